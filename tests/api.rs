//! End-to-end tests against a live PostgreSQL instance.
//!
//! These require `DATABASE_URL` pointing at a database with `schema.sql`
//! applied, so they are `#[ignore]`d by default; run them with
//! `cargo test -- --ignored`.

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{rt, test, web, App, HttpServer};
use boardforge::auth::AuthMiddleware;
use boardforge::routes;
use boardforge::routes::health;
use dotenv::dotenv;
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlx::PgPool;
use std::net::TcpListener;
use uuid::Uuid;

async fn connect_pool() -> PgPool {
    dotenv().ok();
    if std::env::var("JWT_SECRET").is_err() {
        std::env::set_var("JWT_SECRET", "integration-test-secret");
    }
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB")
}

/// Unique suffix so test users never collide across runs.
fn tag() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

struct TestUser {
    id: i64,
    token: String,
}

/// Registers a fresh account through the API and hands back its id and token.
/// Also checks that the registration response never leaks credential material.
async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    email: &str,
    password: &str,
) -> TestUser {
    let resp = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": username,
                "email": email,
                "password": password
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    TestUser {
        id: body["id"].as_i64().unwrap(),
        token: body["token"].as_str().unwrap().to_string(),
    }
}

macro_rules! test_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

// Requires a live database; see module docs.
#[ignore]
#[actix_rt::test]
async fn test_board_column_task_comment_flow() {
    let pool = connect_pool().await;
    let app = test_app!(pool);
    let tag = tag();

    // Register user A.
    let alice = register_user(
        &app,
        &format!("alice_{}", tag),
        &format!("alice_{}@example.com", tag),
        "secret1password",
    )
    .await;
    let alice_token = alice.token;
    let alice_id = alice.id;

    // A second registration with the same email (any username) is rejected.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": format!("other_{}", tag),
                "email": format!("alice_{}@example.com", tag),
                "password": "secret1password"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);

    // Login issues a fresh token.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({
                "email": format!("alice_{}@example.com", tag),
                "password": "secret1password"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    // A wrong password is rejected without detail.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({
                "email": format!("alice_{}@example.com", tag),
                "password": "not-the-password"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    // Create board "Sprint 1"; the creator is owner and sole member.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/boards")
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .set_json(json!({ "name": "Sprint 1" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let board: serde_json::Value = test::read_body_json(resp).await;
    let board_id = board["id"].as_str().unwrap().to_string();
    assert_eq!(board["owner"].as_i64(), Some(alice_id));
    assert_eq!(board["members"], json!([alice_id]));

    // Two sequential column creates get positions 0 and 1.
    let mut column_ids = Vec::new();
    for (name, expected_position) in [("To Do", 0), ("Doing", 1)] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/boards/{}/columns", board_id))
                .append_header(("Authorization", format!("Bearer {}", alice_token)))
                .set_json(json!({ "name": name }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);
        let column: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(column["position"].as_i64(), Some(expected_position));
        column_ids.push(column["id"].as_str().unwrap().to_string());
    }

    // Listing returns them ordered ascending by position.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/boards/{}/columns", board_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let columns: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(columns[0]["name"], "To Do");
    assert_eq!(columns[1]["name"], "Doing");

    // Create a task in "To Do"; defaults and reporter are applied.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/boards/{}/tasks", board_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .set_json(json!({ "title": "Fix header", "column": column_ids[0] }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let task: serde_json::Value = test::read_body_json(resp).await;
    let task_id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["status"], "todo");
    assert_eq!(task["type"], "task");
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["reporter"].as_i64(), Some(alice_id));

    // A column from another board is a validation failure, not a silent accept.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/boards/{}/tasks", board_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .set_json(json!({ "title": "Bad column", "column": Uuid::new_v4() }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 422);

    // Register user B, who is not a member of the board.
    let bob = register_user(
        &app,
        &format!("bob_{}", tag),
        &format!("bob_{}@example.com", tag),
        "secret2password",
    )
    .await;
    let bob_token = bob.token;

    // B is forbidden everywhere under the board: task detail, listings, creation.
    for req in [
        test::TestRequest::get().uri(&format!("/api/tasks/{}", task_id)),
        test::TestRequest::get().uri(&format!("/api/boards/{}/columns", board_id)),
        test::TestRequest::get().uri(&format!("/api/boards/{}/tasks", board_id)),
    ] {
        let resp = test::call_service(
            &app,
            req.append_header(("Authorization", format!("Bearer {}", bob_token)))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 403);
    }
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/boards/{}/tasks", board_id))
            .append_header(("Authorization", format!("Bearer {}", bob_token)))
            .set_json(json!({ "title": "Intruder", "column": column_ids[0] }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);

    // B does not see the board in their own listing.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/boards")
            .append_header(("Authorization", format!("Bearer {}", bob_token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let bob_boards: serde_json::Value = test::read_body_json(resp).await;
    assert!(bob_boards.as_array().unwrap().is_empty());

    // A status update persists and is visible on a subsequent read.
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/tasks/{}", task_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .set_json(json!({ "status": "inprogress" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/tasks/{}", task_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .to_request(),
    )
    .await;
    let task: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(task["status"], "inprogress");

    // An unknown field (reporter) in the update payload is rejected outright.
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/tasks/{}", task_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .set_json(json!({ "reporter": 42 }))
            .to_request(),
    )
    .await;
    assert!(resp.status().is_client_error());

    // Comments: first in, then a newer one at the head.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/tasks/{}/comments", task_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .set_json(json!({ "content": "First look" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/tasks/{}/comments", task_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .set_json(json!({ "content": "Second look" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let comments: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(comments[0]["content"], "Second look");
    assert_eq!(comments[1]["content"], "First look");
    assert_eq!(
        comments[0]["author"]["username"].as_str().unwrap(),
        format!("alice_{}", tag)
    );
    let newest_comment_id = comments[0]["id"].as_str().unwrap().to_string();

    // An empty comment is a validation failure.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/tasks/{}/comments", task_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .set_json(json!({ "content": "" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 422);

    // B cannot delete A's comment, and the list is unchanged afterwards.
    // (B is not even a board member, so the guard rejects the task access.)
    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/tasks/{}/comments/{}", task_id, newest_comment_id))
            .append_header(("Authorization", format!("Bearer {}", bob_token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);

    // A deletes the newest comment; the prior list is restored in order.
    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/tasks/{}/comments/{}", task_id, newest_comment_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 204);
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/tasks/{}", task_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .to_request(),
    )
    .await;
    let task: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(task["comments"].as_array().unwrap().len(), 1);
    assert_eq!(task["comments"][0]["content"], "First look");

    // Deleting the task removes it for good.
    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/tasks/{}", task_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 204);
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/tasks/{}", task_id))
            .append_header(("Authorization", format!("Bearer {}", alice_token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);
}

// Requires a live database; see module docs.
#[ignore]
#[actix_rt::test]
async fn test_unauthenticated_and_invalid_requests() {
    let pool = connect_pool().await;
    let app = test_app!(pool);

    // Health is reachable without a token.
    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(resp.status().is_success());

    // Everything under /api (except auth) requires a token.
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/boards").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    // A garbage token is rejected.
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/boards")
            .append_header(("Authorization", "Bearer not-a-jwt"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    let test_cases = vec![
        // Deserialization errors (expect 400 for missing fields)
        (
            json!({ "email": "test@example.com", "password": "Password123!" }),
            actix_web::http::StatusCode::BAD_REQUEST,
            "missing username",
        ),
        (
            json!({ "username": "testuser", "password": "Password123!" }),
            actix_web::http::StatusCode::BAD_REQUEST,
            "missing email",
        ),
        // Validation errors (expect 422 for invalid formats/lengths after successful deserialization)
        (
            json!({ "username": "testuser", "email": "invalid-email", "password": "Password123!" }),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "invalid email format",
        ),
        (
            json!({ "username": "u", "email": "test@example.com", "password": "Password123!" }),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "username too short",
        ),
        (
            json!({ "username": "a".repeat(31), "email": "test@example.com", "password": "Password123!" }),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "username too long",
        ),
        (
            json!({ "username": "user name!", "email": "test@example.com", "password": "Password123!" }),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "username with invalid chars",
        ),
        (
            json!({ "username": "testuser", "email": "test@example.com", "password": "123" }),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "password too short",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&payload)
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected_status, "case: {}", description);
    }
}

// Requires a live database; see module docs. Runs against a real socket so
// the bearer-token check is exercised over HTTP rather than the in-process
// test harness.
#[ignore]
#[test_log::test(actix_rt::test)]
async fn test_live_server_requires_token() {
    let pool = connect_pool().await;

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let server_pool = pool.clone();
    let server_handle = rt::spawn(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(server_pool.clone()))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                )
        })
        .bind(("127.0.0.1", port))
        .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
        .run()
        .await
    });

    // Give the server a moment to start.
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://127.0.0.1:{}/api/boards", port))
        .json(&json!({ "name": "No token" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Health stays reachable without credentials.
    let resp = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    server_handle.abort();
}
