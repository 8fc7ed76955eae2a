use crate::{
    auth::extractors::AuthenticatedUserId,
    error::AppError,
    models::{BoardInput, ColumnInput, TaskInput},
    services::{HierarchyStore, MembershipGuard},
};
use actix_web::{get, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

/// Creates a board owned by the authenticated user.
///
/// The creator becomes the owner and the sole initial member.
///
/// ## Responses:
/// - `201 Created`: Returns the new `Board` as JSON.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `422 Unprocessable Entity`: If the name or description violate length limits.
#[post("")]
pub async fn create_board(
    pool: web::Data<PgPool>,
    user: AuthenticatedUserId,
    board_data: web::Json<BoardInput>,
) -> Result<impl Responder, AppError> {
    let hierarchy = HierarchyStore::new(pool.get_ref().clone());
    let board = hierarchy.create_board(user.0, board_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(board))
}

/// Lists every board the authenticated user is a member of.
#[get("")]
pub async fn list_boards(
    pool: web::Data<PgPool>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let hierarchy = HierarchyStore::new(pool.get_ref().clone());
    let boards = hierarchy.list_boards_for_user(user.0).await?;

    Ok(HttpResponse::Ok().json(boards))
}

/// Appends a column to a board the authenticated user is a member of.
///
/// Positions are dense and zero-based in creation order.
///
/// ## Responses:
/// - `201 Created`: Returns the new `Column` as JSON.
/// - `403 Forbidden`: If the user is not a member of the board.
/// - `404 Not Found`: If the board does not exist.
#[post("/{board_id}/columns")]
pub async fn create_column(
    pool: web::Data<PgPool>,
    user: AuthenticatedUserId,
    board_id: web::Path<Uuid>,
    column_data: web::Json<ColumnInput>,
) -> Result<impl Responder, AppError> {
    let board_id = board_id.into_inner();
    let guard = MembershipGuard::new(pool.get_ref().clone());
    guard.require_board_member(board_id, user.0).await?;

    let hierarchy = HierarchyStore::new(pool.get_ref().clone());
    let column = hierarchy.create_column(board_id, column_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(column))
}

/// Lists a board's columns in ascending position order.
#[get("/{board_id}/columns")]
pub async fn list_columns(
    pool: web::Data<PgPool>,
    user: AuthenticatedUserId,
    board_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let board_id = board_id.into_inner();
    let guard = MembershipGuard::new(pool.get_ref().clone());
    guard.require_board_member(board_id, user.0).await?;

    let hierarchy = HierarchyStore::new(pool.get_ref().clone());
    let columns = hierarchy.list_columns(board_id).await?;

    Ok(HttpResponse::Ok().json(columns))
}

/// Creates a task on a board the authenticated user is a member of.
///
/// The acting user becomes the task's reporter; the referenced column must
/// belong to the same board.
///
/// ## Responses:
/// - `201 Created`: Returns the new `Task` as JSON.
/// - `403 Forbidden`: If the user is not a member of the board.
/// - `404 Not Found`: If the board does not exist.
/// - `422 Unprocessable Entity`: On field constraint violations or a column/board mismatch.
#[post("/{board_id}/tasks")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUserId,
    board_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let board_id = board_id.into_inner();
    let guard = MembershipGuard::new(pool.get_ref().clone());
    guard.require_board_member(board_id, user.0).await?;

    let hierarchy = HierarchyStore::new(pool.get_ref().clone());
    let task = hierarchy
        .create_task(board_id, user.0, task_data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(task))
}

/// Lists all tasks on a board the authenticated user is a member of.
#[get("/{board_id}/tasks")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    user: AuthenticatedUserId,
    board_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let board_id = board_id.into_inner();
    let guard = MembershipGuard::new(pool.get_ref().clone());
    guard.require_board_member(board_id, user.0).await?;

    let hierarchy = HierarchyStore::new(pool.get_ref().clone());
    let tasks = hierarchy.list_tasks(board_id).await?;

    Ok(HttpResponse::Ok().json(tasks))
}
