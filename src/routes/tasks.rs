use crate::{
    auth::extractors::AuthenticatedUserId,
    error::AppError,
    models::{CommentInput, TaskUpdate},
    services::{CommentEngine, HierarchyStore, MembershipGuard},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

/// Retrieves a single task by its ID.
///
/// The authenticated user must be a member of the board the task belongs to.
/// Existence is checked before membership, so an unknown task reports 404
/// rather than 403.
///
/// ## Responses:
/// - `200 OK`: Returns the `Task` as JSON, embedded comments included.
/// - `403 Forbidden`: If the user is not a member of the task's board.
/// - `404 Not Found`: If the task (or its board) does not exist.
#[get("/{task_id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUserId,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let guard = MembershipGuard::new(pool.get_ref().clone());
    let task = guard.require_task_access(task_id.into_inner(), user.0).await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Applies a partial update to a task.
///
/// Every mutable field is optional; unknown fields are rejected and `reporter`
/// is never accepted. The merged document is re-validated against the same
/// constraints as creation.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task` as JSON.
/// - `403 Forbidden`: If the user is not a member of the task's board.
/// - `404 Not Found`: If the task does not exist.
/// - `409 Conflict`: If the task was modified concurrently.
/// - `422 Unprocessable Entity`: On constraint violations or a column/board mismatch.
#[put("/{task_id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUserId,
    task_id: web::Path<Uuid>,
    update_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    let guard = MembershipGuard::new(pool.get_ref().clone());
    let task = guard.require_task_access(task_id.into_inner(), user.0).await?;

    let hierarchy = HierarchyStore::new(pool.get_ref().clone());
    let task = hierarchy.update_task(task, update_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task.
///
/// Any member of the owning board may delete it; the embedded comments are
/// removed with the document.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `403 Forbidden`: If the user is not a member of the task's board.
/// - `404 Not Found`: If the task does not exist.
#[delete("/{task_id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUserId,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let guard = MembershipGuard::new(pool.get_ref().clone());
    guard.require_task_access(task_id, user.0).await?;

    let hierarchy = HierarchyStore::new(pool.get_ref().clone());
    hierarchy.delete_task(task_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Adds a comment to a task.
///
/// The comment lands at the head of the list (most-recent-first) and the
/// response carries the full list with authors resolved to minimal profiles.
///
/// ## Responses:
/// - `201 Created`: Returns the resolved comment list as JSON.
/// - `403 Forbidden`: If the user is not a member of the task's board.
/// - `404 Not Found`: If the task does not exist.
/// - `409 Conflict`: If the task was modified concurrently.
/// - `422 Unprocessable Entity`: If the content is empty or too long.
#[post("/{task_id}/comments")]
pub async fn add_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUserId,
    task_id: web::Path<Uuid>,
    comment_data: web::Json<CommentInput>,
) -> Result<impl Responder, AppError> {
    let guard = MembershipGuard::new(pool.get_ref().clone());
    let task = guard.require_task_access(task_id.into_inner(), user.0).await?;

    let comments = CommentEngine::new(pool.get_ref().clone());
    let list = comments
        .add_comment(task, user.0, comment_data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(list))
}

/// Deletes a comment from a task. Only the comment's author may delete it.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion; remaining comments keep their order.
/// - `403 Forbidden`: If the requester is not the comment's author, or not a board member.
/// - `404 Not Found`: If the task or the comment does not exist.
/// - `409 Conflict`: If the task was modified concurrently.
#[delete("/{task_id}/comments/{comment_id}")]
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    user: AuthenticatedUserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (task_id, comment_id) = path.into_inner();
    let guard = MembershipGuard::new(pool.get_ref().clone());
    let task = guard.require_task_access(task_id, user.0).await?;

    let comments = CommentEngine::new(pool.get_ref().clone());
    comments.delete_comment(task, comment_id, user.0).await?;

    Ok(HttpResponse::NoContent().finish())
}
