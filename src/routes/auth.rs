use crate::{
    auth::{LoginRequest, RegisterRequest},
    error::AppError,
    services::IdentityDirectory,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;

/// Register a new user
///
/// Creates a new user account and returns the public profile together with
/// an authentication token.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let identity = IdentityDirectory::new(pool.get_ref().clone());
    let response = identity.register(register_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(response))
}

/// Login user
///
/// Authenticates a user and returns the profile plus a fresh token.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let identity = IdentityDirectory::new(pool.get_ref().clone());
    let response = identity.authenticate(login_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(response))
}
