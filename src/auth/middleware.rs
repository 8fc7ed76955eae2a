use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;
use std::rc::Rc;

use crate::auth::token::verify_token;
use crate::error::AppError;

/// Bearer-token authentication for every board and task route.
///
/// Verifies the JWT from the `Authorization` header, then resolves the
/// embedded user id against the users table so that tokens for deleted
/// accounts are rejected. On success the user id is placed in request
/// extensions for the `AuthenticatedUserId` extractor.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            // Skip authentication for health check and auth endpoints
            let path = req.path();
            if path == "/health"
                || path.starts_with("/api/auth/login")
                || path.starts_with("/api/auth/register")
            {
                return service.call(req).await;
            }

            let claims = {
                let token = req
                    .headers()
                    .get("Authorization")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer "));

                match token {
                    Some(token) => verify_token(token).map_err(Error::from)?,
                    None => {
                        return Err(AppError::Unauthorized("Missing token".into()).into());
                    }
                }
            };

            // A valid token whose subject no longer resolves to a user
            // (deleted account) is rejected the same way a bad token is.
            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| Error::from(AppError::Internal("Database pool missing".into())))?;

            let user: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
                .bind(claims.sub)
                .fetch_optional(pool.get_ref())
                .await
                .map_err(AppError::from)?;

            if user.is_none() {
                return Err(AppError::Unauthorized("User no longer exists".into()).into());
            }

            req.extensions_mut().insert(claims.sub);
            service.call(req).await
        })
    }
}
