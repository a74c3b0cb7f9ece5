//! Bearer token authentication.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{Claims, TokenError, TokenIssuer};
use crate::web::error::ApiError;

/// The token from an `Authorization: Bearer` header, if any.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

/// Extractor for authenticated accounts.
///
/// Verifies the `Authorization: Bearer` token with the [`TokenIssuer`]
/// placed in the request extensions by [`token_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub claims: Claims,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }

    /// Succeeds when the caller is `account_id` or an administrator.
    pub fn ensure_self_or_admin(&self, account_id: Uuid) -> Result<(), ApiError> {
        if self.id == account_id || self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Access to another account is not allowed"))
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token = bearer_token(&parts.headers)
                .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

            let issuer = parts
                .extensions
                .get::<Arc<TokenIssuer>>()
                .ok_or_else(|| ApiError::internal("Token issuer not configured"))?;

            let claims = issuer.verify(token).map_err(|e| {
                tracing::debug!(error = %e, "Token verification failed");
                match e {
                    TokenError::Expired => ApiError::unauthorized("Token has expired"),
                    _ => ApiError::unauthorized("Invalid token"),
                }
            })?;

            let id = claims
                .account_id()
                .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;

            Ok(AuthUser { id, claims })
        })
    }
}

/// Extractor for administrators. Missing or invalid tokens are a 401,
/// valid tokens without the admin role a 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user = AuthUser::from_request_parts(parts, state).await?;
            if !user.is_admin() {
                tracing::warn!(account_id = %user.id, "Admin route rejected");
                return Err(ApiError::forbidden("Administrator role required"));
            }
            Ok(AdminUser(user))
        })
    }
}

/// Middleware function to inject the token issuer into request extensions.
pub async fn token_auth(
    State(issuer): State<Arc<TokenIssuer>>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(issuer);
    next.run(request).await
}
