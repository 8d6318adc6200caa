use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::{services::TokenClaims, startup::AppState};

const UNAUTHORIZED_MESSAGE: &str = "Unauthorized access";
const FORBIDDEN_MESSAGE: &str = "Forbidden access";

/// Requires a valid bearer token. A missing header is 401, anything that
/// fails verification is 403. On success the claims go into request
/// extensions for [`AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        tracing::warn!(path = %req.uri().path(), "Request without Authorization header");
        return Err(AppError::Unauthorized(anyhow::anyhow!(UNAUTHORIZED_MESSAGE)));
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            tracing::warn!("Malformed Authorization header");
            AppError::Forbidden(anyhow::anyhow!(FORBIDDEN_MESSAGE))
        })?;

    let claims = state.tokens.verify(token).map_err(|e| {
        tracing::warn!(error = %e, "Bearer token rejected");
        AppError::from(e)
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Extractor for the claims stored by [`auth_middleware`].
pub struct AuthUser(pub TokenClaims);

impl AuthUser {
    /// Fails with 403 unless the token's `email` equals `owner`.
    pub fn ensure_owner(&self, owner: &str) -> Result<(), AppError> {
        match self.0.subject() {
            Some(subject) if subject == owner => Ok(()),
            subject => {
                tracing::warn!(
                    token_subject = ?subject,
                    requested_owner = %owner,
                    "Token subject does not own requested resource"
                );
                Err(AppError::Forbidden(anyhow::anyhow!(FORBIDDEN_MESSAGE)))
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<TokenClaims>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Auth claims missing from request extensions"
            ))
        })?;

        Ok(AuthUser(claims.clone()))
    }
}
