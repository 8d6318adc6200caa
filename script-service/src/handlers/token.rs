use crate::dtos::TokenResponse;
use crate::extract::JsonBody;
use crate::startup::AppState;
use axum::{extract::State, Json};
use serde_json::Value;
use service_core::error::AppError;

/// `POST /jwt`: sign whatever JSON object the caller sends.
pub async fn issue_token(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state
        .tokens
        .issue(payload)
        .map_err(AppError::BadRequest)?;

    tracing::info!(
        expires_in = state.tokens.expiry_seconds(),
        "Issued bearer token"
    );

    Ok(Json(TokenResponse { token }))
}
