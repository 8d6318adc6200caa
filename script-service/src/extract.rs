use axum::extract::FromRequest;
use service_core::error::AppError;

/// `axum::Json` whose rejections surface as `AppError::BadRequest`, so an
/// undecodable body gets the same `{ "error": ... }` shape as every other
/// failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
