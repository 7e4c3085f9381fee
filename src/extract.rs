use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejection is an `AppError`, so malformed bodies answer 400
/// with the usual error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
