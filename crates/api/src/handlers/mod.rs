pub mod admin;
pub mod auth;
pub mod conversation;
pub mod listing;
pub mod notification;
pub mod order;

use amari_core::error::CoreError;
use axum::extract::rejection::JsonRejection;
use axum::Json;

/// Unwrap a JSON body, turning a malformed or mistyped body into a 400
/// with the endpoint's own error code.
pub(crate) fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    code: &'static str,
) -> Result<T, CoreError> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| CoreError::validation(code, rejection.body_text()))
}
