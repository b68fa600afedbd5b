//! Extractors that answer rejections with the JSON error envelope instead of
//! axum's plain-text bodies.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts},
};
use serde::de::DeserializeOwned;

use crate::ServerError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ServerError))]
pub struct ApiQuery<T>(pub T);

/// Parses an optional JSON body: an empty body yields `T::default()`.
///
/// Used for `DELETE` requests, where clients frequently omit the body and the
/// content type.
pub fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ServerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| ServerError::BadRequest(format!("invalid JSON body: {err}")))
}
