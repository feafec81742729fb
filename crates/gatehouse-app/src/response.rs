//! The `{code, data, msg}` envelope every endpoint answers with.

use gatehouse_core::constants::{RESPONSE_CODE_ERROR, RESPONSE_CODE_SUCCESS};
use salvo::writing::Json;
use serde::Serialize;

use crate::error::AppResult;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub data: Option<T>,
    pub msg: String,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn success(data: T, msg: impl Into<String>) -> Self {
        Self {
            code: RESPONSE_CODE_SUCCESS,
            data: Some(data),
            msg: msg.into(),
        }
    }

    #[must_use]
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            code: RESPONSE_CODE_ERROR,
            data: None,
            msg: msg.into(),
        }
    }
}

pub type ApiResult<T> = AppResult<Json<Envelope<T>>>;

/// Wraps `data` in a success envelope.
///
/// ## Errors
/// Never fails; returns `Result` so handlers can end with it directly.
pub fn ok<T>(data: T, msg: &str) -> ApiResult<T> {
    Ok(Json(Envelope::success(data, msg)))
}

/// Success envelope without a payload, for writes.
///
/// ## Errors
/// Never fails.
pub fn done(msg: &str) -> ApiResult<()> {
    Ok(Json(Envelope {
        code: RESPONSE_CODE_SUCCESS,
        data: None,
        msg: msg.to_owned(),
    }))
}
