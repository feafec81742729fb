//! Small readers over the incoming request.

use salvo::Request;
use salvo::http::header::AUTHORIZATION;
use gatehouse_core::types::PageQuery;
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

/// Raw `Authorization` header value, if present and valid UTF-8.
#[must_use]
pub fn authorization(req: &Request) -> Option<&str> {
    req.headers().get(AUTHORIZATION)?.to_str().ok()
}

/// ## Summary
/// Client address used to count failed sign-ins.
///
/// With `trust_forwarded_for`, prefers the first `X-Forwarded-For` entry,
/// then `X-Real-IP`. Otherwise, and as a fallback, uses the socket peer address.
#[must_use]
pub fn client_ip(req: &Request, trust_forwarded_for: bool) -> String {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let forwarded = trust_forwarded_for
        .then(|| {
            header("x-forwarded-for")
                .and_then(|list| list.split(',').next())
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
                .or_else(|| header("x-real-ip"))
        })
        .flatten();
    if let Some(ip) = forwarded {
        return ip.to_owned();
    }

    let peer = req.remote_addr();
    peer.as_ipv4()
        .map(|addr| addr.ip().to_string())
        .or_else(|| peer.as_ipv6().map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_owned())
}

/// ## Summary
/// Reads the JSON body.
///
/// ## Errors
/// Returns `AppError::BadRequest` if the body is not valid JSON for `T`.
pub async fn json_body<T: DeserializeOwned + Send>(req: &mut Request) -> AppResult<T> {
    req.parse_json::<T>().await.map_err(|error| {
        tracing::debug!(%error, "Rejected request body");
        AppError::BadRequest("invalid request body".to_owned())
    })
}

/// ## Summary
/// Reads the numeric `{id}` path parameter.
///
/// ## Errors
/// Returns `AppError::BadRequest` if the parameter is missing or not a number.
pub fn path_id(req: &Request) -> AppResult<i64> {
    req.param::<i64>("id")
        .ok_or_else(|| AppError::BadRequest("invalid id".to_owned()))
}

/// Paging parameters from `page` and `pageSize` in the query string.
#[must_use]
pub fn page_query(req: &Request) -> PageQuery {
    PageQuery {
        page: req.query::<i64>("page"),
        page_size: req.query::<i64>("pageSize"),
    }
}
