//! Request extractors

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, FromRef, FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use platform::client::extract_client_ip;
use serde_json::{Map, Value};

use crate::application::config::AuthConfig;
use crate::error::AuthError;

/// Request bodies built field by field from a JSON object
pub trait FromJsonFields {
    fn from_fields(fields: &Map<String, Value>) -> Self;
}

/// JSON body extractor that never rejects on shape
///
/// The body is read regardless of `Content-Type`. Anything that is not a
/// JSON object (empty, unparsable, an array) reads as `{}`, so missing or
/// mistyped fields reach validation and come back as a 422 with per-field
/// errors. Only failing to buffer the body rejects, e.g. 413 over the
/// body limit.
#[derive(Debug, Clone)]
pub struct LenientJson<T>(pub T);

impl<S, T> FromRequest<S> for LenientJson<T>
where
    S: Send + Sync,
    T: FromJsonFields,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;

        let fields = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        };

        Ok(LenientJson(T::from_fields(&fields)))
    }
}

/// Client IP as used in rate-limit keys
///
/// The TCP peer address, or the first `X-Forwarded-For` entry when
/// `trust_proxy_headers` is set. Falls back to `"unknown"`, so every
/// unidentifiable client shares one registration budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
    Arc<AuthConfig>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AuthConfig>::from_ref(state);

        let direct_ip = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|ConnectInfo(addr)| addr.ip());

        let ip = if config.trust_proxy_headers {
            extract_client_ip(&parts.headers, direct_ip)
        } else {
            direct_ip
        };

        Ok(ClientIp(
            ip.map_or_else(|| "unknown".to_string(), |ip| ip.to_string()),
        ))
    }
}
