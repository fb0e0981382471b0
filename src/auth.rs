use axum::{
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;

use crate::config::AuthConfig;

/// Role allowed to read but not change the collection.
pub const READER_ROLE: &str = "reader";

/// Authenticated caller identity, available to handlers via request extensions.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub name: String,
    pub role: String,
}

impl CallerIdentity {
    pub fn can_write(&self) -> bool {
        self.role != READER_ROLE
    }
}

#[derive(Serialize)]
struct AuthError {
    success: bool,
    error: String,
}

fn reject(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(AuthError {
            success: false,
            error: error.to_string(),
        }),
    )
        .into_response()
}

pub async fn auth_middleware<B>(
    Extension(config): Extension<std::sync::Arc<AuthConfig>>,
    mut req: Request<B>,
    next: Next<B>,
) -> Response {
    if !config.enabled {
        req.extensions_mut().insert(CallerIdentity {
            name: "anonymous".to_string(),
            role: "admin".to_string(),
        });
        return next.run(req).await;
    }

    let api_key = req
        .headers()
        .get("X-API-Key")
        .or_else(|| req.headers().get(header::AUTHORIZATION))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s));

    let Some(key) = api_key else {
        return reject(
            StatusCode::UNAUTHORIZED,
            "Missing API key. Provide X-API-Key header or Authorization: Bearer <key>",
        );
    };

    let Some(entry) = config
        .api_keys
        .iter()
        .find(|entry| entry.key.as_bytes().ct_eq(key.as_bytes()).into())
    else {
        tracing::warn!("Invalid API key presented");
        return reject(StatusCode::UNAUTHORIZED, "Invalid API key");
    };

    let caller = CallerIdentity {
        name: entry.name.clone(),
        role: entry.role.clone(),
    };
    if req.method() != Method::GET && !caller.can_write() {
        tracing::warn!(caller = %caller.name, method = %req.method(), "Write attempted with read-only key");
        return reject(StatusCode::FORBIDDEN, "API key is read-only");
    }

    tracing::debug!(caller = %caller.name, role = %caller.role, "Authenticated request");
    req.extensions_mut().insert(caller);
    next.run(req).await
}
