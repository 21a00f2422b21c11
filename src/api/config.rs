//! Server configuration loaded from environment variables.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::gateway::LockScope;

/// Settings that shape the HTTP server.
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (from ESTIMO_CORS_ORIGINS, comma-separated).
    /// `None` or a `*` entry allows any origin.
    pub cors_origins: Option<Vec<String>>,
    /// Critical section scope for mutations (from ESTIMO_LOCK).
    pub lock_scope: LockScope,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("ESTIMO_CORS_ORIGINS")
            .ok()
            .map(|s| s.split(',').map(|s| s.trim().to_string()).collect());

        let lock_scope = match std::env::var("ESTIMO_LOCK") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring ESTIMO_LOCK: {}", e);
                LockScope::default()
            }),
            Err(_) => LockScope::default(),
        };

        Self {
            cors_origins,
            lock_scope,
        }
    }

    pub fn with_cors_origins(origins: Vec<String>) -> Self {
        Self {
            cors_origins: Some(origins),
            ..Self::default()
        }
    }

    pub fn cors_layer(&self) -> CorsLayer {
        let origins = match &self.cors_origins {
            Some(origins) if !origins.iter().any(|o| o == "*") => origins,
            _ => return CorsLayer::permissive(),
        };

        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .expose_headers([header::LOCATION])
    }
}
