//! Player identity for API requests.
//!
//! Authentication happens upstream. By the time a request reaches us the
//! `Authorization: Bearer <player>` header carries the already-verified player
//! name, and this extractor only lifts it out.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};

/// The player making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player(pub String);

impl Player {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Player
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Player names may be any UTF-8, not only visible ASCII.
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| std::str::from_utf8(h.as_bytes()).ok());

        match auth_header {
            Some(header) => match parse_bearer(header) {
                Some(name) => Ok(Player(name.to_string())),
                None => {
                    tracing::warn!("Invalid Authorization header format");
                    Err(unauthorized())
                }
            },
            None => {
                tracing::warn!("Missing Authorization header");
                Err(unauthorized())
            }
        }
    }
}

fn parse_bearer(header: &str) -> Option<&str> {
    let name = header.strip_prefix("Bearer ")?.trim();
    (!name.is_empty()).then_some(name)
}

fn unauthorized() -> (StatusCode, String) {
    (
        StatusCode::UNAUTHORIZED,
        "A player name is required".to_string(),
    )
}
