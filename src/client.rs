//! HTTP client for the Estimo API.
//!
//! Configuration is via environment variables:
//! - `ESTIMO_URL` - Base URL (default: `http://localhost:3000/api/v1`)
//! - `ESTIMO_PLAYER` - Player name sent as the bearer identity

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

/// Default URL for local development.
pub const DEFAULT_URL: &str = "http://localhost:3000/api/v1";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The game refused the action; the message is the server's reason.
    #[error("{0}")]
    Rejected(String),

    #[error("Unauthorized: a player name is required")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),
}

/// HTTP client for the Estimo API, acting as one player.
#[derive(Debug, Clone)]
pub struct EstimoClient {
    base_url: String,
    player: Option<String>,
    client: Client,
}

impl EstimoClient {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        let base_url = std::env::var("ESTIMO_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let player = std::env::var("ESTIMO_PLAYER").ok();
        Self::new(base_url, player)
    }

    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, player: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            player,
            client: Client::new(),
        }
    }

    /// Act as a different player.
    pub fn with_player(mut self, player: impl Into<String>) -> Self {
        self.player = Some(player.into());
        self
    }

    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    /// Build a request with the player identity, if any.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref player) = self.player {
            req = req.bearer_auth(player);
        }
        req
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status, body))
        }
    }

    /// Handle response with an empty body.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status, body))
        }
    }

    // ============================================================
    // Game Operations
    // ============================================================

    /// Create a game owned by this client's player.
    pub async fn new_game(&self) -> Result<Uuid, ClientError> {
        let response = self.request(reqwest::Method::POST, "/games").send().await?;
        let created: CreatedGame = self.handle_response(response).await?;
        Ok(created.id)
    }

    pub async fn get_game(&self, id: Uuid) -> Result<Game, ClientError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/games/{}", id))
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn game_ids(&self) -> Result<Vec<Uuid>, ClientError> {
        let response = self.request(reqwest::Method::GET, "/games/ids").send().await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Round Operations
    // ============================================================

    pub async fn new_round(&self, id: Uuid, subject: &str) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::POST, &format!("/games/{}/round", id))
            .json(&NewRoundInput {
                subject: subject.to_string(),
            })
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    pub async fn finish_round(&self, id: Uuid, consensus: &str) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/games/{}/round", id))
            .json(&FinishRoundInput {
                consensus: consensus.to_string(),
            })
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    pub async fn estimate(&self, id: Uuid, value: &str) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::POST, &format!("/games/{}/estimation", id))
            .json(&EstimationInput {
                value: value.to_string(),
            })
            .send()
            .await?;
        self.handle_empty_response(response).await
    }
}

fn status_error(status: StatusCode, body: String) -> ClientError {
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(body),
        StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ClientError::Rejected(body)
        }
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        _ => ClientError::Server(format!("{}: {}", status, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_carries_the_reason() {
        let err = status_error(
            StatusCode::FORBIDDEN,
            "There is no open round".to_string(),
        );
        assert!(matches!(err, ClientError::Rejected(ref r) if r == "There is no open round"));
        assert_eq!(err.to_string(), "There is no open round");
    }

    #[test]
    fn maps_other_statuses() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, String::new()),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()),
            ClientError::Server(_)
        ));
    }

    #[test]
    fn strips_trailing_slash_from_base_url() {
        let client = EstimoClient::new("http://localhost:3000/api/v1/", None).with_player("bob");
        assert_eq!(client.base_url, "http://localhost:3000/api/v1");
        assert_eq!(client.player(), Some("bob"));
    }
}
