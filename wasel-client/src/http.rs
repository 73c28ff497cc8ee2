//! HTTP client for the hosted backend
//!
//! Every request carries the public `apikey` header plus a bearer token: the
//! signed-in user's access token when one is set, otherwise the anon key.

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{ClientConfig, ClientError, ClientResult};

/// Shared access-token slot, written by the auth client on sign-in/out
#[derive(Debug, Clone, Default)]
pub struct TokenSlot(Arc<RwLock<Option<String>>>);

impl TokenSlot {
    pub fn set(&self, token: Option<String>) {
        *self.0.write() = token;
    }

    pub fn get(&self) -> Option<String> {
        self.0.read().clone()
    }
}

/// HTTP client for making requests to the backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: Arc<ClientConfig>,
    token: TokenSlot,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config.clone()),
            token: TokenSlot::default(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Token slot shared by every clone of this client
    pub fn token_slot(&self) -> &TokenSlot {
        &self.token
    }

    /// Set the user access token
    pub fn set_token(&self, token: Option<String>) {
        self.token.set(token);
    }

    /// Build authorization header value
    fn auth_header(&self) -> String {
        let token = self
            .token
            .get()
            .unwrap_or_else(|| self.config.anon_key.clone());
        format!("Bearer {token}")
    }

    /// Start a request with the backend headers applied
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
    }

    /// Send and check the status
    pub async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await?;
        Self::check_response(response).await
    }

    /// Send and decode the JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = self.send(request).await?;
        response.json().await.map_err(Into::into)
    }

    /// Map non-2xx responses onto [`ClientError`]
    async fn check_response(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await?;
        let message = error_message(&text);
        tracing::debug!(status = status.as_u16(), %message, "backend request failed");
        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(message)
            }
            _ => ClientError::Internal(message),
        })
    }
}

/// Pull a message out of the backend's error bodies
///
/// Data API: `{"message": ..}`; auth API: `{"error_description": ..}` or
/// `{"msg": ..}`; our own functions: `ApiResponse { message }`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error_description", "msg", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"message":"duplicate key"}"#), "duplicate key");
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message("gateway down"), "gateway down");
    }

    #[test]
    fn test_token_slot_shared_between_clones() {
        let http = HttpClient::new(&ClientConfig::new("http://localhost", "anon")).unwrap();
        let clone = http.clone();
        assert_eq!(http.auth_header(), "Bearer anon");
        clone.set_token(Some("user-token".into()));
        assert_eq!(http.auth_header(), "Bearer user-token");
        http.set_token(None);
        assert_eq!(clone.token_slot().get(), None);
    }
}
