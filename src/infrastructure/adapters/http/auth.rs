use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, Response};
use tracing::debug;

use super::envelope::ItemEnvelope;
use super::{client, decode, error_message};
use crate::domain::{AuthResponse, DomainError, LoginRequest, RegisterRequest, SessionUser};
use crate::ports::AuthProvider;

const LOGIN: &str = "/api/v1/login";
const REGISTER: &str = "/api/v1/register";
const LOGOUT: &str = "/api/v1/logout";
const CURRENT_USER: &str = "/api/v1/user";

/// Session endpoints. Unlike [`HttpBackend`](super::HttpBackend) the token is
/// passed in explicitly, since the gate that owns it is the caller.
pub struct HttpAuthProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DomainError> {
        Ok(Self::with_client(client()?, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> Result<RequestBuilder, DomainError> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| DomainError::Validation(format!("invalid token: {}", e)))?;
        Ok(request.header(AUTHORIZATION, value))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DomainError> {
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response
            .text()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;
        let message = error_message(&text, status);
        if status.as_u16() == 401 {
            return Err(DomainError::Unauthorized(message));
        }
        Err(DomainError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, DomainError> {
        debug!(email = %request.email, "POST {}", LOGIN);
        let response = self
            .send(self.client.post(self.url(LOGIN)).json(request))
            .await?;
        decode(response).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, DomainError> {
        debug!(email = %request.email, "POST {}", REGISTER);
        let response = self
            .send(self.client.post(self.url(REGISTER)).json(request))
            .await?;
        decode(response).await
    }

    async fn logout(&self, token: &str) -> Result<(), DomainError> {
        debug!("POST {}", LOGOUT);
        let request = self.authorized(self.client.post(self.url(LOGOUT)), token)?;
        self.send(request).await?;
        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<SessionUser, DomainError> {
        debug!("GET {}", CURRENT_USER);
        let request = self.authorized(self.client.get(self.url(CURRENT_USER)), token)?;
        let response = self.send(request).await?;
        decode::<ItemEnvelope<SessionUser>>(response)
            .await
            .map(ItemEnvelope::into_inner)
    }
}
