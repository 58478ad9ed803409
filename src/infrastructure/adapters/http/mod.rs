//! REST backend for the PNE API.
//!
//! One [`HttpBackend`] per collection, all sharing a `reqwest::Client` and the
//! credential source. Every request carries `Authorization: Bearer <token>`;
//! when no token is stored the call fails before anything is sent.

mod auth;
mod envelope;

pub use auth::HttpAuthProvider;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{multipart, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{
    ActionRoute, DomainError, Filter, FormValue, Payload, Resource, ResourceAction, UpdateMethod,
};
use crate::ports::{CredentialSource, Listing, ResourceBackend};

use envelope::{ErrorBody, ItemEnvelope, ListEnvelope};

const MAX_ERROR_TEXT: usize = 200;

/// Builds the shared client. Bearer tokens are added per request.
pub fn client() -> Result<reqwest::Client, DomainError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| DomainError::Transport(e.to_string()))
}

pub struct HttpBackend<R: Resource> {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpBackend<R> {
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialSource>) -> Result<Self, DomainError> {
        Ok(Self::with_client(client()?, base_url, credentials))
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            _resource: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, R::ENDPOINT)
    }

    fn listing_url(&self) -> String {
        format!("{}{}", self.base_url, R::LIST_ENDPOINT)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}{}/{}", self.base_url, R::ENDPOINT, id)
    }

    /// Starts an authenticated request.
    fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, DomainError> {
        let token = self.credentials.bearer()?;
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| DomainError::Validation(format!("invalid token: {}", e)))?;
        Ok(self.client.request(method, url).header(AUTHORIZATION, value))
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

        if status == StatusCode::UNAUTHORIZED {
            warn!(resource = R::NAME, "Session token rejected");
            self.credentials.reject();
            return Err(DomainError::Unauthorized(message));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(DomainError::ResourceNotFound(message));
        }
        Err(DomainError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_item(&self, request: RequestBuilder) -> Result<R::Wire, DomainError> {
        let response = self.send(request).await?;
        decode::<ItemEnvelope<R::Wire>>(response)
            .await
            .map(ItemEnvelope::into_inner)
    }
}

#[async_trait]
impl<R: Resource> ResourceBackend<R> for HttpBackend<R> {
    async fn list(&self, filter: &Filter) -> Result<Listing<R::Wire>, DomainError> {
        let url = self.listing_url();
        let mut request = self.request(Method::GET, &url)?;
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            request = request.query(&pairs);
        }

        debug!(resource = R::NAME, %url, params = pairs.len(), "GET");
        let response = self.send(request).await?;
        let (records, meta) = decode::<ListEnvelope<R::Wire>>(response)
            .await?
            .into_parts(filter);
        Ok(Listing { records, meta })
    }

    async fn get(&self, id: &str) -> Result<R::Wire, DomainError> {
        let url = self.item_url(id);
        debug!(resource = R::NAME, %id, "GET");
        self.send_item(self.request(Method::GET, &url)?).await
    }

    async fn create(&self, draft: &R::Draft) -> Result<R::Wire, DomainError> {
        let url = self.collection_url();
        debug!(resource = R::NAME, "POST");
        let request = with_payload(self.request(Method::POST, &url)?, R::draft_payload(draft))?;
        self.send_item(request).await
    }

    async fn update(&self, id: &str, changes: &R::Changes) -> Result<R::Wire, DomainError> {
        let url = self.item_url(id);
        let method = match R::UPDATE_METHOD {
            UpdateMethod::Put => Method::PUT,
            UpdateMethod::Post => Method::POST,
        };
        debug!(resource = R::NAME, %id, %method, "Update");
        let request = with_payload(self.request(method, &url)?, R::changes_payload(changes))?;
        self.send_item(request).await
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let url = self.item_url(id);
        debug!(resource = R::NAME, %id, "DELETE");
        self.send(self.request(Method::DELETE, &url)?).await?;
        Ok(())
    }

    async fn perform(&self, action: &R::Action) -> Result<Option<R::Wire>, DomainError> {
        let url = match action.route() {
            ActionRoute::Item { id, path } => format!("{}/{}", self.item_url(&id), path),
            ActionRoute::Collection { path } => format!("{}/{}", self.collection_url(), path),
        };
        debug!(resource = R::NAME, %url, "POST action");
        let request = with_payload(self.request(Method::POST, &url)?, action.payload())?;
        let response = self.send(request).await?;

        // Acknowledgements like `{"message": "ok"}` carry no record.
        let body = response
            .bytes()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;
        Ok(serde_json::from_slice::<ItemEnvelope<R::Wire>>(&body)
            .ok()
            .map(ItemEnvelope::into_inner))
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

fn with_payload(request: RequestBuilder, payload: Payload) -> Result<RequestBuilder, DomainError> {
    match payload {
        Payload::Empty => Ok(request),
        Payload::Json(body) => Ok(request.json(&body)),
        Payload::Multipart(parts) => {
            let mut form = multipart::Form::new();
            for part in parts {
                form = match part.value {
                    FormValue::Text(text) => form.text(part.name, text),
                    FormValue::File(upload) => {
                        let file = multipart::Part::bytes(upload.bytes)
                            .file_name(upload.file_name)
                            .mime_str(&upload.mime_type)
                            .map_err(|e| DomainError::Validation(e.to_string()))?;
                        form.part(part.name, file)
                    }
                };
            }
            Ok(request.multipart(form))
        }
    }
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DomainError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| DomainError::Transport(e.to_string()))?;
    serde_json::from_slice(&body).map_err(|e| DomainError::Decode(e.to_string()))
}

/// Prefers the JSON `message`/`error` field, falling back to the raw body.
pub(crate) fn error_message(text: &str, status: StatusCode) -> String {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(text) {
        if let Some(message) = body.message.or(body.error) {
            return message;
        }
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    match trimmed.char_indices().nth(MAX_ERROR_TEXT) {
        Some((i, _)) => format!("{}...", &trimmed[..i]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json() {
        assert_eq!(
            error_message(r#"{"message": "Unauthenticated."}"#, StatusCode::UNAUTHORIZED),
            "Unauthenticated."
        );
        assert_eq!(
            error_message("", StatusCode::INTERNAL_SERVER_ERROR),
            "Internal Server Error"
        );
        let long = "x".repeat(500);
        assert_eq!(
            error_message(&long, StatusCode::BAD_GATEWAY).len(),
            MAX_ERROR_TEXT + 3
        );
    }
}
