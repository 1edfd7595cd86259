//! HTTP client - network communication

use async_trait::async_trait;
use reqwest::{Client, StatusCode, multipart::Form};
use serde::de::DeserializeOwned;

use crate::{ClientConfig, ClientError, ClientResult};

/// HTTP client trait
///
/// The seam between the typed API surface and the network; tests drive the
/// API layer through a recording fake.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T>;
    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T>;
    async fn patch<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn delete(&self, path: &str) -> ClientResult<()>;
    async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> ClientResult<T>;
    async fn patch_multipart<T: DeserializeOwned>(&self, path: &str, form: Form)
    -> ClientResult<T>;
    /// POST with an explicit bearer token instead of the stored credential
    /// (the driver endpoint authenticates with its own token).
    async fn post_with_token<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        token: &str,
    ) -> ClientResult<T>;

    fn token(&self) -> Option<&str>;
    fn set_token(&mut self, token: Option<String>);
}

/// Pull a human-readable message out of an error response body.
///
/// The backend has shipped `{error: {message}}`, `{message}` and
/// `{error: "..."}` over time; try them in that order.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(msg) = value.pointer("/error/message").and_then(|v| v.as_str()) {
        return Some(msg.to_string());
    }
    if let Some(msg) = value.get("message").and_then(|v| v.as_str()) {
        return Some(msg.to_string());
    }
    value
        .get("error")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Network HTTP client
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl NetworkHttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// API base URL (with `/api` prefix)
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_header() {
            Some(auth) => req.header(reqwest::header::AUTHORIZATION, auth),
            None => req,
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&text).unwrap_or(text);
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(message)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(ClientError::Validation(message))
                }
                _ => Err(ClientError::Internal(message)),
            };
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let req = self.with_auth(self.client.get(self.url(path)));
        self.handle_response(req.send().await?).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.with_auth(self.client.post(self.url(path)).json(body));
        self.handle_response(req.send().await?).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let req = self.with_auth(self.client.post(self.url(path)));
        self.handle_response(req.send().await?).await
    }

    async fn patch<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let req = self.with_auth(self.client.patch(self.url(path)).json(body));
        self.handle_response(req.send().await?).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let req = self.with_auth(self.client.delete(self.url(path)));
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            // reuse the error mapping; the body type does not matter here
            return self
                .handle_response::<serde_json::Value>(response)
                .await
                .map(|_| ());
        }
        Ok(())
    }

    async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> ClientResult<T> {
        let req = self.with_auth(self.client.post(self.url(path)).multipart(form));
        self.handle_response(req.send().await?).await
    }

    async fn patch_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> ClientResult<T> {
        let req = self.with_auth(self.client.patch(self.url(path)).multipart(form));
        self.handle_response(req.send().await?).await
    }

    async fn post_with_token<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        token: &str,
    ) -> ClientResult<T> {
        let req = self
            .client
            .post(self.url(path))
            .json(body)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token));
        self.handle_response(req.send().await?).await
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_extraction_order() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"nested"},"message":"flat"}"#),
            Some("nested".into())
        );
        assert_eq!(
            extract_error_message(r#"{"message":"flat"}"#),
            Some("flat".into())
        );
        assert_eq!(
            extract_error_message(r#"{"error":"plain"}"#),
            Some("plain".into())
        );
        assert_eq!(extract_error_message("not json"), None);
    }

    #[test]
    fn url_joining_strips_duplicate_slashes() {
        let client = NetworkHttpClient::new(&ClientConfig::new("http://localhost:8080")).unwrap();
        assert_eq!(
            client.url("/admin/orders"),
            "http://localhost:8080/api/admin/orders"
        );
        assert_eq!(client.url("menu"), "http://localhost:8080/api/menu");
    }
}
