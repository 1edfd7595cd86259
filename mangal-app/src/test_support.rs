//! Programmable fake HTTP client for unit tests

use async_trait::async_trait;
use mangal_client::{ClientError, ClientResult, HttpClient};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Error kinds the fake can inject per path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailKind {
    Unauthorized,
    NotFound,
    Internal,
}

impl FailKind {
    fn to_error(self) -> ClientError {
        match self {
            Self::Unauthorized => ClientError::Unauthorized,
            Self::NotFound => ClientError::NotFound("not found".into()),
            Self::Internal => ClientError::Internal("boom".into()),
        }
    }
}

/// Replays canned JSON per path; records every call.
#[derive(Debug, Default)]
pub struct FakeHttp {
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, FailKind>>,
    calls: Mutex<Vec<(String, String, Option<Value>)>>,
    token: Option<String>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, value: Value) {
        self.responses.lock().unwrap().insert(path.to_string(), value);
        self.failures.lock().unwrap().remove(path);
    }

    pub fn fail(&self, path: &str, kind: FailKind) {
        self.failures.lock().unwrap().insert(path.to_string(), kind);
    }

    pub fn calls(&self) -> Vec<(String, String, Option<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    fn record<B: serde::Serialize>(&self, method: &str, path: &str, body: Option<&B>) {
        self.calls.lock().unwrap().push((
            method.to_string(),
            path.to_string(),
            body.and_then(|b| serde_json::to_value(b).ok()),
        ));
    }

    fn reply<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        if let Some(kind) = self.failures.lock().unwrap().get(path) {
            return Err(kind.to_error());
        }
        let value = self
            .responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("no canned response for {}", path)))?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.record::<()>("GET", path, None);
        self.reply(path)
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.record("POST", path, Some(body));
        self.reply(path)
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.record::<()>("POST", path, None);
        self.reply(path)
    }

    async fn patch<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.record("PATCH", path, Some(body));
        self.reply(path)
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        self.record::<()>("DELETE", path, None);
        if let Some(kind) = self.failures.lock().unwrap().get(path) {
            return Err(kind.to_error());
        }
        Ok(())
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        _form: reqwest::multipart::Form,
    ) -> ClientResult<T> {
        self.record::<()>("POST(multipart)", path, None);
        self.reply(path)
    }

    async fn patch_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        _form: reqwest::multipart::Form,
    ) -> ClientResult<T> {
        self.record::<()>("PATCH(multipart)", path, None);
        self.reply(path)
    }

    async fn post_with_token<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        _token: &str,
    ) -> ClientResult<T> {
        self.record("POST", path, Some(body));
        self.reply(path)
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }
}
