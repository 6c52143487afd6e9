//! HTTP backend for [`UserApi`](super::UserApi).
//!
//! Endpoints, relative to the base URL:
//!
//! | op     | method | path                |
//! |--------|--------|---------------------|
//! | list   | GET    | `/get-all-users`    |
//! | get    | GET    | `/{id}/get-by-id`   |
//! | create | POST   | `/add-user`         |
//! | update | PUT    | `/{id}/update-user` |
//! | delete | DELETE | `/{id}/delete-user` |

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::UserApi;
use crate::error::ApiError;
use crate::model::{UserId, UserRecord};

#[derive(Debug, Clone)]
pub struct HttpUserApi {
    client: Client,
    base: String,
}

impl HttpUserApi {
    /// Create a backend for `base_url` (e.g. `http://localhost:8080/api/v1/user`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create with a custom reqwest [`Client`] (proxies, TLS roots, etc.).
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    /// Send the request and turn any non-2xx status into an [`ApiError`].
    async fn execute(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.send().await.map_err(|e| ApiError::transport_chain(&e))?;
        let status = resp.status();
        debug!(url = %resp.url(), status = status.as_u16(), "user api response");
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), body))
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let resp = self.execute(req).await?;
        let bytes = resp.bytes().await.map_err(|e| ApiError::transport_chain(&e))?;
        serde_json::from_slice(&bytes).map_err(ApiError::decode)
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn list_all(&self) -> Result<Vec<UserRecord>, ApiError> {
        self.fetch(self.client.get(self.url("get-all-users"))).await
    }

    async fn get_by_id(&self, id: UserId) -> Result<UserRecord, ApiError> {
        self.fetch(self.client.get(self.url(&format!("{id}/get-by-id"))))
            .await
    }

    async fn create(&self, record: &UserRecord) -> Result<UserRecord, ApiError> {
        let body = record.without_id();
        self.fetch(self.client.post(self.url("add-user")).json(&body))
            .await
    }

    async fn update(&self, id: UserId, record: &UserRecord) -> Result<UserRecord, ApiError> {
        let req = self
            .client
            .put(self.url(&format!("{id}/update-user")))
            .json(record);
        self.fetch(req).await
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), ApiError> {
        self.execute(self.client.delete(self.url(&format!("{id}/delete-user"))))
            .await
            .map(|_| ())
    }
}
