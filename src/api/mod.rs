//! Data access layer for the remote user API.
//!
//! Five operations against a fixed base path, each a single request with no
//! retry, timeout or caching. [`HttpUserApi`] talks to the real server;
//! [`MemoryUserApi`] is an in-process backend with the same semantics.

pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{UserId, UserRecord};

pub use http::HttpUserApi;
pub use memory::{ApiCall, MemoryUserApi};

/// Default base URL of the user resource.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1/user";

/// Remote CRUD operations on user records.
#[async_trait]
pub trait UserApi: Send + Sync {
    /// All records in server-defined order.
    async fn list_all(&self) -> Result<Vec<UserRecord>, ApiError>;

    async fn get_by_id(&self, id: UserId) -> Result<UserRecord, ApiError>;

    /// Persist a new record; the returned record carries the server-assigned id.
    async fn create(&self, record: &UserRecord) -> Result<UserRecord, ApiError>;

    async fn update(&self, id: UserId, record: &UserRecord) -> Result<UserRecord, ApiError>;

    async fn delete_by_id(&self, id: UserId) -> Result<(), ApiError>;
}

#[async_trait]
impl<A: UserApi + ?Sized> UserApi for Arc<A> {
    async fn list_all(&self) -> Result<Vec<UserRecord>, ApiError> {
        (**self).list_all().await
    }

    async fn get_by_id(&self, id: UserId) -> Result<UserRecord, ApiError> {
        (**self).get_by_id(id).await
    }

    async fn create(&self, record: &UserRecord) -> Result<UserRecord, ApiError> {
        (**self).create(record).await
    }

    async fn update(&self, id: UserId, record: &UserRecord) -> Result<UserRecord, ApiError> {
        (**self).update(id, record).await
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), ApiError> {
        (**self).delete_by_id(id).await
    }
}

#[async_trait]
impl<A: UserApi + ?Sized> UserApi for Box<A> {
    async fn list_all(&self) -> Result<Vec<UserRecord>, ApiError> {
        (**self).list_all().await
    }

    async fn get_by_id(&self, id: UserId) -> Result<UserRecord, ApiError> {
        (**self).get_by_id(id).await
    }

    async fn create(&self, record: &UserRecord) -> Result<UserRecord, ApiError> {
        (**self).create(record).await
    }

    async fn update(&self, id: UserId, record: &UserRecord) -> Result<UserRecord, ApiError> {
        (**self).update(id, record).await
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), ApiError> {
        (**self).delete_by_id(id).await
    }
}
