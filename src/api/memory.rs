//! In-process user backend.
//!
//! Keeps records in insertion order, assigns incrementing ids on create and
//! answers missing ids with [`ApiError::NotFound`]. Every call is appended to
//! a log so callers can check exactly which requests were issued.

use std::sync::Mutex;

use async_trait::async_trait;

use super::UserApi;
use crate::error::ApiError;
use crate::model::{UserId, UserRecord};

/// One request observed by [`MemoryUserApi`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    ListAll,
    GetById(UserId),
    Create,
    Update(UserId),
    Delete(UserId),
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<UserRecord>,
    next_id: UserId,
    calls: Vec<ApiCall>,
    fail_next: Option<ApiError>,
}

#[derive(Debug, Default)]
pub struct MemoryUserApi {
    inner: Mutex<Inner>,
}

impl MemoryUserApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing records. Records without an id get one assigned.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = UserRecord>,
    {
        let api = Self::new();
        {
            let mut inner = api.lock();
            for mut rec in records {
                let id = match rec.id {
                    Some(id) => id,
                    None => inner.next_id + 1,
                };
                inner.next_id = inner.next_id.max(id);
                rec.id = Some(id);
                inner.records.push(rec);
            }
        }
        api
    }

    /// Make the next call (of any kind) fail with `err`.
    pub fn fail_next(&self, err: ApiError) {
        self.lock().fail_next = Some(err);
    }

    /// Requests observed so far, oldest first.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Vec<UserRecord> {
        self.lock().records.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the call and take any injected failure.
    fn begin(&self, call: ApiCall) -> Result<std::sync::MutexGuard<'_, Inner>, ApiError> {
        let mut inner = self.lock();
        inner.calls.push(call);
        match inner.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(inner),
        }
    }
}

fn not_found(id: UserId) -> ApiError {
    ApiError::NotFound(format!("user {id}"))
}

#[async_trait]
impl UserApi for MemoryUserApi {
    async fn list_all(&self) -> Result<Vec<UserRecord>, ApiError> {
        let inner = self.begin(ApiCall::ListAll)?;
        Ok(inner.records.clone())
    }

    async fn get_by_id(&self, id: UserId) -> Result<UserRecord, ApiError> {
        let inner = self.begin(ApiCall::GetById(id))?;
        inner
            .records
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, record: &UserRecord) -> Result<UserRecord, ApiError> {
        let mut inner = self.begin(ApiCall::Create)?;
        inner.next_id += 1;
        let created = UserRecord {
            id: Some(inner.next_id),
            ..record.clone()
        };
        inner.records.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: UserId, record: &UserRecord) -> Result<UserRecord, ApiError> {
        let mut inner = self.begin(ApiCall::Update(id))?;
        let slot = inner
            .records
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or_else(|| not_found(id))?;
        *slot = UserRecord {
            id: Some(id),
            ..record.clone()
        };
        Ok(slot.clone())
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), ApiError> {
        let mut inner = self.begin(ApiCall::Delete(id))?;
        let before = inner.records.len();
        inner.records.retain(|r| r.id != Some(id));
        if inner.records.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}
