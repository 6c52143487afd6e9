//! List orchestrator: the authoritative collection of user records and the
//! glue between the table, the form and the remote API.
//!
//! The collection is only ever replaced by [`UserList::refresh`]; nothing here
//! patches individual rows after a mutation.

use tracing::{info, warn};

use crate::api::UserApi;
use crate::error::ApiError;
use crate::form::{SubmitOutcome, UserForm};
use crate::model::{UserId, UserRecord};
use crate::notify::{Confirm, Level, Notifier};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this user?";
pub const DELETED_MESSAGE: &str = "User deleted successfully!";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete user.";
pub const SAVED_MESSAGE: &str = "User saved successfully!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The operator declined the confirmation; nothing was sent.
    Declined,
    Deleted,
    Failed(ApiError),
}

/// Why the form dialog closed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CloseReason {
    Cancelled,
    Saved,
}

pub struct UserList<A, N, C> {
    api: A,
    notifier: N,
    confirm: C,
    users: Vec<UserRecord>,
    form: UserForm,
}

impl<A, N, C> UserList<A, N, C>
where
    A: UserApi,
    N: Notifier,
    C: Confirm,
{
    pub fn new(api: A, notifier: N, confirm: C) -> Self {
        Self {
            api,
            notifier,
            confirm,
            users: Vec::new(),
            form: UserForm::new(),
        }
    }

    /// First fetch of the collection. Failures are returned, not retried.
    pub async fn mount(&mut self) -> Result<(), ApiError> {
        self.refresh().await
    }

    /// Replace the collection with the server's current one.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let users = self.api.list_all().await?;
        info!(count = users.len(), "user list refreshed");
        self.users = users;
        Ok(())
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn find(&self, id: UserId) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == Some(id))
    }

    pub fn form(&self) -> &UserForm {
        &self.form
    }

    /// Buffer edits go straight to the form; they never touch the collection.
    pub fn form_mut(&mut self) -> &mut UserForm {
        &mut self.form
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn open_create(&mut self) {
        self.form.open_create();
    }

    /// Open the form on the record with `id`. Returns `false` if it is not listed.
    pub fn open_edit(&mut self, id: UserId) -> bool {
        let Some(record) = self.users.iter().find(|u| u.id == Some(id)) else {
            return false;
        };
        self.form.open_edit(record);
        true
    }

    /// Ask for confirmation, delete, then resynchronise with the server.
    ///
    /// On failure the collection is left as last fetched.
    pub async fn delete(&mut self, id: UserId) -> DeleteOutcome {
        if !self.confirm.confirm(DELETE_PROMPT).await {
            return DeleteOutcome::Declined;
        }
        match self.api.delete_by_id(id).await {
            Ok(()) => {
                info!(id, "user deleted");
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "refresh after delete failed");
                }
                self.notifier.notify(DELETED_MESSAGE, Level::Success);
                DeleteOutcome::Deleted
            }
            Err(e) => {
                warn!(id, error = %e, "delete failed");
                self.notifier
                    .notify(&format!("{DELETE_FAILED_MESSAGE} {e}"), Level::Error);
                DeleteOutcome::Failed(e)
            }
        }
    }

    /// Submit the form. On success both the success and the close callbacks run.
    pub async fn submit_form(&mut self) -> SubmitOutcome {
        let outcome = self.form.submit(&self.api).await;
        if let SubmitOutcome::Saved(_) = outcome {
            self.on_submit_success();
            self.on_form_closed(CloseReason::Saved).await;
        }
        outcome
    }

    pub async fn cancel_form(&mut self) {
        self.on_form_closed(CloseReason::Cancelled).await;
    }

    fn on_submit_success(&self) {
        self.notifier.notify(SAVED_MESSAGE, Level::Success);
    }

    /// Drop the edited record and close the dialog. A save is followed by a
    /// full re-fetch; a cancel changed nothing remotely and issues no request.
    async fn on_form_closed(&mut self, reason: CloseReason) {
        self.form.cancel();
        if reason == CloseReason::Saved {
            if let Err(e) = self.refresh().await {
                warn!(error = %e, "refresh after save failed");
            }
        }
    }
}
