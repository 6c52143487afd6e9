//! Capabilities injected into the list orchestrator: user-facing
//! notifications and interactive confirmation.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        })
    }
}

/// Shows a short message to the operator ("toast").
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, level: Level);
}

/// Asks the operator a yes/no question without blocking the interface.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, message: &str, level: Level) {
        (**self).notify(message, level)
    }
}

#[async_trait]
impl<C: Confirm + ?Sized> Confirm for Arc<C> {
    async fn confirm(&self, message: &str) -> bool {
        (**self).confirm(message).await
    }
}
