//! Library crate for userdesk.
//!
//! This crate exposes the building blocks of the TUI:
//! - User record and wire format (`model`)
//! - Error and result types (`error`)
//! - Remote data access layer (`api`)
//! - Notification and confirmation capabilities (`notify`)
//! - Form buffer, validation and submit (`form`)
//! - List orchestration (`list`)
//! - Application state, session task and update loop (`app`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `userdesk` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod error;
pub mod form;
pub mod list;
pub mod model;
pub mod notify;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{ApiError, DynError, Result};
pub use model::{Gender, UserId, UserRecord};
