//! The user record managed by the admin client and its wire format.
//!
//! Records serialize as flat JSON objects with camelCase keys
//! (`id`, `fullName`, `email`, `address`, `dateOfBirth`, `phoneNumber`, `gender`).
//! `id` is omitted from the body while the record has never been persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identity of a persisted record.
pub type UserId = i64;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Wire value, as the server expects it.
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }

    /// Human label shown in the form.
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user record as exchanged with the remote API.
///
/// A record with `id == None` has never been persisted. Once the server has
/// assigned an id it is never reassigned by this client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    /// ISO date (`YYYY-MM-DD`), kept as text because the server defines the format.
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub gender: Gender,
}

impl UserRecord {
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Copy of this record with the id removed, as sent to the create endpoint.
    pub fn without_id(&self) -> Self {
        Self { id: None, ..self.clone() }
    }
}
