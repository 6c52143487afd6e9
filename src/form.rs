//! User form: edit buffer, validation and the create/edit state machine.
//!
//! The form is `Closed`, `OpenCreate` (empty buffer) or `OpenEdit(record)`
//! (buffer copied from the record). Validation runs on every read of
//! [`UserForm::errors`]; an error is only *shown* for a field once that field
//! has been touched, either by leaving it or by attempting a submit.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{error, info};

use crate::api::UserApi;
use crate::error::ApiError;
use crate::model::{Gender, UserRecord};

pub const MAX_PHONE_LEN: usize = 15;

/// Editable fields, in display order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FullName,
    Email,
    Address,
    DateOfBirth,
    PhoneNumber,
    Gender,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::FullName,
        Field::Email,
        Field::Address,
        Field::DateOfBirth,
        Field::PhoneNumber,
        Field::Gender,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::FullName => "Full name",
            Field::Email => "Email",
            Field::Address => "Address",
            Field::DateOfBirth => "Date of Birth",
            Field::PhoneNumber => "Phone Number",
            Field::Gender => "Gender",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$")
            .expect("Failed to compile email regex")
    })
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.is_empty() {
        return Err("Email is required.");
    }
    if !email_regex().is_match(email) {
        return Err("Email is invalid.");
    }
    Ok(())
}

pub fn validate_date_of_birth(value: &str) -> Result<(), &'static str> {
    if value.is_empty() {
        return Err("Date of birth is required.");
    }
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| "Date of birth is invalid.")
}

pub fn validate_phone_number(value: &str) -> Result<(), &'static str> {
    if value.is_empty() {
        return Err("Phone number is required.");
    }
    if value.chars().count() > MAX_PHONE_LEN {
        return Err("Phone number cannot exceed 15 characters.");
    }
    Ok(())
}

/// Present means non-empty; whitespace counts as a value.
fn required(value: &str, msg: &'static str) -> Result<(), &'static str> {
    if value.is_empty() { Err(msg) } else { Ok(()) }
}

/// Check a single field of `record`.
pub fn validate_field(record: &UserRecord, field: Field) -> Result<(), &'static str> {
    match field {
        Field::FullName => required(&record.full_name, "Full name is required."),
        Field::Email => validate_email(&record.email),
        Field::Address => required(&record.address, "Address is required."),
        Field::DateOfBirth => validate_date_of_birth(&record.date_of_birth),
        Field::PhoneNumber => validate_phone_number(&record.phone_number),
        // `Gender` can only hold an enumerated value.
        Field::Gender => Ok(()),
    }
}

/// All rule violations of `record`, keyed by field.
pub fn validate(record: &UserRecord) -> BTreeMap<Field, &'static str> {
    Field::ALL
        .iter()
        .filter_map(|f| validate_field(record, *f).err().map(|msg| (*f, msg)))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Closed,
    OpenCreate,
    /// Editing an existing record; holds the record as it was when opened.
    OpenEdit(UserRecord),
}

/// Result of [`UserForm::submit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent: the form is closed or a rule is violated.
    Blocked,
    /// The server accepted the buffer; the form is now closed.
    Saved(UserRecord),
    /// The remote call failed; the form stays open with its buffer intact.
    Failed(ApiError),
}

#[derive(Clone, Debug, Default)]
pub struct UserForm {
    mode: FormMode,
    buffer: UserRecord,
    touched: BTreeSet<Field>,
    focus: Option<Field>,
}

impl UserForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open with an empty buffer (gender defaults to male).
    pub fn open_create(&mut self) {
        self.reset(FormMode::OpenCreate, UserRecord::default());
    }

    /// Open with a copy of `record`'s current field values.
    pub fn open_edit(&mut self, record: &UserRecord) {
        self.reset(FormMode::OpenEdit(record.clone()), record.clone());
    }

    /// Discard the buffer without any remote call.
    pub fn cancel(&mut self) {
        self.reset(FormMode::Closed, UserRecord::default());
        self.focus = None;
    }

    fn reset(&mut self, mode: FormMode, buffer: UserRecord) {
        self.mode = mode;
        self.buffer = buffer;
        self.touched.clear();
        self.focus = Some(Field::FullName);
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode != FormMode::Closed
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::OpenEdit(_))
    }

    pub fn buffer(&self) -> &UserRecord {
        &self.buffer
    }

    pub fn title(&self) -> &'static str {
        if self.is_edit() { "Update User" } else { "Add User" }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_edit() { "Update" } else { "Create" }
    }

    pub fn focus(&self) -> Option<Field> {
        self.focus
    }

    /// Text value of `field` as displayed.
    pub fn value(&self, field: Field) -> &str {
        let b = &self.buffer;
        match field {
            Field::FullName => &b.full_name,
            Field::Email => &b.email,
            Field::Address => &b.address,
            Field::DateOfBirth => &b.date_of_birth,
            Field::PhoneNumber => &b.phone_number,
            Field::Gender => b.gender.label(),
        }
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        let b = &mut self.buffer;
        match field {
            Field::FullName => Some(&mut b.full_name),
            Field::Email => Some(&mut b.email),
            Field::Address => Some(&mut b.address),
            Field::DateOfBirth => Some(&mut b.date_of_birth),
            Field::PhoneNumber => Some(&mut b.phone_number),
            Field::Gender => None,
        }
    }

    /// Replace a text field. Ignored for `Gender` and when closed.
    pub fn set_text(&mut self, field: Field, value: impl Into<String>) {
        if !self.is_open() {
            return;
        }
        if let Some(slot) = self.text_mut(field) {
            *slot = value.into();
        }
    }

    pub fn set_gender(&mut self, gender: Gender) {
        if self.is_open() {
            self.buffer.gender = gender;
        }
    }

    /// Append a character to the focused text field.
    pub fn input_char(&mut self, c: char) {
        if !self.is_open() {
            return;
        }
        match self.focus {
            Some(Field::Gender) => {
                if c == ' ' {
                    self.toggle_gender();
                }
            }
            Some(field) => {
                if let Some(slot) = self.text_mut(field) {
                    slot.push(c);
                }
            }
            None => {}
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focus {
            if let Some(slot) = self.text_mut(field) {
                slot.pop();
            }
        }
    }

    pub fn toggle_gender(&mut self) {
        if self.is_open() {
            self.buffer.gender = self.buffer.gender.toggle();
        }
    }

    /// Move focus to `field`, blurring (touching) the field being left.
    pub fn focus_field(&mut self, field: Field) {
        if !self.is_open() {
            return;
        }
        if let Some(prev) = self.focus {
            if prev != field {
                self.touched.insert(prev);
            }
        }
        self.focus = Some(field);
    }

    pub fn focus_next(&mut self) {
        let next = self.focus.map_or(Field::FullName, Field::next);
        self.focus_field(next);
    }

    pub fn focus_prev(&mut self) {
        let prev = self.focus.map_or(Field::FullName, Field::prev);
        self.focus_field(prev);
    }

    pub fn touch(&mut self, field: Field) {
        self.touched.insert(field);
    }

    pub fn touch_all(&mut self) {
        self.touched.extend(Field::ALL);
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn errors(&self) -> BTreeMap<Field, &'static str> {
        validate(&self.buffer)
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// Error to display for `field`, if it has been touched and is invalid.
    pub fn visible_error(&self, field: Field) -> Option<&'static str> {
        if !self.is_touched(field) {
            return None;
        }
        validate_field(&self.buffer, field).err()
    }

    /// Validate and dispatch the buffer: create when it has no id, update otherwise.
    pub async fn submit<A>(&mut self, api: &A) -> SubmitOutcome
    where
        A: UserApi + ?Sized,
    {
        if !self.is_open() {
            return SubmitOutcome::Blocked;
        }
        self.touch_all();
        if !self.is_valid() {
            return SubmitOutcome::Blocked;
        }
        let result = match self.buffer.id {
            None => api.create(&self.buffer).await,
            Some(id) => api.update(id, &self.buffer).await,
        };
        match result {
            Ok(saved) => {
                info!(id = ?saved.id, "user saved");
                self.cancel();
                SubmitOutcome::Saved(saved)
            }
            Err(e) => {
                error!(error = %e, "Error while submitting the form");
                SubmitOutcome::Failed(e)
            }
        }
    }
}
