//! Field-scoped validation errors shared by the user and rating models.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

/// Longest address accepted by [`is_valid_email`].
const EMAIL_MAX_LEN: usize = 254;

/// Dot-separated atoms before the `@`, a dotted host after it, and an
/// alphabetic top-level label.
pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(
            r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$"
        )
        .unwrap();
    }
    email.len() <= EMAIL_MAX_LEN && EMAIL_RE.is_match(email)
}

/// Emails are compared case-insensitively; store and look them up lower-cased.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    MinLength,
    Mismatch,
    Email,
    /// Present but not a finite number.
    Number,
    /// Another record already holds this value.
    Unique,
    /// The referenced record does not exist.
    Reference,
}

impl FieldErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "minlength",
            Self::Mismatch => "mismatch",
            Self::Email => "email",
            Self::Number => "number",
            Self::Unique => "unique",
            Self::Reference => "reference",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("FieldError", 3)?;
        s.serialize_field("path", self.field)?;
        s.serialize_field("kind", self.kind.as_str())?;
        s.serialize_field("message", &self.message)?;
        s.end()
    }
}

/// Every violation found on a record, in the order the checks ran.
///
/// Serializes as an object keyed by field name so a client can render
/// messages next to the matching inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single violation; used when translating a storage constraint failure.
    pub fn single(field: &'static str, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, kind, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, kind: FieldErrorKind, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            kind,
            message: message.into(),
        });
    }

    /// Records a `required` violation when `value` is missing or blank.
    pub fn require_text(&mut self, field: &'static str, value: Option<&str>) {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.add(field, FieldErrorKind::Required, format!("{field} is required."));
        }
    }

    pub fn require<T>(&mut self, field: &'static str, value: Option<&T>) {
        if value.is_none() {
            self.add(field, FieldErrorKind::Required, format!("{field} is required."));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// First violation recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for e in &self.errors {
            map.serialize_entry(e.field, e)?;
        }
        map.end()
    }
}
