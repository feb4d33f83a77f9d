//! # Patch Module
//!
//! `Patch<T>` is one field of a partial-update request.
//!
//! ```text
//! ┌──────────────────────┬───────────────┬─────────────────────────────────┐
//! │ JSON                 │ Patch         │ Effect                          │
//! ├──────────────────────┼───────────────┼─────────────────────────────────┤
//! │ key absent           │ Absent        │ field untouched                 │
//! │ "key": null          │ Null          │ nullable field cleared,         │
//! │                      │               │ required field → validation err │
//! │ "key": value         │ Value(value)  │ field set (after validation)    │
//! └──────────────────────┴───────────────┴─────────────────────────────────┘
//! ```
//!
//! Serde never calls `Deserialize` for a missing key, so the containing struct
//! must mark `Patch` fields `#[serde(default)]` for `Absent` to appear.
//!
//! ```rust
//! use ecofinds_core::Patch;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Edit {
//!     #[serde(default)]
//!     phone: Patch<String>,
//! }
//!
//! let e: Edit = serde_json::from_str("{}").unwrap();
//! assert!(e.phone.is_absent());
//! let e: Edit = serde_json::from_str(r#"{"phone": null}"#).unwrap();
//! assert_eq!(e.phone, Patch::Null);
//! ```

use serde::{Deserialize, Deserializer};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(v),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)),
        }
    }

    /// Collapses a patch on a non-nullable field.
    ///
    /// `Absent` → `Ok(None)`, `Value(v)` → `Ok(Some(v))`, `Null` → error.
    pub fn required(self, field: &str) -> Result<Option<T>, ValidationError> {
        match self {
            Patch::Absent => Ok(None),
            Patch::Null => Err(ValidationError::NotNullable {
                field: field.to_string(),
            }),
            Patch::Value(v) => Ok(Some(v)),
        }
    }

    /// Writes the patch into a nullable slot. Returns whether anything changed.
    pub fn apply_to(self, slot: &mut Option<T>) -> bool {
        match self {
            Patch::Absent => false,
            Patch::Null => {
                *slot = None;
                true
            }
            Patch::Value(v) => {
                *slot = Some(v);
                true
            }
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

/// A present key decodes through `Option<T>`: `null` is `Null`, anything else
/// is `Value`.
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
