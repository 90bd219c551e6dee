use std::{borrow::Cow, fmt::Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PromptError;

/// Inclusive bounds on the length of a submitted entry.
///
/// The entry is measured in its serialized form, so `12` and `"12"` both have
/// length 2. An unset side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct EntryBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl EntryBounds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum and maximum (inclusive).
    /// See [`range`](Self::range) for the panicking variant.
    pub fn with_range(mut self, min: u32, max: u32) -> Result<Self, &'static str> {
        if min > max {
            return Err("minimum must be <= maximum");
        }
        self.min = Some(min);
        self.max = Some(max);
        Ok(self)
    }

    /// Set minimum and maximum (panics on invalid input).
    /// Use [`with_range`](Self::with_range) to get an error instead.
    pub fn range(mut self, min: u32, max: u32) -> Self {
        assert!(min <= max, "minimum must be <= maximum");
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn min(mut self, min: u32) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Reject bounds that no entry could ever satisfy.
    pub fn validate(&self) -> Result<(), PromptError> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Err(PromptError::InvalidBounds(
                format!("minimum {min} is greater than maximum {max}").into(),
            )),
            _ => Ok(()),
        }
    }

    pub fn contains(&self, length: usize) -> bool {
        let above_min = self.min.is_none_or(|min| length >= min as usize);
        let below_max = self.max.is_none_or(|max| length <= max as usize);
        above_min && below_max
    }

    /// Check an entry against the bounds, returning its length on success.
    pub fn check(&self, entry: &Value) -> Result<usize, PromptError> {
        let length = entry_length(entry);
        if self.contains(length) {
            Ok(length)
        } else {
            Err(PromptError::OutOfBounds {
                length,
                bounds: *self,
            })
        }
    }
}

impl Display for EntryBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn side(bound: Option<u32>) -> Cow<'static, str> {
            match bound {
                Some(bound) => bound.to_string().into(),
                None => "-".into(),
            }
        }
        write!(f, "[{}, {}]", side(self.min), side(self.max))
    }
}

/// Length of an entry in its serialized text form.
///
/// A missing entry counts as empty.
pub fn entry_length(entry: &Value) -> usize {
    match entry {
        Value::Null => 0,
        Value::String(text) => text.chars().count(),
        other => other.to_string().chars().count(),
    }
}
