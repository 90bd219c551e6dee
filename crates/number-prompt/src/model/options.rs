use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::EntryBounds;
use crate::PromptError;

/// Everything a caller can configure on a number prompt.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use number_prompt::model::PromptOptions;
///
/// let options = PromptOptions::new("How many crates?")
///     .title("Set count")
///     .default_value(5)
///     .bounds(1, 3)
///     .timeout(Duration::from_secs(30));
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptOptions {
    pub message: String,
    #[serde(default)]
    pub title: String,
    /// Value pre-filled in the input field
    #[serde(default)]
    pub default_value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<u32>,
    /// Hard deadline after which the prompt destroys itself. `None` or zero
    /// disables it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "duration_secs"
    )]
    pub timeout: Option<Duration>,
}

impl PromptOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            title: String::new(),
            default_value: Value::Null,
            min_value: None,
            max_value: None,
            timeout: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = value.into();
        self
    }

    /// Set minimum and maximum entry length (inclusive).
    /// See [`bounds`](Self::bounds) for the panicking variant.
    pub fn with_bounds(mut self, min: u32, max: u32) -> Result<Self, &'static str> {
        let bounds = EntryBounds::new().with_range(min, max)?;
        self.min_value = bounds.min;
        self.max_value = bounds.max;
        Ok(self)
    }

    /// Set minimum and maximum entry length (panics on invalid input).
    /// Use [`with_bounds`](Self::with_bounds) to get an error instead.
    pub fn bounds(mut self, min: u32, max: u32) -> Self {
        let bounds = EntryBounds::new().range(min, max);
        self.min_value = bounds.min;
        self.max_value = bounds.max;
        self
    }

    pub fn min_value(mut self, min: u32) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn max_value(mut self, max: u32) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn entry_bounds(&self) -> EntryBounds {
        EntryBounds {
            min: self.min_value,
            max: self.max_value,
        }
    }

    /// The timeout, with zero treated as "no timeout".
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|timeout| !timeout.is_zero())
    }

    pub fn validate(&self) -> Result<(), PromptError> {
        self.entry_bounds().validate()
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let Some(secs) = Option::<f64>::deserialize(deserializer)? else {
            return Ok(None);
        };
        Duration::try_from_secs_f64(secs)
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid timeout {secs}: {e}")))
    }
}
