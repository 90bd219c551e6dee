use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data handed to the host renderer on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct RenderPayload {
    pub init_value: Value,
    pub max_value: Option<u32>,
    pub message: String,
    pub min_value: Option<u32>,
    pub title: String,
    /// Remaining fraction of the timeout, from 1 down to 0. Absent when the
    /// prompt has no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

/// The action a UI surface sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PromptAction {
    Submit,
    Cancel,
    /// Anything else the client might send; ignored by the prompt.
    Other(String),
}

impl PromptAction {
    pub fn as_str(&self) -> &str {
        match self {
            PromptAction::Submit => "submit",
            PromptAction::Cancel => "cancel",
            PromptAction::Other(name) => name,
        }
    }
}

#[cfg(feature = "schemars")]
impl schemars::JsonSchema for PromptAction {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "PromptAction".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "string",
            "examples": ["submit", "cancel"]
        })
    }
}

impl From<String> for PromptAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "submit" => PromptAction::Submit,
            "cancel" => PromptAction::Cancel,
            _ => PromptAction::Other(value),
        }
    }
}

impl From<PromptAction> for String {
    fn from(value: PromptAction) -> Self {
        match value {
            PromptAction::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct ActionParams {
    #[serde(default)]
    pub entry: Value,
}

/// `{ action, params: { entry } }` as produced by the client UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct ActionPayload {
    pub action: PromptAction,
    #[serde(default)]
    pub params: ActionParams,
}

impl ActionPayload {
    pub fn submit(entry: impl Into<Value>) -> Self {
        Self {
            action: PromptAction::Submit,
            params: ActionParams {
                entry: entry.into(),
            },
        }
    }

    pub fn cancel() -> Self {
        Self {
            action: PromptAction::Cancel,
            params: ActionParams::default(),
        }
    }
}
