//! Data types shared between a prompt and the host UI.
//!
//! Everything the host renderer consumes or produces goes through serde, so
//! the payloads here are exactly what ends up on the wire between the host and
//! its client-side UI.
use std::{
    borrow::Cow,
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod bounds;
mod options;
mod payload;

pub use bounds::*;
pub use options::*;
pub use payload::*;

/// View name the host uses to pick the modal's template.
pub const NUMBER_INPUT_VIEW: &str = "NumberInputModal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(transparent)]
pub struct PromptId(u64);

impl PromptId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        PromptId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for PromptId {
    fn from(value: u64) -> Self {
        PromptId(value)
    }
}

impl Display for PromptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
        #[serde(transparent)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&'static str> for $name {
            fn from(value: &'static str) -> Self {
                $name(Cow::Borrowed(value))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name(Cow::Owned(value))
            }
        }
    };
}

string_id!(
    /// A user that can be shown a UI surface.
    UserId
);
string_id!(
    /// A client session; the host knows which user is behind it.
    SessionId
);

/// Who the prompt should be shown to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum PromptTarget {
    User(UserId),
    Session(SessionId),
}

impl From<UserId> for PromptTarget {
    fn from(value: UserId) -> Self {
        PromptTarget::User(value)
    }
}

impl From<SessionId> for PromptTarget {
    fn from(value: SessionId) -> Self {
        PromptTarget::Session(value)
    }
}

/// Identifies one host UI surface: the user looking at it, the prompt that
/// owns it and the view template it renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceKey {
    pub user: UserId,
    pub owner: PromptId,
    pub view: Cow<'static, str>,
}

impl SurfaceKey {
    pub fn new(user: UserId, owner: PromptId) -> Self {
        Self {
            user,
            owner,
            view: Cow::Borrowed(NUMBER_INPUT_VIEW),
        }
    }
}

/// Where a prompt is in its lifecycle. Every state but `Open` is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "entry", rename_all = "snake_case")]
pub enum PromptState {
    Open,
    Resolved(Value),
    Cancelled,
    Closed,
    TimedOut,
    Destroyed,
}

impl PromptState {
    pub fn is_open(&self) -> bool {
        matches!(self, PromptState::Open)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }

    pub fn entry(&self) -> Option<&Value> {
        match self {
            PromptState::Resolved(entry) => Some(entry),
            _ => None,
        }
    }
}

impl Display for PromptState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PromptState::Open => "open",
            PromptState::Resolved(_) => "resolved",
            PromptState::Cancelled => "cancelled",
            PromptState::Closed => "closed",
            PromptState::TimedOut => "timed out",
            PromptState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of a prompt, for host diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSnapshot {
    pub id: PromptId,
    pub user: UserId,
    pub state: PromptState,
    pub closed: bool,
    pub created_at: DateTime<Utc>,
}
