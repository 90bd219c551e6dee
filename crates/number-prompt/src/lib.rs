#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, allow(unused_attributes))]
#![doc = include_str!("../README.md")]

mod error;
pub use error::PromptError;

/// Payloads, options and identifiers exchanged with the host UI
pub mod model;

pub mod handler;
pub use handler::{Invokable, UiHost, UiSurfaceRegistry};

pub mod prompt;
pub use prompt::Prompt;

pub mod service;
pub use service::PromptService;

// re-export
pub use serde_json;
