//! Capabilities the host engine provides to a prompt.
//!
//! A prompt never talks to the engine directly: it registers, refreshes and
//! closes surfaces through [`UiSurfaceRegistry`], resolves users through
//! [`UiHost`], and hands its result to an [`Invokable`] in callback mode.
use serde_json::Value;

use crate::{
    model::{PromptId, RenderPayload, SessionId, SurfaceKey, UserId},
    prompt::Prompt,
};

#[macro_use]
mod macros;

/// The host's registry of open UI surfaces.
///
/// Implementations route client actions for a surface back into the
/// [`Prompt`] handed over in [`attach`](UiSurfaceRegistry::attach).
pub trait UiSurfaceRegistry: Send + Sync + 'static {
    /// Open (or reopen) the surface for `key`.
    fn attach(&self, key: SurfaceKey, prompt: Prompt);

    /// Push fresh render data to an open surface.
    fn refresh(&self, key: &SurfaceKey, payload: RenderPayload);

    /// Close every surface owned by `owner`. Closing an already closed owner
    /// must be harmless.
    fn close_all(&self, owner: PromptId);
}

/// Identity resolution on top of the surface registry.
pub trait UiHost: UiSurfaceRegistry {
    /// The user currently behind a client session, if any.
    fn user_for_session(&self, session: &SessionId) -> Option<UserId>;

    /// Whether `user` can still be shown a surface.
    fn is_valid_user(&self, user: &UserId) -> bool {
        let _ = user;
        true
    }
}

impl_host_for_box_and_arc! {
    impl UiSurfaceRegistry {
        fn attach(&self, key: SurfaceKey, prompt: Prompt);
        fn refresh(&self, key: &SurfaceKey, payload: RenderPayload);
        fn close_all(&self, owner: PromptId);
    }
}

impl_host_for_box_and_arc! {
    impl UiHost {
        fn user_for_session(&self, session: &SessionId) -> Option<UserId>;
        fn is_valid_user(&self, user: &UserId) -> bool;
    }
}

/// A single-shot receiver for a submitted entry.
pub trait Invokable: Send + 'static {
    fn invoke(self: Box<Self>, entry: Value);
}

impl<F> Invokable for F
where
    F: FnOnce(Value) + Send + 'static,
{
    fn invoke(self: Box<Self>, entry: Value) {
        (*self)(entry)
    }
}
