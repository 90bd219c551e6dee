use std::sync::Arc;

use serde_json::Value;

use crate::{
    PromptError,
    handler::{Invokable, UiHost, UiSurfaceRegistry},
    model::{PromptOptions, PromptTarget, UserId},
    prompt::Prompt,
};

/// Opens number prompts against a host.
///
/// # Example
/// ```rust,ignore
/// let prompts = PromptService::new(host);
/// let count = prompts
///     .request_number(
///         None,
///         Some(&caller),
///         PromptOptions::new("How many?").title("Set count").bounds(1, 3),
///     )
///     .await?;
/// ```
#[derive(Debug)]
pub struct PromptService<H> {
    host: Arc<H>,
}

impl<H> Clone for PromptService<H> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
        }
    }
}

impl<H: UiHost> PromptService<H> {
    pub fn new(host: H) -> Self {
        Self::from_arc(Arc::new(host))
    }

    pub fn from_arc(host: Arc<H>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    fn registry(&self) -> Arc<dyn UiSurfaceRegistry> {
        self.host.clone()
    }

    /// Work out who a prompt is for.
    ///
    /// Without a target the prompt goes to `caller`; a session target goes to
    /// the user behind that session. An explicit target that does not resolve
    /// never falls back to the caller.
    pub fn resolve_user(
        &self,
        target: Option<&PromptTarget>,
        caller: Option<&UserId>,
    ) -> Result<UserId, PromptError> {
        let user = match target {
            None => caller.cloned(),
            Some(PromptTarget::User(user)) => Some(user.clone()),
            Some(PromptTarget::Session(session)) => self.host.user_for_session(session),
        };
        match user {
            Some(user) if self.host.is_valid_user(&user) => Ok(user),
            _ => {
                tracing::warn!(?target, ?caller, "number prompt target did not resolve");
                Err(PromptError::UnresolvedTarget)
            }
        }
    }

    /// Open a prompt and hand back its handle without waiting on it.
    pub fn open_prompt(
        &self,
        target: Option<PromptTarget>,
        caller: Option<&UserId>,
        options: PromptOptions,
    ) -> Result<Prompt, PromptError> {
        let user = self.resolve_user(target.as_ref(), caller)?;
        let prompt = Prompt::new(self.registry(), user, options)?;
        prompt.open();
        Ok(prompt)
    }

    /// Show a number prompt and wait for the answer.
    ///
    /// Returns `Ok(None)` when the user cancelled or closed the window, the
    /// prompt timed out, or it was destroyed. Dropping the returned future
    /// destroys the prompt.
    pub async fn request_number(
        &self,
        target: Option<PromptTarget>,
        caller: Option<&UserId>,
        options: PromptOptions,
    ) -> Result<Option<Value>, PromptError> {
        let prompt = self.open_prompt(target, caller, options)?;
        let guard = DestroyOnDrop(prompt);
        guard.0.wait().await;
        Ok(guard.0.entry())
    }

    /// Show a number prompt whose answer goes to `callback`.
    ///
    /// Returns as soon as the prompt is attached. The callback runs at most
    /// once, and only for a submitted entry.
    pub fn request_number_with_callback(
        &self,
        target: Option<PromptTarget>,
        caller: Option<&UserId>,
        options: PromptOptions,
        callback: impl Invokable,
    ) -> Result<Prompt, PromptError> {
        let user = self.resolve_user(target.as_ref(), caller)?;
        let prompt = Prompt::with_callback(self.registry(), user, options, callback)?;
        prompt.open();
        Ok(prompt)
    }
}

struct DestroyOnDrop(Prompt);

impl Drop for DestroyOnDrop {
    fn drop(&mut self) {
        self.0.destroy();
    }
}
