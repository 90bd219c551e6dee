use std::{
    future::IntoFuture,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use futures::{FutureExt, future::BoxFuture};
use serde_json::Value;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    PromptError,
    handler::{Invokable, UiSurfaceRegistry},
    model::{
        ActionPayload, EntryBounds, PromptAction, PromptId, PromptOptions, PromptSnapshot,
        PromptState, RenderPayload, SurfaceKey, UserId,
    },
};

/// Subtracted from the remaining time when computing the progress fraction,
/// so the client's bar empties slightly before the prompt actually expires.
pub const PROGRESS_LATENCY: Duration = Duration::from_secs(1);

/// Remaining fraction of `timeout` after `elapsed`, in `[0, 1]`.
///
/// Timeouts no longer than [`PROGRESS_LATENCY`] always report 0.
pub fn progress_fraction(timeout: Duration, elapsed: Duration) -> f64 {
    let latency = PROGRESS_LATENCY.as_secs_f64();
    let span = timeout.as_secs_f64() - latency;
    if span <= 0.0 {
        return 0.0;
    }
    let remaining = timeout.as_secs_f64() - elapsed.as_secs_f64() - latency;
    (remaining / span).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptMode {
    Blocking,
    Callback,
}

struct PromptCore {
    state: PromptState,
    closed: bool,
    attached: bool,
    callback: Option<Box<dyn Invokable>>,
}

struct PromptInner {
    id: PromptId,
    user: UserId,
    options: PromptOptions,
    bounds: EntryBounds,
    mode: PromptMode,
    started: Instant,
    created_at: DateTime<Utc>,
    registry: Arc<dyn UiSurfaceRegistry>,
    core: Mutex<PromptCore>,
    released: AtomicBool,
    torn_down: CancellationToken,
}

/// One outstanding number prompt.
///
/// `Prompt` is a cheap, clonable handle: the host keeps one to route client
/// actions, the caller keeps another to wait for the result. Every terminal
/// transition funnels through a single teardown that closes the prompt's
/// surfaces, releases its callback and wakes waiters, exactly once.
#[derive(Clone)]
pub struct Prompt {
    inner: Arc<PromptInner>,
}

impl std::fmt::Debug for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prompt")
            .field("id", &self.inner.id)
            .field("user", &self.inner.user)
            .field("mode", &self.inner.mode)
            .field("state", &self.state())
            .finish()
    }
}

impl Prompt {
    /// Create a prompt whose result is collected with [`wait`](Prompt::wait).
    ///
    /// The prompt is not visible until [`open`](Prompt::open) is called.
    pub fn new(
        registry: Arc<dyn UiSurfaceRegistry>,
        user: UserId,
        options: PromptOptions,
    ) -> Result<Self, PromptError> {
        Self::build(registry, user, options, PromptMode::Blocking, None)
    }

    /// Create a prompt that hands a submitted entry to `callback`.
    pub fn with_callback(
        registry: Arc<dyn UiSurfaceRegistry>,
        user: UserId,
        options: PromptOptions,
        callback: impl Invokable,
    ) -> Result<Self, PromptError> {
        Self::build(
            registry,
            user,
            options,
            PromptMode::Callback,
            Some(Box::new(callback) as Box<dyn Invokable>),
        )
    }

    fn build(
        registry: Arc<dyn UiSurfaceRegistry>,
        user: UserId,
        options: PromptOptions,
        mode: PromptMode,
        callback: Option<Box<dyn Invokable>>,
    ) -> Result<Self, PromptError> {
        options.validate()?;
        let bounds = options.entry_bounds();
        Ok(Self {
            inner: Arc::new(PromptInner {
                id: PromptId::next(),
                user,
                options,
                bounds,
                mode,
                started: Instant::now(),
                created_at: Utc::now(),
                registry,
                core: Mutex::new(PromptCore {
                    state: PromptState::Open,
                    closed: false,
                    attached: false,
                    callback,
                }),
                released: AtomicBool::new(false),
                torn_down: CancellationToken::new(),
            }),
        })
    }

    pub fn id(&self) -> PromptId {
        self.inner.id
    }

    pub fn user(&self) -> &UserId {
        &self.inner.user
    }

    pub fn options(&self) -> &PromptOptions {
        &self.inner.options
    }

    pub fn is_callback_mode(&self) -> bool {
        self.inner.mode == PromptMode::Callback
    }

    pub fn surface_key(&self) -> SurfaceKey {
        SurfaceKey::new(self.inner.user.clone(), self.inner.id)
    }

    fn core(&self) -> MutexGuard<'_, PromptCore> {
        self.inner
            .core
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> PromptState {
        self.core().state.clone()
    }

    pub fn is_open(&self) -> bool {
        self.core().state.is_open()
    }

    /// Whether the user closed the window without answering.
    pub fn is_closed(&self) -> bool {
        self.core().closed
    }

    /// The submitted entry, once there is one.
    pub fn entry(&self) -> Option<Value> {
        self.core().state.entry().cloned()
    }

    /// Whether teardown has run.
    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.is_cancelled()
    }

    pub fn elapsed(&self) -> Duration {
        self.inner.started.elapsed()
    }

    pub fn snapshot(&self) -> PromptSnapshot {
        let core = self.core();
        PromptSnapshot {
            id: self.inner.id,
            user: self.inner.user.clone(),
            state: core.state.clone(),
            closed: core.closed,
            created_at: self.inner.created_at,
        }
    }

    /// Register the prompt's surface with the host and arm its timeout.
    ///
    /// Calling it again, or on a prompt that already resolved, does nothing.
    pub fn open(&self) {
        {
            let mut core = self.core();
            if core.attached || !core.state.is_open() {
                return;
            }
            core.attached = true;
        }
        tracing::debug!(
            prompt_id = %self.inner.id,
            user = %self.inner.user,
            created_at = %self.inner.created_at,
            "attaching number prompt"
        );
        self.inner
            .registry
            .attach(self.surface_key(), self.clone());
        self.refresh();
        if let Some(timeout) = self.inner.options.effective_timeout() {
            self.arm_timeout(timeout);
        }
    }

    fn arm_timeout(&self, timeout: Duration) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(
                    prompt_id = %self.inner.id,
                    "cannot arm prompt timeout outside of a tokio runtime: {e}"
                );
                return;
            }
        };
        let Some(deadline) = self.inner.started.checked_add(timeout) else {
            tracing::warn!(
                prompt_id = %self.inner.id,
                ?timeout,
                "prompt timeout is beyond any reachable instant, not arming it"
            );
            return;
        };
        let prompt = self.clone();
        handle.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    tracing::debug!(prompt_id = %prompt.inner.id, "number prompt timed out");
                    let _ = prompt.finish(PromptState::TimedOut);
                }
                _ = prompt.inner.torn_down.cancelled() => {}
            }
        });
    }

    /// Data for the host renderer at this instant.
    pub fn render_payload(&self) -> RenderPayload {
        let options = &self.inner.options;
        RenderPayload {
            init_value: options.default_value.clone(),
            max_value: options.max_value,
            message: options.message.clone(),
            min_value: options.min_value,
            title: options.title.clone(),
            timeout: options
                .effective_timeout()
                .map(|timeout| progress_fraction(timeout, self.elapsed())),
        }
    }

    /// Push the current render data to the host. Does nothing once resolved.
    pub fn refresh(&self) {
        if !self.is_open() {
            return;
        }
        let payload = self.render_payload();
        tracing::trace!(prompt_id = %self.inner.id, timeout = ?payload.timeout, "refreshing number prompt");
        self.inner.registry.refresh(&self.surface_key(), payload);
    }

    fn ensure_open(&self) -> Result<(), PromptError> {
        let core = self.core();
        if core.state.is_open() {
            Ok(())
        } else {
            Err(PromptError::NotOpen {
                id: self.inner.id,
                state: core.state.clone(),
            })
        }
    }

    /// Submit an entry.
    ///
    /// An entry whose serialized length falls outside the prompt's bounds is
    /// rejected and the prompt stays open. A `null` entry that passes the
    /// bounds resolves the prompt like [`cancel`](Prompt::cancel).
    pub fn submit(&self, entry: impl Into<Value>) -> Result<(), PromptError> {
        let entry = entry.into();
        self.ensure_open()?;
        if let Err(error) = self.inner.bounds.check(&entry) {
            tracing::warn!(prompt_id = %self.inner.id, %entry, "rejected entry: {error}");
            return Err(error);
        }
        if entry.is_null() {
            return self.finish(PromptState::Cancelled);
        }
        self.finish(PromptState::Resolved(entry))
    }

    pub fn cancel(&self) -> Result<(), PromptError> {
        self.finish(PromptState::Cancelled)
    }

    /// The host reports the user closed the window. Returns whether the
    /// prompt was still open.
    pub fn on_surface_closed(&self) -> bool {
        self.finish(PromptState::Closed).is_ok()
    }

    /// Tear the prompt down without an entry, e.g. because its owner went
    /// away. Safe to call any number of times.
    ///
    /// On a prompt that already reached a terminal state this does nothing:
    /// the transition that got there owns teardown.
    pub fn destroy(&self) {
        let _ = self.finish(PromptState::Destroyed);
    }

    /// Dispatch an action sent by the client. Returns whether it was applied.
    pub fn handle_action(&self, payload: &ActionPayload) -> bool {
        let result = match &payload.action {
            PromptAction::Submit => self.submit(payload.params.entry.clone()),
            PromptAction::Cancel => self.cancel(),
            PromptAction::Other(name) => {
                tracing::debug!(prompt_id = %self.inner.id, action = name.as_str(), "ignoring unknown action");
                return false;
            }
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(prompt_id = %self.inner.id, action = payload.action.as_str(), "action not applied: {e}");
                false
            }
        }
    }

    /// Like [`handle_action`](Prompt::handle_action), from the raw JSON the
    /// client sent.
    pub fn handle_action_json(&self, payload: Value) -> Result<bool, PromptError> {
        let payload: ActionPayload = serde_json::from_value(payload)?;
        Ok(self.handle_action(&payload))
    }

    fn finish(&self, outcome: PromptState) -> Result<(), PromptError> {
        let (callback, entry) = {
            let mut core = self.core();
            if !core.state.is_open() {
                return Err(PromptError::NotOpen {
                    id: self.inner.id,
                    state: core.state.clone(),
                });
            }
            if outcome == PromptState::Closed {
                core.closed = true;
            }
            let entry = outcome.entry().cloned();
            core.state = outcome;
            (core.callback.take(), entry)
        };
        tracing::debug!(prompt_id = %self.inner.id, state = %self.state(), "number prompt finished");
        if let (Some(callback), Some(entry)) = (callback, entry) {
            callback.invoke(entry);
        }
        self.teardown();
        Ok(())
    }

    fn teardown(&self) {
        if self.inner.released.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.registry.close_all(self.inner.id);
        drop(self.core().callback.take());
        self.inner.torn_down.cancel();
        tracing::debug!(prompt_id = %self.inner.id, "number prompt torn down");
    }

    /// Wait until the prompt is torn down.
    ///
    /// Callback-mode prompts deliver their entry through the callback, so
    /// waiting on them returns immediately.
    pub async fn wait(&self) {
        if self.is_callback_mode() {
            return;
        }
        self.inner.torn_down.cancelled().await
    }
}

impl IntoFuture for Prompt {
    type Output = Option<Value>;
    type IntoFuture = BoxFuture<'static, Option<Value>>;

    fn into_future(self) -> Self::IntoFuture {
        async move {
            self.wait().await;
            self.entry()
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fraction_endpoints() {
        let timeout = Duration::from_secs(10);
        assert_eq!(progress_fraction(timeout, Duration::ZERO), 1.0);
        assert_eq!(progress_fraction(timeout, Duration::from_secs(9)), 0.0);
        assert_eq!(progress_fraction(timeout, Duration::from_secs(10)), 0.0);
        assert_eq!(progress_fraction(timeout, Duration::from_secs(60)), 0.0);
    }

    #[test]
    fn test_progress_fraction_is_non_increasing() {
        let timeout = Duration::from_secs(10);
        let mut previous = f64::INFINITY;
        for tenth in 0..=120 {
            let fraction = progress_fraction(timeout, Duration::from_millis(tenth * 100));
            assert!((0.0..=1.0).contains(&fraction));
            assert!(fraction <= previous, "fraction rose at {tenth}");
            previous = fraction;
        }
    }

    #[test]
    fn test_progress_fraction_midpoint() {
        let fraction = progress_fraction(Duration::from_secs(11), Duration::from_secs(5));
        assert!((fraction - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_progress_fraction_short_timeout() {
        assert_eq!(progress_fraction(Duration::from_secs(1), Duration::ZERO), 0.0);
        assert_eq!(
            progress_fraction(Duration::from_millis(500), Duration::ZERO),
            0.0
        );
    }
}
