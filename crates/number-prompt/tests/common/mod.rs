#![allow(dead_code)]
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use number_prompt::{
    Prompt, PromptService, UiHost, UiSurfaceRegistry,
    model::{PromptId, RenderPayload, SessionId, SurfaceKey, UserId},
};
use tokio::sync::Notify;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct HostState {
    open: HashMap<PromptId, (SurfaceKey, Prompt)>,
    attached: Vec<SurfaceKey>,
    refreshes: Vec<(SurfaceKey, RenderPayload)>,
    closed: Vec<PromptId>,
}

/// A host that records every registry call and lets tests play the client.
#[derive(Default)]
pub struct RecordingHost {
    state: Mutex<HostState>,
    sessions: HashMap<SessionId, UserId>,
    banned: HashSet<UserId>,
    attached_signal: Notify,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, session: &'static str, user: &'static str) -> Self {
        self.sessions
            .insert(SessionId::from(session), UserId::from(user));
        self
    }

    pub fn with_banned(mut self, user: &'static str) -> Self {
        self.banned.insert(UserId::from(user));
        self
    }

    pub fn into_service(self) -> (Arc<Self>, PromptService<Self>) {
        let host = Arc::new(self);
        (host.clone(), PromptService::from_arc(host))
    }

    /// The open prompt shown to `user`, if any.
    pub fn prompt_for(&self, user: &UserId) -> Option<Prompt> {
        let state = self.state.lock().unwrap();
        state
            .open
            .values()
            .find(|(key, _)| &key.user == user)
            .map(|(_, prompt)| prompt.clone())
    }

    pub async fn wait_for_prompt(&self, user: &UserId) -> Prompt {
        loop {
            if let Some(prompt) = self.prompt_for(user) {
                return prompt;
            }
            self.attached_signal.notified().await;
        }
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().unwrap().open.len()
    }

    pub fn attached(&self) -> Vec<SurfaceKey> {
        self.state.lock().unwrap().attached.clone()
    }

    pub fn close_calls(&self, owner: PromptId) -> usize {
        let state = self.state.lock().unwrap();
        state.closed.iter().filter(|id| **id == owner).count()
    }

    pub fn total_close_calls(&self) -> usize {
        self.state.lock().unwrap().closed.len()
    }

    pub fn last_payload(&self, owner: PromptId) -> Option<RenderPayload> {
        let state = self.state.lock().unwrap();
        state
            .refreshes
            .iter()
            .rev()
            .find(|(key, _)| key.owner == owner)
            .map(|(_, payload)| payload.clone())
    }
}

impl UiSurfaceRegistry for RecordingHost {
    fn attach(&self, key: SurfaceKey, prompt: Prompt) {
        {
            let mut state = self.state.lock().unwrap();
            state.attached.push(key.clone());
            state.open.insert(key.owner, (key, prompt));
        }
        self.attached_signal.notify_one();
    }

    fn refresh(&self, key: &SurfaceKey, payload: RenderPayload) {
        let mut state = self.state.lock().unwrap();
        state.refreshes.push((key.clone(), payload));
    }

    fn close_all(&self, owner: PromptId) {
        let mut state = self.state.lock().unwrap();
        state.open.remove(&owner);
        state.closed.push(owner);
    }
}

impl UiHost for RecordingHost {
    fn user_for_session(&self, session: &SessionId) -> Option<UserId> {
        self.sessions.get(session).cloned()
    }

    fn is_valid_user(&self, user: &UserId) -> bool {
        !self.banned.contains(user)
    }
}
