//! Per-user wizard sessions.
//!
//! A session holds the step pointer, the answers collected so far and the
//! `editing` flag set when a field is re-entered from the summary. Sessions
//! live only in memory and disappear on restart.

use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::UserId;
use tokio::sync::Mutex;

/// Where a session stands in the wizard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardState {
    /// Waiting for the field at this index
    CollectingField(usize),
    /// Every field is set, waiting for confirm or edit
    AwaitingConfirmation,
}

/// Wizard progress of a single user
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    step: usize,
    values: HashMap<String, String>,
    editing: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn state(&self, field_count: usize) -> WizardState {
        if self.step >= field_count {
            WizardState::AwaitingConfirmation
        } else {
            WizardState::CollectingField(self.step)
        }
    }

    /// Store an accepted answer for the current step and move on.
    ///
    /// While editing, the wizard returns straight to the summary instead
    /// of advancing to the next field.
    pub fn record(&mut self, name: &str, value: String, field_count: usize) -> WizardState {
        self.values.insert(name.to_string(), value);
        if self.editing {
            self.editing = false;
            self.step = field_count;
        } else {
            self.step = (self.step + 1).min(field_count);
        }
        self.state(field_count)
    }

    /// Re-open a single field from the summary, keeping the other answers
    pub fn begin_edit(&mut self, index: usize) {
        self.step = index;
        self.editing = true;
    }

    /// Return to the summary without changing any answer
    pub fn back_to_summary(&mut self, field_count: usize) {
        self.editing = false;
        self.step = field_count;
    }

    /// Whether every one of `names` has a value
    pub fn is_complete<'a>(&self, mut names: impl Iterator<Item = &'a str>) -> bool {
        names.all(|name| self.values.contains_key(name))
    }
}

/// Shared map of active sessions, one per user
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<UserId, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the session map while holding the lock
    pub async fn with<R>(&self, f: impl FnOnce(&mut HashMap<UserId, Session>) -> R) -> R {
        let mut sessions = self.inner.lock().await;
        f(&mut sessions)
    }

    pub async fn get(&self, user: UserId) -> Option<Session> {
        self.inner.lock().await.get(&user).cloned()
    }

    pub async fn contains(&self, user: UserId) -> bool {
        self.inner.lock().await.contains_key(&user)
    }

    pub async fn remove(&self, user: UserId) -> Option<Session> {
        self.inner.lock().await.remove(&user)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
