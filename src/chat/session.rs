//! The session controller.
//!
//! `SessionController` drives a [`SessionState`] against a
//! [`CompletionClient`].  It allows at most one completion call in flight:
//! the busy flag is checked and set under the state lock before the call is
//! made, so concurrent submissions through a shared reference are dropped
//! rather than queued.  The lock is never held across the call itself.
//! Dropping an operation's future mid-call returns the session to idle.
//!
//! Provider failures are logged and recorded as the session's last error.
//! They are never returned to the caller.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::chat::config::ChatConfig;
use crate::chat::state::{Pending, SessionState, SessionStats, TurnOutcome};
use crate::completion::CompletionClient;
use crate::input::{Key, KeyCommand};
use crate::observability::{
    SESSION_ABANDONED, SESSION_IGNORED_BUSY, SESSION_IGNORED_EMPTY, SESSION_STARTUP_FAILURES,
    SESSION_STARTUPS, SESSION_SUBMIT_FAILURES, SESSION_SUBMITS, SESSION_TURN_DURATION,
};
use crate::types::SessionStatus;
use crate::view::ViewWindow;

/// What a keystroke did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Enter triggered a submission.  No newline was inserted.
    Submitted(TurnOutcome),
    /// The input buffer was edited.
    Edited,
    /// The edit was refused because a call is in flight.
    Rejected,
}

impl KeyOutcome {
    /// True if the keystroke's default effect (inserting text) was suppressed.
    pub fn default_prevented(self) -> bool {
        matches!(self, KeyOutcome::Submitted(_))
    }
}

/// A committed call that has not been resolved yet.
///
/// Dropped unresolved, for instance when the caller's future is cancelled,
/// it hands its [`Pending`] to [`SessionState::abandon`].
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
    pending: Option<Pending>,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a Mutex<SessionState>, pending: Pending) -> Self {
        Self {
            state,
            pending: Some(pending),
        }
    }

    fn prompt(&self) -> &str {
        self.pending.as_ref().map_or("", Pending::prompt)
    }

    fn resolve(
        mut self,
        f: impl FnOnce(&mut SessionState, Pending) -> TurnOutcome,
    ) -> TurnOutcome {
        let mut state = lock_state(self.state);
        match self.pending.take() {
            Some(pending) => f(&mut state, pending),
            None => TurnOutcome::Failed,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            SESSION_ABANDONED.click();
            tracing::warn!(startup = pending.is_startup(), "completion abandoned");
            lock_state(self.state).abandon(pending);
        }
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A chat session bound to a completion client.
pub struct SessionController<C: CompletionClient> {
    client: C,
    setup_prompt: String,
    state: Mutex<SessionState>,
}

impl<C: CompletionClient> SessionController<C> {
    /// Creates an idle, empty session.
    pub fn new(client: C, setup_prompt: impl Into<String>, page_size: usize) -> Self {
        Self {
            client,
            setup_prompt: setup_prompt.into(),
            state: Mutex::new(SessionState::new(page_size)),
        }
    }

    /// Creates a session using the setup prompt and page size from `config`.
    pub fn from_config(client: C, config: &ChatConfig) -> Self {
        Self::new(client, config.setup_prompt.clone(), config.page_size)
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }

    /// Sends the setup prompt and seeds the conversation with the reply.
    ///
    /// Runs at most once per session.  On failure the conversation stays
    /// empty and the error is only logged.
    pub async fn startup(&self) -> TurnOutcome {
        let begun = self.state().begin_startup(&self.setup_prompt);
        self.run(begun).await
    }

    /// Submits `prompt` and appends the exchange on success.
    ///
    /// Blank prompts and prompts submitted while a call is in flight are
    /// dropped without touching the conversation.
    pub async fn submit(&self, prompt: &str) -> TurnOutcome {
        let begun = self.state().begin_submit(prompt);
        self.run(begun).await
    }

    /// Submits the current contents of the input buffer.
    pub async fn submit_input(&self) -> TurnOutcome {
        let begun = self.state().begin_submit_input();
        self.run(begun).await
    }

    /// Routes a keystroke: a plain Enter submits, everything else edits.
    pub async fn handle_key(&self, key: Key) -> KeyOutcome {
        match key.command() {
            KeyCommand::Submit => KeyOutcome::Submitted(self.submit_input().await),
            KeyCommand::Edit(edit) => {
                if self.state().edit_input(edit) {
                    KeyOutcome::Edited
                } else {
                    KeyOutcome::Rejected
                }
            }
        }
    }

    async fn run(&self, begun: Result<Pending, TurnOutcome>) -> TurnOutcome {
        let pending = match begun {
            Ok(pending) => pending,
            Err(outcome) => {
                match outcome {
                    TurnOutcome::IgnoredBusy => {
                        SESSION_IGNORED_BUSY.click();
                        tracing::debug!("dropped submission while busy");
                    }
                    TurnOutcome::IgnoredEmpty => {
                        SESSION_IGNORED_EMPTY.click();
                        tracing::debug!("dropped blank submission");
                    }
                    TurnOutcome::AlreadyStarted => {
                        tracing::warn!("startup requested twice");
                    }
                    TurnOutcome::Completed | TurnOutcome::Failed => {}
                }
                return outcome;
            }
        };
        let startup = pending.is_startup();
        if startup {
            SESSION_STARTUPS.click();
        } else {
            SESSION_SUBMITS.click();
        }

        let in_flight = InFlight::new(&self.state, pending);
        let start = Instant::now();
        let result = self.client.generate(in_flight.prompt()).await;
        let elapsed = start.elapsed();
        SESSION_TURN_DURATION.add(elapsed.as_secs_f64());

        match result {
            Ok(text) => {
                tracing::debug!(
                    startup,
                    chars = text.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "completion finished"
                );
                in_flight.resolve(|state, pending| state.complete(pending, text))
            }
            Err(err) => {
                if startup {
                    SESSION_STARTUP_FAILURES.click();
                    tracing::error!(error = %err, "startup completion failed");
                } else {
                    SESSION_SUBMIT_FAILURES.click();
                    tracing::error!(error = %err, "completion failed");
                }
                in_flight.resolve(|state, pending| state.fail(pending, err))
            }
        }
    }

    /// Replaces the input buffer.  Returns false while busy.
    pub fn set_input(&self, text: &str) -> bool {
        self.state().set_input(text)
    }

    /// Returns a copy of the input buffer's text.
    pub fn input(&self) -> String {
        self.state().input().as_str().to_string()
    }

    /// Reports the sentinel's visibility.  Returns true if a page was revealed.
    pub fn observe_sentinel(&self, visible: bool) -> bool {
        self.state().observe_sentinel(visible)
    }

    /// Reports the sentinel scrolling into view and back out again.
    ///
    /// This is what a front end without continuous visibility reporting sends
    /// when the user asks for more history.
    pub fn reveal_more(&self) -> bool {
        let advanced = self.observe_sentinel(true);
        self.observe_sentinel(false);
        advanced
    }

    /// Derives the visible window and hands it to `f`.
    pub fn with_view<R>(&self, f: impl FnOnce(ViewWindow<'_>) -> R) -> R {
        let state = self.state();
        f(state.view())
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.state().status()
    }

    /// Number of entries in the conversation.
    pub fn conversation_len(&self) -> usize {
        self.state().conversation().len()
    }

    /// The most recent provider error, rendered.
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error().map(ToString::to_string)
    }

    /// A snapshot of the session counters.
    pub fn stats(&self) -> SessionStats {
        self.state().stats()
    }

    /// The prompt sent by [`SessionController::startup`].
    pub fn setup_prompt(&self) -> &str {
        &self.setup_prompt
    }

    /// The completion client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The completion client, for reconfiguration between turns.
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }
}
