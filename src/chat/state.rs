//! The session state machine.
//!
//! `SessionState` owns everything a chat session remembers: the conversation,
//! the view state, the Idle/Busy flag, and the pending input.  It performs no
//! I/O.  A turn is split in two: `begin_*` checks and sets the busy flag and
//! hands back a [`Pending`] describing the call to make, and `complete` or
//! `fail` applies the result and returns to idle.  `abandon` returns to idle
//! for a call whose result will never arrive.

use crate::conversation::Conversation;
use crate::error::Error;
use crate::input::{Edit, InputBuffer};
use crate::types::{ChatEntry, SessionStatus};
use crate::view::{ViewState, ViewWindow, derive_view};

/// How a session operation ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The call succeeded and its entries were appended.
    Completed,
    /// The prompt was empty or whitespace; nothing happened.
    IgnoredEmpty,
    /// Another call was in flight; the request was dropped.
    IgnoredBusy,
    /// Startup already ran for this session.
    AlreadyStarted,
    /// The call failed; nothing was appended.
    Failed,
}

impl TurnOutcome {
    /// True if the conversation grew.
    pub fn is_completed(self) -> bool {
        self == TurnOutcome::Completed
    }

    /// True if the operation was dropped without touching any state.
    pub fn is_ignored(self) -> bool {
        matches!(
            self,
            TurnOutcome::IgnoredEmpty | TurnOutcome::IgnoredBusy | TurnOutcome::AlreadyStarted
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingKind {
    Startup,
    Submit,
}

/// A completion call the session has committed to.
///
/// Holding a `Pending` means the session is busy.  Hand it back to
/// [`SessionState::complete`], [`SessionState::fail`] or
/// [`SessionState::abandon`] to return to idle.
#[must_use = "a pending turn keeps the session busy until completed or failed"]
#[derive(Debug)]
pub struct Pending {
    kind: PendingKind,
    prompt: String,
}

impl Pending {
    /// The exact text to send to the completion client.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// True for the one-time startup call.
    pub fn is_startup(&self) -> bool {
        self.kind == PendingKind::Startup
    }
}

/// Counters describing a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    /// Entries in the conversation.
    pub entry_count: usize,
    /// Entries currently visible.
    pub visible_count: usize,
    /// Pages revealed.
    pub current_page: usize,
    /// Entries per page.
    pub page_size: usize,
    /// Idle or busy.
    pub status: SessionStatus,
    /// Whether startup has run.
    pub started: bool,
    /// Completion calls that succeeded.
    pub completed_turns: u64,
    /// Completion calls that failed.
    pub failed_turns: u64,
    /// Completion calls dropped before their result arrived.
    pub abandoned_turns: u64,
    /// Submissions dropped because the session was busy.
    pub ignored_busy: u64,
    /// Submissions dropped because they were blank.
    pub ignored_empty: u64,
    /// The most recent provider error, rendered.
    pub last_error: Option<String>,
}

/// All state of one chat session.
#[derive(Debug, Default)]
pub struct SessionState {
    conversation: Conversation,
    view: ViewState,
    status: SessionStatus,
    input: InputBuffer,
    started: bool,
    completed_turns: u64,
    failed_turns: u64,
    abandoned_turns: u64,
    ignored_busy: u64,
    ignored_empty: u64,
    last_error: Option<Error>,
}

impl SessionState {
    /// Creates an idle, empty session revealing `page_size` entries per page.
    pub fn new(page_size: usize) -> Self {
        Self {
            view: ViewState::new(page_size),
            ..Self::default()
        }
    }

    /// Begins the one-time startup call.
    ///
    /// # Errors
    ///
    /// [`TurnOutcome::AlreadyStarted`] after the first call, and
    /// [`TurnOutcome::IgnoredBusy`] while another call is in flight.
    pub fn begin_startup(&mut self, setup_prompt: &str) -> Result<Pending, TurnOutcome> {
        if self.started {
            return Err(TurnOutcome::AlreadyStarted);
        }
        if self.status.is_busy() {
            self.ignored_busy += 1;
            return Err(TurnOutcome::IgnoredBusy);
        }
        self.started = true;
        self.status = SessionStatus::Busy;
        Ok(Pending {
            kind: PendingKind::Startup,
            prompt: setup_prompt.to_string(),
        })
    }

    /// Begins a user submission of `prompt`.
    ///
    /// The prompt is sent verbatim; trimming only decides whether it is blank.
    ///
    /// # Errors
    ///
    /// [`TurnOutcome::IgnoredEmpty`] for a blank prompt and
    /// [`TurnOutcome::IgnoredBusy`] while another call is in flight.  Neither
    /// changes anything but the counters.
    pub fn begin_submit(&mut self, prompt: &str) -> Result<Pending, TurnOutcome> {
        if prompt.trim().is_empty() {
            self.ignored_empty += 1;
            return Err(TurnOutcome::IgnoredEmpty);
        }
        if self.status.is_busy() {
            self.ignored_busy += 1;
            return Err(TurnOutcome::IgnoredBusy);
        }
        self.status = SessionStatus::Busy;
        Ok(Pending {
            kind: PendingKind::Submit,
            prompt: prompt.to_string(),
        })
    }

    /// Begins a submission of whatever the input buffer holds.
    ///
    /// # Errors
    ///
    /// Same as [`SessionState::begin_submit`].
    pub fn begin_submit_input(&mut self) -> Result<Pending, TurnOutcome> {
        let prompt = self.input.as_str().to_string();
        self.begin_submit(&prompt)
    }

    /// Applies a successful response and returns to idle.
    pub fn complete(&mut self, pending: Pending, response: String) -> TurnOutcome {
        match pending.kind {
            PendingKind::Startup => {
                self.conversation.append([ChatEntry::assistant(response)]);
            }
            PendingKind::Submit => {
                self.conversation.append([
                    ChatEntry::user(pending.prompt),
                    ChatEntry::assistant(response),
                ]);
                self.input.clear();
            }
        }
        self.completed_turns += 1;
        self.status = SessionStatus::Idle;
        TurnOutcome::Completed
    }

    /// Records a failed call and returns to idle without appending anything.
    ///
    /// The input buffer is left as it was so the user can retry.
    pub fn fail(&mut self, pending: Pending, error: Error) -> TurnOutcome {
        drop(pending);
        self.failed_turns += 1;
        self.last_error = Some(error);
        self.status = SessionStatus::Idle;
        TurnOutcome::Failed
    }

    /// Returns to idle for a call whose result will never arrive.
    ///
    /// Nothing is appended and the input buffer is kept.  A startup that is
    /// abandoned counts as having run.
    pub fn abandon(&mut self, pending: Pending) {
        drop(pending);
        self.abandoned_turns += 1;
        self.status = SessionStatus::Idle;
    }

    /// Edits the input buffer.  Returns false, changing nothing, while busy.
    pub fn edit_input(&mut self, edit: Edit) -> bool {
        if self.status.is_busy() {
            return false;
        }
        self.input.apply(edit);
        true
    }

    /// Replaces the input buffer.  Returns false, changing nothing, while busy.
    pub fn set_input(&mut self, text: &str) -> bool {
        if self.status.is_busy() {
            return false;
        }
        self.input.set(text);
        true
    }

    /// Reports sentinel visibility; returns true if a page was revealed.
    pub fn observe_sentinel(&mut self, visible: bool) -> bool {
        self.view
            .observe_sentinel(visible, self.status, self.conversation.len())
    }

    /// Derives the visible window.  Call after every mutation before rendering.
    pub fn view(&self) -> ViewWindow<'_> {
        derive_view(&self.conversation, &self.view, self.status)
    }

    /// The full conversation.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The pending input.
    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    /// Whether startup has run (or is running).
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The most recent provider error.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// A snapshot of the session counters.
    pub fn stats(&self) -> SessionStats {
        let window = self.view();
        SessionStats {
            entry_count: self.conversation.len(),
            visible_count: window.len(),
            current_page: self.view.current_page(),
            page_size: self.view.page_size(),
            status: self.status,
            started: self.started,
            completed_turns: self.completed_turns,
            failed_turns: self.failed_turns,
            abandoned_turns: self.abandoned_turns,
            ignored_busy: self.ignored_busy,
            ignored_empty: self.ignored_empty,
            last_error: self.last_error.as_ref().map(ToString::to_string),
        }
    }
}
