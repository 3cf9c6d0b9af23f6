//! Paginated view over the conversation (infinite scroll).
//!
//! The rendered list shows a growing prefix of the conversation.  The prefix
//! grows one page at a time, and only when the front end reports that the
//! sentinel at the end of the list has scrolled into view.  New entries
//! appended past the window stay hidden until that happens; a reply that
//! lands beyond the current page does not pull the window along.

use std::slice;

use crate::conversation::Conversation;
use crate::observability::VIEW_PAGE_ADVANCES;
use crate::types::{ChatEntry, SessionStatus};

/// Entries revealed per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Length of the visible prefix: `min(page_size * current_page, len)`.
pub fn visible_len(len: usize, current_page: usize, page_size: usize) -> usize {
    page_size.saturating_mul(current_page).min(len)
}

/// Pagination state: page size and how many pages are revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    page_size: usize,
    current_page: usize,
    last_signal: Option<(bool, SessionStatus)>,
}

impl ViewState {
    /// Creates view state showing the first page.  A zero page size is
    /// treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            last_signal: None,
        }
    }

    /// Entries per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Pages revealed so far; starts at one and never decreases.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Upper bound on visible entries: `page_size * current_page`.
    pub fn visible_count(&self) -> usize {
        self.page_size.saturating_mul(self.current_page)
    }

    /// Visible entries for a conversation of `len` entries.
    pub fn visible_len(&self, len: usize) -> usize {
        visible_len(len, self.current_page, self.page_size)
    }

    /// Reports the sentinel's visibility and returns whether a page was added.
    ///
    /// A signal identical to the previous one is ignored, so a front end that
    /// reports visibility on every frame advances at most once per transition.
    /// A page is added only when the sentinel is visible, the session is idle,
    /// and entries remain beyond the window.
    pub fn observe_sentinel(
        &mut self,
        visible: bool,
        status: SessionStatus,
        conversation_len: usize,
    ) -> bool {
        let signal = (visible, status);
        if self.last_signal == Some(signal) {
            return false;
        }
        self.last_signal = Some(signal);
        if visible && status == SessionStatus::Idle && self.visible_count() < conversation_len {
            self.current_page += 1;
            VIEW_PAGE_ADVANCES.click();
            tracing::debug!(
                page = self.current_page,
                visible = self.visible_len(conversation_len),
                total = conversation_len,
                "revealed another page"
            );
            true
        } else {
            false
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// The slice of the conversation handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct ViewWindow<'a> {
    entries: &'a [ChatEntry],
    total: usize,
    current_page: usize,
    page_size: usize,
    status: SessionStatus,
}

impl<'a> ViewWindow<'a> {
    /// Visible entries, oldest first.
    pub fn entries(&self) -> &'a [ChatEntry] {
        self.entries
    }

    /// Iterates visible entries.
    pub fn iter(&self) -> slice::Iter<'a, ChatEntry> {
        self.entries.iter()
    }

    /// Number of visible entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the conversation, visible or not.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Entries held back beyond the window.
    pub fn hidden_count(&self) -> usize {
        self.total - self.entries.len()
    }

    /// True if a sentinel event could reveal more.
    pub fn has_more(&self) -> bool {
        self.hidden_count() > 0
    }

    /// Pages revealed.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Entries per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Session status at derivation time.
    pub fn status(&self) -> SessionStatus {
        self.status
    }
}

/// Derives the visible window from the conversation and view state.
pub fn derive_view<'a>(
    conversation: &'a Conversation,
    view: &ViewState,
    status: SessionStatus,
) -> ViewWindow<'a> {
    let all = conversation.all();
    let len = view.visible_len(all.len());
    ViewWindow {
        entries: &all[..len],
        total: all.len(),
        current_page: view.current_page(),
        page_size: view.page_size(),
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn conversation_of(n: usize) -> Conversation {
        let mut conversation = Conversation::new();
        conversation.append((0..n).map(|i| ChatEntry::user(format!("m{i}"))));
        conversation
    }

    #[test]
    fn initial_state() {
        let view = ViewState::default();
        assert_eq!(view.page_size(), 10);
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.visible_count(), 10);
    }

    #[test]
    fn zero_page_size_clamps() {
        assert_eq!(ViewState::new(0).page_size(), 1);
    }

    #[test]
    fn empty_conversation_has_empty_window() {
        let conversation = Conversation::new();
        let window = derive_view(&conversation, &ViewState::default(), SessionStatus::Idle);
        assert!(window.is_empty());
        assert!(!window.has_more());
    }

    #[test]
    fn twelve_entries_reveal_second_page() {
        let conversation = conversation_of(12);
        let mut view = ViewState::default();
        let window = derive_view(&conversation, &view, SessionStatus::Idle);
        assert_eq!(window.len(), 10);
        assert_eq!(window.hidden_count(), 2);

        assert!(view.observe_sentinel(true, SessionStatus::Idle, conversation.len()));
        assert_eq!(view.current_page(), 2);
        let window = derive_view(&conversation, &view, SessionStatus::Idle);
        assert_eq!(window.len(), 12);
        assert_eq!(window.entries()[11].content(), "m11");
    }

    #[test]
    fn repeated_signal_advances_once() {
        let conversation = conversation_of(35);
        let mut view = ViewState::default();
        assert!(view.observe_sentinel(true, SessionStatus::Idle, conversation.len()));
        assert!(!view.observe_sentinel(true, SessionStatus::Idle, conversation.len()));
        assert!(!view.observe_sentinel(true, SessionStatus::Idle, conversation.len()));
        assert_eq!(view.current_page(), 2);

        assert!(!view.observe_sentinel(false, SessionStatus::Idle, conversation.len()));
        assert!(view.observe_sentinel(true, SessionStatus::Idle, conversation.len()));
        assert_eq!(view.current_page(), 3);
    }

    #[test]
    fn busy_blocks_advance_until_idle_signal() {
        let conversation = conversation_of(15);
        let mut view = ViewState::default();
        assert!(!view.observe_sentinel(true, SessionStatus::Busy, conversation.len()));
        assert_eq!(view.current_page(), 1);
        assert!(view.observe_sentinel(true, SessionStatus::Idle, conversation.len()));
        assert_eq!(view.current_page(), 2);
    }

    #[test]
    fn no_advance_at_end_of_history() {
        let conversation = conversation_of(10);
        let mut view = ViewState::default();
        assert!(!view.observe_sentinel(true, SessionStatus::Idle, conversation.len()));
        assert!(!view.observe_sentinel(false, SessionStatus::Idle, conversation.len()));
        assert!(!view.observe_sentinel(true, SessionStatus::Idle, conversation.len()));
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn growth_alone_does_not_expand_window() {
        let mut conversation = conversation_of(9);
        let view = ViewState::default();
        conversation.append([ChatEntry::user("q"), ChatEntry::assistant("a")]);
        conversation.append([ChatEntry::user("q2"), ChatEntry::assistant("a2")]);
        let window = derive_view(&conversation, &view, SessionStatus::Idle);
        assert_eq!(window.len(), 10);
        assert_eq!(window.total(), 13);
    }

    proptest! {
        #[test]
        fn visible_len_law(len in 0usize..500, page in 1usize..60, size in 1usize..40) {
            let n = visible_len(len, page, size);
            prop_assert_eq!(n, (size * page).min(len));
            prop_assert!(n <= len);
        }

        #[test]
        fn window_never_shrinks(events in prop::collection::vec((any::<bool>(), any::<bool>(), 0usize..3), 0..64)) {
            let mut conversation = Conversation::new();
            let mut view = ViewState::new(3);
            let mut last_visible = 0;
            let mut last_page = view.current_page();
            for (visible, busy, grow) in events {
                conversation.append((0..grow).map(|_| ChatEntry::assistant("x")));
                let status = if busy { SessionStatus::Busy } else { SessionStatus::Idle };
                let before = view.current_page();
                let advanced = view.observe_sentinel(visible, status, conversation.len());
                prop_assert!(view.current_page() == before || (advanced && view.current_page() == before + 1));
                let window = derive_view(&conversation, &view, status);
                prop_assert_eq!(window.len(), view.visible_len(conversation.len()));
                prop_assert!(window.len() >= last_visible);
                prop_assert!(view.current_page() >= last_page);
                last_visible = window.len();
                last_page = view.current_page();
            }
        }
    }
}
