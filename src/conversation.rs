//! The append-only conversation log.

use std::slice;

use crate::types::ChatEntry;

/// Ordered, append-only history of chat entries.
///
/// There is no way to remove, edit, or reorder entries.  Entries
/// appended in one call land together and in the order given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    entries: Vec<ChatEntry>,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entries` to the end, preserving their order.
    ///
    /// Returns how many entries were added.
    pub fn append<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = ChatEntry>,
    {
        let before = self.entries.len();
        self.entries.extend(entries);
        self.entries.len() - before
    }

    /// The full history, oldest first.
    pub fn all(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    /// Iterates entries oldest first.
    pub fn iter(&self) -> slice::Iter<'_, ChatEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a ChatEntry;
    type IntoIter = slice::Iter<'a, ChatEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
