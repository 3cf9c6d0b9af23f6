use crate::types::Role;

/// One turn in the conversation.
///
/// Entries are immutable once created; the conversation only ever appends them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    role: Role,
    content: String,
}

impl ChatEntry {
    /// Create an entry with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user entry.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant entry.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// The author of this entry.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The text of this entry, verbatim.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// True for entries typed by the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
