use std::fmt;

/// Whether a completion call is in flight.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Nothing in flight; submissions are accepted.
    #[default]
    Idle,

    /// A completion call is in flight; submissions are dropped.
    Busy,
}

impl SessionStatus {
    /// True while a call is in flight.
    pub fn is_busy(self) -> bool {
        self == SessionStatus::Busy
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Busy => write!(f, "busy"),
        }
    }
}
