//! Chat sessions with a single-flight completion client.
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`state`]: the session state machine (conversation, view, status, input)
//! - [`session`]: the controller that drives the state against a client
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: slash command parsing for the terminal front end

mod commands;
mod config;
mod session;
mod state;

pub use crate::render::{PlainTextRenderer, Renderer, render_window};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ASSISTANT_LABEL, ChatArgs, ChatConfig, SETUP_PROMPT, USER_LABEL};
pub use session::{KeyOutcome, SessionController};
pub use state::{Pending, SessionState, SessionStats, TurnOutcome};
