//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::types::{GenerationConfig, Model};
use crate::view::DEFAULT_PAGE_SIZE;

/// The prompt sent once when a session starts.
pub const SETUP_PROMPT: &str = "You are WILL-LM, a specialized AI coding assistant. Your primary focus is helping with programming and development tasks. You should provide clear, concise, and practical coding solutions. Always format your responses using Markdown syntax, including:\n\n- Using proper headings (##) for sections\n- Formatting code blocks with the appropriate language tags\n- Using bullet points or numbered lists for steps\n- Highlighting important terms with bold or italic text\n- Using tables when comparing options\n\nPlease confirm your understanding of this role with a well-formatted response.";

/// Label shown before user entries.
pub const USER_LABEL: &str = "You";

/// Label shown before assistant entries.
pub const ASSISTANT_LABEL: &str = "WILL-LM";

/// Command-line arguments for the willlm-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-2.0-flash)", "MODEL")]
    pub model: Option<String>,

    /// Replacement for the setup prompt sent at startup.
    #[arrrg(optional, "Setup prompt sent when the session starts", "PROMPT")]
    pub system: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max tokens per response (default: model limit)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Entries revealed per page.
    #[arrrg(optional, "Entries revealed per page (default: 10)", "N")]
    pub page_size: Option<usize>,

    /// Override the API base URL.
    #[arrrg(optional, "API base URL", "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Prompt sent once at startup; its reply seeds the conversation.
    pub setup_prompt: String,

    /// Maximum tokens per response; `None` leaves it to the model.
    pub max_tokens: Option<u32>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Optional sampling temperature.
    pub temperature: Option<f32>,

    /// Optional top-p nucleus sampling value.
    pub top_p: Option<f32>,

    /// Optional top-k sampling limit.
    pub top_k: Option<u32>,

    /// Custom stop sequences supplied on every request.
    pub stop_sequences: Vec<String>,

    /// Entries revealed per page.
    pub page_size: usize,

    /// API base URL; `None` uses the public endpoint.
    pub base_url: Option<String>,

    /// Transport timeout; `None` uses the client default.
    pub timeout: Option<Duration>,

    /// Label printed before user entries.
    pub user_label: String,

    /// Label printed before assistant entries.
    pub assistant_label: String,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-2.0-flash
    /// - Setup prompt: the WILL-LM coding assistant prompt
    /// - Page size: 10
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            setup_prompt: SETUP_PROMPT.to_string(),
            max_tokens: None,
            use_color: true,
            temperature: None,
            top_p: None,
            top_k: None,
            stop_sequences: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            base_url: None,
            timeout: None,
            user_label: USER_LABEL.to_string(),
            assistant_label: ASSISTANT_LABEL.to_string(),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the setup prompt.
    pub fn with_setup_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.setup_prompt = prompt.into();
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the top-p value.
    pub fn with_top_p(mut self, top_p: Option<f32>) -> Self {
        self.top_p = top_p;
        self
    }

    /// Sets the top-k value.
    pub fn with_top_k(mut self, top_k: Option<u32>) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the stop sequences.
    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.stop_sequences = stop_sequences;
        self
    }

    /// Sets the page size.  Zero is treated as one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the transport timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the entry labels.
    pub fn with_labels(mut self, user: impl Into<String>, assistant: impl Into<String>) -> Self {
        self.user_label = user.into();
        self.assistant_label = assistant.into();
        self
    }

    /// The sampling settings sent with every request.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            max_output_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            stop_sequences: self.stop_sequences.clone(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            model: args.model.map(Model::from).unwrap_or(defaults.model),
            setup_prompt: args.system.unwrap_or(defaults.setup_prompt),
            max_tokens: args.max_tokens,
            use_color: !args.no_color,
            page_size: args.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
            base_url: args.base_url,
            timeout: args.timeout_secs.map(Duration::from_secs),
            ..defaults
        }
    }
}
