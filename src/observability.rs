use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("willlm.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("willlm.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("willlm.client.request_duration_seconds");
pub(crate) static CLIENT_PROMPT_TOKENS: Counter = Counter::new("willlm.client.prompt_tokens");
pub(crate) static CLIENT_CANDIDATE_TOKENS: Counter =
    Counter::new("willlm.client.candidate_tokens");

pub(crate) static SESSION_STARTUPS: Counter = Counter::new("willlm.session.startups");
pub(crate) static SESSION_STARTUP_FAILURES: Counter =
    Counter::new("willlm.session.startup_failures");
pub(crate) static SESSION_SUBMITS: Counter = Counter::new("willlm.session.submits");
pub(crate) static SESSION_SUBMIT_FAILURES: Counter =
    Counter::new("willlm.session.submit_failures");
pub(crate) static SESSION_ABANDONED: Counter = Counter::new("willlm.session.abandoned");
pub(crate) static SESSION_IGNORED_BUSY: Counter = Counter::new("willlm.session.ignored_busy");
pub(crate) static SESSION_IGNORED_EMPTY: Counter = Counter::new("willlm.session.ignored_empty");
pub(crate) static SESSION_TURN_DURATION: Moments =
    Moments::new("willlm.session.turn_duration_seconds");

pub(crate) static VIEW_PAGE_ADVANCES: Counter = Counter::new("willlm.view.page_advances");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);
    collector.register_counter(&CLIENT_PROMPT_TOKENS);
    collector.register_counter(&CLIENT_CANDIDATE_TOKENS);

    collector.register_counter(&SESSION_STARTUPS);
    collector.register_counter(&SESSION_STARTUP_FAILURES);
    collector.register_counter(&SESSION_SUBMITS);
    collector.register_counter(&SESSION_SUBMIT_FAILURES);
    collector.register_counter(&SESSION_ABANDONED);
    collector.register_counter(&SESSION_IGNORED_BUSY);
    collector.register_counter(&SESSION_IGNORED_EMPTY);
    collector.register_moments(&SESSION_TURN_DURATION);

    collector.register_counter(&VIEW_PAGE_ADVANCES);
}
