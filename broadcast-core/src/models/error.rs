use thiserror::Error;

/// Error reported by the broadcast engine.
///
/// Delivered asynchronously through [`EngineListener::on_error`] while a
/// connection is active or being attempted, or returned synchronously when an
/// engine call is rejected outright.
///
/// [`EngineListener::on_error`]: crate::traits::engine_listener::EngineListener::on_error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub code: i64,
    pub domain: String,
    pub detail: String,
    /// Description of the engine component that raised the error, if known.
    pub source: Option<String>,
    pub is_fatal: bool,
}

impl EngineError {
    pub fn new(code: i64, domain: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code,
            domain: domain.into(),
            detail: detail.into(),
            source: None,
            is_fatal: false,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn fatal(mut self) -> Self {
        self.is_fatal = true;
        self
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.domain, self.code, self.detail)
    }
}

impl std::error::Error for EngineError {}

/// Errors that can occur while configuring or driving a broadcast session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    /// Invalid, interdependent or out-of-range configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The destination URL passed to `start` is malformed.
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    /// The caller violated the session lifecycle (double initiation, use after
    /// teardown). Not meant to be recovered from.
    #[error("lifecycle violation: {0}")]
    Lifecycle(String),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}
