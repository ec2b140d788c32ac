use std::time::Duration;

use thiserror::Error;

/// Invalid or missing settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no instruments selected")]
    NoInstrumentsSelected,

    #[error("instrument universe is empty")]
    EmptyUniverse,

    #[error("selected instrument {0} is not part of the universe")]
    UnknownInstrument(String),

    #[error("polling interval must be greater than zero")]
    InvalidInterval,

    #[error("invalid {indicator} thresholds: lower {lower} must be below upper {upper}")]
    InvalidThresholds {
        indicator: &'static str,
        lower: f64,
        upper: f64,
    },

    #[error("invalid value for {field}: {value:?}")]
    InvalidField { field: String, value: String },

    #[error("unknown settings field: {0}")]
    UnknownField(String),

    #[error("malformed settings: {0}")]
    Malformed(String),
}

/// Notification delivery failure.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),

    #[error("endpoint responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("transport credentials are not configured")]
    MissingCredentials,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the bot token.
        TransportError::Network(err.without_url().to_string())
    }
}

/// Failure to obtain indicator readings for an instrument.
#[derive(Error, Debug)]
#[error("failed to read indicators for {instrument}: {message}")]
pub struct ReadingError {
    pub instrument: String,
    pub message: String,
}

impl ReadingError {
    pub fn new(instrument: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            message: message.into(),
        }
    }
}

/// Unexpected fault inside one polling cycle.
#[derive(Error, Debug)]
pub enum LoopIterationError {
    #[error(transparent)]
    Reading(#[from] ReadingError),

    #[error("cycle fault: {0}")]
    Other(String),
}

/// Outcome classification of a failed polling cycle.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Iteration(#[from] LoopIterationError),
}

impl From<ReadingError> for CycleError {
    fn from(err: ReadingError) -> Self {
        CycleError::Iteration(LoopIterationError::Reading(err))
    }
}
