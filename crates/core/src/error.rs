//! Error types for the replay-trader system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the replay-trader system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An instrument that the bar source does not track.
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    /// Event construction violated an invariant.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Data error (invalid or missing data).
    #[error("Data error: {0}")]
    Data(String),

    /// Strategy failure.
    #[error("Strategy error: {0}")]
    Strategy(String),

    /// Execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// A run stopped while dispatching events.
    #[error("Run aborted after bar {}: {source}", display_bar(.last_completed_bar))]
    RunAborted {
        /// Index of the last bar whose cascade fully completed.
        last_completed_bar: Option<usize>,
        /// The failure that stopped the run.
        #[source]
        source: Box<Error>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn display_bar(bar: &Option<usize>) -> String {
    match bar {
        Some(i) => i.to_string(),
        None => "none".to_string(),
    }
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an unknown instrument error.
    pub fn unknown_instrument(symbol: impl Into<String>) -> Self {
        Error::UnknownInstrument(symbol.into())
    }

    /// Create an invalid event error.
    pub fn invalid_event(msg: impl Into<String>) -> Self {
        Error::InvalidEvent(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a strategy error.
    pub fn strategy(msg: impl Into<String>) -> Self {
        Error::Strategy(msg.into())
    }

    /// Create an execution error.
    pub fn execution(msg: impl Into<String>) -> Self {
        Error::Execution(msg.into())
    }

    /// Wrap a dispatch failure with the last completed bar index.
    pub fn run_aborted(last_completed_bar: Option<usize>, source: Error) -> Self {
        Error::RunAborted {
            last_completed_bar,
            source: Box::new(source),
        }
    }

    /// Whether this error comes from miswiring rather than data or runtime.
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::Config(_) | Error::UnknownInstrument(_) | Error::InvalidEvent(_) => true,
            Error::RunAborted { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_aborted_message() {
        let err = Error::run_aborted(Some(4), Error::unknown_instrument("XYZ"));
        assert_eq!(err.to_string(), "Run aborted after bar 4: Unknown instrument: XYZ");
        assert!(err.is_configuration());

        let err = Error::run_aborted(None, Error::execution("venue down"));
        assert_eq!(err.to_string(), "Run aborted after bar none: Execution error: venue down");
        assert!(!err.is_configuration());
    }
}
