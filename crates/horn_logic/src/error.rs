//! Error types for the Horn logic engines.

use thiserror::Error;

/// A specialized `Result` type for graph construction and inference runs.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines the errors that can occur while building a rule graph or running an engine.
///
/// A question that cannot be derived is not an error: both engines report it as `Ok(false)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The exchange record or a rule specification could not be turned into a graph.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// An internal invariant of the graph was broken during a run.
    ///
    /// This never happens on a graph built by [`Graph::link`](crate::Graph::link) and reset
    /// between runs; it is reported rather than tolerated.
    #[error("Internal inconsistency: {0}")]
    Inconsistent(String),

    /// The backward search went deeper than the configured bound.
    #[error("Max inference depth exceeded: {depth}")]
    MaxDepthExceeded { depth: usize },

    /// An error occurred during data serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A record file could not be read or written.
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Shorthand for a [`Error::MalformedInput`] built from anything printable.
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedInput(msg.into())
    }

    /// Shorthand for a [`Error::Inconsistent`] built from anything printable.
    pub(crate) fn inconsistent(msg: impl Into<String>) -> Self {
        Error::Inconsistent(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
