//! Error types for the indicator binding.

use appind_toolkit::{ObjectId, ToolkitError};

/// Errors produced by indicator construction and observation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndicatorError {
    #[error("toolkit error: {0}")]
    Toolkit(#[from] ToolkitError),

    #[error("indicator id must not be empty")]
    EmptyId,

    #[error("indicator {0} has been disposed")]
    Disposed(ObjectId),

    #[error("no live indicator with object id {0}")]
    UnknownObject(ObjectId),

    #[error("unknown {kind} nick: {nick}")]
    UnknownNick { kind: &'static str, nick: String },
}
