//! Error types for the toolkit layer.

/// Errors produced by the toolkit context and its main context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolkitError {
    #[error("toolkit is not initialized on this thread")]
    NotInitialized,

    #[error("main context is closed")]
    ContextClosed,
}
