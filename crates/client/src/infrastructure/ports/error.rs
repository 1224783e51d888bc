//! Error types for port operations.

/// Quest directory errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Storage operation failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },
}

impl RepoError {
    /// Create a Storage error with operation context.
    pub fn storage(operation: &'static str, message: impl ToString) -> Self {
        Self::Storage {
            operation,
            message: message.to_string(),
        }
    }
}

/// Failures reported by the local view layer.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("Failed to render view: {0}")]
    Render(String),
}

impl ViewError {
    pub fn render(message: impl ToString) -> Self {
        Self::Render(message.to_string())
    }
}

/// Socket emit failures. Never surfaced to callers; logged and dropped.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Socket is closed")]
    Closed,

    #[error("Failed to encode message: {0}")]
    Encode(String),
}
