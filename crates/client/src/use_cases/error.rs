//! Errors raised while handling quest log traffic.

use crate::infrastructure::ports::{RepoError, ViewError};

/// Failures inside a use case or socket handler.
///
/// Never fatal: the dispatcher logs them and keeps listening.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("View error: {0}")]
    View(#[from] ViewError),
    #[error("Dispatcher is already listening")]
    AlreadyListening,
}
