//! The error kernel shared by every crate in the workspace.
//!
//! Variants map one-to-one onto the user-visible failure classes: invalid
//! input, authentication failure, missing entity, store failure, upstream
//! gateway failure and invalid state transition. Crates convert their
//! foreign errors at the boundary with [`Error::store`] or
//! [`Error::upstream`] so callers never see driver types.

use {std::result, thiserror::Error};

/// [`result::Result`] with its `Err` variant set to [`Error`].
pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("authentication failed")]
    AuthFailure,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("database operation failed: {0}")]
    Store(String),
    #[error("gateway unreachable: {0}")]
    Upstream(String),
    #[error("gateway returned status {status}")]
    UpstreamStatus { status: u16, body: String },
    #[error("invalid state transition: {0}")]
    StateConflict(String),
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn store(source: impl std::fmt::Display) -> Self {
        Self::Store(source.to_string())
    }

    pub fn upstream(source: impl std::fmt::Display) -> Self {
        Self::Upstream(source.to_string())
    }

    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::StateConflict(message.into())
    }
}
