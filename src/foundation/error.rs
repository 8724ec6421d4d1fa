/// Convenience result type used across renderherd.
pub type RenderherdResult<T> = Result<T, RenderherdError>;

/// Top-level error taxonomy used by orchestration APIs.
#[derive(thiserror::Error, Debug)]
pub enum RenderherdError {
    /// Invalid configuration or job data detected before any work starts.
    #[error("validation error: {0}")]
    Validation(String),

    /// An encoder subprocess could not be created.
    #[error("launch error: {0}")]
    Launch(String),

    /// Errors while building or dispatching coordinator notifications.
    #[error("report error: {0}")]
    Report(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RenderherdError {
    /// Build a [`RenderherdError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RenderherdError::Launch`] value.
    pub fn launch(msg: impl Into<String>) -> Self {
        Self::Launch(msg.into())
    }

    /// Build a [`RenderherdError::Report`] value.
    pub fn report(msg: impl Into<String>) -> Self {
        Self::Report(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
