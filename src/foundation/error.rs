/// Result alias used throughout the crate.
pub type WarholResult<T> = Result<T, WarholError>;

/// Error taxonomy for the display pipeline.
///
/// Allocation and task failures are recovered by the compositor (it stays uninitialized and
/// retries on the next tick). The remaining variants surface from construction and I/O paths.
#[derive(thiserror::Error, Debug)]
pub enum WarholError {
    /// A frame buffer, transfer buffer, or bulk pool reservation could not be satisfied.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// The background refresh task could not be started or joined.
    #[error("task error: {0}")]
    Task(String),

    /// The panel transport rejected a transfer or has shut down.
    #[error("panel error: {0}")]
    Panel(String),

    /// The background asset could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid configuration or geometry.
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other error, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WarholError {
    /// Construct [`WarholError::Allocation`].
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    /// Construct [`WarholError::Task`].
    pub fn task(msg: impl Into<String>) -> Self {
        Self::Task(msg.into())
    }

    /// Construct [`WarholError::Panel`].
    pub fn panel(msg: impl Into<String>) -> Self {
        Self::Panel(msg.into())
    }

    /// Construct [`WarholError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Construct [`WarholError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns `true` for failures the compositor retries on the next tick.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Allocation(_) | Self::Task(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
