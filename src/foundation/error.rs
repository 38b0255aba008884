/// Crate-wide result alias.
pub type StoryResult<T> = Result<T, StoryError>;

#[derive(thiserror::Error, Debug)]
/// Errors surfaced by presenter, effect, store and resource operations.
pub enum StoryError {
    /// A caller-supplied argument is malformed or out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A noise pattern name outside the recognized set.
    #[error("invalid noise pattern: {0}")]
    InvalidPattern(String),

    /// `show_options` was called without any option.
    #[error("empty options: an option menu needs at least one entry")]
    EmptyOptions,

    /// Resource settings do not match the shape expected for the resource kind.
    #[error("invalid resource settings: {0}")]
    InvalidResourceSettings(String),

    /// An image, audio or video source could not be decoded.
    #[error("resource load error: {0}")]
    ResourceLoad(String),

    /// The persisted choice document exists but does not have the expected shape.
    #[error("corrupt choice store: {0}")]
    CorruptStore(String),

    /// The option menu was closed (surface resize) before a choice was confirmed.
    #[error("option menu dismissed before a choice was confirmed")]
    MenuDismissed,

    /// The input source closed while a caller was waiting on it.
    #[error("input source closed")]
    InputClosed,

    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryError {
    /// Build an [`StoryError::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build an [`StoryError::InvalidPattern`].
    pub fn invalid_pattern(msg: impl Into<String>) -> Self {
        Self::InvalidPattern(msg.into())
    }

    /// Build an [`StoryError::InvalidResourceSettings`].
    pub fn resource_settings(msg: impl Into<String>) -> Self {
        Self::InvalidResourceSettings(msg.into())
    }

    /// Build an [`StoryError::ResourceLoad`].
    pub fn resource_load(msg: impl Into<String>) -> Self {
        Self::ResourceLoad(msg.into())
    }

    /// Build an [`StoryError::CorruptStore`].
    pub fn corrupt_store(msg: impl Into<String>) -> Self {
        Self::CorruptStore(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
