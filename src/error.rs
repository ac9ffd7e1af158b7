use thiserror::Error;

/// Everything that can make a run fail.
///
/// Validation errors name positions within the *cleaned* instruction stream
/// (comment characters are stripped before validation), so the positions line
/// up with what the engine actually executes.
#[derive(Debug, Error)]
pub enum Error {
    /// A `]` with no pending `[`. Detected during validation, before any
    /// instruction executes.
    #[error("unmatched ']' at position {0}")]
    UnmatchedCloseBracket(usize),

    /// One or more `[` never closed, listed in the order they were opened.
    #[error("unmatched '[' at positions {0:?}")]
    UnmatchedOpenBracket(Vec<usize>),

    /// The step ceiling was hit. Output flushed before the failing step
    /// remains visible on the sink.
    #[error("step limit reached ({0})")]
    StepLimitExceeded(u64),

    /// Caller-supplied initial tape contents longer than the configured tape.
    #[error("initial tape of {given} bytes exceeds tape length {tape_len}")]
    TapeOverflow { given: usize, tape_len: usize },

    /// A failure from an injected input/output endpoint, propagated as-is.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
