use thiserror::Error;

/// Errors the dispatcher recovers from with a user-visible message.
///
/// Everything here is local to a single command cycle: reporting it and
/// looping again is always correct, and none of these variants leave the
/// job table, history or foreground slot in a modified state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellError {
    /// No executable candidate for the name on the search path.
    #[error("command not found: {name}")]
    CommandNotFound { name: String },

    /// A history or job index outside the currently valid range.
    #[error("index {index} is out of range ({count} entries)")]
    IndexOutOfRange { index: usize, count: usize },

    /// The job table is at capacity; the launch itself is not prevented,
    /// but the process cannot be tracked.
    #[error("job table is full ({capacity} jobs)")]
    CapacityExceeded { capacity: usize },
}
