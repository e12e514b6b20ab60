//! Error types for the regex bridge

use amx_sdk::{AmxError, Cell};

/// Result type for bridge operations
pub type RegexResult<T> = Result<T, RegexError>;

/// Which registry a handle was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// A compiled pattern
    Regex,
    /// A recorded match result
    MatchResults,
}

impl std::fmt::Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleKind::Regex => write!(f, "regex"),
            HandleKind::MatchResults => write!(f, "match_results"),
        }
    }
}

/// Failures a native can report. Every variant turns into the 0 sentinel
/// at the VM boundary; "no match" is not an error and never appears here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegexError {
    /// A plain argument is out of range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A string parameter is empty, unreadable or malformed
    #[error("invalid {0}")]
    InvalidString(&'static str),

    /// A by-reference parameter does not resolve to a cell
    #[error("invalid param reference")]
    InvalidReference,

    /// Unknown, stale or foreign handle
    #[error("invalid {kind} handle {handle:#x}")]
    InvalidHandle {
        /// Registry that was searched
        kind: HandleKind,
        /// The value the caller passed
        handle: Cell,
    },

    /// Group index outside the recorded groups
    #[error("group index {index} out of range (match has {len} groups)")]
    InvalidIndex {
        /// Requested index
        index: Cell,
        /// Number of recorded groups
        len: usize,
    },

    /// The pattern did not compile; carries the engine's diagnostic
    #[error("{0}")]
    Compile(String),

    /// Wrong argument count or other calling-convention violation
    #[error(transparent)]
    Param(#[from] AmxError),
}

impl RegexError {
    /// Shorthand for an unknown pattern handle.
    pub fn regex_handle(handle: Cell) -> Self {
        RegexError::InvalidHandle {
            kind: HandleKind::Regex,
            handle,
        }
    }

    /// Shorthand for an unknown match-results handle.
    pub fn match_handle(handle: Cell) -> Self {
        RegexError::InvalidHandle {
            kind: HandleKind::MatchResults,
            handle,
        }
    }
}
