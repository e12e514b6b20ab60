//! Error types for the AMX SDK

use crate::Cell;

/// Result type for VM boundary calls
pub type AmxResult<T> = Result<T, AmxError>;

/// Errors raised while talking to the scripting VM
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmxError {
    /// Address outside the data segment or not cell-aligned
    #[error("invalid address {0:#x}")]
    InvalidAddress(Cell),

    /// The caller declared a different number of arguments
    #[error("invalid number of parameters: expected {expected}, got {got}")]
    ParamCount {
        /// Arguments the native expects
        expected: usize,
        /// Arguments the caller declared
        got: usize,
    },

    /// A string ran off the end of the data segment
    #[error("unterminated string at {0:#x}")]
    Unterminated(Cell),
}
