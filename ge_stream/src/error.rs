#![allow(missing_docs)]

use core::fmt;
use std::error;

use crate::dirty::DirtyFlags;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The stream's sticky full mask is non-empty; the command was not
    /// appended. Drain the stream and reset before submitting again.
    StreamFull(DirtyFlags),
    /// The snapshot arena ran out of space while copying palette data.
    ArenaExhausted { needed: usize, available: usize },
    /// The packed primitive word used the reserved primitive encoding.
    InvalidPrimitive(u32),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::StreamFull(mask) => {
                write!(f, "command stream full: {:?}", mask)
            }
            StreamError::ArenaExhausted { needed, available } => {
                write!(
                    f,
                    "arena exhausted: needed {} bytes, {} available",
                    needed, available
                )
            }
            StreamError::InvalidPrimitive(word) => {
                write!(f, "invalid primitive word: {:#010X}", word)
            }
        }
    }
}

impl error::Error for StreamError {}
