//! Recording of draw/transfer commands and pipeline state for an emulated
//! fixed-function GPU.
//!
//! The emulated CPU writes GPU registers continuously; an external dirty
//! tracker records which state categories those writes touched. Each time the
//! display list interpreter reaches a draw, it calls
//! [stream::GeStream::submit_draw] with the current [regs::GeRegisters] view
//! and the accumulated [dirty::DirtyFlags]. The stream captures a snapshot of
//! each dirty, currently-relevant state category into a fixed-capacity table
//! and records a command referencing those snapshots by index; untouched
//! categories are inherited from the previous draw, so runs of primitives
//! with identical state cost nothing beyond the command itself.
//!
//! A backend walks [stream::GeStream::commands] in order, resolves each
//! draw's indices against [stream::GeStream::tables], and issues real draw
//! calls. When any table reaches capacity the stream reports itself full and
//! refuses further submissions until it is drained and [stream::GeStream::reset].

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub use error::*;

pub mod arena;
pub mod caps;
mod diff;
pub mod dirty;
mod dump;
mod error;
pub mod regs;
pub mod snapshot;
pub mod stream;
