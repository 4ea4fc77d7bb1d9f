//! # Types
//!
//! Stable value types handed to callers. Unlike the records in [`crate::abi`],
//! these own their data and carry no native layout constraints.

pub mod address;
pub mod flags;
pub mod process;
pub mod registers;

pub use address::Address;
pub use flags::{AttachFlags, EventInterest, OutputMask, SymbolOptions};
pub use process::{Architecture, ExecutionStatus, ProcessId, ThreadId, ThreadInfo};
pub use registers::{RegisterId, Registers, SegmentRegisters, X86_64Register};
