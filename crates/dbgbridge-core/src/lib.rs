//! # dbgbridge-core
//!
//! Safe, thread-affine access to the `dbgeng` debugger engine through its
//! binary interface.
//!
//! This crate provides:
//! - Bit-exact ABI records and vtables for the engine's interfaces
//! - Versioned interface proxies negotiated at session start
//! - Callback sinks for engine output and debug events
//! - A session bound to one thread, with a worker for cross-thread use
//! - Query pipelines: modules, symbols, memory, thread context
//!
//! ## Threading
//!
//! The engine is single-threaded by contract. A [`Session`] refuses calls
//! from any thread but the one that opened it. [`SessionWorker`] runs a
//! session on its own thread and hands out [`SessionHandle`]s that can be
//! used from anywhere, blocking or async. [`InterruptHandle`] is the one
//! call that goes straight to the engine from another thread.
//!
//! ## Why unsafe code is needed
//!
//! Every engine call goes through a function pointer in a native vtable, and
//! callback objects are handed to the engine as raw pointers. Those calls are
//! wrapped in safe proxies here; the unsafe surface stays inside `abi`,
//! `proxy`, and `callbacks`.

#![allow(unsafe_code)] // Required for the engine's vtable-based interfaces

pub mod abi;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod pipelines;
pub mod platform;
pub mod prelude;
pub mod proxy;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use callbacks::{
    CallbackContext, CallbackEvent, CallbackSink, EventDisposition, EventRecorder, OutputBuffer, TracingOutput,
};
pub use config::SessionConfig;
pub use error::{BridgeError, BridgeResult};
pub use pipelines::{
    Lookup, ModuleInfo, ModuleSnapshot, ReadOutcome, ReadStatus, RetryPolicy, StackFrame, SymbolRecord, ThreadContext,
};
pub use platform::{EngineSource, HResult, StatusKind};
pub use proxy::{NegotiatedVersions, ProxySet};
pub use session::{
    DriveAction, DriveOutcome, DriveRequest, InterruptHandle, Session, SessionHandle, SessionState, SessionWorker,
};
pub use types::{Address, Architecture, AttachFlags, EventInterest, OutputMask, ProcessId, SymbolOptions, ThreadId};
