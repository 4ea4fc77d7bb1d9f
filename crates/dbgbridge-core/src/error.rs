//! # Error Types
//!
//! Error taxonomy for calls that cross the engine boundary.
//!
//! We use `thiserror` to generate `Error` implementations and messages.
//!
//! Two outcomes that look like failures are deliberately *not* errors:
//! a symbol lookup miss is [`Lookup::NotFound`](crate::pipelines::Lookup) and a
//! short memory read is [`ReadStatus::PartialRead`](crate::pipelines::ReadStatus).
//! Callers can render "no symbol" or "partially mapped" without treating it
//! as a failed query.

use thiserror::Error;

use crate::platform::hresult::{HResult, StatusKind};
use crate::proxy::InterfaceGroup;

/// Main error type for engine operations
///
/// ## Error Categories
///
/// 1. **Native failures**: `Engine` (code preserved for diagnostics)
/// 2. **Session state**: `SessionClosed`, `SessionBusy`, `WorkerGone`
/// 3. **Caller misuse**: `ThreadAffinityViolation`, `ReentrantCall`, `InvalidArgument`
/// 4. **Capability**: `UnsupportedOperation`, `EngineUnavailable`
/// 5. **Target state**: `TargetNotSuspended`, `Unreadable`, `NotFound`
#[derive(Error, Debug)]
pub enum BridgeError
{
    /// A native engine call returned a failing `HRESULT`.
    ///
    /// `operation` names the interface method (e.g. `IDebugSymbols::GetModuleParameters`).
    #[error("{operation} failed: {code}")]
    Engine
    {
        /// Raw status code returned by the engine
        code: HResult,
        /// Native method that failed
        operation: &'static str,
    },

    /// The session was closed or detached; no native call was attempted.
    #[error("Session is closed")]
    SessionClosed,

    /// A drive operation is already running on this session.
    ///
    /// Drive requests are exclusive. A second request is rejected instead of
    /// queued, whether it comes from another thread or from inside a callback.
    #[error("Session is busy driving the target")]
    SessionBusy,

    /// The call was issued from a thread other than the session's bound thread.
    ///
    /// ## Solution
    ///
    /// Route the call through a [`SessionHandle`](crate::session::SessionHandle),
    /// which marshals it onto the engine thread.
    #[error("{operation} called off the session thread")]
    ThreadAffinityViolation
    {
        /// Operation that was rejected
        operation: &'static str,
    },

    /// A callback sink tried to call an engine operation outside the
    /// reentrant-safe allow-list.
    #[error("{operation} is not permitted from inside an engine callback")]
    ReentrantCall
    {
        /// Operation that was rejected
        operation: &'static str,
    },

    /// The negotiated interface version lacks the requested operation.
    #[error("{operation} requires {group} v{required}, engine provides v{negotiated}")]
    UnsupportedOperation
    {
        /// Operation that needs a newer interface
        operation: &'static str,
        /// Interface group the operation belongs to
        group: InterfaceGroup,
        /// Minimum version that provides the operation
        required: u32,
        /// Version negotiated at connect time
        negotiated: u32,
    },

    /// No byte of the requested range could be read.
    #[error("Memory at 0x{address:016x} ({length} bytes) is unreadable")]
    Unreadable
    {
        /// Start of the requested range
        address: u64,
        /// Requested length
        length: usize,
    },

    /// A lookup by name or index found nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Thread context capture requires the target to be stopped.
    #[error("Target must be suspended for this operation")]
    TargetNotSuspended,

    /// Invalid argument rejected before crossing the boundary.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The engine library or its `DebugCreate` entry point could not be loaded.
    #[error("Debugger engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The session worker thread has exited.
    #[error("Session worker thread is gone")]
    WorkerGone,

    /// I/O error (dump paths, log files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError
{
    /// Build a [`BridgeError::Engine`] from a raw status code.
    #[must_use]
    pub fn engine(code: impl Into<HResult>, operation: &'static str) -> Self
    {
        Self::Engine {
            code: code.into(),
            operation,
        }
    }

    /// Native status code, if this error came from the engine.
    #[must_use]
    pub fn code(&self) -> Option<HResult>
    {
        match self {
            Self::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Classification of the native status code, if any.
    #[must_use]
    pub fn status_kind(&self) -> Option<StatusKind>
    {
        self.code().map(HResult::kind)
    }

    /// Whether an idempotent read-only query may be retried once.
    ///
    /// Only engine codes that signal a transient condition (pending I/O,
    /// symbol server timeouts) qualify.
    #[must_use]
    pub fn is_transient(&self) -> bool
    {
        self.code().is_some_and(HResult::is_transient)
    }

    /// Whether the error indicates caller misuse rather than engine failure.
    #[must_use]
    pub fn is_misuse(&self) -> bool
    {
        matches!(
            self,
            Self::ThreadAffinityViolation { .. } | Self::ReentrantCall { .. } | Self::SessionClosed | Self::SessionBusy
        )
    }
}

/// Convenience type alias for `Result<T, BridgeError>`
///
/// ```rust
/// use dbgbridge_core::error::BridgeResult;
/// fn foo() -> BridgeResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
