//! Common module for library exports

pub use crate::callbacks::{CallbackContext, CallbackEvent, CallbackSink, EventDisposition};
pub use crate::config::SessionConfig;
pub use crate::error::{BridgeError, BridgeResult};
pub use crate::pipelines::{Lookup, ModuleInfo, ReadOutcome, ReadStatus, SymbolRecord, ThreadContext};
pub use crate::session::{DriveRequest, InterruptHandle, Session, SessionHandle, SessionWorker};
pub use crate::types::address::Address;
pub use crate::types::process::{Architecture, ExecutionStatus, ProcessId, ThreadId};
