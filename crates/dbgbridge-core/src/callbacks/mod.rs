//! # Callback Sink Layer
//!
//! The engine reports output text and debug events by calling back into
//! objects the session registered with it. Those calls arrive synchronously,
//! on the session thread, from inside a driven operation such as
//! `WaitForEvent` or a symbol reload.
//!
//! ## Sinks
//!
//! A [`CallbackSink`] receives every [`CallbackEvent`] it declared interest
//! in, in the order the engine reported them. Event payloads borrow engine
//! memory and are only valid for the duration of the call.
//!
//! ## Re-entrancy
//!
//! While a callback is being dispatched the engine is in the middle of an
//! operation. A sink may query the engine only through the
//! [`CallbackContext`] it is handed; any other session call made during
//! dispatch fails with [`BridgeError::ReentrantCall`](crate::error::BridgeError::ReentrantCall)
//! without reaching the engine.
//!
//! ## Panics
//!
//! A panicking sink never unwinds into the engine. Output callbacks report
//! `E_FAIL` and event callbacks report `DEBUG_STATUS_NO_CHANGE` instead.

pub(crate) mod dispatch;
pub(crate) mod events;
pub(crate) mod object;
pub(crate) mod output;
pub mod sinks;

use std::fmt;

pub use sinks::{EventRecorder, OutputBuffer, TracingOutput};

use crate::abi::ExceptionRecord64;
use crate::error::BridgeResult;
use crate::pipelines::{self, Lookup, ModuleLocation, ReadOutcome, SymbolRecord};
use crate::platform::constants::{
    DEBUG_STATUS_BREAK, DEBUG_STATUS_GO, DEBUG_STATUS_GO_HANDLED, DEBUG_STATUS_GO_NOT_HANDLED,
    DEBUG_STATUS_NO_CHANGE, DEBUG_STATUS_STEP_INTO, DEBUG_STATUS_STEP_OVER,
};
use crate::session::SessionCore;
use crate::types::{Address, EventInterest, ExecutionStatus, OutputMask};

/// A target for engine callbacks.
///
/// Sinks are moved into the session when it opens and live until it closes.
pub trait CallbackSink: Send
{
    /// Debug events this sink wants. Events outside the mask are not delivered.
    fn interest(&self) -> EventInterest
    {
        EventInterest::empty()
    }

    /// Whether this sink wants [`CallbackEvent::Output`] chunks.
    fn receives_output(&self) -> bool
    {
        false
    }

    /// Handle one callback.
    ///
    /// The returned disposition only matters for debug events: when several
    /// sinks answer, the one with the highest precedence wins.
    fn on_event(&mut self, event: &CallbackEvent<'_>, context: &CallbackContext<'_>) -> EventDisposition;
}

/// One engine callback, borrowed for the duration of the call.
#[derive(Debug, Clone, Copy)]
pub enum CallbackEvent<'a>
{
    /// A chunk of engine output. Chunks are not line-aligned.
    Output
    {
        mask: OutputMask,
        text: &'a str,
    },
    /// A breakpoint was hit.
    Breakpoint,
    /// An exception was raised in the target.
    Exception
    {
        record: &'a ExceptionRecord64,
        first_chance: bool,
    },
    CreateThread
    {
        handle: u64,
        data_offset: u64,
        start_offset: u64,
    },
    ExitThread
    {
        exit_code: u32,
    },
    CreateProcess
    {
        image_base: Address,
        image_size: u32,
        module_name: &'a str,
        image_name: &'a str,
        checksum: u32,
        time_date_stamp: u32,
        start_offset: u64,
    },
    ExitProcess
    {
        exit_code: u32,
    },
    ModuleLoad
    {
        base: Address,
        size: u32,
        module_name: &'a str,
        image_name: &'a str,
        checksum: u32,
        time_date_stamp: u32,
    },
    ModuleUnload
    {
        image_base_name: &'a str,
        base: Address,
    },
    SystemError
    {
        error: u32,
        level: u32,
    },
    /// `DEBUG_SESSION_*` notification.
    SessionStatus
    {
        status: u32,
    },
    DebuggeeStateChanged
    {
        flags: u32,
        argument: u64,
    },
    EngineStateChanged
    {
        flags: u32,
        argument: u64,
    },
    SymbolStateChanged
    {
        flags: u32,
        argument: u64,
    },
}

impl CallbackEvent<'_>
{
    /// Interest bit that selects this event, empty for output.
    #[must_use]
    pub fn interest(&self) -> EventInterest
    {
        match self {
            CallbackEvent::Output { .. } => EventInterest::empty(),
            CallbackEvent::Breakpoint => EventInterest::BREAKPOINT,
            CallbackEvent::Exception { .. } => EventInterest::EXCEPTION,
            CallbackEvent::CreateThread { .. } => EventInterest::CREATE_THREAD,
            CallbackEvent::ExitThread { .. } => EventInterest::EXIT_THREAD,
            CallbackEvent::CreateProcess { .. } => EventInterest::CREATE_PROCESS,
            CallbackEvent::ExitProcess { .. } => EventInterest::EXIT_PROCESS,
            CallbackEvent::ModuleLoad { .. } => EventInterest::LOAD_MODULE,
            CallbackEvent::ModuleUnload { .. } => EventInterest::UNLOAD_MODULE,
            CallbackEvent::SystemError { .. } => EventInterest::SYSTEM_ERROR,
            CallbackEvent::SessionStatus { .. } => EventInterest::SESSION_STATUS,
            CallbackEvent::DebuggeeStateChanged { .. } => EventInterest::CHANGE_DEBUGGEE_STATE,
            CallbackEvent::EngineStateChanged { .. } => EventInterest::CHANGE_ENGINE_STATE,
            CallbackEvent::SymbolStateChanged { .. } => EventInterest::CHANGE_SYMBOL_STATE,
        }
    }

    /// One-line summary for logs and recorders.
    #[must_use]
    pub fn describe(&self) -> String
    {
        match self {
            CallbackEvent::Output { text, .. } => format!("output {:?}", text),
            CallbackEvent::Breakpoint => "breakpoint".to_string(),
            CallbackEvent::Exception { record, first_chance } => format!(
                "exception 0x{:08x} at 0x{:016x} ({})",
                record.code,
                record.address,
                if *first_chance { "first chance" } else { "second chance" }
            ),
            CallbackEvent::CreateThread { start_offset, .. } => format!("create thread at 0x{start_offset:016x}"),
            CallbackEvent::ExitThread { exit_code } => format!("exit thread ({exit_code})"),
            CallbackEvent::CreateProcess {
                image_base, module_name, ..
            } => format!("create process {module_name} at {image_base}"),
            CallbackEvent::ExitProcess { exit_code } => format!("exit process ({exit_code})"),
            CallbackEvent::ModuleLoad { base, module_name, .. } => format!("load module {module_name} at {base}"),
            CallbackEvent::ModuleUnload { image_base_name, base } => format!("unload module {image_base_name} at {base}"),
            CallbackEvent::SystemError { error, level } => format!("system error {error} (level {level})"),
            CallbackEvent::SessionStatus { status } => format!("session status {status}"),
            CallbackEvent::DebuggeeStateChanged { flags, .. } => format!("debuggee state changed (0x{flags:x})"),
            CallbackEvent::EngineStateChanged { flags, .. } => format!("engine state changed (0x{flags:x})"),
            CallbackEvent::SymbolStateChanged { flags, .. } => format!("symbol state changed (0x{flags:x})"),
        }
    }
}

/// What a sink asks the engine to do after a debug event.
///
/// Variants are declared in ascending precedence; `Ord` follows it, so the
/// combined answer of several sinks is their maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum EventDisposition
{
    /// No opinion
    #[default]
    NoChange,
    /// Continue
    Go,
    /// Continue, exception handled
    GoHandled,
    /// Continue, exception not handled
    GoNotHandled,
    /// Step over
    StepOver,
    /// Step into
    StepInto,
    /// Stop and return control to the caller
    Break,
}

impl EventDisposition
{
    /// Native `DEBUG_STATUS_*` value returned to the engine.
    #[must_use]
    pub const fn raw(self) -> u32
    {
        match self {
            EventDisposition::NoChange => DEBUG_STATUS_NO_CHANGE,
            EventDisposition::Go => DEBUG_STATUS_GO,
            EventDisposition::GoHandled => DEBUG_STATUS_GO_HANDLED,
            EventDisposition::GoNotHandled => DEBUG_STATUS_GO_NOT_HANDLED,
            EventDisposition::StepOver => DEBUG_STATUS_STEP_OVER,
            EventDisposition::StepInto => DEBUG_STATUS_STEP_INTO,
            EventDisposition::Break => DEBUG_STATUS_BREAK,
        }
    }
}

impl fmt::Display for EventDisposition
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Debug::fmt(self, f)
    }
}

/// The engine queries a sink may make while a callback is in progress.
pub struct CallbackContext<'a>
{
    core: &'a SessionCore,
}

impl<'a> CallbackContext<'a>
{
    pub(crate) fn new(core: &'a SessionCore) -> Self
    {
        Self { core }
    }

    /// Read target memory; see [`Session::read_memory`](crate::session::Session::read_memory).
    pub fn read_memory(&self, address: Address, length: usize) -> BridgeResult<ReadOutcome>
    {
        self.core.with_callback_proxies("CallbackContext::read_memory", |proxies| {
            pipelines::memory::read(proxies, address, length, self.core.page_size(proxies))
        })
    }

    /// Module containing `address`.
    pub fn module_by_offset(&self, address: Address) -> BridgeResult<Lookup<ModuleLocation>>
    {
        let retry = self.core.retry_policy();
        self.core.with_callback_proxies("CallbackContext::module_by_offset", |proxies| {
            pipelines::symbols::locate_module(proxies, address, retry)
        })
    }

    /// Symbol at or before `address`.
    pub fn name_by_offset(&self, address: Address) -> BridgeResult<Lookup<SymbolRecord>>
    {
        let retry = self.core.retry_policy();
        self.core.with_callback_proxies("CallbackContext::name_by_offset", |proxies| {
            pipelines::symbols::resolve(proxies, address, retry)
        })
    }

    /// Current execution status.
    pub fn execution_status(&self) -> BridgeResult<ExecutionStatus>
    {
        self.core.with_callback_proxies("CallbackContext::execution_status", |proxies| {
            proxies.control.execution_status()
        })
    }
}

impl fmt::Debug for CallbackContext<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("CallbackContext").finish_non_exhaustive()
    }
}
