//! Thread context capture and thread enumeration.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::retry::RetryPolicy;
use super::symbols::{self, SymbolRecord};
use super::Lookup;
use crate::abi::{Amd64Context, NativeStackFrame};
use crate::error::{BridgeError, BridgeResult};
use crate::proxy::ProxySet;
use crate::session::guards::CurrentThreadGuard;
use crate::types::{Address, Architecture, Registers, ThreadId, ThreadInfo};

/// One frame of a captured stack, innermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame
{
    /// Position in the stack (0 = innermost)
    pub number: u32,
    pub instruction: Address,
    pub return_address: Address,
    pub frame: Address,
    pub stack: Address,
    /// Frame synthesized by the engine (inline or unwind-less)
    pub is_virtual: bool,
    /// Symbol for `instruction`, if one could be resolved
    pub symbol: Option<SymbolRecord>,
    pub raw: NativeStackFrame,
}

impl StackFrame
{
    fn new(raw: NativeStackFrame, symbol: Option<SymbolRecord>) -> Self
    {
        Self {
            number: raw.frame_number,
            instruction: Address::new(raw.instruction_offset),
            return_address: Address::new(raw.return_offset),
            frame: Address::new(raw.frame_offset),
            stack: Address::new(raw.stack_offset),
            is_virtual: raw.is_virtual(),
            symbol,
            raw,
        }
    }
}

/// Register and stack snapshot of one suspended thread.
///
/// Immutable once captured. The snapshot remembers the execution generation
/// it was taken in; [`ThreadContext::is_current`] turns false as soon as the
/// target runs again.
#[derive(Debug, Clone)]
pub struct ThreadContext
{
    thread: ThreadInfo,
    registers: Registers,
    frames: Vec<StackFrame>,
    raw: Amd64Context,
    epoch: u64,
    generation: Arc<AtomicU64>,
}

impl ThreadContext
{
    #[must_use]
    pub fn thread(&self) -> ThreadInfo
    {
        self.thread
    }

    #[must_use]
    pub fn registers(&self) -> &Registers
    {
        &self.registers
    }

    #[must_use]
    pub fn frames(&self) -> &[StackFrame]
    {
        &self.frames
    }

    /// Raw `CONTEXT` record as the engine returned it.
    #[must_use]
    pub fn raw(&self) -> &Amd64Context
    {
        &self.raw
    }

    /// Execution generation the snapshot belongs to.
    #[must_use]
    pub fn epoch(&self) -> u64
    {
        self.epoch
    }

    /// Whether the target has not run since the capture.
    #[must_use]
    pub fn is_current(&self) -> bool
    {
        self.generation.load(Ordering::Acquire) == self.epoch
    }
}

/// Capture the context of `thread` (or the current thread).
pub(crate) fn capture(
    proxies: &ProxySet,
    thread: Option<ThreadId>,
    max_frames: u32,
    retry: RetryPolicy,
    generation: &Arc<AtomicU64>,
) -> BridgeResult<ThreadContext>
{
    if !proxies.control.execution_status()?.is_suspended() {
        return Err(BridgeError::TargetNotSuspended);
    }
    let architecture = proxies.control.actual_processor_type()?;
    if architecture != Architecture::X86_64 {
        return Err(BridgeError::InvalidArgument(format!(
            "thread context capture supports x86_64 targets, not {architecture}"
        )));
    }

    let _selection = match thread {
        Some(id) => Some(CurrentThreadGuard::select(&proxies.system_objects, id)?),
        None => None,
    };
    let epoch = generation.load(Ordering::Acquire);

    let info = ThreadInfo {
        id: proxies.system_objects.current_thread()?,
        system_id: proxies.system_objects.current_thread_system_id()?,
    };
    let raw = proxies.advanced.thread_context()?;
    let registers = Registers::from_amd64(&raw);

    let frames = proxies
        .control
        .stack_trace(max_frames)?
        .into_iter()
        .map(|frame| StackFrame::new(frame, symbolize(proxies, frame.instruction_offset, retry)))
        .collect::<Vec<_>>();
    debug!("Captured {} frames for thread {}", frames.len(), info.id);

    Ok(ThreadContext {
        thread: info,
        registers,
        frames,
        raw,
        epoch,
        generation: Arc::clone(generation),
    })
}

fn symbolize(proxies: &ProxySet, instruction: u64, retry: RetryPolicy) -> Option<SymbolRecord>
{
    match symbols::resolve(proxies, Address::new(instruction), retry) {
        Ok(Lookup::Found(record)) => Some(record),
        Ok(Lookup::NotFound) => None,
        Err(err) => {
            debug!("Frame at 0x{instruction:016x} left unsymbolized: {err}");
            None
        }
    }
}

/// Every thread of the current process, in engine order.
pub(crate) fn threads(proxies: &ProxySet) -> BridgeResult<Vec<ThreadInfo>>
{
    let count = proxies.system_objects.number_threads()?;
    proxies.system_objects.threads(0, count)
}
