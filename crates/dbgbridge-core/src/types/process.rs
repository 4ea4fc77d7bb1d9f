//! Process, thread, and execution-state types.

use std::fmt;

use crate::platform::constants::{
    DEBUG_STATUS_BREAK, DEBUG_STATUS_GO, DEBUG_STATUS_GO_HANDLED, DEBUG_STATUS_GO_NOT_HANDLED,
    DEBUG_STATUS_IGNORE_EVENT, DEBUG_STATUS_NO_CHANGE, DEBUG_STATUS_NO_DEBUGGEE, DEBUG_STATUS_RESTART_REQUESTED,
    DEBUG_STATUS_STEP_BRANCH, DEBUG_STATUS_STEP_INTO, DEBUG_STATUS_STEP_OVER, IMAGE_FILE_MACHINE_AMD64,
    IMAGE_FILE_MACHINE_ARM64, IMAGE_FILE_MACHINE_ARMNT, IMAGE_FILE_MACHINE_I386,
};

/// Operating-system process identifier (PID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub u32);

impl From<u32> for ProcessId
{
    fn from(pid: u32) -> Self
    {
        ProcessId(pid)
    }
}

impl From<ProcessId> for u32
{
    fn from(pid: ProcessId) -> Self
    {
        pid.0
    }
}

impl fmt::Display for ProcessId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// Engine-assigned thread identifier
///
/// The engine numbers threads itself (0, 1, 2, ...) independently of the
/// operating system's thread ids. Every thread-selection call takes this id;
/// the OS id is carried separately in [`ThreadInfo::system_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub u32);

impl ThreadId
{
    /// Raw engine id
    pub const fn raw(self) -> u32
    {
        self.0
    }
}

impl From<u32> for ThreadId
{
    fn from(value: u32) -> Self
    {
        Self(value)
    }
}

impl fmt::Display for ThreadId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "~{}", self.0)
    }
}

/// One thread of the current target process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadInfo
{
    /// Engine id, used for selection
    pub id: ThreadId,
    /// Operating-system thread id
    pub system_id: u32,
}

/// Engine execution status (`DEBUG_STATUS_*`)
///
/// The engine reports this from `GetExecutionStatus`; drive operations set it
/// through `SetExecutionStatus` before waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionStatus
{
    /// No change requested
    NoChange,
    /// Target is running
    Go,
    /// Running, last exception marked handled
    GoHandled,
    /// Running, last exception marked not handled
    GoNotHandled,
    /// Single step over calls
    StepOver,
    /// Single step into calls
    StepInto,
    /// Target is stopped and queryable
    Break,
    /// No target attached
    NoDebuggee,
    /// Step to next branch
    StepBranch,
    /// Ignore the current event
    IgnoreEvent,
    /// Restart requested
    RestartRequested,
    /// Status not known to this crate
    Unknown(u32),
}

impl ExecutionStatus
{
    /// Decode a raw `DEBUG_STATUS_*` value
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self
    {
        match raw {
            DEBUG_STATUS_NO_CHANGE => ExecutionStatus::NoChange,
            DEBUG_STATUS_GO => ExecutionStatus::Go,
            DEBUG_STATUS_GO_HANDLED => ExecutionStatus::GoHandled,
            DEBUG_STATUS_GO_NOT_HANDLED => ExecutionStatus::GoNotHandled,
            DEBUG_STATUS_STEP_OVER => ExecutionStatus::StepOver,
            DEBUG_STATUS_STEP_INTO => ExecutionStatus::StepInto,
            DEBUG_STATUS_BREAK => ExecutionStatus::Break,
            DEBUG_STATUS_NO_DEBUGGEE => ExecutionStatus::NoDebuggee,
            DEBUG_STATUS_STEP_BRANCH => ExecutionStatus::StepBranch,
            DEBUG_STATUS_IGNORE_EVENT => ExecutionStatus::IgnoreEvent,
            DEBUG_STATUS_RESTART_REQUESTED => ExecutionStatus::RestartRequested,
            other => ExecutionStatus::Unknown(other),
        }
    }

    /// Native `DEBUG_STATUS_*` value
    #[must_use]
    pub const fn raw(self) -> u32
    {
        match self {
            ExecutionStatus::NoChange => DEBUG_STATUS_NO_CHANGE,
            ExecutionStatus::Go => DEBUG_STATUS_GO,
            ExecutionStatus::GoHandled => DEBUG_STATUS_GO_HANDLED,
            ExecutionStatus::GoNotHandled => DEBUG_STATUS_GO_NOT_HANDLED,
            ExecutionStatus::StepOver => DEBUG_STATUS_STEP_OVER,
            ExecutionStatus::StepInto => DEBUG_STATUS_STEP_INTO,
            ExecutionStatus::Break => DEBUG_STATUS_BREAK,
            ExecutionStatus::NoDebuggee => DEBUG_STATUS_NO_DEBUGGEE,
            ExecutionStatus::StepBranch => DEBUG_STATUS_STEP_BRANCH,
            ExecutionStatus::IgnoreEvent => DEBUG_STATUS_IGNORE_EVENT,
            ExecutionStatus::RestartRequested => DEBUG_STATUS_RESTART_REQUESTED,
            ExecutionStatus::Unknown(raw) => raw,
        }
    }

    /// Whether the target is stopped and its state can be queried
    #[must_use]
    pub const fn is_suspended(self) -> bool
    {
        matches!(self, ExecutionStatus::Break)
    }
}

/// Target processor architecture, from `GetActualProcessorType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture
{
    /// 32-bit x86
    X86,
    /// 64-bit x86 (AMD64)
    X86_64,
    /// 32-bit ARM (Thumb-2)
    Arm,
    /// 64-bit ARM
    Arm64,
    /// Any other `IMAGE_FILE_MACHINE_*` value
    Unknown(u32),
}

impl Architecture
{
    /// Decode an `IMAGE_FILE_MACHINE_*` value
    #[must_use]
    pub const fn from_machine(machine: u32) -> Self
    {
        match machine {
            IMAGE_FILE_MACHINE_I386 => Architecture::X86,
            IMAGE_FILE_MACHINE_AMD64 => Architecture::X86_64,
            IMAGE_FILE_MACHINE_ARMNT => Architecture::Arm,
            IMAGE_FILE_MACHINE_ARM64 => Architecture::Arm64,
            other => Architecture::Unknown(other),
        }
    }

    /// Pointer width in bytes, if known
    #[must_use]
    pub const fn pointer_size(self) -> Option<usize>
    {
        match self {
            Architecture::X86 | Architecture::Arm => Some(4),
            Architecture::X86_64 | Architecture::Arm64 => Some(8),
            Architecture::Unknown(_) => None,
        }
    }
}

impl fmt::Display for Architecture
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Architecture::X86 => write!(f, "x86"),
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::Arm => write!(f, "arm"),
            Architecture::Arm64 => write!(f, "arm64"),
            Architecture::Unknown(machine) => write!(f, "machine(0x{machine:04x})"),
        }
    }
}
