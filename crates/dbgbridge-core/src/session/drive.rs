//! Drive operations: resume or step the target, then wait for it to stop.

use std::time::Duration;

use tracing::debug;

use crate::error::BridgeResult;
use crate::platform::constants::INFINITE;
use crate::proxy::{LastEvent, ProxySet};
use crate::types::ExecutionStatus;

/// What to do before waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveAction
{
    /// Resume execution
    Go,
    /// Step one instruction, entering calls
    StepInto,
    /// Step one instruction, stepping over calls
    StepOver,
    /// Leave the execution status alone and only wait
    Wait,
}

impl DriveAction
{
    const fn status(self) -> Option<ExecutionStatus>
    {
        match self {
            DriveAction::Go => Some(ExecutionStatus::Go),
            DriveAction::StepInto => Some(ExecutionStatus::StepInto),
            DriveAction::StepOver => Some(ExecutionStatus::StepOver),
            DriveAction::Wait => None,
        }
    }
}

/// A drive action and how long to wait for the target to stop.
///
/// No timeout means wait until an event arrives or the session is
/// interrupted through an [`InterruptHandle`](super::InterruptHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveRequest
{
    pub action: DriveAction,
    pub timeout: Option<Duration>,
}

impl DriveRequest
{
    #[must_use]
    pub const fn new(action: DriveAction) -> Self
    {
        Self { action, timeout: None }
    }

    #[must_use]
    pub const fn go() -> Self
    {
        Self::new(DriveAction::Go)
    }

    #[must_use]
    pub const fn step_into() -> Self
    {
        Self::new(DriveAction::StepInto)
    }

    #[must_use]
    pub const fn step_over() -> Self
    {
        Self::new(DriveAction::StepOver)
    }

    #[must_use]
    pub const fn wait() -> Self
    {
        Self::new(DriveAction::Wait)
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self
    {
        self.timeout = Some(timeout);
        self
    }

    fn timeout_ms(&self) -> u32
    {
        match self.timeout {
            None => INFINITE,
            Some(timeout) => u32::try_from(timeout.as_millis()).map_or(INFINITE - 1, |ms| ms.min(INFINITE - 1)),
        }
    }
}

/// How a drive ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveOutcome
{
    /// Execution status after the wait returned
    pub status: ExecutionStatus,
    /// Event that stopped the target, if one arrived
    pub event: Option<LastEvent>,
    /// The wait timed out before any event
    pub timed_out: bool,
}

/// Run `request` against the engine. The caller holds the drive claim.
pub(crate) fn run(proxies: &ProxySet, request: DriveRequest) -> BridgeResult<DriveOutcome>
{
    if let Some(status) = request.action.status() {
        proxies.control.set_execution_status(status)?;
    }
    let timeout_ms = request.timeout_ms();
    debug!("Driving target: {:?}, timeout {timeout_ms} ms", request.action);

    let arrived = proxies.control.wait_for_event(timeout_ms)?;
    let status = proxies.control.execution_status()?;
    let event = if arrived { Some(proxies.control.last_event()?) } else { None };
    Ok(DriveOutcome {
        status,
        event,
        timed_out: !arrived,
    })
}
