use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::state::{SessionShared, SessionState};
use crate::error::BridgeResult;

/// Breaks into a running target from any thread.
///
/// This is the only way to reach a session from outside its thread without
/// going through the worker. It issues `SetInterrupt(DEBUG_INTERRUPT_ACTIVE)`,
/// which makes a pending wait return with the target stopped.
///
/// Fails with `SessionClosed` once the session has been torn down.
#[derive(Clone)]
pub struct InterruptHandle
{
    shared: Arc<SessionShared>,
}

impl InterruptHandle
{
    pub(crate) fn new(shared: Arc<SessionShared>) -> Self
    {
        Self { shared }
    }

    /// Request a break-in.
    pub fn interrupt(&self) -> BridgeResult<()>
    {
        debug!("Interrupt requested while {}", self.shared.state());
        self.shared.interrupt()
    }

    #[must_use]
    pub fn state(&self) -> SessionState
    {
        self.shared.state()
    }
}

impl fmt::Debug for InterruptHandle
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("InterruptHandle").field("state", &self.state()).finish()
    }
}
