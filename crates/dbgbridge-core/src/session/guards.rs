//! # RAII Guards for Engine State
//!
//! Guards that change a piece of engine-wide state for the duration of one
//! query and put it back when dropped, even if the query fails.
//!
//! ## Guards
//!
//! - **CurrentThreadGuard**: selects a thread as the engine's current thread
//!   and restores the previous selection on drop

use tracing::warn;

use crate::error::BridgeResult;
use crate::proxy::SystemObjectsProxy;
use crate::types::ThreadId;

/// RAII guard that makes a thread current and restores the previous one when dropped.
///
/// Register and stack queries operate on the engine's current thread. Capturing
/// another thread's context switches the selection, and this guard makes sure
/// the caller's selection survives the capture.
pub(crate) struct CurrentThreadGuard<'a>
{
    system_objects: &'a SystemObjectsProxy,
    previous: ThreadId,
    active: bool,
}

impl<'a> CurrentThreadGuard<'a>
{
    /// Make `thread` current.
    ///
    /// ## Errors
    ///
    /// - `Engine`: the previous selection could not be read or `thread` is not a valid engine thread id
    pub(crate) fn select(system_objects: &'a SystemObjectsProxy, thread: ThreadId) -> BridgeResult<Self>
    {
        let previous = system_objects.current_thread()?;
        if previous == thread {
            return Ok(Self {
                system_objects,
                previous,
                active: false,
            });
        }
        system_objects.set_current_thread(thread)?;
        Ok(Self {
            system_objects,
            previous,
            active: true,
        })
    }
}

impl Drop for CurrentThreadGuard<'_>
{
    fn drop(&mut self)
    {
        if self.active {
            if let Err(err) = self.system_objects.set_current_thread(self.previous) {
                warn!("Failed to restore current thread {}: {err}", self.previous);
            }
        }
    }
}
