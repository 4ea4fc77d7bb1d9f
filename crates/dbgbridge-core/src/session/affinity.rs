//! Thread affinity.
//!
//! The engine requires every call for a connection to come from the thread
//! that created it. [`ThreadBound`] records that thread and refuses access
//! from any other one.

use std::mem::ManuallyDrop;
use std::thread::{self, ThreadId};

use tracing::error;

use crate::error::{BridgeError, BridgeResult};

/// A value usable only on the thread that created it.
///
/// The wrapper itself may be moved or shared across threads; the value
/// inside is handed out only on the owning thread. Dropping it on another
/// thread leaks the value instead of running its destructor there.
pub(crate) struct ThreadBound<T>
{
    value: ManuallyDrop<T>,
    owner: ThreadId,
}

impl<T> ThreadBound<T>
{
    pub(crate) fn new(value: T) -> Self
    {
        Self {
            value: ManuallyDrop::new(value),
            owner: thread::current().id(),
        }
    }

    pub(crate) fn is_owner(&self) -> bool
    {
        thread::current().id() == self.owner
    }

    pub(crate) fn owner(&self) -> ThreadId
    {
        self.owner
    }

    /// Borrow the value, failing with `ThreadAffinityViolation` off the owning thread.
    pub(crate) fn get(&self, operation: &'static str) -> BridgeResult<&T>
    {
        if self.is_owner() {
            Ok(&self.value)
        } else {
            Err(BridgeError::ThreadAffinityViolation { operation })
        }
    }
}

impl<T> Drop for ThreadBound<T>
{
    fn drop(&mut self)
    {
        if self.is_owner() {
            // SAFETY: dropped exactly once, here, on the owning thread.
            unsafe { ManuallyDrop::drop(&mut self.value) };
        } else {
            error!(
                "Session value dropped on {:?} but bound to {:?}; leaking native objects",
                thread::current().id(),
                self.owner
            );
        }
    }
}

// SAFETY: the value is only reachable through `get`, which checks the current
// thread, and is only dropped on the owning thread.
unsafe impl<T> Send for ThreadBound<T> {}
// SAFETY: as above; shared access from a foreign thread never reaches the value.
unsafe impl<T> Sync for ThreadBound<T> {}
