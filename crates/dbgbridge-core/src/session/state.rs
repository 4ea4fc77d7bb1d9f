//! Session state shared with other threads.
//!
//! Everything here is safe to touch from any thread: the lifecycle state,
//! the execution generation, and the interrupt target. The engine connection
//! itself never leaves the session thread.

use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{BridgeError, BridgeResult};
use crate::platform::constants::DEBUG_INTERRUPT_ACTIVE;
use crate::platform::hresult::check;
use crate::proxy::control::set_interrupt_raw;

/// Lifecycle of a session.
///
/// `Created → Connected → Running → Connected → … → Closed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionState
{
    /// Engine not connected yet
    Created = 0,
    /// Connected and idle; queries are accepted
    Connected = 1,
    /// A drive operation is in flight
    Running = 2,
    /// Torn down; every call fails with `SessionClosed`
    Closed = 3,
}

impl SessionState
{
    const fn from_raw(raw: u8) -> Self
    {
        match raw {
            0 => SessionState::Created,
            1 => SessionState::Connected,
            2 => SessionState::Running,
            _ => SessionState::Closed,
        }
    }
}

impl fmt::Display for SessionState
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            SessionState::Created => "created",
            SessionState::Connected => "connected",
            SessionState::Running => "running",
            SessionState::Closed => "closed",
        };
        write!(f, "{label}")
    }
}

/// `IDebugControl` pointer used only for `SetInterrupt`.
struct InterruptTarget(NonNull<c_void>);

// SAFETY: `SetInterrupt` is the one engine method documented as callable from
// any thread. The pointer is cleared under the mutex before the interface is
// released, so it is never used after release.
unsafe impl Send for InterruptTarget {}

pub(crate) struct SessionShared
{
    state: AtomicU8,
    generation: Arc<AtomicU64>,
    interrupt: Mutex<Option<InterruptTarget>>,
}

impl SessionShared
{
    pub(crate) fn new() -> Self
    {
        Self {
            state: AtomicU8::new(SessionState::Created as u8),
            generation: Arc::new(AtomicU64::new(0)),
            interrupt: Mutex::new(None),
        }
    }

    pub(crate) fn state(&self) -> SessionState
    {
        SessionState::from_raw(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn mark_connected(&self)
    {
        self.state.store(SessionState::Connected as u8, Ordering::Release);
    }

    /// Move to `Closed` and forget the interrupt target. Returns the previous state.
    pub(crate) fn mark_closed(&self) -> SessionState
    {
        let mut slot = self.interrupt_slot();
        *slot = None;
        SessionState::from_raw(self.state.swap(SessionState::Closed as u8, Ordering::AcqRel))
    }

    /// Fail unless the session is connected or running.
    pub(crate) fn ensure_open(&self) -> BridgeResult<()>
    {
        match self.state() {
            SessionState::Connected | SessionState::Running => Ok(()),
            SessionState::Created | SessionState::Closed => Err(BridgeError::SessionClosed),
        }
    }

    pub(crate) fn generation(&self) -> &Arc<AtomicU64>
    {
        &self.generation
    }

    /// Invalidate every context captured so far.
    pub(crate) fn advance_generation(&self) -> u64
    {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn set_interrupt_target(&self, control: NonNull<c_void>)
    {
        *self.interrupt_slot() = Some(InterruptTarget(control));
    }

    /// `SetInterrupt(DEBUG_INTERRUPT_ACTIVE)` from any thread.
    pub(crate) fn interrupt(&self) -> BridgeResult<()>
    {
        let slot = self.interrupt_slot();
        let Some(target) = slot.as_ref() else {
            return Err(BridgeError::SessionClosed);
        };
        if self.state() == SessionState::Closed {
            return Err(BridgeError::SessionClosed);
        }
        // SAFETY: the target stays valid while it is in the slot and the slot
        // lock is held for the duration of the call.
        let hr = unsafe { set_interrupt_raw(target.0, DEBUG_INTERRUPT_ACTIVE) };
        check(hr, "IDebugControl::SetInterrupt")
    }

    fn interrupt_slot(&self) -> MutexGuard<'_, Option<InterruptTarget>>
    {
        self.interrupt.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionShared
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("SessionShared")
            .field("state", &self.state())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Exclusive right to drive the target.
///
/// Acquired by moving `Connected → Running`; dropping it moves back to
/// `Connected` unless the session was closed meanwhile.
#[derive(Debug)]
pub(crate) struct DriveClaim
{
    shared: Arc<SessionShared>,
}

impl DriveClaim
{
    pub(crate) fn acquire(shared: &Arc<SessionShared>) -> BridgeResult<Self>
    {
        match shared.state.compare_exchange(
            SessionState::Connected as u8,
            SessionState::Running as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                shared.advance_generation();
                Ok(Self {
                    shared: Arc::clone(shared),
                })
            }
            Err(current) => match SessionState::from_raw(current) {
                SessionState::Running => Err(BridgeError::SessionBusy),
                _ => Err(BridgeError::SessionClosed),
            },
        }
    }
}

impl Drop for DriveClaim
{
    fn drop(&mut self)
    {
        let _ = self.shared.state.compare_exchange(
            SessionState::Running as u8,
            SessionState::Connected as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}
