//! Fan-out of engine callbacks to the session's sinks.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, warn};

use super::{CallbackContext, CallbackEvent, EventDisposition};
use crate::platform::hresult::{E_FAIL, HRESULT, S_OK};
use crate::session::SessionCore;

/// Tracks whether the engine is currently inside one of our callbacks.
#[derive(Debug, Default)]
pub(crate) struct DispatchState
{
    depth: Cell<u32>,
}

impl DispatchState
{
    pub(crate) fn enter(&self) -> DispatchGuard<'_>
    {
        self.depth.set(self.depth.get() + 1);
        DispatchGuard { state: self }
    }

    pub(crate) fn is_active(&self) -> bool
    {
        self.depth.get() > 0
    }
}

pub(crate) struct DispatchGuard<'a>
{
    state: &'a DispatchState,
}

impl Drop for DispatchGuard<'_>
{
    fn drop(&mut self)
    {
        self.state.depth.set(self.state.depth.get().saturating_sub(1));
    }
}

/// Deliver an output chunk to every sink that receives output.
pub(crate) fn deliver_output(core: &SessionCore, event: &CallbackEvent<'_>) -> HRESULT
{
    let _dispatching = core.dispatch().enter();
    let Ok(mut sinks) = core.sinks().try_borrow_mut() else {
        warn!("Dropped nested output callback: sinks are already being dispatched");
        return S_OK;
    };
    let context = CallbackContext::new(core);
    let mut status = S_OK;
    for (index, sink) in sinks.iter_mut().enumerate() {
        if !sink.receives_output() {
            continue;
        }
        if panic::catch_unwind(AssertUnwindSafe(|| sink.on_event(event, &context))).is_err() {
            error!("Output sink #{index} panicked; reporting E_FAIL to the engine");
            status = E_FAIL;
        }
    }
    status
}

/// Deliver a debug event and combine the sinks' dispositions.
pub(crate) fn deliver_event(core: &SessionCore, event: &CallbackEvent<'_>) -> u32
{
    let _dispatching = core.dispatch().enter();
    let Ok(mut sinks) = core.sinks().try_borrow_mut() else {
        warn!("Dropped nested event callback ({}): sinks are already being dispatched", event.describe());
        return EventDisposition::NoChange.raw();
    };
    let context = CallbackContext::new(core);
    let wanted = event.interest();
    let mut combined = EventDisposition::NoChange;
    for (index, sink) in sinks.iter_mut().enumerate() {
        if !sink.interest().contains(wanted) {
            continue;
        }
        match panic::catch_unwind(AssertUnwindSafe(|| sink.on_event(event, &context))) {
            Ok(disposition) => combined = combined.max(disposition),
            Err(_) => error!("Event sink #{index} panicked on {}; treating as no change", event.describe()),
        }
    }
    combined.raw()
}
