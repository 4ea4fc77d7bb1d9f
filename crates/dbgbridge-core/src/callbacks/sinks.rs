//! Ready-made sinks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::{CallbackContext, CallbackEvent, CallbackSink, EventDisposition};
use crate::types::{EventInterest, OutputMask};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T>
{
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Collects output chunks in arrival order.
///
/// Clones share the same buffer, so the caller keeps one clone and moves the
/// other into the session.
///
/// ```rust
/// use dbgbridge_core::callbacks::OutputBuffer;
///
/// let buffer = OutputBuffer::new();
/// let reader = buffer.clone();
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer
{
    chunks: Arc<Mutex<Vec<String>>>,
}

impl OutputBuffer
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Copy of every chunk received so far.
    #[must_use]
    pub fn chunks(&self) -> Vec<String>
    {
        lock(&self.chunks).clone()
    }

    /// All chunks concatenated.
    #[must_use]
    pub fn text(&self) -> String
    {
        lock(&self.chunks).concat()
    }

    /// Remove and return every chunk received so far.
    pub fn take(&self) -> Vec<String>
    {
        std::mem::take(&mut *lock(&self.chunks))
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        lock(&self.chunks).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        lock(&self.chunks).is_empty()
    }
}

impl CallbackSink for OutputBuffer
{
    fn receives_output(&self) -> bool
    {
        true
    }

    fn on_event(&mut self, event: &CallbackEvent<'_>, _context: &CallbackContext<'_>) -> EventDisposition
    {
        if let CallbackEvent::Output { text, .. } = event {
            lock(&self.chunks).push((*text).to_string());
        }
        EventDisposition::NoChange
    }
}

/// Forwards engine output to `tracing` under the `dbgbridge::engine` target.
///
/// Error output goes to `warn`, debuggee output to `info`, everything else to `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOutput;

impl CallbackSink for TracingOutput
{
    fn receives_output(&self) -> bool
    {
        true
    }

    fn on_event(&mut self, event: &CallbackEvent<'_>, _context: &CallbackContext<'_>) -> EventDisposition
    {
        if let CallbackEvent::Output { mask, text } = event {
            let text = text.trim_end_matches(['\r', '\n']);
            if text.is_empty() {
                return EventDisposition::NoChange;
            }
            if mask.intersects(OutputMask::ERROR | OutputMask::WARNING) {
                warn!(target: "dbgbridge::engine", "{text}");
            } else if mask.intersects(OutputMask::DEBUGGEE) {
                info!(target: "dbgbridge::engine", "{text}");
            } else {
                debug!(target: "dbgbridge::engine", "{text}");
            }
        }
        EventDisposition::NoChange
    }
}

/// Records a summary line per debug event and answers with a fixed disposition.
#[derive(Debug, Clone)]
pub struct EventRecorder
{
    interest: EventInterest,
    disposition: EventDisposition,
    events: Arc<Mutex<Vec<String>>>,
}

impl EventRecorder
{
    /// Record the events in `interest`, answering [`EventDisposition::NoChange`].
    #[must_use]
    pub fn new(interest: EventInterest) -> Self
    {
        Self {
            interest,
            disposition: EventDisposition::NoChange,
            events: Arc::default(),
        }
    }

    /// Answer every recorded event with `disposition`.
    #[must_use]
    pub fn answering(mut self, disposition: EventDisposition) -> Self
    {
        self.disposition = disposition;
        self
    }

    /// Summaries recorded so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<String>
    {
        lock(&self.events).clone()
    }
}

impl CallbackSink for EventRecorder
{
    fn interest(&self) -> EventInterest
    {
        self.interest
    }

    fn on_event(&mut self, event: &CallbackEvent<'_>, _context: &CallbackContext<'_>) -> EventDisposition
    {
        lock(&self.events).push(event.describe());
        self.disposition
    }
}
