//! Tests for callback dispatch to sinks

mod common;

use std::sync::{Arc, Mutex};

use common::{loaded_dump, open_with, Scripted, APP_BASE};
use dbgbridge_core::platform::constants::{DEBUG_STATUS_BREAK, DEBUG_STATUS_GO, DEBUG_STATUS_NO_CHANGE};
use dbgbridge_core::platform::hresult::{E_FAIL, S_OK};
use dbgbridge_core::types::ExecutionStatus;
use dbgbridge_core::{
    Address, BridgeError, CallbackContext, CallbackEvent, CallbackSink, DriveRequest, EventDisposition, EventInterest,
    EventRecorder, Lookup, OutputBuffer, Session, TracingOutput,
};

const HEAP_BASE: u64 = 0x1000_0000;

/// Sink that panics on every callback it receives.
struct PanickingSink
{
    output: bool,
}

impl CallbackSink for PanickingSink
{
    fn interest(&self) -> EventInterest
    {
        if self.output {
            EventInterest::empty()
        } else {
            EventInterest::all()
        }
    }

    fn receives_output(&self) -> bool
    {
        self.output
    }

    fn on_event(&mut self, event: &CallbackEvent<'_>, _context: &CallbackContext<'_>) -> EventDisposition
    {
        panic!("sink failure on {}", event.describe());
    }
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn test_output_chunks_in_order()
{
    let engine = loaded_dump();
    let buffer = OutputBuffer::new();
    let session = open_with(engine, |config| config.sink(buffer.clone()));
    engine.script(Scripted::Output("Loading symbols".to_string()));
    engine.script(Scripted::Output(" for app\n".to_string()));
    engine.script(Scripted::Output("done\n".to_string()));

    session.drive(DriveRequest::wait()).unwrap();

    assert_eq!(buffer.len(), 3);
    assert_eq!(buffer.chunks(), ["Loading symbols", " for app\n", "done\n"]);
    assert_eq!(buffer.text(), "Loading symbols for app\ndone\n");
    assert_eq!(engine.state().output_results, vec![S_OK, S_OK, S_OK]);

    let taken = buffer.take();
    assert_eq!(taken.len(), 3);
    assert!(buffer.is_empty());
}

#[test]
fn test_tracing_output_sink()
{
    let engine = loaded_dump();
    let session = open_with(engine, |config| config.sink(TracingOutput));
    engine.script(Scripted::Output("ModLoad: 00007ff6`00000000 app.exe\n".to_string()));

    session.drive(DriveRequest::wait()).unwrap();

    assert_eq!(engine.state().output_results, vec![S_OK]);
}

#[test]
fn test_event_only_sink_ignores_output()
{
    let engine = loaded_dump();
    let recorder = EventRecorder::new(EventInterest::BREAKPOINT);
    let session = open_with(engine, |config| config.sink(recorder.clone()));
    engine.script(Scripted::Output("hello\n".to_string()));

    session.drive(DriveRequest::wait()).unwrap();

    assert!(recorder.events().is_empty());
    assert_eq!(engine.state().output_results, vec![S_OK]);
}

#[test]
fn test_panicking_output_sink_reports_failure()
{
    let engine = loaded_dump();
    let buffer = OutputBuffer::new();
    let session = open_with(engine, |config| {
        config.sink(PanickingSink { output: true }).sink(buffer.clone())
    });
    engine.script(Scripted::Output("still delivered\n".to_string()));

    session.drive(DriveRequest::wait()).unwrap();

    assert_eq!(engine.state().output_results, vec![E_FAIL]);
    assert_eq!(buffer.chunks(), ["still delivered\n"]);
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_interest_registered_with_engine()
{
    let engine = loaded_dump();
    let _session = open_with(engine, |config| {
        config
            .sink(EventRecorder::new(EventInterest::BREAKPOINT))
            .sink(EventRecorder::new(EventInterest::EXCEPTION | EventInterest::LOAD_MODULE))
            .sink(OutputBuffer::new())
    });

    let expected = EventInterest::BREAKPOINT | EventInterest::EXCEPTION | EventInterest::LOAD_MODULE;
    assert_eq!(engine.state().interest, expected.bits());
}

#[test]
fn test_event_descriptions()
{
    let engine = loaded_dump();
    let recorder = EventRecorder::new(
        EventInterest::BREAKPOINT
            | EventInterest::EXCEPTION
            | EventInterest::LOAD_MODULE
            | EventInterest::UNLOAD_MODULE
            | EventInterest::EXIT_PROCESS,
    );
    let session = open_with(engine, |config| config.sink(recorder.clone()));
    engine.script(Scripted::LoadModule {
        name: "plugin".to_string(),
        base: 0x7ff7_0000_0000,
        size: 0x1_0000,
    });
    engine.script(Scripted::Breakpoint);
    engine.script(Scripted::Exception {
        code: 0xC000_0005,
        address: APP_BASE + 0x1010,
        first_chance: true,
    });
    engine.script(Scripted::Exception {
        code: 0x8000_0003,
        address: APP_BASE + 0x2000,
        first_chance: false,
    });
    engine.script(Scripted::UnloadModule {
        name: "plugin".to_string(),
        base: 0x7ff7_0000_0000,
    });
    engine.script(Scripted::ExitProcess(3));

    let outcome = session.drive(DriveRequest::go()).unwrap();

    assert_eq!(
        recorder.events(),
        [
            "load module plugin at 0x00007ff700000000",
            "breakpoint",
            "exception 0xc0000005 at 0x00007ff600001010 (first chance)",
            "exception 0x80000003 at 0x00007ff600002000 (second chance)",
            "unload module plugin at 0x00007ff700000000",
            "exit process (3)",
        ]
    );
    assert_eq!(outcome.event.unwrap().description, "Exit process 3");
}

#[test]
fn test_sinks_only_see_their_interest()
{
    let engine = loaded_dump();
    let breakpoints = EventRecorder::new(EventInterest::BREAKPOINT);
    let exceptions = EventRecorder::new(EventInterest::EXCEPTION);
    let session = open_with(engine, |config| config.sink(breakpoints.clone()).sink(exceptions.clone()));
    engine.script(Scripted::Exception {
        code: 0xC000_0094,
        address: APP_BASE + 0x1000,
        first_chance: true,
    });
    engine.script(Scripted::Breakpoint);
    engine.script(Scripted::ExitProcess(0));

    session.drive(DriveRequest::go()).unwrap();

    assert_eq!(breakpoints.events(), ["breakpoint"]);
    assert_eq!(exceptions.events().len(), 1);
    assert!(exceptions.events()[0].starts_with("exception 0xc0000094"));
    // Exit-process was outside every sink's interest and never delivered
    assert_eq!(engine.state().dispositions.len(), 2);
}

#[test]
fn test_highest_disposition_wins()
{
    let engine = loaded_dump();
    let session = open_with(engine, |config| {
        config
            .sink(EventRecorder::new(EventInterest::BREAKPOINT).answering(EventDisposition::Go))
            .sink(EventRecorder::new(EventInterest::BREAKPOINT).answering(EventDisposition::Break))
            .sink(EventRecorder::new(EventInterest::BREAKPOINT).answering(EventDisposition::StepOver))
    });
    engine.script(Scripted::Breakpoint);

    session.drive(DriveRequest::go()).unwrap();

    assert_eq!(engine.state().dispositions, vec![DEBUG_STATUS_BREAK as i32]);
}

#[test]
fn test_no_opinion_by_default()
{
    let engine = loaded_dump();
    let recorder = EventRecorder::new(EventInterest::BREAKPOINT);
    let session = open_with(engine, |config| config.sink(recorder.clone()));
    engine.script(Scripted::Breakpoint);

    session.drive(DriveRequest::go()).unwrap();

    assert_eq!(engine.state().dispositions, vec![DEBUG_STATUS_NO_CHANGE as i32]);
}

#[test]
fn test_panicking_event_sink_counts_as_no_change()
{
    let engine = loaded_dump();
    let recorder = EventRecorder::new(EventInterest::BREAKPOINT).answering(EventDisposition::Go);
    let session = open_with(engine, |config| {
        config.sink(PanickingSink { output: false }).sink(recorder.clone())
    });
    engine.script(Scripted::Breakpoint);
    engine.script(Scripted::ExitProcess(1));

    session.drive(DriveRequest::go()).unwrap();

    assert_eq!(recorder.events(), ["breakpoint"]);
    assert_eq!(
        engine.state().dispositions,
        vec![DEBUG_STATUS_GO as i32, DEBUG_STATUS_NO_CHANGE as i32]
    );
    assert_eq!(session.modules().unwrap().len(), 3);
}

#[test]
fn test_disposition_precedence()
{
    assert!(EventDisposition::NoChange < EventDisposition::Go);
    assert!(EventDisposition::Go < EventDisposition::GoHandled);
    assert!(EventDisposition::GoNotHandled < EventDisposition::StepOver);
    assert!(EventDisposition::StepInto < EventDisposition::Break);
    assert_eq!(EventDisposition::default(), EventDisposition::NoChange);
    assert_eq!(EventDisposition::Break.raw(), DEBUG_STATUS_BREAK);
    assert_eq!(EventDisposition::Go.raw(), DEBUG_STATUS_GO);
}

// ============================================================================
// Re-entrancy
// ============================================================================

type SessionSlot = Arc<Mutex<Option<Arc<Session>>>>;

/// Calls back into the session from inside a breakpoint callback.
struct ReentrantSink
{
    slot: SessionSlot,
    results: Arc<Mutex<Vec<String>>>,
}

impl CallbackSink for ReentrantSink
{
    fn interest(&self) -> EventInterest
    {
        EventInterest::BREAKPOINT
    }

    fn on_event(&mut self, _event: &CallbackEvent<'_>, _context: &CallbackContext<'_>) -> EventDisposition
    {
        let Some(session) = self.slot.lock().unwrap().clone() else {
            return EventDisposition::NoChange;
        };
        let mut results = self.results.lock().unwrap();
        results.push(describe(session.modules().map(|modules| modules.len())));
        results.push(describe(session.drive(DriveRequest::go())));
        results.push(describe(session.close()));
        EventDisposition::NoChange
    }
}

fn describe<T>(result: Result<T, BridgeError>) -> String
{
    match result {
        Ok(_) => "ok".to_string(),
        Err(BridgeError::ReentrantCall { operation }) => format!("reentrant {operation}"),
        Err(BridgeError::SessionBusy) => "busy".to_string(),
        Err(other) => format!("{other}"),
    }
}

#[test]
fn test_session_calls_from_sink_are_rejected()
{
    let engine = loaded_dump();
    let slot: SessionSlot = Arc::default();
    let results = Arc::new(Mutex::new(Vec::new()));
    let session = Arc::new(open_with(engine, |config| {
        config.sink(ReentrantSink {
            slot: Arc::clone(&slot),
            results: Arc::clone(&results),
        })
    }));
    *slot.lock().unwrap() = Some(Arc::clone(&session));
    engine.script(Scripted::Breakpoint);
    let before = engine.state().count("IDebugSymbols::GetNumberModules");

    let outcome = session.drive(DriveRequest::go()).unwrap();

    assert_eq!(outcome.status, ExecutionStatus::Break);
    assert_eq!(
        *results.lock().unwrap(),
        ["reentrant Session::modules", "busy", "reentrant Session::close"]
    );
    assert_eq!(engine.state().count("IDebugSymbols::GetNumberModules"), before);

    // The session is untouched and usable afterwards
    assert_eq!(session.modules().unwrap().len(), 3);

    slot.lock().unwrap().take();
    session.close().unwrap();
}

/// Queries the engine through the callback context.
struct InspectingSink
{
    seen: Arc<Mutex<Vec<String>>>,
}

impl CallbackSink for InspectingSink
{
    fn interest(&self) -> EventInterest
    {
        EventInterest::EXCEPTION
    }

    fn on_event(&mut self, event: &CallbackEvent<'_>, context: &CallbackContext<'_>) -> EventDisposition
    {
        let CallbackEvent::Exception { record, .. } = event else {
            return EventDisposition::NoChange;
        };
        let mut seen = self.seen.lock().unwrap();
        let faulting = Address::new(record.address);

        match context.name_by_offset(faulting) {
            Ok(Lookup::Found(symbol)) => seen.push(symbol.to_string()),
            other => seen.push(format!("{other:?}")),
        }
        match context.module_by_offset(faulting) {
            Ok(Lookup::Found(module)) => seen.push(format!("{}", module.base)),
            other => seen.push(format!("{other:?}")),
        }
        match context.read_memory(Address::new(HEAP_BASE), 4) {
            Ok(outcome) => seen.push(format!("{:02x?}", outcome.bytes())),
            Err(err) => seen.push(format!("{err}")),
        }
        match context.execution_status() {
            Ok(status) => seen.push(format!("{status:?}")),
            Err(err) => seen.push(format!("{err}")),
        }
        EventDisposition::GoHandled
    }
}

#[test]
fn test_callback_context_queries()
{
    let engine = loaded_dump().with_memory(HEAP_BASE, vec![0xde, 0xad, 0xbe, 0xef, 0x00]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let session = open_with(engine, |config| {
        config.sink(InspectingSink {
            seen: Arc::clone(&seen),
        })
    });
    engine.script(Scripted::Exception {
        code: 0xC000_0005,
        address: APP_BASE + 0x2004,
        first_chance: true,
    });

    session.drive(DriveRequest::go()).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        [
            "app!worker_loop+0x4",
            "0x00007ff600000000",
            "[de, ad, be, ef]",
            "Go",
        ]
    );
    assert_eq!(
        engine.state().dispositions,
        vec![EventDisposition::GoHandled.raw() as i32]
    );
}

#[test]
fn test_no_sinks_no_events()
{
    let engine = loaded_dump();
    let session = open_with(engine, |config| config);
    engine.script(Scripted::Breakpoint);
    engine.script(Scripted::Output("ignored\n".to_string()));

    let outcome = session.drive(DriveRequest::go()).unwrap();

    assert_eq!(outcome.status, ExecutionStatus::Break);
    let state = engine.state();
    assert_eq!(state.interest, 0);
    assert!(state.dispositions.is_empty());
    assert_eq!(state.output_results, vec![S_OK]);
}
