//! # Session
//!
//! A [`Session`] owns one engine connection: the root client, every
//! negotiated proxy, and the registered callback objects. It is bound to the
//! thread that opened it; every engine call goes through that thread.
//!
//! ## Lifecycle
//!
//! `Created → Connected → Running → Connected → … → Closed`
//!
//! - **Connected**: queries and drive operations are accepted
//! - **Running**: one drive operation is in flight; a second one fails with
//!   `SessionBusy`
//! - **Closed**: torn down; every call fails with `SessionClosed` without
//!   reaching the engine
//!
//! ## Reaching a session from other threads
//!
//! - [`InterruptHandle`]: break into a running target from anywhere
//! - [`SessionWorker`] / [`SessionHandle`]: run the session on a dedicated
//!   thread and submit requests to it from any thread, blocking or async

mod affinity;
pub mod drive;
pub(crate) mod engine;
pub(crate) mod guards;
pub mod interrupt;
pub(crate) mod state;
pub mod worker;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

pub use drive::{DriveAction, DriveOutcome, DriveRequest};
pub use interrupt::InterruptHandle;
pub use state::SessionState;
pub use worker::{SessionHandle, SessionWorker};

use self::affinity::ThreadBound;
use self::engine::{EngineConnection, EngineHandle, RegisteredCallbacks, Teardown};
use self::state::{DriveClaim, SessionShared};
use crate::callbacks::dispatch::DispatchState;
use crate::callbacks::CallbackSink;
use crate::config::SessionConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::pipelines::{self, Lookup, ModuleSnapshot, ReadOutcome, RetryPolicy, SymbolRecord, ThreadContext};
use crate::platform::constants::DEFAULT_PAGE_SIZE;
use crate::proxy::{NegotiatedVersions, ProxySet};
use crate::types::{
    Address, Architecture, AttachFlags, EventInterest, ExecutionStatus, ProcessId, ThreadId, ThreadInfo,
};

// ============================================================================
// Session core
// ============================================================================

/// State that lives on the session thread only.
///
/// Callback objects reach it through a `Weak`, so a callback that outlives
/// the session finds nothing to call into.
pub(crate) struct SessionCore
{
    shared: Arc<SessionShared>,
    connection: RefCell<Option<EngineConnection>>,
    dispatch: DispatchState,
    sinks: RefCell<Vec<Box<dyn CallbackSink>>>,
    retry: RetryPolicy,
    max_frames: u32,
    page_size: Cell<Option<u32>>,
}

impl SessionCore
{
    pub(crate) fn dispatch(&self) -> &DispatchState
    {
        &self.dispatch
    }

    pub(crate) fn sinks(&self) -> &RefCell<Vec<Box<dyn CallbackSink>>>
    {
        &self.sinks
    }

    pub(crate) fn retry_policy(&self) -> RetryPolicy
    {
        self.retry
    }

    /// Target page size, cached after the first successful query.
    pub(crate) fn page_size(&self, proxies: &ProxySet) -> u32
    {
        if let Some(size) = self.page_size.get() {
            return size;
        }
        match proxies.control.page_size() {
            Ok(size) => {
                self.page_size.set(Some(size));
                size
            }
            Err(err) => {
                debug!("Page size unavailable ({err}); assuming 0x{DEFAULT_PAGE_SIZE:x}");
                DEFAULT_PAGE_SIZE
            }
        }
    }

    /// Run `query` against the proxies outside of callback dispatch.
    pub(crate) fn with_proxies<T>(
        &self,
        operation: &'static str,
        query: impl FnOnce(&ProxySet) -> BridgeResult<T>,
    ) -> BridgeResult<T>
    {
        self.shared.ensure_open()?;
        if self.dispatch.is_active() {
            error!("{operation} called from inside an engine callback");
            return Err(BridgeError::ReentrantCall { operation });
        }
        self.borrow_proxies(query)
    }

    /// Run one of the queries a sink may issue while it is being dispatched.
    pub(crate) fn with_callback_proxies<T>(
        &self,
        _operation: &'static str,
        query: impl FnOnce(&ProxySet) -> BridgeResult<T>,
    ) -> BridgeResult<T>
    {
        self.shared.ensure_open()?;
        self.borrow_proxies(query)
    }

    fn borrow_proxies<T>(&self, query: impl FnOnce(&ProxySet) -> BridgeResult<T>) -> BridgeResult<T>
    {
        let connection = self.connection.try_borrow().map_err(|_| BridgeError::SessionClosed)?;
        match connection.as_ref() {
            Some(connection) => query(&connection.proxies),
            None => Err(BridgeError::SessionClosed),
        }
    }

    fn forget_target_state(&self)
    {
        self.page_size.set(None);
    }

    /// Unregister callbacks and release every native object.
    fn teardown(&self, operation: &'static str, mode: Teardown) -> BridgeResult<()>
    {
        if self.dispatch.is_active() {
            error!("{operation} called from inside an engine callback");
            return Err(BridgeError::ReentrantCall { operation });
        }
        let mut slot = self
            .connection
            .try_borrow_mut()
            .map_err(|_| BridgeError::ReentrantCall { operation })?;
        let previous = self.shared.mark_closed();
        let Some(connection) = slot.take() else {
            return Err(BridgeError::SessionClosed);
        };
        drop(slot);

        debug!("Tearing down session ({mode:?}) from state {previous}");
        connection.teardown(mode);
        info!("Session closed");
        Ok(())
    }
}

// ============================================================================
// Session
// ============================================================================

/// One connection to the debugger engine.
///
/// Every method must be called on the thread that opened the session and
/// fails with `ThreadAffinityViolation` anywhere else. Use a
/// [`SessionWorker`] to reach a session from several threads.
pub struct Session
{
    shared: Arc<SessionShared>,
    core: ThreadBound<Rc<SessionCore>>,
    wait_for_initial_event: bool,
}

impl Session
{
    /// Load the engine, negotiate every interface, and register callbacks.
    ///
    /// ## Errors
    ///
    /// - `EngineUnavailable`: the engine library or entry point could not be loaded
    /// - `Engine`: an interface could not be obtained or a setting was rejected
    pub fn open(config: SessionConfig) -> BridgeResult<Self>
    {
        let SessionConfig {
            engine,
            symbol_path,
            symbol_options,
            output_mask,
            retry,
            wait_for_initial_event,
            max_frames,
            sinks,
        } = config;

        let shared = Arc::new(SessionShared::new());
        let engine = EngineHandle::connect(engine)?;
        let proxies = ProxySet::acquire(engine.root())?;
        debug!("Negotiated interface versions: {:?}", proxies.versions());

        proxies.client.set_output_mask(output_mask)?;
        if let Some(path) = symbol_path.as_deref() {
            proxies.symbols.set_symbol_path(path)?;
        }
        if let Some(options) = symbol_options {
            proxies.symbols.set_symbol_options(options)?;
        }

        let interest = sinks
            .iter()
            .fold(EventInterest::empty(), |interest, sink| interest | sink.interest());
        let core = Rc::new(SessionCore {
            shared: Arc::clone(&shared),
            connection: RefCell::new(None),
            dispatch: DispatchState::default(),
            sinks: RefCell::new(sinks),
            retry,
            max_frames,
            page_size: Cell::new(None),
        });
        let callbacks = RegisteredCallbacks::register(&proxies.client, &core, interest)?;

        shared.set_interrupt_target(proxies.control.interrupt_target());
        *core.connection.borrow_mut() = Some(EngineConnection::new(proxies, callbacks, engine));
        shared.mark_connected();
        info!("Session connected");

        Ok(Self {
            shared,
            core: ThreadBound::new(core),
            wait_for_initial_event,
        })
    }

    fn core(&self, operation: &'static str) -> BridgeResult<&SessionCore>
    {
        self.core.get(operation).map(|core| &**core)
    }

    fn query<T>(&self, operation: &'static str, query: impl FnOnce(&SessionCore, &ProxySet) -> BridgeResult<T>)
        -> BridgeResult<T>
    {
        let core = self.core(operation)?;
        core.with_proxies(operation, |proxies| query(core, proxies))
    }

    #[must_use]
    pub fn state(&self) -> SessionState
    {
        self.shared.state()
    }

    /// Handle that can break into the target from any thread.
    #[must_use]
    pub fn interrupt_handle(&self) -> InterruptHandle
    {
        InterruptHandle::new(Arc::clone(&self.shared))
    }

    /// Interface versions negotiated at open.
    pub fn versions(&self) -> BridgeResult<NegotiatedVersions>
    {
        self.query("Session::versions", |_, proxies| Ok(proxies.versions()))
    }

    /// Direct access to the proxies for calls the pipelines do not cover.
    pub fn with_proxies<T>(&self, query: impl FnOnce(&ProxySet) -> BridgeResult<T>) -> BridgeResult<T>
    {
        self.query("Session::with_proxies", |_, proxies| query(proxies))
    }

    // ------------------------------------------------------------------------
    // Targets
    // ------------------------------------------------------------------------

    /// Open a crash dump and, unless disabled, wait for its initial event.
    pub fn open_dump(&self, path: impl AsRef<Path>) -> BridgeResult<()>
    {
        let path = path.as_ref();
        self.query("Session::open_dump", |core, proxies| {
            core.forget_target_state();
            proxies.client.open_dump_file(path)
        })?;
        info!("Opened dump {}", path.display());
        self.settle_initial_event()
    }

    /// Attach to a live process and, unless disabled, wait for the attach to complete.
    pub fn attach_process(&self, pid: ProcessId, flags: AttachFlags) -> BridgeResult<()>
    {
        self.query("Session::attach_process", |core, proxies| {
            core.forget_target_state();
            proxies.client.attach_process(pid, flags)
        })?;
        info!("Attached to process {pid}");
        self.settle_initial_event()
    }

    fn settle_initial_event(&self) -> BridgeResult<()>
    {
        if !self.wait_for_initial_event {
            return Ok(());
        }
        let outcome = self.drive(DriveRequest::wait())?;
        debug!("Initial event settled with status {:?}", outcome.status);
        Ok(())
    }

    /// Detach from every target and end the session. The session is closed afterwards.
    pub fn detach(&self) -> BridgeResult<()>
    {
        const OPERATION: &str = "Session::detach";
        self.core(OPERATION)?.teardown(OPERATION, Teardown::Detach)
    }

    /// End the session, detaching from live targets.
    pub fn close(&self) -> BridgeResult<()>
    {
        const OPERATION: &str = "Session::close";
        self.core(OPERATION)?.teardown(OPERATION, Teardown::Close)
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Resume or step the target and wait for it to stop.
    ///
    /// ## Errors
    ///
    /// - `SessionBusy`: another drive is in flight
    /// - `SessionClosed`: the session has been torn down
    pub fn drive(&self, request: DriveRequest) -> BridgeResult<DriveOutcome>
    {
        const OPERATION: &str = "Session::drive";
        self.core(OPERATION)?;
        let claim = DriveClaim::acquire(&self.shared)?;
        self.drive_claimed(claim, request)
    }

    /// Drive with a claim acquired by the caller, possibly on another thread.
    pub(crate) fn drive_claimed(&self, claim: DriveClaim, request: DriveRequest) -> BridgeResult<DriveOutcome>
    {
        let outcome = self.query("Session::drive", |core, proxies| {
            core.forget_target_state();
            drive::run(proxies, request)
        });
        drop(claim);
        outcome
    }

    pub fn execution_status(&self) -> BridgeResult<ExecutionStatus>
    {
        self.query("Session::execution_status", |_, proxies| proxies.control.execution_status())
    }

    pub fn architecture(&self) -> BridgeResult<Architecture>
    {
        self.query("Session::architecture", |_, proxies| proxies.control.actual_processor_type())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Snapshot of the loaded modules in engine order.
    pub fn modules(&self) -> BridgeResult<ModuleSnapshot>
    {
        self.query("Session::modules", |core, proxies| {
            pipelines::modules::enumerate(proxies, core.retry_policy())
        })
    }

    /// Module, symbol, and displacement for `address`.
    pub fn resolve_symbol(&self, address: Address) -> BridgeResult<Lookup<SymbolRecord>>
    {
        self.query("Session::resolve_symbol", |core, proxies| {
            pipelines::symbols::resolve(proxies, address, core.retry_policy())
        })
    }

    /// Address of a `module!symbol` (or bare symbol) name.
    pub fn address_of(&self, name: &str) -> BridgeResult<Lookup<Address>>
    {
        self.query("Session::address_of", |core, proxies| {
            pipelines::symbols::address_of(proxies, name, core.retry_policy())
        })
    }

    /// Reload symbols for `module` (empty for all modules).
    pub fn reload_symbols(&self, module: &str) -> BridgeResult<()>
    {
        self.query("Session::reload_symbols", |_, proxies| proxies.symbols.reload(module))
    }

    /// Read up to `length` bytes at `address`.
    ///
    /// ## Errors
    ///
    /// - `Unreadable`: not a single byte of the range could be read
    /// - `InvalidArgument`: the range wraps the address space or exceeds `u32::MAX` bytes
    pub fn read_memory(&self, address: Address, length: usize) -> BridgeResult<ReadOutcome>
    {
        self.query("Session::read_memory", |core, proxies| {
            pipelines::memory::read(proxies, address, length, core.page_size(proxies))
        })
    }

    /// One target pointer at `address`.
    pub fn read_pointer(&self, address: Address) -> BridgeResult<Address>
    {
        let pointers = self.read_pointers(address, 1)?;
        pointers.first().copied().ok_or(BridgeError::Unreadable {
            address: address.value(),
            length: 1,
        })
    }

    /// `count` consecutive target pointers at `address`.
    pub fn read_pointers(&self, address: Address, count: usize) -> BridgeResult<Vec<Address>>
    {
        self.query("Session::read_pointers", |_, proxies| {
            pipelines::memory::read_pointers(proxies, address, count)
        })
    }

    /// Write `data` at `address`, returning how many bytes the engine wrote.
    pub fn write_memory(&self, address: Address, data: &[u8]) -> BridgeResult<usize>
    {
        self.query("Session::write_memory", |_, proxies| {
            proxies.data_spaces.write_virtual(address.value(), data)
        })
    }

    /// Threads of the current process.
    pub fn threads(&self) -> BridgeResult<Vec<ThreadInfo>>
    {
        self.query("Session::threads", |_, proxies| pipelines::context::threads(proxies))
    }

    /// Registers and stack of `thread`, or of the current thread when `None`.
    ///
    /// ## Errors
    ///
    /// - `TargetNotSuspended`: the target is running
    pub fn capture_context(&self, thread: Option<ThreadId>) -> BridgeResult<ThreadContext>
    {
        self.query("Session::capture_context", |core, proxies| {
            pipelines::context::capture(
                proxies,
                thread,
                core.max_frames,
                core.retry_policy(),
                core.shared.generation(),
            )
        })
    }
}

impl fmt::Debug for Session
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("thread", &self.core.owner())
            .finish_non_exhaustive()
    }
}

impl Drop for Session
{
    fn drop(&mut self)
    {
        if !self.core.is_owner() {
            // The bound core leaks itself; make sure nothing else uses the connection.
            self.shared.mark_closed();
            return;
        }
        if self.shared.state() == SessionState::Closed {
            return;
        }
        if let Ok(core) = self.core("Session::drop") {
            if let Err(err) = core.teardown("Session::drop", Teardown::Close) {
                warn!("Session teardown on drop failed: {err}");
            }
        }
    }
}
