//! # Engine Connection
//!
//! Ownership of the native objects behind a session: the root client and
//! the library that backs it, the negotiated proxies, and the callback
//! objects registered with the engine.
//!
//! Teardown runs in a fixed order. Callbacks are unregistered first so the
//! engine stops calling into us, then proxies are released newest first,
//! then the session is ended on the root client, and the library is
//! unloaded last.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::abi::vtables::{IDebugClientVtbl, IDebugEventCallbacksVtbl, IDebugOutputCallbacksVtbl};
use crate::callbacks::events::EVENT_CALLBACKS_VTBL;
use crate::callbacks::object::{CallbackObject, OwnedCallback};
use crate::callbacks::output::OUTPUT_CALLBACKS_VTBL;
use crate::error::BridgeResult;
use crate::platform::loader::{self, EngineLibrary, EngineSource};
use crate::proxy::{ClientProxy, EndSessionMode, InterfaceGroup, InterfaceProxy, ProxySet};
use crate::types::EventInterest;

use super::SessionCore;

/// How a connection is ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Teardown
{
    /// `EndSession(DEBUG_END_ACTIVE_DETACH)`
    Close,
    /// `DetachProcesses`, then `EndSession(DEBUG_END_PASSIVE)`
    Detach,
}

/// Root `IDebugClient` and the library it came from.
///
/// Fields drop in declaration order: the root is released before the
/// library is unloaded.
pub(crate) struct EngineHandle
{
    root: ClientProxy,
    _library: Option<EngineLibrary>,
}

impl EngineHandle
{
    pub(crate) fn connect(source: EngineSource) -> BridgeResult<Self>
    {
        let loaded = loader::load(source)?;
        // SAFETY: `DebugCreate` handed us one owned reference to an `IDebugClient`.
        let root = unsafe { InterfaceProxy::from_raw(loaded.root, InterfaceGroup::Client, 1) };
        Ok(Self {
            root: ClientProxy::from_interface(root),
            _library: loaded.library,
        })
    }

    pub(crate) fn root(&self) -> &InterfaceProxy<IDebugClientVtbl>
    {
        self.root.interface()
    }

    fn end(self, mode: EndSessionMode)
    {
        if let Err(err) = self.root.end_session(mode) {
            warn!("EndSession({mode:?}) failed: {err}");
        }
    }
}

/// The crate's references to the two registered callback objects.
pub(crate) struct RegisteredCallbacks
{
    output: OwnedCallback<IDebugOutputCallbacksVtbl>,
    events: OwnedCallback<IDebugEventCallbacksVtbl>,
}

impl RegisteredCallbacks
{
    /// Create both callback objects and register them with `client`.
    pub(crate) fn register(client: &ClientProxy, core: &Rc<SessionCore>, interest: EventInterest) -> BridgeResult<Self>
    {
        let output = CallbackObject::create(&OUTPUT_CALLBACKS_VTBL, core, EventInterest::empty());
        let events = CallbackObject::create(&EVENT_CALLBACKS_VTBL, core, interest);

        // SAFETY: both objects stay alive until `unregister`, which runs
        // before the owned references are dropped.
        unsafe {
            client.set_output_callbacks(Some(output.as_raw()))?;
            if let Err(err) = client.set_event_callbacks(Some(events.as_raw())) {
                let _ = client.set_output_callbacks(None);
                return Err(err);
            }
        }
        debug!("Registered callbacks with interest {interest:?}");
        Ok(Self { output, events })
    }

    fn unregister(self, client: &ClientProxy)
    {
        // SAFETY: clearing a registration is always valid.
        unsafe {
            if let Err(err) = client.set_event_callbacks(None) {
                warn!("Failed to unregister event callbacks: {err}");
            }
            if let Err(err) = client.set_output_callbacks(None) {
                warn!("Failed to unregister output callbacks: {err}");
            }
        }
        drop(self.events);
        drop(self.output);
    }
}

/// Everything a connected session owns on the native side.
///
/// Without an explicit [`EngineConnection::teardown`] the fields drop in
/// declaration order, which still releases proxies before the root.
pub(crate) struct EngineConnection
{
    callbacks: RegisteredCallbacks,
    pub(crate) proxies: ProxySet,
    engine: EngineHandle,
}

impl EngineConnection
{
    pub(crate) fn new(proxies: ProxySet, callbacks: RegisteredCallbacks, engine: EngineHandle) -> Self
    {
        Self {
            callbacks,
            proxies,
            engine,
        }
    }

    /// Release every native object in teardown order.
    pub(crate) fn teardown(self, mode: Teardown)
    {
        let Self {
            callbacks,
            proxies,
            engine,
        } = self;

        if mode == Teardown::Detach {
            if let Err(err) = proxies.client.detach_processes() {
                warn!("DetachProcesses failed: {err}");
            }
        }
        callbacks.unregister(&proxies.client);
        drop(proxies);

        engine.end(match mode {
            Teardown::Close => EndSessionMode::Detach,
            Teardown::Detach => EndSessionMode::Passive,
        });
        debug!("Engine connection released");
    }
}
