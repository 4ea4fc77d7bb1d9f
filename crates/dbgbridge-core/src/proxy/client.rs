//! `IDebugClient*` proxy: target lifetime, callbacks, output routing.

use std::ffi::c_void;
use std::path::Path;
use std::ptr;

use tracing::debug;

use super::{negotiate, to_c_string, InterfaceGroup, InterfaceProxy};
use crate::abi::vtables::{
    IDebugClient2Vtbl, IDebugClient4Vtbl, IDebugClientVtbl, IID_IDEBUG_CLIENT, IID_IDEBUG_CLIENT2,
    IID_IDEBUG_CLIENT3, IID_IDEBUG_CLIENT4,
};
use crate::abi::Guid;
use crate::error::{BridgeError, BridgeResult};
use crate::platform::constants::{DEBUG_END_ACTIVE_DETACH, DEBUG_END_ACTIVE_TERMINATE, DEBUG_END_PASSIVE};
use crate::platform::hresult::check;
use crate::types::{AttachFlags, OutputMask, ProcessId};

/// Client versions, newest first.
pub(crate) const VERSIONS: &[(u32, Guid)] = &[
    (4, IID_IDEBUG_CLIENT4),
    (3, IID_IDEBUG_CLIENT3),
    (2, IID_IDEBUG_CLIENT2),
    (1, IID_IDEBUG_CLIENT),
];

/// How `EndSession` leaves the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndSessionMode
{
    /// Leave targets as they are
    Passive,
    /// Terminate live targets
    Terminate,
    /// Detach from live targets, letting them run
    Detach,
}

impl EndSessionMode
{
    const fn raw(self) -> u32
    {
        match self {
            EndSessionMode::Passive => DEBUG_END_PASSIVE,
            EndSessionMode::Terminate => DEBUG_END_ACTIVE_TERMINATE,
            EndSessionMode::Detach => DEBUG_END_ACTIVE_DETACH,
        }
    }
}

/// Proxy for `IDebugClient` .. `IDebugClient4`.
#[derive(Debug)]
pub struct ClientProxy
{
    iface: InterfaceProxy<IDebugClientVtbl>,
}

impl ClientProxy
{
    pub(crate) fn negotiate(root: &InterfaceProxy<IDebugClientVtbl>) -> BridgeResult<Self>
    {
        Ok(Self {
            iface: negotiate(root, InterfaceGroup::Client, VERSIONS)?,
        })
    }

    pub(crate) fn from_interface(iface: InterfaceProxy<IDebugClientVtbl>) -> Self
    {
        Self { iface }
    }

    pub(crate) fn interface(&self) -> &InterfaceProxy<IDebugClientVtbl>
    {
        &self.iface
    }

    /// Negotiated version.
    #[must_use]
    pub fn version(&self) -> u32
    {
        self.iface.version()
    }

    /// `AttachProcess` on the local machine.
    pub fn attach_process(&self, pid: ProcessId, flags: AttachFlags) -> BridgeResult<()>
    {
        if pid.0 == 0 {
            return Err(BridgeError::InvalidArgument("process id 0 cannot be attached".to_string()));
        }
        debug!("Attaching to process {pid} with {flags:?}");
        // SAFETY: valid interface pointer; server 0 is the local machine.
        let hr = unsafe { (self.iface.vtbl().attach_process)(self.iface.as_raw(), 0, pid.0, flags.bits()) };
        check(hr, "IDebugClient::AttachProcess")
    }

    /// `OpenDumpFile`
    pub fn open_dump_file(&self, path: &Path) -> BridgeResult<()>
    {
        let text = path
            .to_str()
            .ok_or_else(|| BridgeError::InvalidArgument(format!("dump path {} is not valid UTF-8", path.display())))?;
        let native = to_c_string(text, "dump path")?;
        debug!("Opening dump {}", path.display());
        // SAFETY: valid interface pointer and NUL-terminated path.
        let hr = unsafe { (self.iface.vtbl().open_dump_file)(self.iface.as_raw(), native.as_ptr()) };
        check(hr, "IDebugClient::OpenDumpFile")
    }

    /// `DetachProcesses`
    pub fn detach_processes(&self) -> BridgeResult<()>
    {
        // SAFETY: valid interface pointer.
        let hr = unsafe { (self.iface.vtbl().detach_processes)(self.iface.as_raw()) };
        check(hr, "IDebugClient::DetachProcesses")
    }

    /// `EndSession`
    pub fn end_session(&self, mode: EndSessionMode) -> BridgeResult<()>
    {
        // SAFETY: valid interface pointer.
        let hr = unsafe { (self.iface.vtbl().end_session)(self.iface.as_raw(), mode.raw()) };
        check(hr, "IDebugClient::EndSession")
    }

    /// `GetExitCode` of the current process, `None` while it is still running.
    pub fn exit_code(&self) -> BridgeResult<Option<u32>>
    {
        let mut code = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (self.iface.vtbl().get_exit_code)(self.iface.as_raw(), &mut code) };
        check(hr, "IDebugClient::GetExitCode")?;
        Ok((hr == crate::platform::hresult::S_OK).then_some(code))
    }

    /// `DispatchCallbacks`: deliver queued callbacks for up to `timeout_ms`.
    pub fn dispatch_callbacks(&self, timeout_ms: u32) -> BridgeResult<()>
    {
        // SAFETY: valid interface pointer.
        let hr = unsafe { (self.iface.vtbl().dispatch_callbacks)(self.iface.as_raw(), timeout_ms) };
        check(hr, "IDebugClient::DispatchCallbacks")
    }

    /// `SetOutputCallbacks`; `None` unregisters.
    ///
    /// # Safety
    ///
    /// `callbacks` must be a live `IDebugOutputCallbacks` object.
    pub(crate) unsafe fn set_output_callbacks(&self, callbacks: Option<*mut c_void>) -> BridgeResult<()>
    {
        let hr = (self.iface.vtbl().set_output_callbacks)(self.iface.as_raw(), callbacks.unwrap_or(ptr::null_mut()));
        check(hr, "IDebugClient::SetOutputCallbacks")
    }

    /// `SetEventCallbacks`; `None` unregisters.
    ///
    /// # Safety
    ///
    /// `callbacks` must be a live `IDebugEventCallbacks` object.
    pub(crate) unsafe fn set_event_callbacks(&self, callbacks: Option<*mut c_void>) -> BridgeResult<()>
    {
        let hr = (self.iface.vtbl().set_event_callbacks)(self.iface.as_raw(), callbacks.unwrap_or(ptr::null_mut()));
        check(hr, "IDebugClient::SetEventCallbacks")
    }

    /// `FlushCallbacks`
    pub fn flush_callbacks(&self) -> BridgeResult<()>
    {
        // SAFETY: valid interface pointer.
        let hr = unsafe { (self.iface.vtbl().flush_callbacks)(self.iface.as_raw()) };
        check(hr, "IDebugClient::FlushCallbacks")
    }

    /// `GetOutputMask`
    pub fn output_mask(&self) -> BridgeResult<OutputMask>
    {
        let mut mask = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (self.iface.vtbl().get_output_mask)(self.iface.as_raw(), &mut mask) };
        check(hr, "IDebugClient::GetOutputMask")?;
        Ok(OutputMask::from_bits_retain(mask))
    }

    /// `SetOutputMask`
    pub fn set_output_mask(&self, mask: OutputMask) -> BridgeResult<()>
    {
        // SAFETY: valid interface pointer.
        let hr = unsafe { (self.iface.vtbl().set_output_mask)(self.iface.as_raw(), mask.bits()) };
        check(hr, "IDebugClient::SetOutputMask")
    }

    /// `TerminateCurrentProcess` (v2)
    pub fn terminate_current_process(&self) -> BridgeResult<()>
    {
        const OP: &str = "IDebugClient2::TerminateCurrentProcess";
        self.iface.require(2, OP)?;
        // SAFETY: version checked above.
        let vtbl = unsafe { self.iface.extended::<IDebugClient2Vtbl>() };
        // SAFETY: valid interface pointer.
        let hr = unsafe { (vtbl.terminate_current_process)(self.iface.as_raw()) };
        check(hr, OP)
    }

    /// `DetachCurrentProcess` (v2)
    pub fn detach_current_process(&self) -> BridgeResult<()>
    {
        const OP: &str = "IDebugClient2::DetachCurrentProcess";
        self.iface.require(2, OP)?;
        // SAFETY: version checked above.
        let vtbl = unsafe { self.iface.extended::<IDebugClient2Vtbl>() };
        // SAFETY: valid interface pointer.
        let hr = unsafe { (vtbl.detach_current_process)(self.iface.as_raw()) };
        check(hr, OP)
    }

    /// `GetNumberDumpFiles` (v4)
    pub fn number_dump_files(&self) -> BridgeResult<u32>
    {
        const OP: &str = "IDebugClient4::GetNumberDumpFiles";
        self.iface.require(4, OP)?;
        // SAFETY: version checked above.
        let vtbl = unsafe { self.iface.extended::<IDebugClient4Vtbl>() };
        let mut count = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (vtbl.get_number_dump_files)(self.iface.as_raw(), &mut count) };
        check(hr, OP)?;
        Ok(count)
    }
}
