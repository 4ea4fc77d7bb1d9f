//! `IDebugControl*` proxy: execution control, stacks, target facts.

use std::ffi::c_void;
use std::ptr::{self, NonNull};

use super::{decode_c_string, negotiate, InterfaceGroup, InterfaceProxy};
use crate::abi::vtables::{
    IDebugClientVtbl, IDebugControl2Vtbl, IDebugControl3Vtbl, IDebugControlVtbl, IID_IDEBUG_CONTROL,
    IID_IDEBUG_CONTROL2, IID_IDEBUG_CONTROL3,
};
use crate::abi::{AbiRecord, Guid, NativeStackFrame};
use crate::error::{BridgeError, BridgeResult};
use crate::platform::constants::{DEBUG_WAIT_DEFAULT, MAX_STACK_FRAMES};
use crate::platform::hresult::{check, E_UNEXPECTED, HRESULT, S_FALSE, S_OK};
use crate::types::{Architecture, ExecutionStatus};

/// Control versions, newest first.
pub(crate) const VERSIONS: &[(u32, Guid)] =
    &[(3, IID_IDEBUG_CONTROL3), (2, IID_IDEBUG_CONTROL2), (1, IID_IDEBUG_CONTROL)];

const DESCRIPTION_CAPACITY: usize = 512;

/// What `GetLastEventInformation` reports about the event that ended a wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastEvent
{
    /// `DEBUG_EVENT_*` type, 0 if none
    pub event_type: u32,
    /// Engine process id
    pub process_id: u32,
    /// Engine thread id
    pub thread_id: u32,
    /// Engine-formatted description
    pub description: String,
}

/// Proxy for `IDebugControl` .. `IDebugControl3`.
#[derive(Debug)]
pub struct ControlProxy
{
    iface: InterfaceProxy<IDebugControlVtbl>,
}

impl ControlProxy
{
    pub(crate) fn negotiate(root: &InterfaceProxy<IDebugClientVtbl>) -> BridgeResult<Self>
    {
        Ok(Self {
            iface: negotiate(root, InterfaceGroup::Control, VERSIONS)?,
        })
    }

    /// Negotiated version.
    #[must_use]
    pub fn version(&self) -> u32
    {
        self.iface.version()
    }

    /// Raw interface pointer for the interrupt path.
    pub(crate) fn interrupt_target(&self) -> NonNull<c_void>
    {
        // SAFETY: `as_raw` comes from a NonNull.
        unsafe { NonNull::new_unchecked(self.iface.as_raw()) }
    }

    /// `SetInterrupt`
    pub fn set_interrupt(&self, flags: u32) -> BridgeResult<()>
    {
        // SAFETY: valid interface pointer.
        let hr = unsafe { set_interrupt_raw(self.interrupt_target(), flags) };
        check(hr, "IDebugControl::SetInterrupt")
    }

    /// `GetExecutionStatus`
    pub fn execution_status(&self) -> BridgeResult<ExecutionStatus>
    {
        let mut status = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (self.iface.vtbl().get_execution_status)(self.iface.as_raw(), &mut status) };
        check(hr, "IDebugControl::GetExecutionStatus")?;
        Ok(ExecutionStatus::from_raw(status))
    }

    /// `SetExecutionStatus`
    pub fn set_execution_status(&self, status: ExecutionStatus) -> BridgeResult<()>
    {
        // SAFETY: valid interface pointer.
        let hr = unsafe { (self.iface.vtbl().set_execution_status)(self.iface.as_raw(), status.raw()) };
        check(hr, "IDebugControl::SetExecutionStatus")
    }

    /// `WaitForEvent`. `Ok(false)` when the timeout elapsed without an event.
    pub fn wait_for_event(&self, timeout_ms: u32) -> BridgeResult<bool>
    {
        // SAFETY: valid interface pointer.
        let hr = unsafe { (self.iface.vtbl().wait_for_event)(self.iface.as_raw(), DEBUG_WAIT_DEFAULT, timeout_ms) };
        check(hr, "IDebugControl::WaitForEvent")?;
        Ok(hr != S_FALSE)
    }

    /// `GetLastEventInformation` without the extra-information blob.
    pub fn last_event(&self) -> BridgeResult<LastEvent>
    {
        let mut event_type = 0u32;
        let mut process_id = 0u32;
        let mut thread_id = 0u32;
        let mut description = vec![0u8; DESCRIPTION_CAPACITY];
        let mut description_used = 0u32;
        // SAFETY: valid interface pointer; every out slot and buffer is sized as declared.
        let hr = unsafe {
            (self.iface.vtbl().get_last_event_information)(
                self.iface.as_raw(),
                &mut event_type,
                &mut process_id,
                &mut thread_id,
                ptr::null_mut(),
                0,
                ptr::null_mut(),
                description.as_mut_ptr().cast(),
                DESCRIPTION_CAPACITY as u32,
                &mut description_used,
            )
        };
        check(hr, "IDebugControl::GetLastEventInformation")?;
        Ok(LastEvent {
            event_type,
            process_id,
            thread_id,
            description: decode_c_string(&description),
        })
    }

    /// `GetStackTrace` from the current thread's context, innermost frame first.
    pub fn stack_trace(&self, max_frames: u32) -> BridgeResult<Vec<NativeStackFrame>>
    {
        let capacity = max_frames.clamp(1, MAX_STACK_FRAMES);
        let mut frames = vec![NativeStackFrame::zeroed(); capacity as usize];
        let mut filled = 0u32;
        // SAFETY: valid interface pointer; `frames` holds `capacity` records.
        let hr = unsafe {
            (self.iface.vtbl().get_stack_trace)(self.iface.as_raw(), 0, 0, 0, frames.as_mut_ptr(), capacity, &mut filled)
        };
        check(hr, "IDebugControl::GetStackTrace")?;
        frames.truncate(filled.min(capacity) as usize);
        Ok(frames)
    }

    /// `GetActualProcessorType`
    pub fn actual_processor_type(&self) -> BridgeResult<Architecture>
    {
        let mut machine = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (self.iface.vtbl().get_actual_processor_type)(self.iface.as_raw(), &mut machine) };
        check(hr, "IDebugControl::GetActualProcessorType")?;
        Ok(Architecture::from_machine(machine))
    }

    /// `GetPageSize`
    pub fn page_size(&self) -> BridgeResult<u32>
    {
        let mut size = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (self.iface.vtbl().get_page_size)(self.iface.as_raw(), &mut size) };
        check(hr, "IDebugControl::GetPageSize")?;
        if size == 0 || !size.is_power_of_two() {
            return Err(BridgeError::engine(E_UNEXPECTED, "IDebugControl::GetPageSize"));
        }
        Ok(size)
    }

    /// `IsPointer64Bit`: `S_OK` means yes, `S_FALSE` means no.
    pub fn is_pointer_64bit(&self) -> BridgeResult<bool>
    {
        // SAFETY: valid interface pointer.
        let hr = unsafe { (self.iface.vtbl().is_pointer_64bit)(self.iface.as_raw()) };
        check(hr, "IDebugControl::IsPointer64Bit")?;
        Ok(hr == S_OK)
    }

    /// `GetCurrentTimeDate` (v2), seconds since 1970 on the target.
    pub fn current_time_date(&self) -> BridgeResult<u32>
    {
        const OP: &str = "IDebugControl2::GetCurrentTimeDate";
        self.iface.require(2, OP)?;
        // SAFETY: version checked above.
        let vtbl = unsafe { self.iface.extended::<IDebugControl2Vtbl>() };
        let mut value = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (vtbl.get_current_time_date)(self.iface.as_raw(), &mut value) };
        check(hr, OP)?;
        Ok(value)
    }

    /// `GetDumpFormatFlags` (v2)
    pub fn dump_format_flags(&self) -> BridgeResult<u32>
    {
        const OP: &str = "IDebugControl2::GetDumpFormatFlags";
        self.iface.require(2, OP)?;
        // SAFETY: version checked above.
        let vtbl = unsafe { self.iface.extended::<IDebugControl2Vtbl>() };
        let mut flags = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (vtbl.get_dump_format_flags)(self.iface.as_raw(), &mut flags) };
        check(hr, OP)?;
        Ok(flags)
    }

    /// `GetNumberEvents` (v3): events in the current target (dumps may hold several).
    pub fn number_events(&self) -> BridgeResult<u32>
    {
        const OP: &str = "IDebugControl3::GetNumberEvents";
        self.iface.require(3, OP)?;
        // SAFETY: version checked above.
        let vtbl = unsafe { self.iface.extended::<IDebugControl3Vtbl>() };
        let mut events = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (vtbl.get_number_events)(self.iface.as_raw(), &mut events) };
        check(hr, OP)?;
        Ok(events)
    }
}

/// `SetInterrupt` through a bare interface pointer.
///
/// # Safety
///
/// `control` must be a live `IDebugControl` pointer.
pub(crate) unsafe fn set_interrupt_raw(control: NonNull<c_void>, flags: u32) -> HRESULT
{
    let vtbl = &**control.as_ptr().cast::<*const IDebugControlVtbl>();
    (vtbl.set_interrupt)(control.as_ptr(), flags)
}
