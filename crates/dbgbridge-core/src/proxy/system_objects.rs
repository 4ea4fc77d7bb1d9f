//! `IDebugSystemObjects` proxy: threads and processes of the current target.

use super::{negotiate, InterfaceGroup, InterfaceProxy};
use crate::abi::vtables::{IDebugClientVtbl, IDebugSystemObjectsVtbl, IID_IDEBUG_SYSTEM_OBJECTS};
use crate::abi::Guid;
use crate::error::BridgeResult;
use crate::platform::hresult::check;
use crate::types::{ProcessId, ThreadId, ThreadInfo};

/// System-objects versions, newest first.
pub(crate) const VERSIONS: &[(u32, Guid)] = &[(1, IID_IDEBUG_SYSTEM_OBJECTS)];

/// Proxy for `IDebugSystemObjects`.
#[derive(Debug)]
pub struct SystemObjectsProxy
{
    iface: InterfaceProxy<IDebugSystemObjectsVtbl>,
}

impl SystemObjectsProxy
{
    pub(crate) fn negotiate(root: &InterfaceProxy<IDebugClientVtbl>) -> BridgeResult<Self>
    {
        Ok(Self {
            iface: negotiate(root, InterfaceGroup::SystemObjects, VERSIONS)?,
        })
    }

    /// Negotiated version.
    #[must_use]
    pub fn version(&self) -> u32
    {
        self.iface.version()
    }

    /// `GetEventThread`: thread that raised the last event.
    pub fn event_thread(&self) -> BridgeResult<ThreadId>
    {
        let mut id = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (self.iface.vtbl().get_event_thread)(self.iface.as_raw(), &mut id) };
        check(hr, "IDebugSystemObjects::GetEventThread")?;
        Ok(ThreadId(id))
    }

    /// `GetCurrentThreadId`
    pub fn current_thread(&self) -> BridgeResult<ThreadId>
    {
        let mut id = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (self.iface.vtbl().get_current_thread_id)(self.iface.as_raw(), &mut id) };
        check(hr, "IDebugSystemObjects::GetCurrentThreadId")?;
        Ok(ThreadId(id))
    }

    /// `SetCurrentThreadId`
    pub fn set_current_thread(&self, id: ThreadId) -> BridgeResult<()>
    {
        // SAFETY: valid interface pointer.
        let hr = unsafe { (self.iface.vtbl().set_current_thread_id)(self.iface.as_raw(), id.0) };
        check(hr, "IDebugSystemObjects::SetCurrentThreadId")
    }

    /// `GetCurrentThreadSystemId`
    pub fn current_thread_system_id(&self) -> BridgeResult<u32>
    {
        let mut id = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (self.iface.vtbl().get_current_thread_system_id)(self.iface.as_raw(), &mut id) };
        check(hr, "IDebugSystemObjects::GetCurrentThreadSystemId")?;
        Ok(id)
    }

    /// `GetCurrentProcessSystemId`
    pub fn current_process_system_id(&self) -> BridgeResult<ProcessId>
    {
        let mut id = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (self.iface.vtbl().get_current_process_system_id)(self.iface.as_raw(), &mut id) };
        check(hr, "IDebugSystemObjects::GetCurrentProcessSystemId")?;
        Ok(ProcessId(id))
    }

    /// `GetNumberThreads` in the current process.
    pub fn number_threads(&self) -> BridgeResult<u32>
    {
        let mut count = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (self.iface.vtbl().get_number_threads)(self.iface.as_raw(), &mut count) };
        check(hr, "IDebugSystemObjects::GetNumberThreads")?;
        Ok(count)
    }

    /// `GetThreadIdsByIndex`: engine and system ids for `count` threads from `start`.
    pub fn threads(&self, start: u32, count: u32) -> BridgeResult<Vec<ThreadInfo>>
    {
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut ids = vec![0u32; count as usize];
        let mut system_ids = vec![0u32; count as usize];
        // SAFETY: valid interface pointer; both arrays hold `count` entries.
        let hr = unsafe {
            (self.iface.vtbl().get_thread_ids_by_index)(
                self.iface.as_raw(),
                start,
                count,
                ids.as_mut_ptr(),
                system_ids.as_mut_ptr(),
            )
        };
        check(hr, "IDebugSystemObjects::GetThreadIdsByIndex")?;
        Ok(ids
            .into_iter()
            .zip(system_ids)
            .map(|(id, system_id)| ThreadInfo {
                id: ThreadId(id),
                system_id,
            })
            .collect())
    }
}
