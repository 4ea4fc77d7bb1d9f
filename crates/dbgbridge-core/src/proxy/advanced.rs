//! `IDebugAdvanced*` proxy: raw thread context.

use std::ptr;

use super::{negotiate, InterfaceGroup, InterfaceProxy};
use crate::abi::context::CONTEXT_FULL;
use crate::abi::vtables::{
    IDebugAdvancedVtbl, IDebugClientVtbl, IID_IDEBUG_ADVANCED, IID_IDEBUG_ADVANCED2, IID_IDEBUG_ADVANCED3,
};
use crate::abi::{AbiRecord, Amd64Context, Guid};
use crate::error::BridgeResult;
use crate::platform::hresult::check;

/// Advanced versions, newest first.
pub(crate) const VERSIONS: &[(u32, Guid)] =
    &[(3, IID_IDEBUG_ADVANCED3), (2, IID_IDEBUG_ADVANCED2), (1, IID_IDEBUG_ADVANCED)];

/// Proxy for `IDebugAdvanced` .. `IDebugAdvanced3`.
#[derive(Debug)]
pub struct AdvancedProxy
{
    iface: InterfaceProxy<IDebugAdvancedVtbl>,
}

impl AdvancedProxy
{
    pub(crate) fn negotiate(root: &InterfaceProxy<IDebugClientVtbl>) -> BridgeResult<Self>
    {
        Ok(Self {
            iface: negotiate(root, InterfaceGroup::Advanced, VERSIONS)?,
        })
    }

    /// Negotiated version.
    #[must_use]
    pub fn version(&self) -> u32
    {
        self.iface.version()
    }

    /// `GetThreadContext` for the current thread, as an AMD64 record.
    pub fn thread_context(&self) -> BridgeResult<Amd64Context>
    {
        let mut context = Amd64Context::with_flags(CONTEXT_FULL);
        // SAFETY: valid interface pointer; `context` is an aligned buffer of the stated size.
        let hr = unsafe {
            (self.iface.vtbl().get_thread_context)(
                self.iface.as_raw(),
                ptr::from_mut(&mut context).cast(),
                Amd64Context::SIZE as u32,
            )
        };
        check(hr, "IDebugAdvanced::GetThreadContext")?;
        Ok(context)
    }

    /// `SetThreadContext` for the current thread.
    pub fn set_thread_context(&self, context: &Amd64Context) -> BridgeResult<()>
    {
        // SAFETY: valid interface pointer; `context` is a record of the stated size.
        let hr = unsafe {
            (self.iface.vtbl().set_thread_context)(
                self.iface.as_raw(),
                ptr::from_ref(context).cast(),
                Amd64Context::SIZE as u32,
            )
        };
        check(hr, "IDebugAdvanced::SetThreadContext")
    }
}
