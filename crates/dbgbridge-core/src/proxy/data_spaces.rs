//! `IDebugDataSpaces*` proxy: virtual memory.

use super::{len_u32, negotiate, InterfaceGroup, InterfaceProxy};
use crate::abi::vtables::{
    IDebugClientVtbl, IDebugDataSpaces2Vtbl, IDebugDataSpacesVtbl, IID_IDEBUG_DATA_SPACES, IID_IDEBUG_DATA_SPACES2,
};
use crate::abi::{AbiRecord, Guid, MemoryBasicInformation64};
use crate::error::BridgeResult;
use crate::platform::hresult::check;

/// Data-spaces versions, newest first.
pub(crate) const VERSIONS: &[(u32, Guid)] = &[(2, IID_IDEBUG_DATA_SPACES2), (1, IID_IDEBUG_DATA_SPACES)];

/// Proxy for `IDebugDataSpaces` .. `IDebugDataSpaces2`.
#[derive(Debug)]
pub struct DataSpacesProxy
{
    iface: InterfaceProxy<IDebugDataSpacesVtbl>,
}

impl DataSpacesProxy
{
    pub(crate) fn negotiate(root: &InterfaceProxy<IDebugClientVtbl>) -> BridgeResult<Self>
    {
        Ok(Self {
            iface: negotiate(root, InterfaceGroup::DataSpaces, VERSIONS)?,
        })
    }

    /// Negotiated version.
    #[must_use]
    pub fn version(&self) -> u32
    {
        self.iface.version()
    }

    /// `ReadVirtual` into `buffer`; returns the number of bytes the engine filled.
    pub fn read_virtual(&self, offset: u64, buffer: &mut [u8]) -> BridgeResult<usize>
    {
        let size = len_u32(buffer.len(), "read")?;
        let mut read = 0u32;
        // SAFETY: valid interface pointer; `buffer` holds `size` bytes.
        let hr = unsafe {
            (self.iface.vtbl().read_virtual)(self.iface.as_raw(), offset, buffer.as_mut_ptr().cast(), size, &mut read)
        };
        check(hr, "IDebugDataSpaces::ReadVirtual")?;
        Ok((read as usize).min(buffer.len()))
    }

    /// `WriteVirtual`; returns the number of bytes written.
    pub fn write_virtual(&self, offset: u64, data: &[u8]) -> BridgeResult<usize>
    {
        let size = len_u32(data.len(), "write")?;
        let mut written = 0u32;
        // SAFETY: valid interface pointer; `data` holds `size` bytes.
        let hr = unsafe {
            (self.iface.vtbl().write_virtual)(self.iface.as_raw(), offset, data.as_ptr().cast(), size, &mut written)
        };
        check(hr, "IDebugDataSpaces::WriteVirtual")?;
        Ok((written as usize).min(data.len()))
    }

    /// `ReadPointersVirtual`: `count` target pointers, each widened to 64 bits.
    pub fn read_pointers_virtual(&self, count: usize, offset: u64) -> BridgeResult<Vec<u64>>
    {
        let native_count = len_u32(count, "pointer read")?;
        let mut pointers = vec![0u64; count];
        // SAFETY: valid interface pointer; `pointers` holds `count` entries.
        let hr = unsafe {
            (self.iface.vtbl().read_pointers_virtual)(self.iface.as_raw(), native_count, offset, pointers.as_mut_ptr())
        };
        check(hr, "IDebugDataSpaces::ReadPointersVirtual")?;
        Ok(pointers)
    }

    /// `QueryVirtual` (v2): region containing `offset`.
    pub fn query_virtual(&self, offset: u64) -> BridgeResult<MemoryBasicInformation64>
    {
        const OP: &str = "IDebugDataSpaces2::QueryVirtual";
        self.iface.require(2, OP)?;
        // SAFETY: version checked above.
        let vtbl = unsafe { self.iface.extended::<IDebugDataSpaces2Vtbl>() };
        let mut info = MemoryBasicInformation64::zeroed();
        // SAFETY: valid interface pointer and out record.
        let hr = unsafe { (vtbl.query_virtual)(self.iface.as_raw(), offset, &mut info) };
        check(hr, OP)?;
        Ok(info)
    }
}
