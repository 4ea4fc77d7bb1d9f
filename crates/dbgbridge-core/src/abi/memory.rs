//! Virtual memory region record (`MEMORY_BASIC_INFORMATION64`).

use super::AbiRecord;

/// `MEM_COMMIT`
pub const MEM_COMMIT: u32 = 0x1000;
/// `MEM_FREE`
pub const MEM_FREE: u32 = 0x1_0000;
/// `PAGE_NOACCESS`
pub const PAGE_NOACCESS: u32 = 0x01;
/// `PAGE_GUARD`
pub const PAGE_GUARD: u32 = 0x100;

/// Native `MEMORY_BASIC_INFORMATION64` (48 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryBasicInformation64
{
    /// Start of the region
    pub base_address: u64,
    /// Start of the allocation the region belongs to
    pub allocation_base: u64,
    /// Protection the allocation was created with
    pub allocation_protect: u32,
    /// Padding present in the native layout
    pub alignment1: u32,
    /// Region length in bytes
    pub region_size: u64,
    /// `MEM_COMMIT`, `MEM_RESERVE` or `MEM_FREE`
    pub state: u32,
    /// Current page protection
    pub protect: u32,
    /// `MEM_IMAGE`, `MEM_MAPPED` or `MEM_PRIVATE`
    pub region_type: u32,
    /// Padding present in the native layout
    pub alignment2: u32,
}

const _: () = assert!(std::mem::size_of::<MemoryBasicInformation64>() == 48);

// SAFETY: repr(C), integers only.
unsafe impl AbiRecord for MemoryBasicInformation64 {}

impl MemoryBasicInformation64
{
    /// One past the last byte of the region.
    #[must_use]
    pub const fn end(&self) -> u64
    {
        self.base_address.saturating_add(self.region_size)
    }

    /// Committed and not guarded or no-access.
    #[must_use]
    pub const fn is_readable(&self) -> bool
    {
        self.state == MEM_COMMIT && self.protect & (PAGE_NOACCESS | PAGE_GUARD) == 0 && self.protect != 0
    }
}
