//! Exception record delivered with exception events.

use super::AbiRecord;

/// Maximum number of parameters carried by an exception record.
pub const EXCEPTION_MAXIMUM_PARAMETERS: usize = 15;

/// Native `EXCEPTION_RECORD64` (152 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExceptionRecord64
{
    /// `EXCEPTION_*` / `STATUS_*` code
    pub code: u32,
    /// `EXCEPTION_NONCONTINUABLE` and friends
    pub flags: u32,
    /// Address of a chained record in target memory, 0 if none
    pub record: u64,
    /// Faulting address
    pub address: u64,
    /// Number of valid entries in `information`
    pub number_parameters: u32,
    /// Padding present in the native layout
    pub unused_alignment: u32,
    /// Exception-specific parameters
    pub information: [u64; EXCEPTION_MAXIMUM_PARAMETERS],
}

const _: () = assert!(std::mem::size_of::<ExceptionRecord64>() == 152);

// SAFETY: repr(C), integers only.
unsafe impl AbiRecord for ExceptionRecord64 {}

impl ExceptionRecord64
{
    /// Valid parameters, clamped to the array length.
    #[must_use]
    pub fn parameters(&self) -> &[u64]
    {
        let count = (self.number_parameters as usize).min(EXCEPTION_MAXIMUM_PARAMETERS);
        &self.information[..count]
    }

    /// Whether execution can continue past this exception.
    #[must_use]
    pub const fn is_continuable(&self) -> bool
    {
        // EXCEPTION_NONCONTINUABLE
        self.flags & 0x1 == 0
    }
}
