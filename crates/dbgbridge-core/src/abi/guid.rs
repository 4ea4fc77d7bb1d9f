//! Interface identifiers.

use std::fmt;

use super::AbiRecord;

/// Native `GUID` / `IID` (16 bytes).
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid
{
    /// First group (8 hex digits)
    pub data1: u32,
    /// Second group (4 hex digits)
    pub data2: u16,
    /// Third group (4 hex digits)
    pub data3: u16,
    /// Remaining 8 bytes, in display order
    pub data4: [u8; 8],
}

const _: () = assert!(std::mem::size_of::<Guid>() == 16);

// SAFETY: repr(C), integers only.
unsafe impl AbiRecord for Guid {}

impl Guid
{
    /// Build from the 128-bit value written in registry order.
    ///
    /// ```rust
    /// use dbgbridge_core::abi::Guid;
    ///
    /// let iid = Guid::from_u128(0x27fe5639_8407_4f47_8364_ee118fb08ac8);
    /// assert_eq!(iid.to_string(), "27fe5639-8407-4f47-8364-ee118fb08ac8");
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_u128(value: u128) -> Self
    {
        Self {
            data1: (value >> 96) as u32,
            data2: (value >> 80) as u16,
            data3: (value >> 64) as u16,
            data4: (value as u64).to_be_bytes(),
        }
    }
}

impl fmt::Display for Guid
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let d = &self.data4;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

impl fmt::Debug for Guid
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{{{self}}}")
    }
}
