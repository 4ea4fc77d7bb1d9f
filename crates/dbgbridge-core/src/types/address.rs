//! Target address type.

use std::fmt;
use std::ops::{Add, Sub};

/// Strongly typed address in the target's virtual address space
///
/// Target addresses are always 64-bit, even when the target itself is a
/// 32-bit process: the engine sign-extends 32-bit pointers into 64-bit
/// offsets. Wrapping them keeps addresses from being mixed up with sizes,
/// displacements, or thread ids.
///
/// ## Example
///
/// ```rust
/// use dbgbridge_core::types::Address;
///
/// let base = Address::from(0x7ff6_0000_0000);
/// let rip = base + 0x1a40;
/// assert_eq!(rip.offset_from(base), Some(0x1a40));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// Usable in const contexts, unlike `Address::from`.
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Add an offset, returning `None` on overflow
    ///
    /// ```rust
    /// use dbgbridge_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Subtract an offset, returning `None` on underflow
    pub fn checked_sub(self, offset: u64) -> Option<Self>
    {
        self.0.checked_sub(offset).map(Address)
    }

    /// Add an offset, saturating at `u64::MAX`
    pub fn saturating_add(self, offset: u64) -> Self
    {
        Address(self.0.saturating_add(offset))
    }

    /// Distance from `base` to this address, `None` if `base` is above it
    pub fn offset_from(self, base: Address) -> Option<u64>
    {
        self.0.checked_sub(base.0)
    }

    /// Round down to a multiple of `alignment` (a power of two)
    ///
    /// ```rust
    /// use dbgbridge_core::types::Address;
    ///
    /// assert_eq!(Address::from(0x1fff).align_down(0x1000), Address::from(0x1000));
    /// ```
    pub const fn align_down(self, alignment: u64) -> Self
    {
        Address(self.0 & !(alignment.wrapping_sub(1)))
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

impl Sub<u64> for Address
{
    type Output = Address;

    fn sub(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_sub(rhs))
    }
}
