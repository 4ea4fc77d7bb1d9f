//! # ABI Struct Layer
//!
//! Fixed-layout value types that mirror the engine's binary records
//! byte-for-byte, plus the vtable declarations for every interface version
//! the crate talks to.
//!
//! ## Layout contract
//!
//! - Every record is `#[repr(C)]` with fields in native order.
//! - Reserved regions are declared explicitly and copied through untouched.
//! - Each record's size is pinned by a `const` assertion, so a layout
//!   mistake is a compile error rather than memory corruption at runtime.
//! - Field offsets are checked in `tests/layout.rs`.
//!
//! Records use fixed-width fields only, so their layout is identical for
//! 32-bit and 64-bit hosts. Vtables are arrays of pointers and scale with the
//! host pointer width.

pub mod context;
pub mod exception;
pub mod guid;
pub mod memory;
pub mod module;
pub mod stack;
pub mod vtables;

use std::mem::size_of;
use std::ptr;

pub use context::Amd64Context;
pub use exception::ExceptionRecord64;
pub use guid::Guid;
pub use memory::MemoryBasicInformation64;
pub use module::{ModuleDescriptor, ModuleNameKind, SymbolType};
pub use stack::NativeStackFrame;

use crate::error::{BridgeError, BridgeResult};

/// A plain-old-data record exchanged with the engine.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]`, contain no pointers or references, and
/// accept every bit pattern as a valid value.
pub unsafe trait AbiRecord: Copy + 'static
{
    /// Native size in bytes.
    const SIZE: usize = size_of::<Self>();

    /// All-zero value, the state the engine expects for out-parameters.
    #[must_use]
    fn zeroed() -> Self
    {
        // SAFETY: the trait contract guarantees all-zero is a valid value.
        unsafe { std::mem::zeroed() }
    }

    /// Copy the record into its exact native byte representation.
    #[must_use]
    fn to_bytes(&self) -> Vec<u8>
    {
        let mut bytes = vec![0u8; Self::SIZE];
        // SAFETY: `bytes` holds exactly `SIZE` bytes; `Self` has no padding
        // the engine would not also see.
        unsafe {
            ptr::copy_nonoverlapping(ptr::from_ref(self).cast::<u8>(), bytes.as_mut_ptr(), Self::SIZE);
        }
        bytes
    }

    /// Read a record from native bytes.
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` if `bytes` is shorter than [`AbiRecord::SIZE`].
    fn from_bytes(bytes: &[u8]) -> BridgeResult<Self>
    {
        if bytes.len() < Self::SIZE {
            return Err(BridgeError::InvalidArgument(format!(
                "record needs {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            )));
        }
        // SAFETY: length checked above; every bit pattern is valid for `Self`.
        Ok(unsafe { ptr::read_unaligned(bytes.as_ptr().cast::<Self>()) })
    }
}
