//! # Engine Status Codes
//!
//! Every engine method returns a 32-bit `HRESULT`. This module converts those
//! codes into a closed [`StatusKind`] classification so the rest of the crate
//! can match on meaning instead of magic numbers.
//!
//! The mapping table ([`STATUS_TABLE`]) is part of the compatibility surface:
//! it lists every code the engine documents for the operations this crate
//! calls. Codes outside the table classify as [`StatusKind::Unknown`] with the
//! raw value preserved.
//!
//! ## Layout of an `HRESULT`
//!
//! - bit 31: severity (1 = failure)
//! - bits 16-26: facility (7 = `FACILITY_WIN32`)
//! - bits 0-15: code
//!
//! ## References
//!
//! - [Structure of COM error codes](https://learn.microsoft.com/windows/win32/com/structure-of-com-error-codes)

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

/// Raw native status code.
#[allow(clippy::upper_case_acronyms)]
pub type HRESULT = i32;

/// Operation succeeded.
pub const S_OK: HRESULT = 0;
/// Operation succeeded with a qualified result (truncated buffer, "no").
pub const S_FALSE: HRESULT = 1;
/// Not implemented by this engine build.
pub const E_NOTIMPL: HRESULT = 0x8000_4001_u32 as i32;
/// Interface not supported (`QueryInterface` miss).
pub const E_NOINTERFACE: HRESULT = 0x8000_4002_u32 as i32;
/// Invalid pointer argument.
pub const E_POINTER: HRESULT = 0x8000_4003_u32 as i32;
/// Operation aborted (interrupt).
pub const E_ABORT: HRESULT = 0x8000_4004_u32 as i32;
/// Unspecified failure.
pub const E_FAIL: HRESULT = 0x8000_4005_u32 as i32;
/// The data necessary to complete the operation is not yet available.
pub const E_PENDING: HRESULT = 0x8000_000A_u32 as i32;
/// Catastrophic or state-dependent failure (no target, engine busy).
pub const E_UNEXPECTED: HRESULT = 0x8000_FFFF_u32 as i32;
/// Access denied.
pub const E_ACCESSDENIED: HRESULT = 0x8007_0005_u32 as i32;
/// Out of memory.
pub const E_OUTOFMEMORY: HRESULT = 0x8007_000E_u32 as i32;
/// One or more arguments are invalid.
pub const E_INVALIDARG: HRESULT = 0x8007_0057_u32 as i32;

/// `ERROR_READ_FAULT`
pub const ERROR_READ_FAULT: u32 = 30;
/// `ERROR_SEM_TIMEOUT`
pub const ERROR_SEM_TIMEOUT: u32 = 121;
/// `ERROR_PARTIAL_COPY`
pub const ERROR_PARTIAL_COPY: u32 = 299;
/// `ERROR_NOACCESS`
pub const ERROR_NOACCESS: u32 = 998;
/// `ERROR_TIMEOUT`
pub const ERROR_TIMEOUT: u32 = 1460;

/// Equivalent of the `HRESULT_FROM_WIN32` macro.
#[must_use]
pub const fn hresult_from_win32(error: u32) -> HRESULT
{
    if error == 0 {
        S_OK
    } else {
        ((error & 0xFFFF) | (7 << 16) | 0x8000_0000) as i32
    }
}

/// Classification of a native status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind
{
    /// `S_OK`
    Ok,
    /// `S_FALSE`: success with a qualified answer
    False,
    /// `E_FAIL`
    Fail,
    /// `E_INVALIDARG`
    InvalidArgument,
    /// `E_NOINTERFACE`
    NoInterface,
    /// `E_NOTIMPL`
    NotImplemented,
    /// `E_OUTOFMEMORY`
    OutOfMemory,
    /// `E_UNEXPECTED`
    Unexpected,
    /// `E_PENDING`
    Pending,
    /// `E_ACCESSDENIED`
    AccessDenied,
    /// `E_POINTER`
    Pointer,
    /// `E_ABORT`
    Abort,
    /// `ERROR_READ_FAULT` / `ERROR_NOACCESS`
    ReadFault,
    /// `ERROR_PARTIAL_COPY`
    PartialCopy,
    /// `ERROR_SEM_TIMEOUT` / `ERROR_TIMEOUT`
    Timeout,
    /// Any code not in [`STATUS_TABLE`]
    Unknown,
}

/// Documented codes and their classification.
pub const STATUS_TABLE: &[(HRESULT, StatusKind, &str)] = &[
    (S_OK, StatusKind::Ok, "S_OK"),
    (S_FALSE, StatusKind::False, "S_FALSE"),
    (E_FAIL, StatusKind::Fail, "E_FAIL"),
    (E_INVALIDARG, StatusKind::InvalidArgument, "E_INVALIDARG"),
    (E_NOINTERFACE, StatusKind::NoInterface, "E_NOINTERFACE"),
    (E_NOTIMPL, StatusKind::NotImplemented, "E_NOTIMPL"),
    (E_OUTOFMEMORY, StatusKind::OutOfMemory, "E_OUTOFMEMORY"),
    (E_UNEXPECTED, StatusKind::Unexpected, "E_UNEXPECTED"),
    (E_PENDING, StatusKind::Pending, "E_PENDING"),
    (E_ACCESSDENIED, StatusKind::AccessDenied, "E_ACCESSDENIED"),
    (E_POINTER, StatusKind::Pointer, "E_POINTER"),
    (E_ABORT, StatusKind::Abort, "E_ABORT"),
    (hresult_from_win32(ERROR_READ_FAULT), StatusKind::ReadFault, "ERROR_READ_FAULT"),
    (hresult_from_win32(ERROR_NOACCESS), StatusKind::ReadFault, "ERROR_NOACCESS"),
    (hresult_from_win32(ERROR_PARTIAL_COPY), StatusKind::PartialCopy, "ERROR_PARTIAL_COPY"),
    (hresult_from_win32(ERROR_SEM_TIMEOUT), StatusKind::Timeout, "ERROR_SEM_TIMEOUT"),
    (hresult_from_win32(ERROR_TIMEOUT), StatusKind::Timeout, "ERROR_TIMEOUT"),
];

static STATUS_INDEX: Lazy<HashMap<HRESULT, (StatusKind, &'static str)>> =
    Lazy::new(|| STATUS_TABLE.iter().map(|&(code, kind, name)| (code, (kind, name))).collect());

/// Typed wrapper around a native status code.
///
/// ```rust
/// use dbgbridge_core::platform::hresult::{HResult, StatusKind, E_INVALIDARG};
///
/// let code = HResult::from(E_INVALIDARG);
/// assert!(code.failed());
/// assert_eq!(code.kind(), StatusKind::InvalidArgument);
/// assert_eq!(code.to_string(), "0x80070057 (E_INVALIDARG)");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HResult(pub HRESULT);

impl HResult
{
    /// Raw value.
    #[must_use]
    pub const fn raw(self) -> HRESULT
    {
        self.0
    }

    /// `SUCCEEDED(hr)`
    #[must_use]
    pub const fn succeeded(self) -> bool
    {
        self.0 >= 0
    }

    /// `FAILED(hr)`
    #[must_use]
    pub const fn failed(self) -> bool
    {
        self.0 < 0
    }

    /// Classify via [`STATUS_TABLE`].
    #[must_use]
    pub fn kind(self) -> StatusKind
    {
        STATUS_INDEX.get(&self.0).map_or(StatusKind::Unknown, |(kind, _)| *kind)
    }

    /// Symbolic name if the code is documented.
    #[must_use]
    pub fn name(self) -> Option<&'static str>
    {
        STATUS_INDEX.get(&self.0).map(|(_, name)| *name)
    }

    /// Codes after which an idempotent query may be retried once.
    #[must_use]
    pub fn is_transient(self) -> bool
    {
        matches!(self.kind(), StatusKind::Pending | StatusKind::Timeout)
    }

    /// Codes the engine uses when a virtual address range is not mapped.
    #[must_use]
    pub fn is_read_failure(self) -> bool
    {
        matches!(self.kind(), StatusKind::ReadFault | StatusKind::PartialCopy | StatusKind::Fail)
    }
}

impl From<HRESULT> for HResult
{
    fn from(code: HRESULT) -> Self
    {
        HResult(code)
    }
}

impl fmt::Display for HResult
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        #[allow(clippy::cast_sign_loss)]
        let bits = self.0 as u32;
        match self.name() {
            Some(name) => write!(f, "0x{bits:08x} ({name})"),
            None => write!(f, "0x{bits:08x}"),
        }
    }
}

impl fmt::Debug for HResult
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "HResult({self})")
    }
}

/// Turn a native return value into `Ok(())` or a [`BridgeError::Engine`](crate::error::BridgeError).
///
/// `S_FALSE` and other success codes are `Ok`; callers that care about the
/// qualified answer inspect the raw code themselves.
pub(crate) fn check(code: HRESULT, operation: &'static str) -> crate::error::BridgeResult<()>
{
    if code < 0 {
        Err(crate::error::BridgeError::engine(code, operation))
    } else {
        Ok(())
    }
}
