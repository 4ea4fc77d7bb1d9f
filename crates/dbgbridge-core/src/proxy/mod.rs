//! # Interface Proxy Layer
//!
//! Typed wrappers around the engine's versioned interfaces. Each proxy owns
//! exactly one native interface reference and releases it exactly once when
//! dropped. Proxies are neither `Clone` nor `Send`: the engine requires every
//! call for a connection to happen on one thread, and the session that owns
//! the proxies enforces that.
//!
//! ## Version negotiation
//!
//! Each interface group (client, control, symbols, ...) has several versions,
//! each a strict extension of the previous one. At connect time the session
//! asks the root client for the newest version first and falls back to older
//! ones ([`negotiate`]). The ordinal that succeeded is stored on the proxy;
//! operations that need a newer version return
//! [`BridgeError::UnsupportedOperation`] instead of calling through a vtable
//! slot the engine never provided.
//!
//! ## Result codes
//!
//! Every native call returns an `HRESULT`. Proxies turn failures into
//! [`BridgeError::Engine`] with the native method name attached, and keep
//! `S_FALSE` visible where it carries meaning (truncated buffers, "no").

pub mod advanced;
pub mod client;
pub mod control;
pub mod data_spaces;
pub mod symbols;
pub mod system_objects;

use std::ffi::{c_char, c_void};
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use tracing::debug;

pub use advanced::AdvancedProxy;
pub use client::{ClientProxy, EndSessionMode};
pub use control::{ControlProxy, LastEvent};
pub use data_spaces::DataSpacesProxy;
pub use symbols::{ModuleNames, SymbolsProxy};
pub use system_objects::SystemObjectsProxy;

use crate::abi::guid::Guid;
use crate::abi::vtables::{ComInterface, IDebugClientVtbl};
use crate::error::{BridgeError, BridgeResult};
use crate::platform::hresult::{check, HResult, StatusKind, HRESULT, S_FALSE};

/// Interface families the session negotiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceGroup
{
    /// `IDebugClient*`
    Client,
    /// `IDebugControl*`
    Control,
    /// `IDebugSymbols*`
    Symbols,
    /// `IDebugDataSpaces*`
    DataSpaces,
    /// `IDebugAdvanced*`
    Advanced,
    /// `IDebugSystemObjects*`
    SystemObjects,
}

impl InterfaceGroup
{
    /// Acquisition order at connect time. Teardown runs in reverse.
    pub const ALL: [InterfaceGroup; 6] = [
        InterfaceGroup::Client,
        InterfaceGroup::Control,
        InterfaceGroup::Symbols,
        InterfaceGroup::DataSpaces,
        InterfaceGroup::Advanced,
        InterfaceGroup::SystemObjects,
    ];

    /// Native interface base name.
    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            InterfaceGroup::Client => "IDebugClient",
            InterfaceGroup::Control => "IDebugControl",
            InterfaceGroup::Symbols => "IDebugSymbols",
            InterfaceGroup::DataSpaces => "IDebugDataSpaces",
            InterfaceGroup::Advanced => "IDebugAdvanced",
            InterfaceGroup::SystemObjects => "IDebugSystemObjects",
        }
    }
}

impl fmt::Display for InterfaceGroup
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

/// Version ordinal negotiated for each interface group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NegotiatedVersions
{
    pub client: u32,
    pub control: u32,
    pub symbols: u32,
    pub data_spaces: u32,
    pub advanced: u32,
    pub system_objects: u32,
}

impl NegotiatedVersions
{
    /// Version for `group`.
    #[must_use]
    pub const fn get(&self, group: InterfaceGroup) -> u32
    {
        match group {
            InterfaceGroup::Client => self.client,
            InterfaceGroup::Control => self.control,
            InterfaceGroup::Symbols => self.symbols,
            InterfaceGroup::DataSpaces => self.data_spaces,
            InterfaceGroup::Advanced => self.advanced,
            InterfaceGroup::SystemObjects => self.system_objects,
        }
    }
}

/// One owned native interface reference.
///
/// `V` is the version-1 vtable of the group; [`InterfaceProxy::extended`]
/// reinterprets it as a newer version after the caller has checked the
/// negotiated ordinal.
pub struct InterfaceProxy<V: ComInterface>
{
    raw: NonNull<c_void>,
    group: InterfaceGroup,
    version: u32,
    _marker: PhantomData<*const V>,
}

impl<V: ComInterface> InterfaceProxy<V>
{
    /// Take ownership of one reference.
    ///
    /// # Safety
    ///
    /// `raw` must point to a live object implementing the interface `V` at
    /// `version` or newer, with one reference owned by the caller.
    pub(crate) unsafe fn from_raw(raw: NonNull<c_void>, group: InterfaceGroup, version: u32) -> Self
    {
        Self {
            raw,
            group,
            version,
            _marker: PhantomData,
        }
    }

    /// Negotiated version ordinal.
    #[must_use]
    pub fn version(&self) -> u32
    {
        self.version
    }

    /// Interface group this proxy belongs to.
    #[must_use]
    pub fn group(&self) -> InterfaceGroup
    {
        self.group
    }

    pub(crate) fn as_raw(&self) -> *mut c_void
    {
        self.raw.as_ptr()
    }

    pub(crate) fn vtbl(&self) -> &V
    {
        // SAFETY: a native interface pointer points at its vtable pointer.
        unsafe { &**self.raw.as_ptr().cast::<*const V>() }
    }

    /// Reinterpret the vtable as the newer version `E`.
    ///
    /// # Safety
    ///
    /// `E` must be a version of this group no newer than [`Self::version`].
    pub(crate) unsafe fn extended<E: ComInterface>(&self) -> &E
    {
        &**self.raw.as_ptr().cast::<*const E>()
    }

    /// Fail with `UnsupportedOperation` unless the negotiated version is at least `required`.
    pub(crate) fn require(&self, required: u32, operation: &'static str) -> BridgeResult<()>
    {
        if self.version >= required {
            Ok(())
        } else {
            Err(BridgeError::UnsupportedOperation {
                operation,
                group: self.group,
                required,
                negotiated: self.version,
            })
        }
    }

    /// `QueryInterface` for `iid`. `Ok(None)` when the object does not implement it.
    pub(crate) fn query_raw(&self, iid: &Guid) -> BridgeResult<Option<NonNull<c_void>>>
    {
        let mut out: *mut c_void = ptr::null_mut();
        // SAFETY: valid interface pointer, valid IID and out slot.
        let hr = unsafe { (self.vtbl().unknown().query_interface)(self.as_raw(), iid, &mut out) };
        if HResult(hr).kind() == StatusKind::NoInterface {
            return Ok(None);
        }
        check(hr, "IUnknown::QueryInterface")?;
        Ok(NonNull::new(out))
    }
}

impl<V: ComInterface> Drop for InterfaceProxy<V>
{
    fn drop(&mut self)
    {
        // SAFETY: this proxy owns exactly one reference.
        let remaining = unsafe { (self.vtbl().unknown().release)(self.as_raw()) };
        debug!("Released {} v{} ({} references remain)", self.group, self.version, remaining);
    }
}

impl<V: ComInterface> fmt::Debug for InterfaceProxy<V>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("InterfaceProxy")
            .field("interface", &V::NAME)
            .field("version", &self.version)
            .field("raw", &self.raw)
            .finish()
    }
}

/// Ask `root` for the newest version of a group.
///
/// `versions` lists `(ordinal, iid)` pairs, newest first.
pub(crate) fn negotiate<V: ComInterface>(
    root: &InterfaceProxy<IDebugClientVtbl>,
    group: InterfaceGroup,
    versions: &[(u32, Guid)],
) -> BridgeResult<InterfaceProxy<V>>
{
    for &(version, iid) in versions {
        match root.query_raw(&iid)? {
            Some(raw) => {
                debug!("Negotiated {group} v{version}");
                // SAFETY: QueryInterface returned an AddRef'd pointer for this IID.
                return Ok(unsafe { InterfaceProxy::from_raw(raw, group, version) });
            }
            None => debug!("{group} v{version} not available"),
        }
    }
    Err(BridgeError::engine(crate::platform::hresult::E_NOINTERFACE, "IUnknown::QueryInterface"))
}

/// Every proxy a connected session holds.
///
/// Fields drop in declaration order, which is the reverse of acquisition
/// order, so the last interface acquired is the first released.
pub struct ProxySet
{
    pub system_objects: SystemObjectsProxy,
    pub advanced: AdvancedProxy,
    pub data_spaces: DataSpacesProxy,
    pub symbols: SymbolsProxy,
    pub control: ControlProxy,
    pub client: ClientProxy,
}

impl ProxySet
{
    /// Negotiate every group from the root client, in acquisition order.
    pub(crate) fn acquire(root: &InterfaceProxy<IDebugClientVtbl>) -> BridgeResult<Self>
    {
        let client = ClientProxy::negotiate(root)?;
        let control = ControlProxy::negotiate(root)?;
        let symbols = SymbolsProxy::negotiate(root)?;
        let data_spaces = DataSpacesProxy::negotiate(root)?;
        let advanced = AdvancedProxy::negotiate(root)?;
        let system_objects = SystemObjectsProxy::negotiate(root)?;
        Ok(Self {
            system_objects,
            advanced,
            data_spaces,
            symbols,
            control,
            client,
        })
    }

    /// Negotiated ordinals.
    #[must_use]
    pub fn versions(&self) -> NegotiatedVersions
    {
        NegotiatedVersions {
            client: self.client.version(),
            control: self.control.version(),
            symbols: self.symbols.version(),
            data_spaces: self.data_spaces.version(),
            advanced: self.advanced.version(),
            system_objects: self.system_objects.version(),
        }
    }
}

/// Most names fit in this without a second call.
const INITIAL_STRING_CAPACITY: u32 = 256;
const MAX_STRING_ATTEMPTS: usize = 4;

/// Call a native "fill this string buffer" method, growing the buffer on truncation.
///
/// `call` receives `(buffer, buffer_size, required_size_out)`. The engine
/// returns `S_FALSE` and the required size when the buffer was too small.
pub(crate) fn read_string<F>(operation: &'static str, mut call: F) -> BridgeResult<String>
where
    F: FnMut(*mut c_char, u32, *mut u32) -> HRESULT,
{
    let mut capacity = INITIAL_STRING_CAPACITY;
    for _ in 0..MAX_STRING_ATTEMPTS {
        let mut buffer = vec![0u8; capacity as usize];
        let mut required = 0u32;
        let hr = call(buffer.as_mut_ptr().cast::<c_char>(), capacity, &mut required);
        check(hr, operation)?;
        if hr == S_FALSE && required > capacity {
            capacity = required;
            continue;
        }
        return Ok(decode_c_string(&buffer));
    }
    Err(BridgeError::InvalidArgument(format!("{operation}: name kept growing past {capacity} bytes")))
}

/// Text up to the first NUL, lossily decoded.
pub(crate) fn decode_c_string(bytes: &[u8]) -> String
{
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Convert a caller string into a NUL-terminated native string.
pub(crate) fn to_c_string(value: &str, what: &str) -> BridgeResult<std::ffi::CString>
{
    std::ffi::CString::new(value).map_err(|_| BridgeError::InvalidArgument(format!("{what} contains a NUL byte")))
}

/// Buffer lengths cross the boundary as `u32`.
pub(crate) fn len_u32(len: usize, what: &str) -> BridgeResult<u32>
{
    u32::try_from(len).map_err(|_| BridgeError::InvalidArgument(format!("{what} of {len} bytes exceeds u32::MAX")))
}
