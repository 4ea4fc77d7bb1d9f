//! # Engine Loader
//!
//! Locates the engine's `DebugCreate` entry point and produces the root
//! `IDebugClient` pointer a session starts from.
//!
//! The engine normally ships as a shared library (`dbgeng.dll`). Hosts that
//! already hold a resolved entry point, or that embed a different engine
//! build, can bypass library loading through [`EngineSource`].

use std::ffi::c_void;
use std::fmt;
use std::path::PathBuf;
use std::ptr::{self, NonNull};

use libloading::Library;
use tracing::debug;

use crate::abi::guid::Guid;
use crate::abi::vtables::IID_IDEBUG_CLIENT;
use crate::error::{BridgeError, BridgeResult};
use crate::platform::hresult::{check, HRESULT};

/// Signature of `DebugCreate(REFIID InterfaceId, PVOID* Interface)`.
pub type DebugCreateFn = unsafe extern "system" fn(iid: *const Guid, interface: *mut *mut c_void) -> HRESULT;

/// Constructor that yields a root `IDebugClient` pointer with one reference owned by the caller.
pub type EngineConstructor = Box<dyn FnOnce() -> BridgeResult<NonNull<c_void>> + Send>;

/// Base name of the engine library, without platform prefix/suffix.
pub const ENGINE_LIBRARY_NAME: &str = "dbgeng";

/// Where a session obtains its engine connection.
pub enum EngineSource
{
    /// Load the engine from the platform's library search path.
    SystemLibrary,
    /// Load the engine from an explicit path.
    Library(PathBuf),
    /// Call an already-resolved `DebugCreate`.
    Entry(DebugCreateFn),
    /// Arbitrary constructor, run on the session thread.
    Custom(EngineConstructor),
}

impl Default for EngineSource
{
    fn default() -> Self
    {
        Self::SystemLibrary
    }
}

impl fmt::Debug for EngineSource
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Self::SystemLibrary => f.write_str("SystemLibrary"),
            Self::Library(path) => f.debug_tuple("Library").field(path).finish(),
            Self::Entry(entry) => f.debug_tuple("Entry").field(&(*entry as *const c_void)).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A loaded engine library. Must outlive every interface obtained from it.
pub(crate) struct EngineLibrary
{
    _library: Library,
}

/// Result of loading: the root client plus the library that backs it (if any).
pub(crate) struct LoadedEngine
{
    pub root: NonNull<c_void>,
    pub library: Option<EngineLibrary>,
}

/// Resolve `source` into a root `IDebugClient`.
pub(crate) fn load(source: EngineSource) -> BridgeResult<LoadedEngine>
{
    match source {
        EngineSource::SystemLibrary => load_library(PathBuf::from(libloading::library_filename(ENGINE_LIBRARY_NAME))),
        EngineSource::Library(path) => load_library(path),
        EngineSource::Entry(entry) => Ok(LoadedEngine {
            root: create_with(entry)?,
            library: None,
        }),
        EngineSource::Custom(constructor) => Ok(LoadedEngine {
            root: constructor()?,
            library: None,
        }),
    }
}

fn load_library(path: PathBuf) -> BridgeResult<LoadedEngine>
{
    debug!("Loading debugger engine from {}", path.display());
    // SAFETY: loading the engine runs its initialisers; the library is kept
    // alive in `EngineLibrary` for as long as any interface obtained from it.
    let library = unsafe { Library::new(&path) }
        .map_err(|err| BridgeError::EngineUnavailable(format!("{}: {err}", path.display())))?;

    // SAFETY: the symbol type matches the documented `DebugCreate` signature.
    let entry: DebugCreateFn = unsafe {
        *library
            .get::<DebugCreateFn>(b"DebugCreate\0")
            .map_err(|err| BridgeError::EngineUnavailable(format!("DebugCreate not exported: {err}")))?
    };

    let root = create_with(entry)?;
    Ok(LoadedEngine {
        root,
        library: Some(EngineLibrary { _library: library }),
    })
}

fn create_with(entry: DebugCreateFn) -> BridgeResult<NonNull<c_void>>
{
    let mut raw: *mut c_void = ptr::null_mut();
    // SAFETY: `entry` follows the DebugCreate contract; `raw` is a valid out slot.
    let hr = unsafe { entry(&IID_IDEBUG_CLIENT, &mut raw) };
    check(hr, "DebugCreate")?;
    NonNull::new(raw).ok_or_else(|| BridgeError::EngineUnavailable("DebugCreate returned a null client".to_string()))
}
