//! `IDebugSymbols*` proxy: modules, names, symbol path.

use std::ffi::c_char;
use std::ptr;

use tracing::debug;

use super::{negotiate, read_string, to_c_string, InterfaceGroup, InterfaceProxy};
use crate::abi::vtables::{
    IDebugClientVtbl, IDebugSymbols2Vtbl, IDebugSymbolsVtbl, IID_IDEBUG_SYMBOLS, IID_IDEBUG_SYMBOLS2,
};
use crate::abi::{AbiRecord, Guid, ModuleDescriptor, ModuleNameKind};
use crate::error::{BridgeError, BridgeResult};
use crate::platform::hresult::check;
use crate::types::SymbolOptions;

/// Symbols versions, newest first.
pub(crate) const VERSIONS: &[(u32, Guid)] = &[(2, IID_IDEBUG_SYMBOLS2), (1, IID_IDEBUG_SYMBOLS)];

/// The three names `GetModuleNames` reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleNames
{
    pub image: Option<String>,
    pub module: Option<String>,
    pub loaded_image: Option<String>,
}

/// Proxy for `IDebugSymbols` .. `IDebugSymbols2`.
#[derive(Debug)]
pub struct SymbolsProxy
{
    iface: InterfaceProxy<IDebugSymbolsVtbl>,
}

impl SymbolsProxy
{
    pub(crate) fn negotiate(root: &InterfaceProxy<IDebugClientVtbl>) -> BridgeResult<Self>
    {
        Ok(Self {
            iface: negotiate(root, InterfaceGroup::Symbols, VERSIONS)?,
        })
    }

    /// Negotiated version.
    #[must_use]
    pub fn version(&self) -> u32
    {
        self.iface.version()
    }

    /// `GetSymbolOptions`
    pub fn symbol_options(&self) -> BridgeResult<SymbolOptions>
    {
        let mut options = 0u32;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (self.iface.vtbl().get_symbol_options)(self.iface.as_raw(), &mut options) };
        check(hr, "IDebugSymbols::GetSymbolOptions")?;
        Ok(SymbolOptions::from_bits_retain(options))
    }

    /// `SetSymbolOptions`
    pub fn set_symbol_options(&self, options: SymbolOptions) -> BridgeResult<()>
    {
        // SAFETY: valid interface pointer.
        let hr = unsafe { (self.iface.vtbl().set_symbol_options)(self.iface.as_raw(), options.bits()) };
        check(hr, "IDebugSymbols::SetSymbolOptions")
    }

    /// `GetNameByOffset`: `module!symbol` text and displacement.
    pub fn name_by_offset(&self, offset: u64) -> BridgeResult<(String, u64)>
    {
        let mut displacement = 0u64;
        let name = read_string("IDebugSymbols::GetNameByOffset", |buffer, size, used| {
            // SAFETY: valid interface pointer; `buffer` holds `size` bytes.
            unsafe { (self.iface.vtbl().get_name_by_offset)(self.iface.as_raw(), offset, buffer, size, used, &mut displacement) }
        })?;
        Ok((name, displacement))
    }

    /// `GetOffsetByName`
    pub fn offset_by_name(&self, symbol: &str) -> BridgeResult<u64>
    {
        let native = to_c_string(symbol, "symbol name")?;
        let mut offset = 0u64;
        // SAFETY: valid interface pointer, NUL-terminated name, valid out slot.
        let hr = unsafe { (self.iface.vtbl().get_offset_by_name)(self.iface.as_raw(), native.as_ptr(), &mut offset) };
        check(hr, "IDebugSymbols::GetOffsetByName")?;
        Ok(offset)
    }

    /// `GetNumberModules`: (loaded, unloaded).
    pub fn number_modules(&self) -> BridgeResult<(u32, u32)>
    {
        let mut loaded = 0u32;
        let mut unloaded = 0u32;
        // SAFETY: valid interface pointer and out slots.
        let hr = unsafe { (self.iface.vtbl().get_number_modules)(self.iface.as_raw(), &mut loaded, &mut unloaded) };
        check(hr, "IDebugSymbols::GetNumberModules")?;
        Ok((loaded, unloaded))
    }

    /// `GetModuleByIndex`: base address.
    pub fn module_by_index(&self, index: u32) -> BridgeResult<u64>
    {
        let mut base = 0u64;
        // SAFETY: valid interface pointer and out slot.
        let hr = unsafe { (self.iface.vtbl().get_module_by_index)(self.iface.as_raw(), index, &mut base) };
        check(hr, "IDebugSymbols::GetModuleByIndex")?;
        Ok(base)
    }

    /// `GetModuleByModuleName`: (index, base).
    pub fn module_by_name(&self, name: &str) -> BridgeResult<(u32, u64)>
    {
        let native = to_c_string(name, "module name")?;
        let mut index = 0u32;
        let mut base = 0u64;
        // SAFETY: valid interface pointer, NUL-terminated name, valid out slots.
        let hr = unsafe {
            (self.iface.vtbl().get_module_by_module_name)(self.iface.as_raw(), native.as_ptr(), 0, &mut index, &mut base)
        };
        check(hr, "IDebugSymbols::GetModuleByModuleName")?;
        Ok((index, base))
    }

    /// `GetModuleByOffset`: (index, base) of the module containing `offset`.
    pub fn module_by_offset(&self, offset: u64) -> BridgeResult<(u32, u64)>
    {
        let mut index = 0u32;
        let mut base = 0u64;
        // SAFETY: valid interface pointer and out slots.
        let hr =
            unsafe { (self.iface.vtbl().get_module_by_offset)(self.iface.as_raw(), offset, 0, &mut index, &mut base) };
        check(hr, "IDebugSymbols::GetModuleByOffset")?;
        Ok((index, base))
    }

    /// `GetModuleParameters` for `count` modules starting at index `start`.
    pub fn module_parameters(&self, count: u32, start: u32) -> BridgeResult<Vec<ModuleDescriptor>>
    {
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut params = vec![ModuleDescriptor::zeroed(); count as usize];
        // SAFETY: valid interface pointer; `params` holds `count` records; a null
        // base array selects modules by index.
        let hr = unsafe {
            (self.iface.vtbl().get_module_parameters)(self.iface.as_raw(), count, ptr::null(), start, params.as_mut_ptr())
        };
        check(hr, "IDebugSymbols::GetModuleParameters")?;
        Ok(params)
    }

    /// `GetModuleNames`. Names of zero length are reported as `None`.
    pub fn module_names(&self, index: u32, lengths: &ModuleDescriptor) -> BridgeResult<ModuleNames>
    {
        let mut image = name_buffer(lengths.image_name_size);
        let mut module = name_buffer(lengths.module_name_size);
        let mut loaded_image = name_buffer(lengths.loaded_image_name_size);
        let (image_ptr, image_len) = buffer_parts(&mut image)?;
        let (module_ptr, module_len) = buffer_parts(&mut module)?;
        let (loaded_ptr, loaded_len) = buffer_parts(&mut loaded_image)?;
        // SAFETY: valid interface pointer; each buffer is null with size 0 or
        // holds exactly the size passed.
        let hr = unsafe {
            (self.iface.vtbl().get_module_names)(
                self.iface.as_raw(),
                index,
                0,
                image_ptr,
                image_len,
                ptr::null_mut(),
                module_ptr,
                module_len,
                ptr::null_mut(),
                loaded_ptr,
                loaded_len,
                ptr::null_mut(),
            )
        };
        check(hr, "IDebugSymbols::GetModuleNames")?;
        Ok(ModuleNames {
            image: image.map(|bytes| super::decode_c_string(&bytes)),
            module: module.map(|bytes| super::decode_c_string(&bytes)),
            loaded_image: loaded_image.map(|bytes| super::decode_c_string(&bytes)),
        })
    }

    /// `GetModuleNameString` (v2) for any [`ModuleNameKind`].
    pub fn module_name_string(&self, kind: ModuleNameKind, index: u32) -> BridgeResult<String>
    {
        const OP: &str = "IDebugSymbols2::GetModuleNameString";
        self.iface.require(2, OP)?;
        // SAFETY: version checked above.
        let vtbl = unsafe { self.iface.extended::<IDebugSymbols2Vtbl>() };
        read_string(OP, |buffer, size, used| {
            // SAFETY: valid interface pointer; `buffer` holds `size` bytes.
            unsafe { (vtbl.get_module_name_string)(self.iface.as_raw(), kind.selector(), index, 0, buffer, size, used) }
        })
    }

    /// `Reload`; an empty string reloads every module.
    pub fn reload(&self, module: &str) -> BridgeResult<()>
    {
        let native = to_c_string(module, "reload argument")?;
        debug!("Reloading symbols for '{module}'");
        // SAFETY: valid interface pointer and NUL-terminated string.
        let hr = unsafe { (self.iface.vtbl().reload)(self.iface.as_raw(), native.as_ptr()) };
        check(hr, "IDebugSymbols::Reload")
    }

    /// `GetSymbolPath`
    pub fn symbol_path(&self) -> BridgeResult<String>
    {
        read_string("IDebugSymbols::GetSymbolPath", |buffer, size, used| {
            // SAFETY: valid interface pointer; `buffer` holds `size` bytes.
            unsafe { (self.iface.vtbl().get_symbol_path)(self.iface.as_raw(), buffer, size, used) }
        })
    }

    /// `SetSymbolPath`
    pub fn set_symbol_path(&self, path: &str) -> BridgeResult<()>
    {
        let native = to_c_string(path, "symbol path")?;
        // SAFETY: valid interface pointer and NUL-terminated string.
        let hr = unsafe { (self.iface.vtbl().set_symbol_path)(self.iface.as_raw(), native.as_ptr()) };
        check(hr, "IDebugSymbols::SetSymbolPath")
    }
}

fn name_buffer(length: u32) -> Option<Vec<u8>>
{
    (length > 0).then(|| vec![0u8; length as usize])
}

fn buffer_parts(buffer: &mut Option<Vec<u8>>) -> BridgeResult<(*mut c_char, u32)>
{
    match buffer {
        Some(bytes) => {
            let len = u32::try_from(bytes.len())
                .map_err(|_| BridgeError::InvalidArgument("module name length exceeds u32::MAX".to_string()))?;
            Ok((bytes.as_mut_ptr().cast::<c_char>(), len))
        }
        None => Ok((ptr::null_mut(), 0)),
    }
}
