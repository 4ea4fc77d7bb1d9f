//! Module enumeration.
//!
//! One snapshot is built from three engine queries: the loaded-module count,
//! a single `GetModuleParameters` call covering every index, and per-module
//! name strings. Name buffers are sized from the descriptor's name-length
//! fields; a zero length means the engine has no such name.

use tracing::{debug, warn};

use super::retry::RetryPolicy;
use crate::abi::{ModuleDescriptor, ModuleNameKind, SymbolType};
use crate::error::BridgeResult;
use crate::proxy::{ModuleNames, ProxySet};
use crate::types::Address;

/// One loaded module as the engine reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo
{
    /// Engine module index (enumeration order)
    pub index: u32,
    pub base: Address,
    pub size: u32,
    pub time_date_stamp: u32,
    pub checksum: u32,
    /// `DEBUG_MODULE_*` flags
    pub flags: u32,
    pub symbol_type: SymbolType,
    pub image_name: Option<String>,
    pub module_name: Option<String>,
    pub loaded_image_name: Option<String>,
    pub symbol_file_name: Option<String>,
    pub mapped_image_name: Option<String>,
    /// Raw descriptor, reserved bytes included
    pub descriptor: ModuleDescriptor,
}

impl ModuleInfo
{
    /// First address past the image.
    #[must_use]
    pub fn end(&self) -> Address
    {
        Address::new(self.descriptor.end())
    }

    #[must_use]
    pub fn contains(&self, address: Address) -> bool
    {
        self.descriptor.contains(address.value())
    }

    /// Short name for display: module name, else image name, else empty.
    #[must_use]
    pub fn name(&self) -> &str
    {
        self.module_name
            .as_deref()
            .or(self.image_name.as_deref())
            .unwrap_or_default()
    }

    /// Name of the given kind, if the engine reported one.
    #[must_use]
    pub fn name_of(&self, kind: ModuleNameKind) -> Option<&str>
    {
        match kind {
            ModuleNameKind::Image => self.image_name.as_deref(),
            ModuleNameKind::Module => self.module_name.as_deref(),
            ModuleNameKind::LoadedImage => self.loaded_image_name.as_deref(),
            ModuleNameKind::SymbolFile => self.symbol_file_name.as_deref(),
            ModuleNameKind::MappedImage => self.mapped_image_name.as_deref(),
        }
    }
}

/// Loaded modules at one point in time, in engine index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSnapshot
{
    modules: Vec<ModuleInfo>,
    overlaps: Vec<(u32, u32)>,
}

impl ModuleSnapshot
{
    #[must_use]
    pub fn modules(&self) -> &[ModuleInfo]
    {
        &self.modules
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleInfo>
    {
        self.modules.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.modules.is_empty()
    }

    /// Index pairs of modules whose address ranges overlap. Empty for a consistent snapshot.
    #[must_use]
    pub fn overlaps(&self) -> &[(u32, u32)]
    {
        &self.overlaps
    }

    /// Module whose range contains `address`.
    #[must_use]
    pub fn containing(&self, address: Address) -> Option<&ModuleInfo>
    {
        self.modules.iter().find(|module| module.contains(address))
    }

    /// Module by short name, case-insensitively.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&ModuleInfo>
    {
        self.modules.iter().find(|module| module.name().eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ModuleInfo>
    {
        self.modules
    }
}

impl<'a> IntoIterator for &'a ModuleSnapshot
{
    type Item = &'a ModuleInfo;
    type IntoIter = std::slice::Iter<'a, ModuleInfo>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.modules.iter()
    }
}

/// Build a snapshot of the loaded modules.
pub(crate) fn enumerate(proxies: &ProxySet, retry: RetryPolicy) -> BridgeResult<ModuleSnapshot>
{
    let symbols = &proxies.symbols;
    let (loaded, unloaded) = retry.run("IDebugSymbols::GetNumberModules", || symbols.number_modules())?;
    debug!("Enumerating {loaded} loaded modules ({unloaded} unloaded ignored)");

    let descriptors = retry.run("IDebugSymbols::GetModuleParameters", || symbols.module_parameters(loaded, 0))?;

    let mut modules = Vec::with_capacity(descriptors.len());
    for (index, descriptor) in (0u32..).zip(descriptors) {
        if !descriptor.is_valid() {
            debug!("Module #{index} reported no parameters, skipping");
            continue;
        }
        let names = match retry.run("IDebugSymbols::GetModuleNames", || symbols.module_names(index, &descriptor)) {
            Ok(names) => names,
            Err(err) => {
                warn!("Names for module #{index} at 0x{:016x} unavailable: {err}", descriptor.base);
                ModuleNames::default()
            }
        };
        let symbol_file_name = extended_name(proxies, retry, index, &descriptor, ModuleNameKind::SymbolFile);
        let mapped_image_name = extended_name(proxies, retry, index, &descriptor, ModuleNameKind::MappedImage);

        modules.push(ModuleInfo {
            index,
            base: Address::new(descriptor.base),
            size: descriptor.size,
            time_date_stamp: descriptor.time_date_stamp,
            checksum: descriptor.checksum,
            flags: descriptor.flags,
            symbol_type: descriptor.symbol_type(),
            image_name: names.image,
            module_name: names.module,
            loaded_image_name: names.loaded_image,
            symbol_file_name,
            mapped_image_name,
            descriptor,
        });
    }

    let overlaps = find_overlaps(&modules);
    Ok(ModuleSnapshot { modules, overlaps })
}

/// Names only `GetModuleNameString` can report. Absent when the negotiated
/// symbols interface predates it or the engine reports no such name.
fn extended_name(
    proxies: &ProxySet,
    retry: RetryPolicy,
    index: u32,
    descriptor: &ModuleDescriptor,
    kind: ModuleNameKind,
) -> Option<String>
{
    if descriptor.name_length(kind) == 0 {
        return None;
    }
    let symbols = &proxies.symbols;
    if symbols.version() < 2 {
        debug!("{kind:?} name of module #{index} needs IDebugSymbols2 (have v{})", symbols.version());
        return None;
    }
    match retry.run("IDebugSymbols2::GetModuleNameString", || symbols.module_name_string(kind, index)) {
        Ok(name) if !name.is_empty() => Some(name),
        Ok(_) => None,
        Err(err) => {
            debug!("{kind:?} name of module #{index} unavailable: {err}");
            None
        }
    }
}

fn find_overlaps(modules: &[ModuleInfo]) -> Vec<(u32, u32)>
{
    let mut overlaps = Vec::new();
    for (position, first) in modules.iter().enumerate() {
        for second in &modules[position + 1..] {
            if first.descriptor.overlaps(&second.descriptor) {
                warn!(
                    "Modules #{} ({} {}..{}) and #{} ({} {}..{}) overlap",
                    first.index,
                    first.name(),
                    first.base,
                    first.end(),
                    second.index,
                    second.name(),
                    second.base,
                    second.end()
                );
                overlaps.push((first.index, second.index));
            }
        }
    }
    overlaps
}
