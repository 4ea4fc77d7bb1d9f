//! Symbol resolution.
//!
//! Address to symbol goes through the containing module first: an address
//! outside every module is a miss, not an error. The engine formats names
//! as `module!symbol`; the two halves are split here.

use std::fmt;

use tracing::debug;

use super::retry::RetryPolicy;
use super::Lookup;
use crate::error::{BridgeError, BridgeResult};
use crate::platform::hresult::StatusKind;
use crate::proxy::ProxySet;
use crate::types::Address;

/// Module that contains an address: its engine index and base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleLocation
{
    pub index: u32,
    pub base: Address,
}

/// A resolved address.
///
/// The owning module is referenced by base address and name only; look it
/// up in a [`ModuleSnapshot`](super::ModuleSnapshot) if more is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRecord
{
    /// Address that was resolved
    pub address: Address,
    /// Base of the containing module
    pub module_base: Address,
    /// Short module name
    pub module_name: String,
    /// Symbol name without the module prefix, if the engine found one
    pub symbol: Option<String>,
    /// Distance from the symbol start to `address`
    pub displacement: u64,
}

impl SymbolRecord
{
    /// Start address of the symbol.
    #[must_use]
    pub fn symbol_address(&self) -> Address
    {
        Address::new(self.address.value().wrapping_sub(self.displacement))
    }
}

impl fmt::Display for SymbolRecord
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match &self.symbol {
            Some(symbol) => write!(f, "{}!{symbol}", self.module_name)?,
            None => write!(f, "{}", self.module_name)?,
        }
        if self.displacement != 0 {
            write!(f, "+0x{:x}", self.displacement)?;
        }
        Ok(())
    }
}

/// Codes `GetModuleByOffset` returns for an address outside every module.
const MODULE_MISSES: &[StatusKind] = &[StatusKind::NoInterface, StatusKind::InvalidArgument];

/// Name lookups also report an unknown symbol with a bare `E_FAIL`.
const NAME_MISSES: &[StatusKind] = &[StatusKind::NoInterface, StatusKind::InvalidArgument, StatusKind::Fail];

fn miss_to_not_found<T>(result: BridgeResult<T>, misses: &[StatusKind]) -> BridgeResult<Lookup<T>>
{
    match result {
        Ok(value) => Ok(Lookup::Found(value)),
        Err(err) if err.status_kind().is_some_and(|kind| misses.contains(&kind)) => Ok(Lookup::NotFound),
        Err(err) => Err(err),
    }
}

/// Module containing `address`.
pub(crate) fn locate_module(proxies: &ProxySet, address: Address, retry: RetryPolicy)
    -> BridgeResult<Lookup<ModuleLocation>>
{
    let result = retry.run("IDebugSymbols::GetModuleByOffset", || proxies.symbols.module_by_offset(address.value()));
    let found = miss_to_not_found(result, MODULE_MISSES)?;
    Ok(found.map(|(index, base)| ModuleLocation {
        index,
        base: Address::new(base),
    }))
}

/// Resolve `address` to module, symbol and displacement.
pub(crate) fn resolve(proxies: &ProxySet, address: Address, retry: RetryPolicy) -> BridgeResult<Lookup<SymbolRecord>>
{
    let Lookup::Found(module) = locate_module(proxies, address, retry)? else {
        debug!("{address} is outside every loaded module");
        return Ok(Lookup::NotFound);
    };

    let result = retry.run("IDebugSymbols::GetNameByOffset", || proxies.symbols.name_by_offset(address.value()));
    let named = miss_to_not_found(result, NAME_MISSES)?;

    let record = match named {
        Lookup::Found((text, displacement)) => {
            let (module_name, symbol) = split_qualified(&text);
            SymbolRecord {
                address,
                module_base: module.base,
                module_name,
                symbol,
                displacement,
            }
        }
        Lookup::NotFound => SymbolRecord {
            address,
            module_base: module.base,
            module_name: module_name(proxies, module, retry),
            symbol: None,
            displacement: address.offset_from(module.base).unwrap_or_default(),
        },
    };
    Ok(Lookup::Found(record))
}

/// Address of a `module!symbol` expression.
pub(crate) fn address_of(proxies: &ProxySet, name: &str, retry: RetryPolicy) -> BridgeResult<Lookup<Address>>
{
    if name.is_empty() {
        return Err(BridgeError::InvalidArgument("symbol name is empty".to_string()));
    }
    let result = retry.run("IDebugSymbols::GetOffsetByName", || proxies.symbols.offset_by_name(name));
    let found = miss_to_not_found(result, NAME_MISSES)?;
    Ok(found.map(Address::new))
}

/// Short name of a module, best effort.
fn module_name(proxies: &ProxySet, module: ModuleLocation, retry: RetryPolicy) -> String
{
    let names = retry
        .run("IDebugSymbols::GetModuleParameters", || proxies.symbols.module_parameters(1, module.index))
        .and_then(|descriptors| match descriptors.first() {
            Some(descriptor) => proxies.symbols.module_names(module.index, descriptor),
            None => Ok(crate::proxy::ModuleNames::default()),
        });
    match names {
        Ok(names) => names.module.or(names.image).unwrap_or_default(),
        Err(err) => {
            debug!("Name of module at {} unavailable: {err}", module.base);
            String::new()
        }
    }
}

/// Split the engine's `module!symbol` text.
fn split_qualified(text: &str) -> (String, Option<String>)
{
    match text.split_once('!') {
        Some((module, symbol)) if !symbol.is_empty() => (module.to_string(), Some(symbol.to_string())),
        Some((module, _)) => (module.to_string(), None),
        None => (text.to_string(), None),
    }
}
