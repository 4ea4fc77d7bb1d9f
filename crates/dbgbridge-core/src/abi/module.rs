//! # Module Parameters
//!
//! [`ModuleDescriptor`] mirrors `DEBUG_MODULE_PARAMETERS`, the record
//! `IDebugSymbols::GetModuleParameters` fills for each loaded module.
//!
//! ## Native layout (64 bytes)
//!
//! | Offset | Field | Width |
//! |--------|-------|-------|
//! | 0  | `Base` | 8 |
//! | 8  | `Size` | 4 |
//! | 12 | `TimeDateStamp` | 4 |
//! | 16 | `Checksum` | 4 |
//! | 20 | `Flags` | 4 |
//! | 24 | `SymbolType` | 4 |
//! | 28 | `ImageNameSize` | 4 |
//! | 32 | `ModuleNameSize` | 4 |
//! | 36 | `LoadedImageNameSize` | 4 |
//! | 40 | `SymbolFileNameSize` | 4 |
//! | 44 | `MappedImageNameSize` | 4 |
//! | 48 | `Reserved[2]` | 16 |

use std::fmt;

use super::AbiRecord;
use crate::platform::constants::{
    DEBUG_INVALID_OFFSET, DEBUG_MODNAME_IMAGE, DEBUG_MODNAME_LOADED_IMAGE, DEBUG_MODNAME_MAPPED_IMAGE,
    DEBUG_MODNAME_MODULE, DEBUG_MODNAME_SYMBOL_FILE, DEBUG_MODULE_UNLOADED,
};

/// Native `DEBUG_MODULE_PARAMETERS`.
///
/// The `*_name_size` fields are byte lengths (terminator included) of the
/// companion name-string queries, not sizes of anything in this struct. A
/// zero length means the engine has no such name for the module.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModuleDescriptor
{
    /// Load address of the image
    pub base: u64,
    /// Size of the mapped image in bytes
    pub size: u32,
    /// Link timestamp from the PE header
    pub time_date_stamp: u32,
    /// Checksum from the PE header
    pub checksum: u32,
    /// `DEBUG_MODULE_*` flags
    pub flags: u32,
    /// `DEBUG_SYMTYPE_*` tag
    pub symbol_type: u32,
    /// Length of the image file name
    pub image_name_size: u32,
    /// Length of the short module name
    pub module_name_size: u32,
    /// Length of the loaded image name
    pub loaded_image_name_size: u32,
    /// Length of the symbol file name
    pub symbol_file_name_size: u32,
    /// Length of the mapped image name
    pub mapped_image_name_size: u32,
    /// Opaque engine state. Copied through, never read.
    pub reserved: [u64; 2],
}

const _: () = assert!(std::mem::size_of::<ModuleDescriptor>() == 64);

// SAFETY: repr(C), integers only.
unsafe impl AbiRecord for ModuleDescriptor {}

impl ModuleDescriptor
{
    /// One past the last byte of the image.
    #[must_use]
    pub const fn end(&self) -> u64
    {
        self.base.saturating_add(self.size as u64)
    }

    /// Whether `address` falls inside `[base, base + size)`.
    #[must_use]
    pub const fn contains(&self, address: u64) -> bool
    {
        address >= self.base && address < self.end()
    }

    /// Whether the two image ranges share at least one byte.
    #[must_use]
    pub const fn overlaps(&self, other: &ModuleDescriptor) -> bool
    {
        self.base < other.end() && other.base < self.end()
    }

    /// The engine marks entries it could not describe with `DEBUG_INVALID_OFFSET`.
    #[must_use]
    pub const fn is_valid(&self) -> bool
    {
        self.base != DEBUG_INVALID_OFFSET
    }

    /// Whether the module is in the unloaded list.
    #[must_use]
    pub const fn is_unloaded(&self) -> bool
    {
        self.flags & DEBUG_MODULE_UNLOADED != 0
    }

    /// Decoded symbol-type tag.
    #[must_use]
    pub const fn symbol_type(&self) -> SymbolType
    {
        SymbolType::from_raw(self.symbol_type)
    }

    /// Reported byte length for one of the companion names.
    #[must_use]
    pub const fn name_length(&self, kind: ModuleNameKind) -> u32
    {
        match kind {
            ModuleNameKind::Image => self.image_name_size,
            ModuleNameKind::Module => self.module_name_size,
            ModuleNameKind::LoadedImage => self.loaded_image_name_size,
            ModuleNameKind::SymbolFile => self.symbol_file_name_size,
            ModuleNameKind::MappedImage => self.mapped_image_name_size,
        }
    }
}

/// Which companion name to fetch (`DEBUG_MODNAME_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleNameKind
{
    /// Full path of the image file
    Image,
    /// Short module name (e.g. `ntdll`)
    Module,
    /// Name the loader reported
    LoadedImage,
    /// Symbol file the engine matched
    SymbolFile,
    /// Image mapped from disk or the symbol store
    MappedImage,
}

impl ModuleNameKind
{
    /// Every kind, in native selector order.
    pub const ALL: [ModuleNameKind; 5] = [
        ModuleNameKind::Image,
        ModuleNameKind::Module,
        ModuleNameKind::LoadedImage,
        ModuleNameKind::SymbolFile,
        ModuleNameKind::MappedImage,
    ];

    /// Native `DEBUG_MODNAME_*` selector.
    #[must_use]
    pub const fn selector(self) -> u32
    {
        match self {
            ModuleNameKind::Image => DEBUG_MODNAME_IMAGE,
            ModuleNameKind::Module => DEBUG_MODNAME_MODULE,
            ModuleNameKind::LoadedImage => DEBUG_MODNAME_LOADED_IMAGE,
            ModuleNameKind::SymbolFile => DEBUG_MODNAME_SYMBOL_FILE,
            ModuleNameKind::MappedImage => DEBUG_MODNAME_MAPPED_IMAGE,
        }
    }
}

/// Decoded `DEBUG_SYMTYPE_*` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType
{
    /// No symbols loaded
    None,
    /// COFF symbols
    Coff,
    /// CodeView symbols
    CodeView,
    /// PDB symbols
    Pdb,
    /// Export table only
    Export,
    /// Loading deferred until first use
    Deferred,
    /// `.sym` file
    Sym,
    /// Loaded through DIA
    Dia,
    /// Tag not known to this crate
    Unknown(u32),
}

impl SymbolType
{
    /// Decode a raw tag.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self
    {
        match raw {
            0 => SymbolType::None,
            1 => SymbolType::Coff,
            2 => SymbolType::CodeView,
            3 => SymbolType::Pdb,
            4 => SymbolType::Export,
            5 => SymbolType::Deferred,
            6 => SymbolType::Sym,
            7 => SymbolType::Dia,
            other => SymbolType::Unknown(other),
        }
    }
}

impl fmt::Display for SymbolType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            SymbolType::None => f.write_str("none"),
            SymbolType::Coff => f.write_str("coff"),
            SymbolType::CodeView => f.write_str("codeview"),
            SymbolType::Pdb => f.write_str("pdb"),
            SymbolType::Export => f.write_str("export"),
            SymbolType::Deferred => f.write_str("deferred"),
            SymbolType::Sym => f.write_str("sym"),
            SymbolType::Dia => f.write_str("dia"),
            SymbolType::Unknown(raw) => write!(f, "unknown({raw})"),
        }
    }
}
