//! Typed flag sets for engine masks and options.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Output categories (`DEBUG_OUTPUT_*`) the client receives
    pub struct OutputMask : u32 {
        /// Normal output
        const NORMAL = 0x1;
        /// Error output
        const ERROR = 0x2;
        /// Warnings
        const WARNING = 0x4;
        /// Additional output
        const VERBOSE = 0x8;
        /// Prompt output
        const PROMPT = 0x10;
        /// Register dump before prompt
        const PROMPT_REGISTERS = 0x20;
        /// Warnings specific to extension operation
        const EXTENSION_WARNING = 0x40;
        /// Debuggee debug output
        const DEBUGGEE = 0x80;
        /// Debuggee-generated prompt
        const DEBUGGEE_PROMPT = 0x100;
        /// Symbol messages
        const SYMBOLS = 0x200;
        /// Status notifications
        const STATUS = 0x400;
    }
}

impl OutputMask
{
    /// What a diagnostics host usually wants to see.
    pub const DEFAULT: Self = Self::NORMAL.union(Self::ERROR).union(Self::WARNING).union(Self::DEBUGGEE);
}

impl Default for OutputMask
{
    fn default() -> Self
    {
        Self::DEFAULT
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Events (`DEBUG_EVENT_*`) an event sink wants to be told about
    pub struct EventInterest : u32 {
        /// Breakpoint hit
        const BREAKPOINT = 0x1;
        /// Exception raised
        const EXCEPTION = 0x2;
        /// Thread created
        const CREATE_THREAD = 0x4;
        /// Thread exited
        const EXIT_THREAD = 0x8;
        /// Process created or attached
        const CREATE_PROCESS = 0x10;
        /// Process exited
        const EXIT_PROCESS = 0x20;
        /// Module loaded
        const LOAD_MODULE = 0x40;
        /// Module unloaded
        const UNLOAD_MODULE = 0x80;
        /// System error
        const SYSTEM_ERROR = 0x100;
        /// Session status change
        const SESSION_STATUS = 0x200;
        /// Target state changed
        const CHANGE_DEBUGGEE_STATE = 0x400;
        /// Engine state changed
        const CHANGE_ENGINE_STATE = 0x800;
        /// Symbol state changed
        const CHANGE_SYMBOL_STATE = 0x1000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Symbol handler options (`SYMOPT_*`)
    pub struct SymbolOptions : u32 {
        /// Case-insensitive symbol matching
        const CASE_INSENSITIVE = 0x0000_0001;
        /// Present undecorated names
        const UNDNAME = 0x0000_0002;
        /// Load symbols on first use
        const DEFERRED_LOADS = 0x0000_0004;
        /// Do not present C++ scope separators
        const NO_CPP = 0x0000_0008;
        /// Load line numbers
        const LOAD_LINES = 0x0000_0010;
        /// Resolve addresses in optimized images to the nearest symbol
        const OMAP_FIND_NEAREST = 0x0000_0020;
        /// Accept symbols that do not match the image exactly
        const LOAD_ANYTHING = 0x0000_0040;
        /// Skip unqualified loads
        const NO_UNQUALIFIED_LOADS = 0x0000_0100;
        /// Fail on critical errors instead of prompting
        const FAIL_CRITICAL_ERRORS = 0x0000_0200;
        /// Require exact symbol matches
        const EXACT_SYMBOLS = 0x0000_0400;
        /// Never prompt for symbol server access
        const NO_PROMPTS = 0x0008_0000;
        /// Emit symbol diagnostics through output callbacks
        const DEBUG = 0x8000_0000;
    }
}

impl SymbolOptions
{
    /// Options a non-interactive host normally runs with.
    pub const DEFAULT: Self = Self::CASE_INSENSITIVE
        .union(Self::UNDNAME)
        .union(Self::DEFERRED_LOADS)
        .union(Self::LOAD_LINES)
        .union(Self::OMAP_FIND_NEAREST)
        .union(Self::FAIL_CRITICAL_ERRORS)
        .union(Self::NO_PROMPTS);
}

impl Default for SymbolOptions
{
    fn default() -> Self
    {
        Self::DEFAULT
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Process attach flags (`DEBUG_ATTACH_*`)
    pub struct AttachFlags : u32 {
        /// Attach without stopping the target (inspection only)
        const NONINVASIVE = 0x0000_0001;
        /// Reattach to a process the engine already knows
        const EXISTING = 0x0000_0002;
        /// Do not suspend threads on noninvasive attach
        const NONINVASIVE_NO_SUSPEND = 0x0000_0004;
        /// Skip the initial break-in after an invasive attach
        const INVASIVE_NO_INITIAL_BREAK = 0x0000_0008;
        /// Resume the target after attach
        const INVASIVE_RESUME_PROCESS = 0x0000_0010;
    }
}
