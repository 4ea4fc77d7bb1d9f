//! # Engine Constants
//!
//! Centralized `DEBUG_*` constants from `dbgeng.h`.
//!
//! ## Organization
//!
//! - Execution status and wait flags
//! - Session end modes and interrupt flags
//! - Output masks
//! - Event interest masks
//! - Module name selectors and flags
//! - Processor types

// ============================================================================
// Execution Status
// ============================================================================

/// `DEBUG_STATUS_NO_CHANGE`
pub const DEBUG_STATUS_NO_CHANGE: u32 = 0;
/// `DEBUG_STATUS_GO`
pub const DEBUG_STATUS_GO: u32 = 1;
/// `DEBUG_STATUS_GO_HANDLED`
pub const DEBUG_STATUS_GO_HANDLED: u32 = 2;
/// `DEBUG_STATUS_GO_NOT_HANDLED`
pub const DEBUG_STATUS_GO_NOT_HANDLED: u32 = 3;
/// `DEBUG_STATUS_STEP_OVER`
pub const DEBUG_STATUS_STEP_OVER: u32 = 4;
/// `DEBUG_STATUS_STEP_INTO`
pub const DEBUG_STATUS_STEP_INTO: u32 = 5;
/// `DEBUG_STATUS_BREAK`
pub const DEBUG_STATUS_BREAK: u32 = 6;
/// `DEBUG_STATUS_NO_DEBUGGEE`
pub const DEBUG_STATUS_NO_DEBUGGEE: u32 = 7;
/// `DEBUG_STATUS_STEP_BRANCH`
pub const DEBUG_STATUS_STEP_BRANCH: u32 = 8;
/// `DEBUG_STATUS_IGNORE_EVENT`
pub const DEBUG_STATUS_IGNORE_EVENT: u32 = 9;
/// `DEBUG_STATUS_RESTART_REQUESTED`
pub const DEBUG_STATUS_RESTART_REQUESTED: u32 = 10;

/// `DEBUG_WAIT_DEFAULT`
pub const DEBUG_WAIT_DEFAULT: u32 = 0;
/// `INFINITE`: the core never imposes its own timeout.
pub const INFINITE: u32 = 0xFFFF_FFFF;

// ============================================================================
// Session lifetime
// ============================================================================

/// `DEBUG_END_PASSIVE`
pub const DEBUG_END_PASSIVE: u32 = 0;
/// `DEBUG_END_ACTIVE_TERMINATE`
pub const DEBUG_END_ACTIVE_TERMINATE: u32 = 1;
/// `DEBUG_END_ACTIVE_DETACH`
pub const DEBUG_END_ACTIVE_DETACH: u32 = 2;

/// `DEBUG_INTERRUPT_ACTIVE`: break into the target.
pub const DEBUG_INTERRUPT_ACTIVE: u32 = 0;
/// `DEBUG_INTERRUPT_PASSIVE`: stop the current wait without breaking in.
pub const DEBUG_INTERRUPT_PASSIVE: u32 = 1;
/// `DEBUG_INTERRUPT_EXIT`: wake a waiting thread and exit.
pub const DEBUG_INTERRUPT_EXIT: u32 = 2;

/// `DEBUG_ANY_ID`
pub const DEBUG_ANY_ID: u32 = 0xFFFF_FFFF;
/// `DEBUG_INVALID_OFFSET`: entry returned for modules the engine could not describe.
pub const DEBUG_INVALID_OFFSET: u64 = u64::MAX;

// ============================================================================
// Output masks
// ============================================================================

/// `DEBUG_OUTPUT_NORMAL`
pub const DEBUG_OUTPUT_NORMAL: u32 = 0x1;
/// `DEBUG_OUTPUT_ERROR`
pub const DEBUG_OUTPUT_ERROR: u32 = 0x2;
/// `DEBUG_OUTPUT_WARNING`
pub const DEBUG_OUTPUT_WARNING: u32 = 0x4;
/// `DEBUG_OUTPUT_VERBOSE`
pub const DEBUG_OUTPUT_VERBOSE: u32 = 0x8;
/// `DEBUG_OUTPUT_PROMPT`
pub const DEBUG_OUTPUT_PROMPT: u32 = 0x10;
/// `DEBUG_OUTPUT_PROMPT_REGISTERS`
pub const DEBUG_OUTPUT_PROMPT_REGISTERS: u32 = 0x20;
/// `DEBUG_OUTPUT_EXTENSION_WARNING`
pub const DEBUG_OUTPUT_EXTENSION_WARNING: u32 = 0x40;
/// `DEBUG_OUTPUT_DEBUGGEE`
pub const DEBUG_OUTPUT_DEBUGGEE: u32 = 0x80;
/// `DEBUG_OUTPUT_DEBUGGEE_PROMPT`
pub const DEBUG_OUTPUT_DEBUGGEE_PROMPT: u32 = 0x100;
/// `DEBUG_OUTPUT_SYMBOLS`
pub const DEBUG_OUTPUT_SYMBOLS: u32 = 0x200;
/// `DEBUG_OUTPUT_STATUS`
pub const DEBUG_OUTPUT_STATUS: u32 = 0x400;

// ============================================================================
// Event interest masks (also `DEBUG_EVENT_*` last-event types)
// ============================================================================

/// `DEBUG_EVENT_BREAKPOINT`
pub const DEBUG_EVENT_BREAKPOINT: u32 = 0x1;
/// `DEBUG_EVENT_EXCEPTION`
pub const DEBUG_EVENT_EXCEPTION: u32 = 0x2;
/// `DEBUG_EVENT_CREATE_THREAD`
pub const DEBUG_EVENT_CREATE_THREAD: u32 = 0x4;
/// `DEBUG_EVENT_EXIT_THREAD`
pub const DEBUG_EVENT_EXIT_THREAD: u32 = 0x8;
/// `DEBUG_EVENT_CREATE_PROCESS`
pub const DEBUG_EVENT_CREATE_PROCESS: u32 = 0x10;
/// `DEBUG_EVENT_EXIT_PROCESS`
pub const DEBUG_EVENT_EXIT_PROCESS: u32 = 0x20;
/// `DEBUG_EVENT_LOAD_MODULE`
pub const DEBUG_EVENT_LOAD_MODULE: u32 = 0x40;
/// `DEBUG_EVENT_UNLOAD_MODULE`
pub const DEBUG_EVENT_UNLOAD_MODULE: u32 = 0x80;
/// `DEBUG_EVENT_SYSTEM_ERROR`
pub const DEBUG_EVENT_SYSTEM_ERROR: u32 = 0x100;
/// `DEBUG_EVENT_SESSION_STATUS`
pub const DEBUG_EVENT_SESSION_STATUS: u32 = 0x200;
/// `DEBUG_EVENT_CHANGE_DEBUGGEE_STATE`
pub const DEBUG_EVENT_CHANGE_DEBUGGEE_STATE: u32 = 0x400;
/// `DEBUG_EVENT_CHANGE_ENGINE_STATE`
pub const DEBUG_EVENT_CHANGE_ENGINE_STATE: u32 = 0x800;
/// `DEBUG_EVENT_CHANGE_SYMBOL_STATE`
pub const DEBUG_EVENT_CHANGE_SYMBOL_STATE: u32 = 0x1000;

// ============================================================================
// Modules
// ============================================================================

/// `DEBUG_MODNAME_IMAGE`
pub const DEBUG_MODNAME_IMAGE: u32 = 0;
/// `DEBUG_MODNAME_MODULE`
pub const DEBUG_MODNAME_MODULE: u32 = 1;
/// `DEBUG_MODNAME_LOADED_IMAGE`
pub const DEBUG_MODNAME_LOADED_IMAGE: u32 = 2;
/// `DEBUG_MODNAME_SYMBOL_FILE`
pub const DEBUG_MODNAME_SYMBOL_FILE: u32 = 3;
/// `DEBUG_MODNAME_MAPPED_IMAGE`
pub const DEBUG_MODNAME_MAPPED_IMAGE: u32 = 4;

/// `DEBUG_MODULE_UNLOADED`
pub const DEBUG_MODULE_UNLOADED: u32 = 0x1;
/// `DEBUG_MODULE_USER_MODE`
pub const DEBUG_MODULE_USER_MODE: u32 = 0x2;
/// `DEBUG_MODULE_EXE_MODULE`
pub const DEBUG_MODULE_EXE_MODULE: u32 = 0x4;
/// `DEBUG_MODULE_EXPLICIT`
pub const DEBUG_MODULE_EXPLICIT: u32 = 0x8;
/// `DEBUG_MODULE_SECONDARY`
pub const DEBUG_MODULE_SECONDARY: u32 = 0x10;
/// `DEBUG_MODULE_SYNTHETIC`
pub const DEBUG_MODULE_SYNTHETIC: u32 = 0x20;
/// `DEBUG_MODULE_SYM_BAD_CHECKSUM`
pub const DEBUG_MODULE_SYM_BAD_CHECKSUM: u32 = 0x10000;

// ============================================================================
// Processor types (`IMAGE_FILE_MACHINE_*`)
// ============================================================================

/// `IMAGE_FILE_MACHINE_I386`
pub const IMAGE_FILE_MACHINE_I386: u32 = 0x014C;
/// `IMAGE_FILE_MACHINE_ARMNT`
pub const IMAGE_FILE_MACHINE_ARMNT: u32 = 0x01C4;
/// `IMAGE_FILE_MACHINE_AMD64`
pub const IMAGE_FILE_MACHINE_AMD64: u32 = 0x8664;
/// `IMAGE_FILE_MACHINE_ARM64`
pub const IMAGE_FILE_MACHINE_ARM64: u32 = 0xAA64;

/// Maximum frames requested from `GetStackTrace` in one call.
pub const MAX_STACK_FRAMES: u32 = 1024;

/// Page size assumed when the engine cannot report one.
pub const DEFAULT_PAGE_SIZE: u32 = 0x1000;
