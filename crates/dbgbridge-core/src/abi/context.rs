//! # AMD64 Thread Context
//!
//! [`Amd64Context`] mirrors the native `CONTEXT` record for x64 targets, the
//! buffer `IDebugAdvanced::GetThreadContext` fills. The engine writes exactly
//! [`AMD64_CONTEXT_SIZE`] bytes and requires 16-byte alignment.
//!
//! Only the integer and control registers are decoded by this crate. The
//! floating-point save area and vector registers are carried as raw bytes so a
//! caller can round-trip the record through `SetThreadContext` unchanged.

use super::AbiRecord;

/// Size of the native record.
pub const AMD64_CONTEXT_SIZE: usize = 1232;

/// `CONTEXT_AMD64`
pub const CONTEXT_AMD64: u32 = 0x0010_0000;
/// `CONTEXT_CONTROL`: `SegSs`, `Rsp`, `SegCs`, `Rip`, `EFlags`
pub const CONTEXT_CONTROL: u32 = CONTEXT_AMD64 | 0x1;
/// `CONTEXT_INTEGER`: `Rax`..`R15`
pub const CONTEXT_INTEGER: u32 = CONTEXT_AMD64 | 0x2;
/// `CONTEXT_SEGMENTS`
pub const CONTEXT_SEGMENTS: u32 = CONTEXT_AMD64 | 0x4;
/// `CONTEXT_FLOATING_POINT`
pub const CONTEXT_FLOATING_POINT: u32 = CONTEXT_AMD64 | 0x8;
/// `CONTEXT_DEBUG_REGISTERS`
pub const CONTEXT_DEBUG_REGISTERS: u32 = CONTEXT_AMD64 | 0x10;
/// `CONTEXT_FULL`
pub const CONTEXT_FULL: u32 = CONTEXT_CONTROL | CONTEXT_INTEGER | CONTEXT_FLOATING_POINT;

/// Native x64 `CONTEXT` (1232 bytes, 16-byte aligned).
#[repr(C, align(16))]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Amd64Context
{
    /// Register parameter home addresses
    pub p_home: [u64; 6],

    /// `CONTEXT_*` flags describing which parts are valid
    pub context_flags: u32,
    /// SSE control/status
    pub mx_csr: u32,

    pub seg_cs: u16,
    pub seg_ds: u16,
    pub seg_es: u16,
    pub seg_fs: u16,
    pub seg_gs: u16,
    pub seg_ss: u16,
    pub eflags: u32,

    pub dr0: u64,
    pub dr1: u64,
    pub dr2: u64,
    pub dr3: u64,
    pub dr6: u64,
    pub dr7: u64,

    pub rax: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rbx: u64,
    pub rsp: u64,
    pub rbp: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub r8: u64,
    pub r9: u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,

    pub rip: u64,

    /// `XMM_SAVE_AREA32`, kept opaque
    pub flt_save: [u8; 512],

    /// `M128A VectorRegister[26]`, kept opaque
    pub vector_register: [[u64; 2]; 26],
    pub vector_control: u64,

    pub debug_control: u64,
    pub last_branch_to_rip: u64,
    pub last_branch_from_rip: u64,
    pub last_exception_to_rip: u64,
    pub last_exception_from_rip: u64,
}

const _: () = assert!(std::mem::size_of::<Amd64Context>() == AMD64_CONTEXT_SIZE);
const _: () = assert!(std::mem::align_of::<Amd64Context>() == 16);

// SAFETY: repr(C), integers only.
unsafe impl AbiRecord for Amd64Context {}

impl Amd64Context
{
    /// Zeroed record with `context_flags` set, ready to hand to `GetThreadContext`.
    #[must_use]
    pub fn with_flags(flags: u32) -> Self
    {
        let mut context = <Self as AbiRecord>::zeroed();
        context.context_flags = flags;
        context
    }

    /// General-purpose registers in encoding order (`rax`, `rcx`, `rdx`, `rbx`, `rsp`, ...).
    #[must_use]
    pub const fn integer_registers(&self) -> [u64; 16]
    {
        [
            self.rax, self.rcx, self.rdx, self.rbx, self.rsp, self.rbp, self.rsi, self.rdi, self.r8, self.r9,
            self.r10, self.r11, self.r12, self.r13, self.r14, self.r15,
        ]
    }
}

impl std::fmt::Debug for Amd64Context
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Amd64Context")
            .field("context_flags", &format_args!("0x{:08x}", self.context_flags))
            .field("rip", &format_args!("0x{:016x}", self.rip))
            .field("rsp", &format_args!("0x{:016x}", self.rsp))
            .field("rbp", &format_args!("0x{:016x}", self.rbp))
            .field("eflags", &format_args!("0x{:08x}", self.eflags))
            .finish_non_exhaustive()
    }
}
