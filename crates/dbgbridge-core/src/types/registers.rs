//! Decoded register snapshots.

use std::fmt;

use smallvec::SmallVec;

use super::{Address, Architecture};
use crate::abi::Amd64Context;

/// Identifier for a specific CPU register
///
/// The common registers (PC, SP, FP, Status) exist on every architecture the
/// engine supports. Architecture-specific registers go through the
/// `X86_64` variant.
///
/// ## Example
///
/// ```rust
/// use dbgbridge_core::types::{RegisterId, X86_64Register};
///
/// let pc = RegisterId::Pc;
/// let rax = RegisterId::X86_64(X86_64Register::Rax);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterId
{
    /// Program counter (RIP on x86-64)
    Pc,
    /// Stack pointer (RSP on x86-64)
    Sp,
    /// Frame pointer (RBP on x86-64)
    Fp,
    /// Flags register (EFLAGS on x86-64)
    Status,
    /// x86-64 general-purpose register
    X86_64(X86_64Register),
}

/// x86-64 general-purpose registers, in hardware encoding order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum X86_64Register
{
    /// RAX - accumulator, return values
    Rax,
    /// RCX - first integer argument (Windows x64 ABI)
    Rcx,
    /// RDX - second integer argument
    Rdx,
    /// RBX - callee-saved
    Rbx,
    /// RSP - stack pointer
    Rsp,
    /// RBP - frame pointer when frames are kept
    Rbp,
    /// RSI - callee-saved on Windows
    Rsi,
    /// RDI - callee-saved on Windows
    Rdi,
    /// R8 - third integer argument
    R8,
    /// R9 - fourth integer argument
    R9,
    /// R10 - volatile
    R10,
    /// R11 - volatile
    R11,
    /// R12 - callee-saved
    R12,
    /// R13 - callee-saved
    R13,
    /// R14 - callee-saved
    R14,
    /// R15 - callee-saved
    R15,
}

impl X86_64Register
{
    /// Every register, in encoding order
    pub const ALL: [X86_64Register; 16] = [
        X86_64Register::Rax,
        X86_64Register::Rcx,
        X86_64Register::Rdx,
        X86_64Register::Rbx,
        X86_64Register::Rsp,
        X86_64Register::Rbp,
        X86_64Register::Rsi,
        X86_64Register::Rdi,
        X86_64Register::R8,
        X86_64Register::R9,
        X86_64Register::R10,
        X86_64Register::R11,
        X86_64Register::R12,
        X86_64Register::R13,
        X86_64Register::R14,
        X86_64Register::R15,
    ];

    /// Index into [`Registers::general`]; equal to the hardware encoding.
    const fn index(self) -> usize
    {
        self as usize
    }

    /// Lowercase register name
    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            X86_64Register::Rax => "rax",
            X86_64Register::Rcx => "rcx",
            X86_64Register::Rdx => "rdx",
            X86_64Register::Rbx => "rbx",
            X86_64Register::Rsp => "rsp",
            X86_64Register::Rbp => "rbp",
            X86_64Register::Rsi => "rsi",
            X86_64Register::Rdi => "rdi",
            X86_64Register::R8 => "r8",
            X86_64Register::R9 => "r9",
            X86_64Register::R10 => "r10",
            X86_64Register::R11 => "r11",
            X86_64Register::R12 => "r12",
            X86_64Register::R13 => "r13",
            X86_64Register::R14 => "r14",
            X86_64Register::R15 => "r15",
        }
    }
}

impl fmt::Display for X86_64Register
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

/// Segment selectors captured with the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentRegisters
{
    pub cs: u16,
    pub ds: u16,
    pub es: u16,
    pub fs: u16,
    pub gs: u16,
    pub ss: u16,
}

/// CPU register snapshot for one thread
///
/// Holds the architecture-neutral PC/SP/FP/status values plus the
/// general-purpose register file. The register file is stored inline (no heap
/// allocation) for every architecture with 16 or fewer integer registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers
{
    /// Program counter
    pub pc: Address,
    /// Stack pointer
    pub sp: Address,
    /// Frame pointer
    pub fp: Address,
    /// General-purpose registers (x86-64: encoding order, see [`X86_64Register`])
    pub general: SmallVec<[u64; 16]>,
    /// Flags register
    pub status: u64,
    /// Segment selectors
    pub segments: SegmentRegisters,
    /// Hardware debug registers DR0-DR3, DR6, DR7
    pub debug: [u64; 6],
    architecture: Architecture,
}

impl Registers
{
    /// Empty register set for `architecture`
    #[must_use]
    pub fn new(architecture: Architecture) -> Self
    {
        Self {
            pc: Address::ZERO,
            sp: Address::ZERO,
            fp: Address::ZERO,
            general: SmallVec::new(),
            status: 0,
            segments: SegmentRegisters::default(),
            debug: [0; 6],
            architecture,
        }
    }

    /// Decode an AMD64 `CONTEXT` record
    #[must_use]
    pub fn from_amd64(context: &Amd64Context) -> Self
    {
        Self {
            pc: Address::from(context.rip),
            sp: Address::from(context.rsp),
            fp: Address::from(context.rbp),
            general: SmallVec::from_buf(context.integer_registers()),
            status: u64::from(context.eflags),
            segments: SegmentRegisters {
                cs: context.seg_cs,
                ds: context.seg_ds,
                es: context.seg_es,
                fs: context.seg_fs,
                gs: context.seg_gs,
                ss: context.seg_ss,
            },
            debug: [context.dr0, context.dr1, context.dr2, context.dr3, context.dr6, context.dr7],
            architecture: Architecture::X86_64,
        }
    }

    /// Architecture the snapshot was decoded for
    #[must_use]
    pub fn architecture(&self) -> Architecture
    {
        self.architecture
    }

    /// Read a register by identifier
    ///
    /// Returns `None` when the identifier does not belong to this snapshot's
    /// architecture.
    ///
    /// ```rust
    /// use dbgbridge_core::abi::{AbiRecord, Amd64Context};
    /// use dbgbridge_core::types::{RegisterId, Registers, X86_64Register};
    ///
    /// let mut context = Amd64Context::zeroed();
    /// context.rcx = 0x1234;
    /// let regs = Registers::from_amd64(&context);
    /// assert_eq!(regs.get(RegisterId::X86_64(X86_64Register::Rcx)), Some(0x1234));
    /// ```
    #[must_use]
    pub fn get(&self, id: RegisterId) -> Option<u64>
    {
        match id {
            RegisterId::Pc => Some(self.pc.value()),
            RegisterId::Sp => Some(self.sp.value()),
            RegisterId::Fp => Some(self.fp.value()),
            RegisterId::Status => Some(self.status),
            RegisterId::X86_64(reg) => {
                if self.architecture != Architecture::X86_64 {
                    return None;
                }
                self.general.get(reg.index()).copied()
            }
        }
    }

    /// Named x86-64 registers with their values
    pub fn named(&self) -> impl Iterator<Item = (X86_64Register, u64)> + '_
    {
        let count = if self.architecture == Architecture::X86_64 { self.general.len() } else { 0 };
        X86_64Register::ALL.into_iter().zip(self.general.iter().copied()).take(count)
    }
}
