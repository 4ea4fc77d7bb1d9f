//! Native stack frame record (`DEBUG_STACK_FRAME`).

use super::AbiRecord;

/// Native `DEBUG_STACK_FRAME` (128 bytes).
///
/// `GetStackTrace` fills an array of these, innermost frame first.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeStackFrame
{
    /// Address of the current instruction in this frame
    pub instruction_offset: u64,
    /// Return address of the frame
    pub return_offset: u64,
    /// Frame pointer value
    pub frame_offset: u64,
    /// Stack pointer value
    pub stack_offset: u64,
    /// Function table entry address, 0 if none
    pub func_table_entry: u64,
    /// First four stack-passed arguments
    pub params: [u64; 4],
    /// Reserved
    pub reserved: [u64; 6],
    /// Nonzero for frames synthesised from inline data
    pub virtual_frame: i32,
    /// Index of the frame, 0 is innermost
    pub frame_number: u32,
}

const _: () = assert!(std::mem::size_of::<NativeStackFrame>() == 128);

// SAFETY: repr(C), integers only.
unsafe impl AbiRecord for NativeStackFrame {}

impl NativeStackFrame
{
    /// Whether the engine produced this frame from inline data rather than a real activation.
    #[must_use]
    pub const fn is_virtual(&self) -> bool
    {
        self.virtual_frame != 0
    }
}
