//! # Interface Vtables
//!
//! One `#[repr(C)]` struct per native interface version. Version N+1 embeds
//! version N as its first field (`base`), mirroring single inheritance in the
//! native headers, so a pointer to a newer vtable is always a valid pointer to
//! every older one.
//!
//! Methods this crate calls are typed function pointers. Methods it never
//! calls are [`Slot`]s grouped into arrays named after the range they cover,
//! so slot ordering stays explicit and checkable: every vtable's size is
//! pinned below as a slot count.
//!
//! The first parameter of every method is the interface pointer itself
//! ([`This`]).

use std::ffi::{c_char, c_void};
use std::mem::size_of;

use super::exception::ExceptionRecord64;
use super::guid::Guid;
use super::memory::MemoryBasicInformation64;
use super::module::ModuleDescriptor;
use super::stack::NativeStackFrame;
use crate::platform::hresult::HRESULT;

/// Interface pointer passed as the implicit first argument.
pub type This = *mut c_void;

/// A vtable entry this crate never calls. Pointer-sized, nullable.
pub type Slot = Option<unsafe extern "system" fn()>;

// ============================================================================
// Interface identifiers
// ============================================================================

/// `IUnknown`
pub const IID_IUNKNOWN: Guid = Guid::from_u128(0x00000000_0000_0000_c000_000000000046);

/// `IDebugClient`
pub const IID_IDEBUG_CLIENT: Guid = Guid::from_u128(0x27fe5639_8407_4f47_8364_ee118fb08ac8);
/// `IDebugClient2`
pub const IID_IDEBUG_CLIENT2: Guid = Guid::from_u128(0xedbed635_372e_4dab_bbfe_ed0d2f63be81);
/// `IDebugClient3`
pub const IID_IDEBUG_CLIENT3: Guid = Guid::from_u128(0xdd492d7f_71b8_4ad6_a8dc_1c887479ff91);
/// `IDebugClient4`
pub const IID_IDEBUG_CLIENT4: Guid = Guid::from_u128(0xca83c3de_5089_4cf8_93c8_d892387f2a5e);

/// `IDebugControl`
pub const IID_IDEBUG_CONTROL: Guid = Guid::from_u128(0x5182e668_105e_416e_ad92_24ef800424ba);
/// `IDebugControl2`
pub const IID_IDEBUG_CONTROL2: Guid = Guid::from_u128(0xd4366723_44df_4bed_8c7e_4c05424f4588);
/// `IDebugControl3`
pub const IID_IDEBUG_CONTROL3: Guid = Guid::from_u128(0x7df74a86_b03f_407f_90ab_a20dadcead08);

/// `IDebugSymbols`
pub const IID_IDEBUG_SYMBOLS: Guid = Guid::from_u128(0x8c31e98c_983a_48a5_9016_6fe5d667a950);
/// `IDebugSymbols2`
pub const IID_IDEBUG_SYMBOLS2: Guid = Guid::from_u128(0x3a707211_afdd_4495_ad4f_56fecdf8163f);

/// `IDebugDataSpaces`
pub const IID_IDEBUG_DATA_SPACES: Guid = Guid::from_u128(0x88f7dfab_3ea7_4c3a_aefb_c4e8106173aa);
/// `IDebugDataSpaces2`
pub const IID_IDEBUG_DATA_SPACES2: Guid = Guid::from_u128(0x7a5e852f_96e9_468f_ac1b_0b3addc4a049);

/// `IDebugAdvanced`
pub const IID_IDEBUG_ADVANCED: Guid = Guid::from_u128(0xf2df5f53_071f_47bd_9de6_5734c3fed689);
/// `IDebugAdvanced2`
pub const IID_IDEBUG_ADVANCED2: Guid = Guid::from_u128(0x716d14c9_119b_4ba5_af1f_0890e672416a);
/// `IDebugAdvanced3`
pub const IID_IDEBUG_ADVANCED3: Guid = Guid::from_u128(0xcba4abb4_84c4_444d_87ca_a04e13286739);

/// `IDebugSystemObjects`
pub const IID_IDEBUG_SYSTEM_OBJECTS: Guid = Guid::from_u128(0x6b86fe2c_2c4f_4f0c_9da2_174311acc327);

/// `IDebugOutputCallbacks`
pub const IID_IDEBUG_OUTPUT_CALLBACKS: Guid = Guid::from_u128(0x4bf58045_d654_4c40_b0af_683090f356dc);
/// `IDebugEventCallbacks`
pub const IID_IDEBUG_EVENT_CALLBACKS: Guid = Guid::from_u128(0x337be28b_5036_4d72_b6bf_c45fbb9f2eaa);

/// A native interface vtable.
///
/// # Safety
///
/// The implementing struct must be `#[repr(C)]`, start with the `IUnknown`
/// methods (directly or through `base`), and match the native method order of
/// the interface named by [`ComInterface::IID`].
pub unsafe trait ComInterface: 'static
{
    /// Interface identifier used with `QueryInterface`.
    const IID: Guid;
    /// Native interface name, used in logs and errors.
    const NAME: &'static str;

    /// The `IUnknown` prefix shared by every interface.
    fn unknown(&self) -> &IUnknownVtbl;
}

macro_rules! com_interface {
    ($vtbl:ty, $iid:expr, $name:literal, root) => {
        // SAFETY: declared repr(C) in native method order.
        unsafe impl ComInterface for $vtbl
        {
            const IID: Guid = $iid;
            const NAME: &'static str = $name;

            fn unknown(&self) -> &IUnknownVtbl
            {
                &self.unknown
            }
        }
    };
    ($vtbl:ty, $iid:expr, $name:literal) => {
        // SAFETY: declared repr(C) in native method order, base first.
        unsafe impl ComInterface for $vtbl
        {
            const IID: Guid = $iid;
            const NAME: &'static str = $name;

            fn unknown(&self) -> &IUnknownVtbl
            {
                self.base.unknown()
            }
        }
    };
}

const fn slots(count: usize) -> usize
{
    count * size_of::<usize>()
}

// ============================================================================
// IUnknown
// ============================================================================

/// `IUnknown`
#[repr(C)]
pub struct IUnknownVtbl
{
    pub query_interface: unsafe extern "system" fn(this: This, iid: *const Guid, out: *mut *mut c_void) -> HRESULT,
    pub add_ref: unsafe extern "system" fn(this: This) -> u32,
    pub release: unsafe extern "system" fn(this: This) -> u32,
}

const _: () = assert!(size_of::<IUnknownVtbl>() == slots(3));

// ============================================================================
// IDebugClient
// ============================================================================

/// `IDebugClient`
#[repr(C)]
pub struct IDebugClientVtbl
{
    pub unknown: IUnknownVtbl,
    /// `AttachKernel` .. `GetRunningProcessDescription`
    pub _kernel_and_process_servers: [Slot; 9],
    pub attach_process: unsafe extern "system" fn(this: This, server: u64, process_id: u32, flags: u32) -> HRESULT,
    /// `CreateProcess` .. `SetProcessOptions`
    pub _process_creation: [Slot; 6],
    pub open_dump_file: unsafe extern "system" fn(this: This, path: *const c_char) -> HRESULT,
    /// `WriteDumpFile` .. `TerminateProcesses`
    pub _dump_writing_and_servers: [Slot; 5],
    pub detach_processes: unsafe extern "system" fn(this: This) -> HRESULT,
    pub end_session: unsafe extern "system" fn(this: This, flags: u32) -> HRESULT,
    pub get_exit_code: unsafe extern "system" fn(this: This, code: *mut u32) -> HRESULT,
    pub dispatch_callbacks: unsafe extern "system" fn(this: This, timeout: u32) -> HRESULT,
    pub exit_dispatch: unsafe extern "system" fn(this: This, client: *mut c_void) -> HRESULT,
    /// `CreateClient` .. `GetOutputCallbacks`
    pub _input_callbacks: [Slot; 4],
    pub set_output_callbacks: unsafe extern "system" fn(this: This, callbacks: *mut c_void) -> HRESULT,
    pub get_output_mask: unsafe extern "system" fn(this: This, mask: *mut u32) -> HRESULT,
    pub set_output_mask: unsafe extern "system" fn(this: This, mask: u32) -> HRESULT,
    /// `GetOtherOutputMask` .. `OutputIdentity`
    pub _output_formatting: [Slot; 8],
    /// `GetEventCallbacks`
    pub _get_event_callbacks: Slot,
    pub set_event_callbacks: unsafe extern "system" fn(this: This, callbacks: *mut c_void) -> HRESULT,
    pub flush_callbacks: unsafe extern "system" fn(this: This) -> HRESULT,
}

/// `IDebugClient2`
#[repr(C)]
pub struct IDebugClient2Vtbl
{
    pub base: IDebugClientVtbl,
    /// `WriteDumpFile2` .. `IsKernelDebuggerEnabled`
    pub _dump_and_server_ext: [Slot; 5],
    pub terminate_current_process: unsafe extern "system" fn(this: This) -> HRESULT,
    pub detach_current_process: unsafe extern "system" fn(this: This) -> HRESULT,
    /// `AbandonCurrentProcess`
    pub _abandon_current_process: Slot,
}

/// `IDebugClient3`
#[repr(C)]
pub struct IDebugClient3Vtbl
{
    pub base: IDebugClient2Vtbl,
    /// Wide-string process creation and lookup
    pub _wide_process: [Slot; 4],
}

/// `IDebugClient4`
#[repr(C)]
pub struct IDebugClient4Vtbl
{
    pub base: IDebugClient3Vtbl,
    /// `OpenDumpFileWide` .. `AddDumpInformationFileWide`
    pub _wide_dump: [Slot; 3],
    pub get_number_dump_files: unsafe extern "system" fn(this: This, count: *mut u32) -> HRESULT,
    /// `GetDumpFile`, `GetDumpFileWide`
    pub _dump_file: [Slot; 2],
}

const _: () = assert!(size_of::<IDebugClientVtbl>() == slots(3 + 45));
const _: () = assert!(size_of::<IDebugClient2Vtbl>() == slots(3 + 45 + 8));
const _: () = assert!(size_of::<IDebugClient3Vtbl>() == slots(3 + 45 + 8 + 4));
const _: () = assert!(size_of::<IDebugClient4Vtbl>() == slots(3 + 45 + 8 + 4 + 6));

com_interface!(IDebugClientVtbl, IID_IDEBUG_CLIENT, "IDebugClient", root);
com_interface!(IDebugClient2Vtbl, IID_IDEBUG_CLIENT2, "IDebugClient2");
com_interface!(IDebugClient3Vtbl, IID_IDEBUG_CLIENT3, "IDebugClient3");
com_interface!(IDebugClient4Vtbl, IID_IDEBUG_CLIENT4, "IDebugClient4");

// ============================================================================
// IDebugControl
// ============================================================================

/// `IDebugControl`
#[repr(C)]
pub struct IDebugControlVtbl
{
    pub unknown: IUnknownVtbl,
    /// `GetInterrupt`
    pub _get_interrupt: Slot,
    pub set_interrupt: unsafe extern "system" fn(this: This, flags: u32) -> HRESULT,
    /// `GetInterruptTimeout` .. `GetNearInstruction`
    pub _io_and_disassembly: [Slot; 26],
    pub get_stack_trace: unsafe extern "system" fn(
        this: This,
        frame_offset: u64,
        stack_offset: u64,
        instruction_offset: u64,
        frames: *mut NativeStackFrame,
        frames_size: u32,
        frames_filled: *mut u32,
    ) -> HRESULT,
    /// `GetReturnOffset`, `OutputStackTrace`, `GetDebuggeeType`
    pub _stack_output: [Slot; 3],
    pub get_actual_processor_type: unsafe extern "system" fn(this: This, processor: *mut u32) -> HRESULT,
    /// `GetExecutingProcessorType` .. `GetSystemVersion`
    pub _processor_info: [Slot; 5],
    pub get_page_size: unsafe extern "system" fn(this: This, size: *mut u32) -> HRESULT,
    pub is_pointer_64bit: unsafe extern "system" fn(this: This) -> HRESULT,
    /// `ReadBugCheckData` .. `SetEffectiveProcessorType`
    pub _processor_types: [Slot; 6],
    pub get_execution_status: unsafe extern "system" fn(this: This, status: *mut u32) -> HRESULT,
    pub set_execution_status: unsafe extern "system" fn(this: This, status: u32) -> HRESULT,
    /// `GetCodeLevel` .. `SetExceptionFilterSecondCommand`
    pub _engine_options_and_filters: [Slot; 42],
    pub wait_for_event: unsafe extern "system" fn(this: This, flags: u32, timeout: u32) -> HRESULT,
    pub get_last_event_information: unsafe extern "system" fn(
        this: This,
        event_type: *mut u32,
        process_id: *mut u32,
        thread_id: *mut u32,
        extra_information: *mut c_void,
        extra_information_size: u32,
        extra_information_used: *mut u32,
        description: *mut c_char,
        description_size: u32,
        description_used: *mut u32,
    ) -> HRESULT,
}

/// `IDebugControl2`
#[repr(C)]
pub struct IDebugControl2Vtbl
{
    pub base: IDebugControlVtbl,
    pub get_current_time_date: unsafe extern "system" fn(this: This, time_date: *mut u32) -> HRESULT,
    /// `GetCurrentSystemUpTime`
    pub _get_current_system_up_time: Slot,
    pub get_dump_format_flags: unsafe extern "system" fn(this: This, flags: *mut u32) -> HRESULT,
    /// Text replacements
    pub _text_replacements: [Slot; 5],
}

/// `IDebugControl3`
#[repr(C)]
pub struct IDebugControl3Vtbl
{
    pub base: IDebugControl2Vtbl,
    /// Assembly options and expression syntax
    pub _assembly_and_syntax: [Slot; 9],
    pub get_number_events: unsafe extern "system" fn(this: This, events: *mut u32) -> HRESULT,
    /// `GetEventIndexDescription` .. `SetNextEventIndex`
    pub _event_index: [Slot; 3],
}

const _: () = assert!(size_of::<IDebugControlVtbl>() == slots(3 + 92));
const _: () = assert!(size_of::<IDebugControl2Vtbl>() == slots(3 + 92 + 8));
const _: () = assert!(size_of::<IDebugControl3Vtbl>() == slots(3 + 92 + 8 + 13));

com_interface!(IDebugControlVtbl, IID_IDEBUG_CONTROL, "IDebugControl", root);
com_interface!(IDebugControl2Vtbl, IID_IDEBUG_CONTROL2, "IDebugControl2");
com_interface!(IDebugControl3Vtbl, IID_IDEBUG_CONTROL3, "IDebugControl3");

// ============================================================================
// IDebugSymbols
// ============================================================================

/// `IDebugSymbols`
#[repr(C)]
pub struct IDebugSymbolsVtbl
{
    pub unknown: IUnknownVtbl,
    pub get_symbol_options: unsafe extern "system" fn(this: This, options: *mut u32) -> HRESULT,
    /// `AddSymbolOptions`, `RemoveSymbolOptions`
    pub _option_edits: [Slot; 2],
    pub set_symbol_options: unsafe extern "system" fn(this: This, options: u32) -> HRESULT,
    pub get_name_by_offset: unsafe extern "system" fn(
        this: This,
        offset: u64,
        name: *mut c_char,
        name_size: u32,
        name_used: *mut u32,
        displacement: *mut u64,
    ) -> HRESULT,
    pub get_offset_by_name: unsafe extern "system" fn(this: This, symbol: *const c_char, offset: *mut u64) -> HRESULT,
    /// `GetNearNameByOffset`, `GetLineByOffset`, `GetOffsetByLine`
    pub _near_and_lines: [Slot; 3],
    pub get_number_modules: unsafe extern "system" fn(this: This, loaded: *mut u32, unloaded: *mut u32) -> HRESULT,
    pub get_module_by_index: unsafe extern "system" fn(this: This, index: u32, base: *mut u64) -> HRESULT,
    pub get_module_by_module_name: unsafe extern "system" fn(
        this: This,
        name: *const c_char,
        start_index: u32,
        index: *mut u32,
        base: *mut u64,
    ) -> HRESULT,
    pub get_module_by_offset:
        unsafe extern "system" fn(this: This, offset: u64, start_index: u32, index: *mut u32, base: *mut u64) -> HRESULT,
    pub get_module_names: unsafe extern "system" fn(
        this: This,
        index: u32,
        base: u64,
        image_name: *mut c_char,
        image_name_size: u32,
        image_name_used: *mut u32,
        module_name: *mut c_char,
        module_name_size: u32,
        module_name_used: *mut u32,
        loaded_image_name: *mut c_char,
        loaded_image_name_size: u32,
        loaded_image_name_used: *mut u32,
    ) -> HRESULT,
    pub get_module_parameters: unsafe extern "system" fn(
        this: This,
        count: u32,
        bases: *const u64,
        start: u32,
        params: *mut ModuleDescriptor,
    ) -> HRESULT,
    /// `GetSymbolModule` .. `EndSymbolMatch`
    pub _types_and_scopes: [Slot; 21],
    pub reload: unsafe extern "system" fn(this: This, module: *const c_char) -> HRESULT,
    pub get_symbol_path:
        unsafe extern "system" fn(this: This, buffer: *mut c_char, buffer_size: u32, path_size: *mut u32) -> HRESULT,
    pub set_symbol_path: unsafe extern "system" fn(this: This, path: *const c_char) -> HRESULT,
    /// `AppendSymbolPath` .. `GetSourceFileLineOffsets`
    pub _image_and_source_paths: [Slot; 10],
}

/// `IDebugSymbols2`
#[repr(C)]
pub struct IDebugSymbols2Vtbl
{
    pub base: IDebugSymbolsVtbl,
    /// `GetModuleVersionInformation`
    pub _get_module_version_information: Slot,
    pub get_module_name_string: unsafe extern "system" fn(
        this: This,
        which: u32,
        index: u32,
        base: u64,
        buffer: *mut c_char,
        buffer_size: u32,
        name_size: *mut u32,
    ) -> HRESULT,
    /// `GetConstantName` .. `SetTypeOptions`
    pub _type_names_and_options: [Slot; 6],
}

const _: () = assert!(size_of::<IDebugSymbolsVtbl>() == slots(3 + 49));
const _: () = assert!(size_of::<IDebugSymbols2Vtbl>() == slots(3 + 49 + 8));

com_interface!(IDebugSymbolsVtbl, IID_IDEBUG_SYMBOLS, "IDebugSymbols", root);
com_interface!(IDebugSymbols2Vtbl, IID_IDEBUG_SYMBOLS2, "IDebugSymbols2");

// ============================================================================
// IDebugDataSpaces
// ============================================================================

/// `IDebugDataSpaces`
#[repr(C)]
pub struct IDebugDataSpacesVtbl
{
    pub unknown: IUnknownVtbl,
    pub read_virtual:
        unsafe extern "system" fn(this: This, offset: u64, buffer: *mut c_void, size: u32, read: *mut u32) -> HRESULT,
    pub write_virtual: unsafe extern "system" fn(
        this: This,
        offset: u64,
        buffer: *const c_void,
        size: u32,
        written: *mut u32,
    ) -> HRESULT,
    /// `SearchVirtual`, `ReadVirtualUncached`, `WriteVirtualUncached`
    pub _search_and_uncached: [Slot; 3],
    pub read_pointers_virtual: unsafe extern "system" fn(this: This, count: u32, offset: u64, ptrs: *mut u64) -> HRESULT,
    /// `WritePointersVirtual` .. `ReadProcessorSystemData`
    pub _physical_and_io: [Slot; 14],
}

/// `IDebugDataSpaces2`
#[repr(C)]
pub struct IDebugDataSpaces2Vtbl
{
    pub base: IDebugDataSpacesVtbl,
    /// `VirtualToPhysical` .. `FillPhysical`
    pub _translation_and_fill: [Slot; 5],
    pub query_virtual:
        unsafe extern "system" fn(this: This, offset: u64, info: *mut MemoryBasicInformation64) -> HRESULT,
}

const _: () = assert!(size_of::<IDebugDataSpacesVtbl>() == slots(3 + 20));
const _: () = assert!(size_of::<IDebugDataSpaces2Vtbl>() == slots(3 + 20 + 6));

com_interface!(IDebugDataSpacesVtbl, IID_IDEBUG_DATA_SPACES, "IDebugDataSpaces", root);
com_interface!(IDebugDataSpaces2Vtbl, IID_IDEBUG_DATA_SPACES2, "IDebugDataSpaces2");

// ============================================================================
// IDebugAdvanced
// ============================================================================

/// `IDebugAdvanced`
#[repr(C)]
pub struct IDebugAdvancedVtbl
{
    pub unknown: IUnknownVtbl,
    pub get_thread_context: unsafe extern "system" fn(this: This, context: *mut c_void, size: u32) -> HRESULT,
    pub set_thread_context: unsafe extern "system" fn(this: This, context: *const c_void, size: u32) -> HRESULT,
}

/// `IDebugAdvanced2`
#[repr(C)]
pub struct IDebugAdvanced2Vtbl
{
    pub base: IDebugAdvancedVtbl,
    /// `Request` .. `GetSystemObjectInformation`
    pub _requests_and_source: [Slot; 5],
}

/// `IDebugAdvanced3`
#[repr(C)]
pub struct IDebugAdvanced3Vtbl
{
    pub base: IDebugAdvanced2Vtbl,
    /// Wide-string variants
    pub _wide: [Slot; 3],
}

const _: () = assert!(size_of::<IDebugAdvancedVtbl>() == slots(3 + 2));
const _: () = assert!(size_of::<IDebugAdvanced2Vtbl>() == slots(3 + 2 + 5));
const _: () = assert!(size_of::<IDebugAdvanced3Vtbl>() == slots(3 + 2 + 5 + 3));

com_interface!(IDebugAdvancedVtbl, IID_IDEBUG_ADVANCED, "IDebugAdvanced", root);
com_interface!(IDebugAdvanced2Vtbl, IID_IDEBUG_ADVANCED2, "IDebugAdvanced2");
com_interface!(IDebugAdvanced3Vtbl, IID_IDEBUG_ADVANCED3, "IDebugAdvanced3");

// ============================================================================
// IDebugSystemObjects
// ============================================================================

/// `IDebugSystemObjects`
#[repr(C)]
pub struct IDebugSystemObjectsVtbl
{
    pub unknown: IUnknownVtbl,
    pub get_event_thread: unsafe extern "system" fn(this: This, id: *mut u32) -> HRESULT,
    /// `GetEventProcess`
    pub _get_event_process: Slot,
    pub get_current_thread_id: unsafe extern "system" fn(this: This, id: *mut u32) -> HRESULT,
    pub set_current_thread_id: unsafe extern "system" fn(this: This, id: u32) -> HRESULT,
    /// `GetCurrentProcessId`, `SetCurrentProcessId`
    pub _current_process: [Slot; 2],
    pub get_number_threads: unsafe extern "system" fn(this: This, number: *mut u32) -> HRESULT,
    /// `GetTotalNumberThreads`
    pub _get_total_number_threads: Slot,
    pub get_thread_ids_by_index: unsafe extern "system" fn(
        this: This,
        start: u32,
        count: u32,
        ids: *mut u32,
        system_ids: *mut u32,
    ) -> HRESULT,
    /// `GetThreadIdByProcessor` .. `GetThreadIdByTeb`
    pub _thread_lookup: [Slot; 5],
    pub get_current_thread_system_id: unsafe extern "system" fn(this: This, system_id: *mut u32) -> HRESULT,
    /// `GetThreadIdBySystemId` .. `GetProcessIdByPeb`
    pub _process_lookup: [Slot; 9],
    pub get_current_process_system_id: unsafe extern "system" fn(this: This, system_id: *mut u32) -> HRESULT,
    /// `GetProcessIdBySystemId` .. `GetCurrentProcessExecutableName`
    pub _process_handles: [Slot; 4],
}

const _: () = assert!(size_of::<IDebugSystemObjectsVtbl>() == slots(3 + 29));

com_interface!(IDebugSystemObjectsVtbl, IID_IDEBUG_SYSTEM_OBJECTS, "IDebugSystemObjects", root);

// ============================================================================
// Callback interfaces (implemented by this crate, called by the engine)
// ============================================================================

/// `IDebugOutputCallbacks`
#[repr(C)]
pub struct IDebugOutputCallbacksVtbl
{
    pub unknown: IUnknownVtbl,
    pub output: unsafe extern "system" fn(this: This, mask: u32, text: *const c_char) -> HRESULT,
}

/// `IDebugEventCallbacks`
#[repr(C)]
pub struct IDebugEventCallbacksVtbl
{
    pub unknown: IUnknownVtbl,
    pub get_interest_mask: unsafe extern "system" fn(this: This, mask: *mut u32) -> HRESULT,
    pub breakpoint: unsafe extern "system" fn(this: This, breakpoint: *mut c_void) -> HRESULT,
    pub exception:
        unsafe extern "system" fn(this: This, exception: *const ExceptionRecord64, first_chance: u32) -> HRESULT,
    pub create_thread:
        unsafe extern "system" fn(this: This, handle: u64, data_offset: u64, start_offset: u64) -> HRESULT,
    pub exit_thread: unsafe extern "system" fn(this: This, exit_code: u32) -> HRESULT,
    pub create_process: unsafe extern "system" fn(
        this: This,
        image_file_handle: u64,
        handle: u64,
        base_offset: u64,
        module_size: u32,
        module_name: *const c_char,
        image_name: *const c_char,
        checksum: u32,
        time_date_stamp: u32,
        initial_thread_handle: u64,
        thread_data_offset: u64,
        start_offset: u64,
    ) -> HRESULT,
    pub exit_process: unsafe extern "system" fn(this: This, exit_code: u32) -> HRESULT,
    pub load_module: unsafe extern "system" fn(
        this: This,
        image_file_handle: u64,
        base_offset: u64,
        module_size: u32,
        module_name: *const c_char,
        image_name: *const c_char,
        checksum: u32,
        time_date_stamp: u32,
    ) -> HRESULT,
    pub unload_module: unsafe extern "system" fn(this: This, image_base_name: *const c_char, base_offset: u64) -> HRESULT,
    pub system_error: unsafe extern "system" fn(this: This, error: u32, level: u32) -> HRESULT,
    pub session_status: unsafe extern "system" fn(this: This, status: u32) -> HRESULT,
    pub change_debuggee_state: unsafe extern "system" fn(this: This, flags: u32, argument: u64) -> HRESULT,
    pub change_engine_state: unsafe extern "system" fn(this: This, flags: u32, argument: u64) -> HRESULT,
    pub change_symbol_state: unsafe extern "system" fn(this: This, flags: u32, argument: u64) -> HRESULT,
}

const _: () = assert!(size_of::<IDebugOutputCallbacksVtbl>() == slots(3 + 1));
const _: () = assert!(size_of::<IDebugEventCallbacksVtbl>() == slots(3 + 14));

com_interface!(IDebugOutputCallbacksVtbl, IID_IDEBUG_OUTPUT_CALLBACKS, "IDebugOutputCallbacks", root);
com_interface!(IDebugEventCallbacksVtbl, IID_IDEBUG_EVENT_CALLBACKS, "IDebugEventCallbacks", root);
