//! Scripted in-process engine.
//!
//! Implements the real interface vtables with `extern "system"` functions
//! backed by a plain Rust state struct. Every native call is logged by name,
//! interface releases are recorded in order, and waits deliver scripted
//! events to whatever callbacks the session registered.
//!
//! Engines are leaked on creation so interface pointers handed to a session
//! stay valid no matter which side is dropped first.

use std::collections::{HashMap, VecDeque};
use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use dbgbridge_core::abi::vtables::{
    IDebugAdvancedVtbl, IDebugClient2Vtbl, IDebugClient3Vtbl, IDebugClient4Vtbl, IDebugClientVtbl,
    IDebugControl2Vtbl, IDebugControl3Vtbl, IDebugControlVtbl, IDebugDataSpaces2Vtbl, IDebugDataSpacesVtbl,
    IDebugEventCallbacksVtbl, IDebugOutputCallbacksVtbl, IDebugSymbols2Vtbl, IDebugSymbolsVtbl,
    IDebugSystemObjectsVtbl, IUnknownVtbl, This, IID_IDEBUG_ADVANCED, IID_IDEBUG_ADVANCED2, IID_IDEBUG_ADVANCED3,
    IID_IDEBUG_CLIENT, IID_IDEBUG_CLIENT2, IID_IDEBUG_CLIENT3, IID_IDEBUG_CLIENT4, IID_IDEBUG_CONTROL,
    IID_IDEBUG_CONTROL2, IID_IDEBUG_CONTROL3, IID_IDEBUG_DATA_SPACES, IID_IDEBUG_DATA_SPACES2, IID_IDEBUG_SYMBOLS,
    IID_IDEBUG_SYMBOLS2, IID_IDEBUG_SYSTEM_OBJECTS, IID_IUNKNOWN,
};
use dbgbridge_core::abi::{
    AbiRecord, Amd64Context, ExceptionRecord64, Guid, MemoryBasicInformation64, ModuleDescriptor, NativeStackFrame,
};
use dbgbridge_core::platform::constants::{
    DEBUG_EVENT_BREAKPOINT, DEBUG_EVENT_EXCEPTION, DEBUG_EVENT_EXIT_PROCESS, DEBUG_EVENT_LOAD_MODULE,
    DEBUG_EVENT_UNLOAD_MODULE, DEBUG_INVALID_OFFSET, DEBUG_MODNAME_IMAGE, DEBUG_MODNAME_LOADED_IMAGE,
    DEBUG_MODNAME_MAPPED_IMAGE, DEBUG_MODNAME_MODULE, DEBUG_MODNAME_SYMBOL_FILE, DEBUG_OUTPUT_NORMAL,
    DEBUG_STATUS_BREAK, DEBUG_STATUS_GO, DEBUG_STATUS_NO_DEBUGGEE, IMAGE_FILE_MACHINE_AMD64, INFINITE,
};
use dbgbridge_core::platform::hresult::{
    hresult_from_win32, E_FAIL, E_INVALIDARG, E_NOINTERFACE, E_PENDING, E_POINTER, E_UNEXPECTED, ERROR_PARTIAL_COPY,
    ERROR_READ_FAULT, HRESULT, S_FALSE, S_OK,
};
use dbgbridge_core::proxy::{InterfaceGroup, NegotiatedVersions};
use dbgbridge_core::{BridgeError, BridgeResult, SessionConfig};

// ============================================================================
// Scripted state
// ============================================================================

/// A module the fake reports as loaded.
#[derive(Debug, Clone)]
pub struct FakeModule
{
    pub name: String,
    pub image: String,
    pub base: u64,
    pub size: u32,
    /// `(offset from base, name)`
    pub symbols: Vec<(u64, String)>,
    pub symbol_file: Option<String>,
    pub reserved: [u64; 2],
    /// Make `GetModuleNames` fail for this module
    pub names_fail: bool,
}

impl FakeModule
{
    pub fn new(name: &str, base: u64, size: u32) -> Self
    {
        Self {
            name: name.to_string(),
            image: format!("C:\\Windows\\System32\\{name}.dll"),
            base,
            size,
            symbols: Vec::new(),
            symbol_file: Some(format!("{name}.pdb")),
            reserved: [0, 0],
            names_fail: false,
        }
    }

    pub fn symbol(mut self, offset: u64, name: &str) -> Self
    {
        self.symbols.push((offset, name.to_string()));
        self.symbols.sort_by_key(|(offset, _)| *offset);
        self
    }

    fn contains(&self, address: u64) -> bool
    {
        address >= self.base && address - self.base < u64::from(self.size)
    }

    fn descriptor(&self) -> ModuleDescriptor
    {
        let mut descriptor = ModuleDescriptor::zeroed();
        descriptor.base = self.base;
        descriptor.size = self.size;
        descriptor.time_date_stamp = 0x5f00_0000;
        descriptor.checksum = 0x0001_2345;
        descriptor.symbol_type = 3;
        descriptor.image_name_size = name_size(&self.image);
        descriptor.module_name_size = name_size(&self.name);
        descriptor.loaded_image_name_size = name_size(&self.image);
        descriptor.symbol_file_name_size = self.symbol_file.as_deref().map_or(0, name_size);
        descriptor.mapped_image_name_size = 0;
        descriptor.reserved = self.reserved;
        descriptor
    }
}

#[allow(clippy::cast_possible_truncation)]
fn name_size(name: &str) -> u32
{
    name.len() as u32 + 1
}

/// An event delivered to the registered callbacks by the next wait.
#[derive(Debug, Clone)]
pub enum Scripted
{
    Output(String),
    Breakpoint,
    Exception
    {
        code: u32, address: u64, first_chance: bool
    },
    LoadModule
    {
        name: String, base: u64, size: u32
    },
    UnloadModule
    {
        name: String, base: u64
    },
    ExitProcess(u32),
}

impl Scripted
{
    fn last_event(&self) -> Option<(u32, String)>
    {
        match self {
            Scripted::Output(_) => None,
            Scripted::Breakpoint => Some((DEBUG_EVENT_BREAKPOINT, "Hit breakpoint 0".to_string())),
            Scripted::Exception { code, address, .. } => {
                Some((DEBUG_EVENT_EXCEPTION, format!("Exception 0x{code:08x} at 0x{address:x}")))
            }
            Scripted::LoadModule { name, .. } => Some((DEBUG_EVENT_LOAD_MODULE, format!("Load module {name}"))),
            Scripted::UnloadModule { name, .. } => Some((DEBUG_EVENT_UNLOAD_MODULE, format!("Unload module {name}"))),
            Scripted::ExitProcess(code) => Some((DEBUG_EVENT_EXIT_PROCESS, format!("Exit process {code}"))),
        }
    }
}

/// How reads that run off the end of mapped memory behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialReads
{
    /// Fail the whole read with `ERROR_PARTIAL_COPY`
    Fail,
    /// Succeed with the readable prefix
    ReturnPrefix,
}

/// Everything the fake knows and remembers.
#[derive(Debug)]
pub struct EngineState
{
    pub calls: Vec<String>,
    pub released: Vec<InterfaceGroup>,
    pub versions: NegotiatedVersions,
    pub modules: Vec<FakeModule>,
    pub memory: Vec<(u64, Vec<u8>)>,
    pub partial_reads: PartialReads,
    pub status: u32,
    pub processor: u32,
    pub page_size: u32,
    pub pointer_64: bool,
    pub threads: Vec<(u32, u32)>,
    pub current_thread: u32,
    /// `rip, rsp, rbp` per engine thread id
    pub registers: HashMap<u32, (u64, u64, u64)>,
    /// `(instruction, return)` pairs, innermost first
    pub frames: Vec<(u64, u64)>,
    pub script: VecDeque<Scripted>,
    pub last_event: (u32, String),
    /// Block waits until released or interrupted
    pub hold_wait: bool,
    pub waiting: bool,
    pub interrupted: bool,
    pub interrupts: u32,
    /// Next wait reports a timeout
    pub time_out_next_wait: bool,
    /// Methods that fail with `E_PENDING` for the next N calls
    pub transient: HashMap<&'static str, u32>,
    /// Methods that always fail with the given code
    pub failures: HashMap<&'static str, HRESULT>,
    pub output_callbacks: usize,
    pub event_callbacks: usize,
    pub interest: u32,
    pub dispositions: Vec<HRESULT>,
    pub output_results: Vec<HRESULT>,
    pub symbol_path: String,
    pub symbol_options: u32,
    pub output_mask: u32,
    pub end_session: Option<u32>,
    pub attached: Option<u32>,
    pub dump: Option<String>,
    pub reloads: Vec<String>,
    pub execution_requests: Vec<u32>,
}

impl EngineState
{
    fn new() -> Self
    {
        Self {
            calls: Vec::new(),
            released: Vec::new(),
            versions: NegotiatedVersions {
                client: 4,
                control: 3,
                symbols: 2,
                data_spaces: 2,
                advanced: 1,
                system_objects: 1,
            },
            modules: Vec::new(),
            memory: Vec::new(),
            partial_reads: PartialReads::Fail,
            status: DEBUG_STATUS_NO_DEBUGGEE,
            processor: IMAGE_FILE_MACHINE_AMD64,
            page_size: 0x1000,
            pointer_64: true,
            threads: vec![(0, 0x1a00), (1, 0x1a04)],
            current_thread: 0,
            registers: HashMap::from([(0, (0x7ff6_0000_1010, 0x7ffe_0000, 0x7ffe_0040)), (1, (0x7ff6_0000_2020, 0x6ffe_0000, 0x6ffe_0040))]),
            frames: Vec::new(),
            script: VecDeque::new(),
            last_event: (0, String::new()),
            hold_wait: false,
            waiting: false,
            interrupted: false,
            interrupts: 0,
            time_out_next_wait: false,
            transient: HashMap::new(),
            failures: HashMap::new(),
            output_callbacks: 0,
            event_callbacks: 0,
            interest: 0,
            dispositions: Vec::new(),
            output_results: Vec::new(),
            symbol_path: String::new(),
            symbol_options: 0,
            output_mask: 0,
            end_session: None,
            attached: None,
            dump: None,
            reloads: Vec::new(),
            execution_requests: Vec::new(),
        }
    }

    /// Number of logged calls whose name starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize
    {
        self.calls.iter().filter(|call| call.starts_with(prefix)).count()
    }

    fn module_index(&self, address: u64) -> Option<usize>
    {
        self.modules.iter().position(|module| module.contains(address))
    }

    /// Length of the readable run starting at `address`, capped at `limit`.
    fn readable_prefix(&self, address: u64, limit: usize) -> usize
    {
        let mut cursor = address;
        let mut total = 0usize;
        while total < limit {
            let Some((base, bytes)) = self
                .memory
                .iter()
                .find(|(base, bytes)| cursor >= *base && cursor - *base < bytes.len() as u64)
            else {
                break;
            };
            let available = bytes.len() - usize::try_from(cursor - base).unwrap_or(usize::MAX);
            let take = available.min(limit - total);
            total += take;
            cursor += take as u64;
        }
        total
    }

    fn byte_at(&self, address: u64) -> Option<u8>
    {
        self.memory.iter().find_map(|(base, bytes)| {
            if address >= *base && address - *base < bytes.len() as u64 {
                usize::try_from(address - base).ok().map(|offset| bytes[offset])
            } else {
                None
            }
        })
    }

    fn set_byte(&mut self, address: u64, value: u8) -> bool
    {
        for (base, bytes) in &mut self.memory {
            if address >= *base && address - *base < bytes.len() as u64 {
                if let Ok(offset) = usize::try_from(address - *base) {
                    bytes[offset] = value;
                    return true;
                }
            }
        }
        false
    }
}

// ============================================================================
// Engine object
// ============================================================================

const GROUPS: [InterfaceGroup; 6] = [
    InterfaceGroup::Client,
    InterfaceGroup::Control,
    InterfaceGroup::Symbols,
    InterfaceGroup::DataSpaces,
    InterfaceGroup::Advanced,
    InterfaceGroup::SystemObjects,
];

const IIDS: &[(Guid, InterfaceGroup, u32)] = &[
    (IID_IDEBUG_CLIENT, InterfaceGroup::Client, 1),
    (IID_IDEBUG_CLIENT2, InterfaceGroup::Client, 2),
    (IID_IDEBUG_CLIENT3, InterfaceGroup::Client, 3),
    (IID_IDEBUG_CLIENT4, InterfaceGroup::Client, 4),
    (IID_IDEBUG_CONTROL, InterfaceGroup::Control, 1),
    (IID_IDEBUG_CONTROL2, InterfaceGroup::Control, 2),
    (IID_IDEBUG_CONTROL3, InterfaceGroup::Control, 3),
    (IID_IDEBUG_SYMBOLS, InterfaceGroup::Symbols, 1),
    (IID_IDEBUG_SYMBOLS2, InterfaceGroup::Symbols, 2),
    (IID_IDEBUG_DATA_SPACES, InterfaceGroup::DataSpaces, 1),
    (IID_IDEBUG_DATA_SPACES2, InterfaceGroup::DataSpaces, 2),
    (IID_IDEBUG_ADVANCED, InterfaceGroup::Advanced, 1),
    (IID_IDEBUG_ADVANCED2, InterfaceGroup::Advanced, 2),
    (IID_IDEBUG_ADVANCED3, InterfaceGroup::Advanced, 3),
    (IID_IDEBUG_SYSTEM_OBJECTS, InterfaceGroup::SystemObjects, 1),
];

fn slot_of(group: InterfaceGroup) -> usize
{
    match group {
        InterfaceGroup::Client => 0,
        InterfaceGroup::Control => 1,
        InterfaceGroup::Symbols => 2,
        InterfaceGroup::DataSpaces => 3,
        InterfaceGroup::Advanced => 4,
        InterfaceGroup::SystemObjects => 5,
    }
}

/// One interface face of the engine. The vtable pointer comes first, as the ABI requires.
#[repr(C)]
struct Face
{
    vtbl: *const c_void,
    engine: *const Engine,
    group: InterfaceGroup,
    refs: AtomicU32,
}

struct Engine
{
    faces: [Face; 6],
    state: Mutex<EngineState>,
    wake: Condvar,
}

// SAFETY: the raw pointers in `faces` point into the leaked engine itself or
// at statics; all mutable state sits behind the mutex.
unsafe impl Send for Engine {}
// SAFETY: as above.
unsafe impl Sync for Engine {}

/// Handle to a leaked fake engine.
#[derive(Clone, Copy)]
pub struct FakeEngine
{
    engine: &'static Engine,
}

impl FakeEngine
{
    pub fn new() -> Self
    {
        let vtables: [*const c_void; 6] = [
            ptr::from_ref(&CLIENT_VTBL).cast(),
            ptr::from_ref(&CONTROL_VTBL).cast(),
            ptr::from_ref(&SYMBOLS_VTBL).cast(),
            ptr::from_ref(&DATA_SPACES_VTBL).cast(),
            ptr::from_ref(&ADVANCED_VTBL).cast(),
            ptr::from_ref(&SYSTEM_OBJECTS_VTBL).cast(),
        ];
        let faces = std::array::from_fn(|slot| Face {
            vtbl: vtables[slot],
            engine: ptr::null(),
            group: GROUPS[slot],
            refs: AtomicU32::new(0),
        });
        let engine: &'static mut Engine = Box::leak(Box::new(Engine {
            faces,
            state: Mutex::new(EngineState::new()),
            wake: Condvar::new(),
        }));
        let back: *const Engine = ptr::from_ref(engine);
        for face in &mut engine.faces {
            face.engine = back;
        }
        Self { engine }
    }

    /// Inspect or script the engine.
    pub fn state(&self) -> MutexGuard<'_, EngineState>
    {
        self.engine.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_module(self, module: FakeModule) -> Self
    {
        self.state().modules.push(module);
        self
    }

    pub fn with_memory(self, base: u64, bytes: Vec<u8>) -> Self
    {
        self.state().memory.push((base, bytes));
        self
    }

    pub fn with_versions(self, versions: NegotiatedVersions) -> Self
    {
        self.state().versions = versions;
        self
    }

    /// A dump target that is already broken in.
    pub fn suspended(self) -> Self
    {
        {
            let mut state = self.state();
            state.status = DEBUG_STATUS_BREAK;
            state.dump = Some("fake.dmp".to_string());
        }
        self
    }

    /// Queue an event for the next wait.
    pub fn script(&self, event: Scripted)
    {
        self.state().script.push_back(event);
    }

    /// Release a held wait.
    pub fn release_wait(&self)
    {
        self.state().hold_wait = false;
        self.engine.wake.notify_all();
    }

    /// Block until a wait is in progress.
    pub fn wait_until_waiting(&self, timeout: Duration) -> bool
    {
        let deadline = Instant::now() + timeout;
        let mut state = self.state();
        while !state.waiting {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self
                .engine
                .wake
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    pub fn call_count(&self) -> usize
    {
        self.state().calls.len()
    }

    /// References currently held on `group`'s interface.
    pub fn refs(&self, group: InterfaceGroup) -> u32
    {
        self.engine.faces[slot_of(group)].refs.load(Ordering::SeqCst)
    }

    /// What `DebugCreate` returns: the client face with one new reference.
    pub fn create_root(self) -> BridgeResult<NonNull<c_void>>
    {
        self.state().calls.push("DebugCreate".to_string());
        let face = &self.engine.faces[slot_of(InterfaceGroup::Client)];
        face.refs.fetch_add(1, Ordering::SeqCst);
        NonNull::new(ptr::from_ref(face).cast_mut().cast::<c_void>())
            .ok_or_else(|| BridgeError::EngineUnavailable("null face".to_string()))
    }

    /// Session configuration that connects to this engine.
    pub fn config(self) -> SessionConfig
    {
        SessionConfig::new()
            .wait_for_initial_event(false)
            .custom_engine(move || self.create_root())
    }
}

// ============================================================================
// Plumbing
// ============================================================================

unsafe fn face<'a>(this: This) -> &'a Face
{
    &*this.cast::<Face>()
}

unsafe fn engine<'a>(this: This) -> &'a Engine
{
    &*face(this).engine
}

fn lock(engine: &Engine) -> MutexGuard<'_, EngineState>
{
    engine.state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Log the call and apply injected failures.
unsafe fn enter<'a>(this: This, name: &'static str) -> Result<MutexGuard<'a, EngineState>, HRESULT>
{
    let mut state = lock(engine(this));
    state.calls.push(name.to_string());
    if let Some(&code) = state.failures.get(name) {
        return Err(code);
    }
    if let Some(remaining) = state.transient.get_mut(name) {
        if *remaining > 0 {
            *remaining -= 1;
            return Err(E_PENDING);
        }
    }
    Ok(state)
}

macro_rules! enter {
    ($this:expr, $name:literal) => {
        match enter($this, $name) {
            Ok(state) => state,
            Err(code) => return code,
        }
    };
}

/// Copy `text` into a caller buffer the way the engine does.
unsafe fn write_string(text: &str, buffer: *mut c_char, size: u32, used: *mut u32) -> HRESULT
{
    let needed = name_size(text);
    if !used.is_null() {
        *used = needed;
    }
    if buffer.is_null() || size == 0 {
        return S_OK;
    }
    let capacity = size as usize;
    let copy = text.len().min(capacity - 1);
    ptr::copy_nonoverlapping(text.as_ptr(), buffer.cast::<u8>(), copy);
    *buffer.add(copy) = 0;
    if copy < text.len() {
        S_FALSE
    } else {
        S_OK
    }
}

unsafe fn read_c_string(text: *const c_char) -> String
{
    if text.is_null() {
        String::new()
    } else {
        CStr::from_ptr(text).to_string_lossy().into_owned()
    }
}

// ============================================================================
// IUnknown
// ============================================================================

const UNKNOWN: IUnknownVtbl = IUnknownVtbl {
    query_interface,
    add_ref,
    release,
};

unsafe extern "system" fn query_interface(this: This, iid: *const Guid, out: *mut *mut c_void) -> HRESULT
{
    if iid.is_null() || out.is_null() {
        return E_POINTER;
    }
    *out = ptr::null_mut();
    let engine = engine(this);
    let target = {
        let mut state = lock(engine);
        state.calls.push("IUnknown::QueryInterface".to_string());
        if *iid == IID_IUNKNOWN {
            Some(face(this).group)
        } else {
            IIDS.iter()
                .find(|(candidate, group, version)| *candidate == *iid && *version <= state.versions.get(*group))
                .map(|(_, group, _)| *group)
        }
    };
    let Some(group) = target else {
        return E_NOINTERFACE;
    };
    let target = &engine.faces[slot_of(group)];
    target.refs.fetch_add(1, Ordering::SeqCst);
    *out = ptr::from_ref(target).cast_mut().cast();
    S_OK
}

unsafe extern "system" fn add_ref(this: This) -> u32
{
    face(this).refs.fetch_add(1, Ordering::SeqCst) + 1
}

unsafe extern "system" fn release(this: This) -> u32
{
    let face = face(this);
    let remaining = face.refs.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
    if remaining == 0 {
        lock(&*face.engine).released.push(face.group);
    }
    remaining
}

// ============================================================================
// IDebugClient
// ============================================================================

static CLIENT_VTBL: IDebugClient4Vtbl = IDebugClient4Vtbl {
    base: IDebugClient3Vtbl {
        base: IDebugClient2Vtbl {
            base: IDebugClientVtbl {
                unknown: UNKNOWN,
                _kernel_and_process_servers: [None; 9],
                attach_process,
                _process_creation: [None; 6],
                open_dump_file,
                _dump_writing_and_servers: [None; 5],
                detach_processes,
                end_session,
                get_exit_code,
                dispatch_callbacks,
                exit_dispatch,
                _input_callbacks: [None; 4],
                set_output_callbacks,
                get_output_mask,
                set_output_mask,
                _output_formatting: [None; 8],
                _get_event_callbacks: None,
                set_event_callbacks,
                flush_callbacks,
            },
            _dump_and_server_ext: [None; 5],
            terminate_current_process,
            detach_current_process,
            _abandon_current_process: None,
        },
        _wide_process: [None; 4],
    },
    _wide_dump: [None; 3],
    get_number_dump_files,
    _dump_file: [None; 2],
};

unsafe extern "system" fn attach_process(this: This, _server: u64, process_id: u32, _flags: u32) -> HRESULT
{
    let mut state = enter!(this, "IDebugClient::AttachProcess");
    state.attached = Some(process_id);
    state.status = DEBUG_STATUS_GO;
    S_OK
}

unsafe extern "system" fn open_dump_file(this: This, path: *const c_char) -> HRESULT
{
    let mut state = enter!(this, "IDebugClient::OpenDumpFile");
    if path.is_null() {
        return E_POINTER;
    }
    state.dump = Some(read_c_string(path));
    state.status = DEBUG_STATUS_GO;
    S_OK
}

unsafe extern "system" fn detach_processes(this: This) -> HRESULT
{
    let mut state = enter!(this, "IDebugClient::DetachProcesses");
    state.attached = None;
    state.status = DEBUG_STATUS_NO_DEBUGGEE;
    S_OK
}

unsafe extern "system" fn end_session(this: This, flags: u32) -> HRESULT
{
    let mut state = enter!(this, "IDebugClient::EndSession");
    state.end_session = Some(flags);
    state.status = DEBUG_STATUS_NO_DEBUGGEE;
    S_OK
}

unsafe extern "system" fn get_exit_code(this: This, code: *mut u32) -> HRESULT
{
    let _state = enter!(this, "IDebugClient::GetExitCode");
    *code = 0;
    S_FALSE
}

unsafe extern "system" fn dispatch_callbacks(this: This, _timeout: u32) -> HRESULT
{
    let _state = enter!(this, "IDebugClient::DispatchCallbacks");
    S_OK
}

unsafe extern "system" fn exit_dispatch(this: This, _client: *mut c_void) -> HRESULT
{
    let _state = enter!(this, "IDebugClient::ExitDispatch");
    S_OK
}

/// Swap a stored callback pointer, taking and dropping references like the engine does.
unsafe fn swap_callbacks(slot: &mut usize, callbacks: *mut c_void)
{
    if !callbacks.is_null() {
        let vtbl = &**callbacks.cast::<*const IUnknownVtbl>();
        (vtbl.add_ref)(callbacks);
    }
    let previous = std::mem::replace(slot, callbacks as usize) as *mut c_void;
    if !previous.is_null() {
        let vtbl = &**previous.cast::<*const IUnknownVtbl>();
        (vtbl.release)(previous);
    }
}

unsafe extern "system" fn set_output_callbacks(this: This, callbacks: *mut c_void) -> HRESULT
{
    let mut state = enter!(this, "IDebugClient::SetOutputCallbacks");
    swap_callbacks(&mut state.output_callbacks, callbacks);
    S_OK
}

unsafe extern "system" fn get_output_mask(this: This, mask: *mut u32) -> HRESULT
{
    let state = enter!(this, "IDebugClient::GetOutputMask");
    *mask = state.output_mask;
    S_OK
}

unsafe extern "system" fn set_output_mask(this: This, mask: u32) -> HRESULT
{
    let mut state = enter!(this, "IDebugClient::SetOutputMask");
    state.output_mask = mask;
    S_OK
}

unsafe extern "system" fn set_event_callbacks(this: This, callbacks: *mut c_void) -> HRESULT
{
    let mut state = enter!(this, "IDebugClient::SetEventCallbacks");
    swap_callbacks(&mut state.event_callbacks, callbacks);
    if !callbacks.is_null() {
        let vtbl = &**callbacks.cast::<*const IDebugEventCallbacksVtbl>();
        let mut interest = 0u32;
        if (vtbl.get_interest_mask)(callbacks, &mut interest) == S_OK {
            state.interest = interest;
        }
    }
    S_OK
}

unsafe extern "system" fn flush_callbacks(this: This) -> HRESULT
{
    let _state = enter!(this, "IDebugClient::FlushCallbacks");
    S_OK
}

unsafe extern "system" fn terminate_current_process(this: This) -> HRESULT
{
    let mut state = enter!(this, "IDebugClient2::TerminateCurrentProcess");
    state.attached = None;
    state.status = DEBUG_STATUS_NO_DEBUGGEE;
    S_OK
}

unsafe extern "system" fn detach_current_process(this: This) -> HRESULT
{
    let mut state = enter!(this, "IDebugClient2::DetachCurrentProcess");
    state.attached = None;
    state.status = DEBUG_STATUS_NO_DEBUGGEE;
    S_OK
}

unsafe extern "system" fn get_number_dump_files(this: This, count: *mut u32) -> HRESULT
{
    let state = enter!(this, "IDebugClient4::GetNumberDumpFiles");
    *count = u32::from(state.dump.is_some());
    S_OK
}

// ============================================================================
// IDebugControl
// ============================================================================

static CONTROL_VTBL: IDebugControl3Vtbl = IDebugControl3Vtbl {
    base: IDebugControl2Vtbl {
        base: IDebugControlVtbl {
            unknown: UNKNOWN,
            _get_interrupt: None,
            set_interrupt,
            _io_and_disassembly: [None; 26],
            get_stack_trace,
            _stack_output: [None; 3],
            get_actual_processor_type,
            _processor_info: [None; 5],
            get_page_size,
            is_pointer_64bit,
            _processor_types: [None; 6],
            get_execution_status,
            set_execution_status,
            _engine_options_and_filters: [None; 42],
            wait_for_event,
            get_last_event_information,
        },
        get_current_time_date,
        _get_current_system_up_time: None,
        get_dump_format_flags,
        _text_replacements: [None; 5],
    },
    _assembly_and_syntax: [None; 9],
    get_number_events,
    _event_index: [None; 3],
};

unsafe extern "system" fn set_interrupt(this: This, _flags: u32) -> HRESULT
{
    let engine = engine(this);
    {
        let mut state = lock(engine);
        state.calls.push("IDebugControl::SetInterrupt".to_string());
        state.interrupts += 1;
        state.interrupted = true;
    }
    engine.wake.notify_all();
    S_OK
}

unsafe extern "system" fn get_stack_trace(
    this: This,
    _frame_offset: u64,
    _stack_offset: u64,
    _instruction_offset: u64,
    frames: *mut NativeStackFrame,
    frames_size: u32,
    frames_filled: *mut u32,
) -> HRESULT
{
    let state = enter!(this, "IDebugControl::GetStackTrace");
    let count = state.frames.len().min(frames_size as usize);
    for (number, &(instruction, return_offset)) in state.frames.iter().take(count).enumerate() {
        let mut frame = NativeStackFrame::zeroed();
        frame.instruction_offset = instruction;
        frame.return_offset = return_offset;
        frame.frame_offset = 0x7ffe_0000 + number as u64 * 0x40;
        frame.stack_offset = 0x7ffe_0000 + number as u64 * 0x40 - 8;
        frame.frame_number = u32::try_from(number).unwrap_or(u32::MAX);
        *frames.add(number) = frame;
    }
    if !frames_filled.is_null() {
        *frames_filled = u32::try_from(count).unwrap_or(u32::MAX);
    }
    S_OK
}

unsafe extern "system" fn get_actual_processor_type(this: This, processor: *mut u32) -> HRESULT
{
    let state = enter!(this, "IDebugControl::GetActualProcessorType");
    *processor = state.processor;
    S_OK
}

unsafe extern "system" fn get_page_size(this: This, size: *mut u32) -> HRESULT
{
    let state = enter!(this, "IDebugControl::GetPageSize");
    *size = state.page_size;
    S_OK
}

unsafe extern "system" fn is_pointer_64bit(this: This) -> HRESULT
{
    let state = enter!(this, "IDebugControl::IsPointer64Bit");
    if state.pointer_64 {
        S_OK
    } else {
        S_FALSE
    }
}

unsafe extern "system" fn get_execution_status(this: This, status: *mut u32) -> HRESULT
{
    let state = enter!(this, "IDebugControl::GetExecutionStatus");
    *status = state.status;
    S_OK
}

unsafe extern "system" fn set_execution_status(this: This, status: u32) -> HRESULT
{
    let mut state = enter!(this, "IDebugControl::SetExecutionStatus");
    if state.status == DEBUG_STATUS_NO_DEBUGGEE {
        return E_UNEXPECTED;
    }
    state.execution_requests.push(status);
    state.status = status;
    S_OK
}

unsafe extern "system" fn wait_for_event(this: This, _flags: u32, timeout: u32) -> HRESULT
{
    let engine = engine(this);
    let mut state = enter!(this, "IDebugControl::WaitForEvent");
    if state.status == DEBUG_STATUS_NO_DEBUGGEE {
        return E_UNEXPECTED;
    }
    if state.time_out_next_wait {
        state.time_out_next_wait = false;
        return S_FALSE;
    }

    state.waiting = true;
    engine.wake.notify_all();
    let deadline = (timeout != INFINITE).then(|| Instant::now() + Duration::from_millis(u64::from(timeout)));
    while state.hold_wait && !state.interrupted {
        match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    state.waiting = false;
                    return S_FALSE;
                }
                state = engine
                    .wake
                    .wait_timeout(state, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
            None => state = engine.wake.wait(state).unwrap_or_else(PoisonError::into_inner),
        }
    }
    state.waiting = false;

    if state.interrupted {
        state.interrupted = false;
        state.hold_wait = false;
        state.status = DEBUG_STATUS_BREAK;
        state.last_event = (DEBUG_EVENT_EXCEPTION, "Break instruction exception".to_string());
        return S_OK;
    }

    let events: Vec<Scripted> = state.script.drain(..).collect();
    let output = state.output_callbacks as *mut c_void;
    let callbacks = state.event_callbacks as *mut c_void;
    let interest = state.interest;
    drop(state);

    let mut last = None;
    for event in &events {
        deliver(engine, output, callbacks, interest, event);
        if let Some(described) = event.last_event() {
            last = Some(described);
        }
    }

    let mut state = lock(engine);
    state.status = DEBUG_STATUS_BREAK;
    state.last_event = last.unwrap_or((DEBUG_EVENT_BREAKPOINT, "Initial breakpoint".to_string()));
    S_OK
}

/// Call the registered callbacks for one scripted event, without holding the state lock.
unsafe fn deliver(engine: &Engine, output: *mut c_void, callbacks: *mut c_void, interest: u32, event: &Scripted)
{
    if let Scripted::Output(text) = event {
        if output.is_null() {
            return;
        }
        let text = CString::new(text.as_str()).unwrap_or_default();
        let vtbl = &**output.cast::<*const IDebugOutputCallbacksVtbl>();
        let result = (vtbl.output)(output, DEBUG_OUTPUT_NORMAL, text.as_ptr());
        lock(engine).output_results.push(result);
        return;
    }
    if callbacks.is_null() {
        return;
    }
    let vtbl = &**callbacks.cast::<*const IDebugEventCallbacksVtbl>();
    let result = match event {
        Scripted::Output(_) => return,
        Scripted::Breakpoint => {
            if interest & DEBUG_EVENT_BREAKPOINT == 0 {
                return;
            }
            (vtbl.breakpoint)(callbacks, ptr::null_mut())
        }
        Scripted::Exception {
            code,
            address,
            first_chance,
        } => {
            if interest & DEBUG_EVENT_EXCEPTION == 0 {
                return;
            }
            let mut record = ExceptionRecord64::zeroed();
            record.code = *code;
            record.address = *address;
            (vtbl.exception)(callbacks, &record, u32::from(*first_chance))
        }
        Scripted::LoadModule { name, base, size } => {
            if interest & DEBUG_EVENT_LOAD_MODULE == 0 {
                return;
            }
            let module = CString::new(name.as_str()).unwrap_or_default();
            let image = CString::new(format!("{name}.dll")).unwrap_or_default();
            (vtbl.load_module)(callbacks, 0, *base, *size, module.as_ptr(), image.as_ptr(), 0, 0)
        }
        Scripted::UnloadModule { name, base } => {
            if interest & DEBUG_EVENT_UNLOAD_MODULE == 0 {
                return;
            }
            let name = CString::new(name.as_str()).unwrap_or_default();
            (vtbl.unload_module)(callbacks, name.as_ptr(), *base)
        }
        Scripted::ExitProcess(code) => {
            if interest & DEBUG_EVENT_EXIT_PROCESS == 0 {
                return;
            }
            (vtbl.exit_process)(callbacks, *code)
        }
    };
    lock(engine).dispositions.push(result);
}

unsafe extern "system" fn get_last_event_information(
    this: This,
    event_type: *mut u32,
    process_id: *mut u32,
    thread_id: *mut u32,
    _extra_information: *mut c_void,
    _extra_information_size: u32,
    _extra_information_used: *mut u32,
    description: *mut c_char,
    description_size: u32,
    description_used: *mut u32,
) -> HRESULT
{
    let state = enter!(this, "IDebugControl::GetLastEventInformation");
    *event_type = state.last_event.0;
    *process_id = 0;
    *thread_id = state.current_thread;
    write_string(&state.last_event.1, description, description_size, description_used)
}

unsafe extern "system" fn get_current_time_date(this: This, time_date: *mut u32) -> HRESULT
{
    let _state = enter!(this, "IDebugControl2::GetCurrentTimeDate");
    *time_date = 1_700_000_000;
    S_OK
}

unsafe extern "system" fn get_dump_format_flags(this: This, flags: *mut u32) -> HRESULT
{
    let _state = enter!(this, "IDebugControl2::GetDumpFormatFlags");
    *flags = 0x1;
    S_OK
}

unsafe extern "system" fn get_number_events(this: This, events: *mut u32) -> HRESULT
{
    let _state = enter!(this, "IDebugControl3::GetNumberEvents");
    *events = 1;
    S_OK
}

// ============================================================================
// IDebugSymbols
// ============================================================================

static SYMBOLS_VTBL: IDebugSymbols2Vtbl = IDebugSymbols2Vtbl {
    base: IDebugSymbolsVtbl {
        unknown: UNKNOWN,
        get_symbol_options,
        _option_edits: [None; 2],
        set_symbol_options,
        get_name_by_offset,
        get_offset_by_name,
        _near_and_lines: [None; 3],
        get_number_modules,
        get_module_by_index,
        get_module_by_module_name,
        get_module_by_offset,
        get_module_names,
        get_module_parameters,
        _types_and_scopes: [None; 21],
        reload,
        get_symbol_path,
        set_symbol_path,
        _image_and_source_paths: [None; 10],
    },
    _get_module_version_information: None,
    get_module_name_string,
    _type_names_and_options: [None; 6],
};

unsafe extern "system" fn get_symbol_options(this: This, options: *mut u32) -> HRESULT
{
    let state = enter!(this, "IDebugSymbols::GetSymbolOptions");
    *options = state.symbol_options;
    S_OK
}

unsafe extern "system" fn set_symbol_options(this: This, options: u32) -> HRESULT
{
    let mut state = enter!(this, "IDebugSymbols::SetSymbolOptions");
    state.symbol_options = options;
    S_OK
}

unsafe extern "system" fn get_name_by_offset(
    this: This,
    offset: u64,
    name: *mut c_char,
    name_size: u32,
    name_used: *mut u32,
    displacement: *mut u64,
) -> HRESULT
{
    let state = enter!(this, "IDebugSymbols::GetNameByOffset");
    let Some(index) = state.module_index(offset) else {
        return E_FAIL;
    };
    let module = &state.modules[index];
    let relative = offset - module.base;
    let Some((symbol_offset, symbol)) = module.symbols.iter().rev().find(|(start, _)| *start <= relative) else {
        return E_FAIL;
    };
    if !displacement.is_null() {
        *displacement = relative - symbol_offset;
    }
    write_string(&format!("{}!{symbol}", module.name), name, name_size, name_used)
}

unsafe extern "system" fn get_offset_by_name(this: This, symbol: *const c_char, offset: *mut u64) -> HRESULT
{
    let state = enter!(this, "IDebugSymbols::GetOffsetByName");
    let wanted = read_c_string(symbol);
    let (module_name, symbol_name) = match wanted.split_once('!') {
        Some((module, symbol)) => (Some(module), symbol),
        None => (None, wanted.as_str()),
    };
    for module in &state.modules {
        if module_name.is_some_and(|name| !name.eq_ignore_ascii_case(&module.name)) {
            continue;
        }
        if let Some((relative, _)) = module.symbols.iter().find(|(_, name)| name == symbol_name) {
            *offset = module.base + relative;
            return S_OK;
        }
    }
    E_FAIL
}

unsafe extern "system" fn get_number_modules(this: This, loaded: *mut u32, unloaded: *mut u32) -> HRESULT
{
    let state = enter!(this, "IDebugSymbols::GetNumberModules");
    *loaded = u32::try_from(state.modules.len()).unwrap_or(u32::MAX);
    *unloaded = 0;
    S_OK
}

unsafe extern "system" fn get_module_by_index(this: This, index: u32, base: *mut u64) -> HRESULT
{
    let state = enter!(this, "IDebugSymbols::GetModuleByIndex");
    match state.modules.get(index as usize) {
        Some(module) => {
            *base = module.base;
            S_OK
        }
        None => E_INVALIDARG,
    }
}

unsafe extern "system" fn get_module_by_module_name(
    this: This,
    name: *const c_char,
    start_index: u32,
    index: *mut u32,
    base: *mut u64,
) -> HRESULT
{
    let state = enter!(this, "IDebugSymbols::GetModuleByModuleName");
    let wanted = read_c_string(name);
    let found = state
        .modules
        .iter()
        .enumerate()
        .skip(start_index as usize)
        .find(|(_, module)| module.name.eq_ignore_ascii_case(&wanted));
    match found {
        Some((position, module)) => {
            *index = u32::try_from(position).unwrap_or(u32::MAX);
            *base = module.base;
            S_OK
        }
        None => E_INVALIDARG,
    }
}

unsafe extern "system" fn get_module_by_offset(
    this: This,
    offset: u64,
    _start_index: u32,
    index: *mut u32,
    base: *mut u64,
) -> HRESULT
{
    let state = enter!(this, "IDebugSymbols::GetModuleByOffset");
    match state.module_index(offset) {
        Some(position) => {
            *index = u32::try_from(position).unwrap_or(u32::MAX);
            *base = state.modules[position].base;
            S_OK
        }
        None => E_INVALIDARG,
    }
}

unsafe extern "system" fn get_module_names(
    this: This,
    index: u32,
    _base: u64,
    image_name: *mut c_char,
    image_name_size: u32,
    image_name_used: *mut u32,
    module_name: *mut c_char,
    module_name_size: u32,
    module_name_used: *mut u32,
    loaded_image_name: *mut c_char,
    loaded_image_name_size: u32,
    loaded_image_name_used: *mut u32,
) -> HRESULT
{
    let state = enter!(this, "IDebugSymbols::GetModuleNames");
    let Some(module) = state.modules.get(index as usize) else {
        return E_INVALIDARG;
    };
    if module.names_fail {
        return E_FAIL;
    }
    let mut result = write_string(&module.image, image_name, image_name_size, image_name_used);
    if write_string(&module.name, module_name, module_name_size, module_name_used) == S_FALSE {
        result = S_FALSE;
    }
    if write_string(&module.image, loaded_image_name, loaded_image_name_size, loaded_image_name_used) == S_FALSE {
        result = S_FALSE;
    }
    result
}

unsafe extern "system" fn get_module_parameters(
    this: This,
    count: u32,
    _bases: *const u64,
    start: u32,
    params: *mut ModuleDescriptor,
) -> HRESULT
{
    let state = enter!(this, "IDebugSymbols::GetModuleParameters");
    for slot in 0..count as usize {
        let descriptor = match state.modules.get(start as usize + slot) {
            Some(module) => module.descriptor(),
            None => {
                let mut invalid = ModuleDescriptor::zeroed();
                invalid.base = DEBUG_INVALID_OFFSET;
                invalid
            }
        };
        *params.add(slot) = descriptor;
    }
    S_OK
}

unsafe extern "system" fn reload(this: This, module: *const c_char) -> HRESULT
{
    let mut state = enter!(this, "IDebugSymbols::Reload");
    let module = read_c_string(module);
    state.reloads.push(module);
    S_OK
}

unsafe extern "system" fn get_symbol_path(this: This, buffer: *mut c_char, buffer_size: u32, path_size: *mut u32)
    -> HRESULT
{
    let state = enter!(this, "IDebugSymbols::GetSymbolPath");
    write_string(&state.symbol_path, buffer, buffer_size, path_size)
}

unsafe extern "system" fn set_symbol_path(this: This, path: *const c_char) -> HRESULT
{
    let mut state = enter!(this, "IDebugSymbols::SetSymbolPath");
    state.symbol_path = read_c_string(path);
    S_OK
}

unsafe extern "system" fn get_module_name_string(
    this: This,
    which: u32,
    index: u32,
    _base: u64,
    buffer: *mut c_char,
    buffer_size: u32,
    name_size: *mut u32,
) -> HRESULT
{
    let state = enter!(this, "IDebugSymbols2::GetModuleNameString");
    let Some(module) = state.modules.get(index as usize) else {
        return E_INVALIDARG;
    };
    let name = match which {
        DEBUG_MODNAME_IMAGE | DEBUG_MODNAME_LOADED_IMAGE => module.image.clone(),
        DEBUG_MODNAME_MODULE => module.name.clone(),
        DEBUG_MODNAME_SYMBOL_FILE => module.symbol_file.clone().unwrap_or_default(),
        DEBUG_MODNAME_MAPPED_IMAGE => String::new(),
        _ => return E_INVALIDARG,
    };
    write_string(&name, buffer, buffer_size, name_size)
}

// ============================================================================
// IDebugDataSpaces
// ============================================================================

static DATA_SPACES_VTBL: IDebugDataSpaces2Vtbl = IDebugDataSpaces2Vtbl {
    base: IDebugDataSpacesVtbl {
        unknown: UNKNOWN,
        read_virtual,
        write_virtual,
        _search_and_uncached: [None; 3],
        read_pointers_virtual,
        _physical_and_io: [None; 14],
    },
    _translation_and_fill: [None; 5],
    query_virtual,
};

unsafe extern "system" fn read_virtual(this: This, offset: u64, buffer: *mut c_void, size: u32, read: *mut u32)
    -> HRESULT
{
    let state = enter!(this, "IDebugDataSpaces::ReadVirtual");
    let wanted = size as usize;
    let prefix = state.readable_prefix(offset, wanted);
    if !read.is_null() {
        *read = 0;
    }
    if prefix == 0 {
        return hresult_from_win32(ERROR_READ_FAULT);
    }
    if prefix < wanted && state.partial_reads == PartialReads::Fail {
        return hresult_from_win32(ERROR_PARTIAL_COPY);
    }
    let out = buffer.cast::<u8>();
    for position in 0..prefix {
        *out.add(position) = state.byte_at(offset + position as u64).unwrap_or_default();
    }
    if !read.is_null() {
        *read = u32::try_from(prefix).unwrap_or(u32::MAX);
    }
    S_OK
}

unsafe extern "system" fn write_virtual(
    this: This,
    offset: u64,
    buffer: *const c_void,
    size: u32,
    written: *mut u32,
) -> HRESULT
{
    let mut state = enter!(this, "IDebugDataSpaces::WriteVirtual");
    let bytes = buffer.cast::<u8>();
    let mut count = 0u32;
    for position in 0..size {
        if !state.set_byte(offset + u64::from(position), *bytes.add(position as usize)) {
            break;
        }
        count += 1;
    }
    if !written.is_null() {
        *written = count;
    }
    if count == 0 && size > 0 {
        hresult_from_win32(ERROR_READ_FAULT)
    } else {
        S_OK
    }
}

unsafe extern "system" fn read_pointers_virtual(this: This, count: u32, offset: u64, ptrs: *mut u64) -> HRESULT
{
    let state = enter!(this, "IDebugDataSpaces::ReadPointersVirtual");
    let width: u64 = if state.pointer_64 { 8 } else { 4 };
    let total = usize::try_from(u64::from(count) * width).unwrap_or(usize::MAX);
    if state.readable_prefix(offset, total) < total {
        return hresult_from_win32(ERROR_READ_FAULT);
    }
    for index in 0..u64::from(count) {
        let mut value = 0u64;
        for byte in 0..width {
            let address = offset + index * width + byte;
            value |= u64::from(state.byte_at(address).unwrap_or_default()) << (8 * byte);
        }
        *ptrs.add(index as usize) = value;
    }
    S_OK
}

unsafe extern "system" fn query_virtual(this: This, offset: u64, info: *mut MemoryBasicInformation64) -> HRESULT
{
    let state = enter!(this, "IDebugDataSpaces2::QueryVirtual");
    let Some((base, bytes)) = state
        .memory
        .iter()
        .find(|(base, bytes)| offset >= *base && offset - *base < bytes.len() as u64)
    else {
        return E_INVALIDARG;
    };
    let mut region = MemoryBasicInformation64::zeroed();
    region.base_address = *base;
    region.allocation_base = *base;
    region.region_size = bytes.len() as u64;
    region.state = 0x1000;
    region.protect = 0x04;
    *info = region;
    S_OK
}

// ============================================================================
// IDebugAdvanced
// ============================================================================

static ADVANCED_VTBL: IDebugAdvancedVtbl = IDebugAdvancedVtbl {
    unknown: UNKNOWN,
    get_thread_context,
    set_thread_context,
};

unsafe extern "system" fn get_thread_context(this: This, context: *mut c_void, size: u32) -> HRESULT
{
    let state = enter!(this, "IDebugAdvanced::GetThreadContext");
    if size as usize != Amd64Context::SIZE {
        return E_INVALIDARG;
    }
    let Some(&(rip, rsp, rbp)) = state.registers.get(&state.current_thread) else {
        return E_UNEXPECTED;
    };
    let context = &mut *context.cast::<Amd64Context>();
    context.rip = rip;
    context.rsp = rsp;
    context.rbp = rbp;
    context.rax = u64::from(state.current_thread);
    context.eflags = 0x246;
    context.seg_cs = 0x33;
    context.seg_ss = 0x2b;
    S_OK
}

unsafe extern "system" fn set_thread_context(this: This, context: *const c_void, size: u32) -> HRESULT
{
    let mut state = enter!(this, "IDebugAdvanced::SetThreadContext");
    if size as usize != Amd64Context::SIZE {
        return E_INVALIDARG;
    }
    let context = &*context.cast::<Amd64Context>();
    let thread = state.current_thread;
    state.registers.insert(thread, (context.rip, context.rsp, context.rbp));
    S_OK
}

// ============================================================================
// IDebugSystemObjects
// ============================================================================

static SYSTEM_OBJECTS_VTBL: IDebugSystemObjectsVtbl = IDebugSystemObjectsVtbl {
    unknown: UNKNOWN,
    get_event_thread,
    _get_event_process: None,
    get_current_thread_id,
    set_current_thread_id,
    _current_process: [None; 2],
    get_number_threads,
    _get_total_number_threads: None,
    get_thread_ids_by_index,
    _thread_lookup: [None; 5],
    get_current_thread_system_id,
    _process_lookup: [None; 9],
    get_current_process_system_id,
    _process_handles: [None; 4],
};

unsafe extern "system" fn get_event_thread(this: This, id: *mut u32) -> HRESULT
{
    let state = enter!(this, "IDebugSystemObjects::GetEventThread");
    *id = state.current_thread;
    S_OK
}

unsafe extern "system" fn get_current_thread_id(this: This, id: *mut u32) -> HRESULT
{
    let state = enter!(this, "IDebugSystemObjects::GetCurrentThreadId");
    *id = state.current_thread;
    S_OK
}

unsafe extern "system" fn set_current_thread_id(this: This, id: u32) -> HRESULT
{
    let mut state = enter!(this, "IDebugSystemObjects::SetCurrentThreadId");
    if !state.threads.iter().any(|(thread, _)| *thread == id) {
        return E_INVALIDARG;
    }
    state.current_thread = id;
    S_OK
}

unsafe extern "system" fn get_number_threads(this: This, number: *mut u32) -> HRESULT
{
    let state = enter!(this, "IDebugSystemObjects::GetNumberThreads");
    *number = u32::try_from(state.threads.len()).unwrap_or(u32::MAX);
    S_OK
}

unsafe extern "system" fn get_thread_ids_by_index(
    this: This,
    start: u32,
    count: u32,
    ids: *mut u32,
    system_ids: *mut u32,
) -> HRESULT
{
    let state = enter!(this, "IDebugSystemObjects::GetThreadIdsByIndex");
    for slot in 0..count as usize {
        let Some(&(id, system_id)) = state.threads.get(start as usize + slot) else {
            return E_INVALIDARG;
        };
        if !ids.is_null() {
            *ids.add(slot) = id;
        }
        if !system_ids.is_null() {
            *system_ids.add(slot) = system_id;
        }
    }
    S_OK
}

unsafe extern "system" fn get_current_thread_system_id(this: This, system_id: *mut u32) -> HRESULT
{
    let state = enter!(this, "IDebugSystemObjects::GetCurrentThreadSystemId");
    let current = state.current_thread;
    match state.threads.iter().find(|(id, _)| *id == current) {
        Some(&(_, system)) => {
            *system_id = system;
            S_OK
        }
        None => E_UNEXPECTED,
    }
}

unsafe extern "system" fn get_current_process_system_id(this: This, system_id: *mut u32) -> HRESULT
{
    let state = enter!(this, "IDebugSystemObjects::GetCurrentProcessSystemId");
    *system_id = state.attached.unwrap_or(0x1234);
    S_OK
}
