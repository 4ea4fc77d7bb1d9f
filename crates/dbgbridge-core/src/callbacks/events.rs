//! `IDebugEventCallbacks` implementation.
//!
//! Each native method turns its arguments into a [`CallbackEvent`] and hands
//! it to the dispatcher. String arguments are decoded lossily; a null string
//! becomes empty.

use std::borrow::Cow;
use std::ffi::{c_char, c_void, CStr};

use super::dispatch;
use super::object::{add_ref, query_interface, release, CallbackObject};
use super::{CallbackEvent, EventDisposition};
use crate::abi::vtables::{IDebugEventCallbacksVtbl, IUnknownVtbl, This};
use crate::abi::ExceptionRecord64;
use crate::platform::hresult::{E_POINTER, HRESULT, S_OK};
use crate::types::Address;

type Vtbl = IDebugEventCallbacksVtbl;

pub(crate) static EVENT_CALLBACKS_VTBL: Vtbl = Vtbl {
    unknown: IUnknownVtbl {
        query_interface: query_interface::<Vtbl>,
        add_ref: add_ref::<Vtbl>,
        release: release::<Vtbl>,
    },
    get_interest_mask,
    breakpoint,
    exception,
    create_thread,
    exit_thread,
    create_process,
    exit_process,
    load_module,
    unload_module,
    system_error,
    session_status,
    change_debuggee_state,
    change_engine_state,
    change_symbol_state,
};

/// Route one event through the session that registered `this`.
///
/// Event callbacks return a `DEBUG_STATUS_*` value in the `HRESULT` slot.
#[allow(clippy::cast_possible_wrap)]
unsafe fn deliver(this: This, event: &CallbackEvent<'_>) -> HRESULT
{
    let object = CallbackObject::<Vtbl>::from_this(this);
    match object.session() {
        Some(core) => dispatch::deliver_event(&core, event) as HRESULT,
        None => EventDisposition::NoChange.raw() as HRESULT,
    }
}

unsafe fn text<'a>(value: *const c_char) -> Cow<'a, str>
{
    if value.is_null() {
        Cow::Borrowed("")
    } else {
        CStr::from_ptr(value).to_string_lossy()
    }
}

unsafe extern "system" fn get_interest_mask(this: This, mask: *mut u32) -> HRESULT
{
    if mask.is_null() {
        return E_POINTER;
    }
    let object = CallbackObject::<Vtbl>::from_this(this);
    *mask = object.interest.bits();
    S_OK
}

unsafe extern "system" fn breakpoint(this: This, _breakpoint: *mut c_void) -> HRESULT
{
    deliver(this, &CallbackEvent::Breakpoint)
}

#[allow(clippy::cast_possible_wrap)]
unsafe extern "system" fn exception(this: This, record: *const ExceptionRecord64, first_chance: u32) -> HRESULT
{
    let Some(record) = record.as_ref() else {
        return EventDisposition::NoChange.raw() as HRESULT;
    };
    deliver(
        this,
        &CallbackEvent::Exception {
            record,
            first_chance: first_chance != 0,
        },
    )
}

unsafe extern "system" fn create_thread(this: This, handle: u64, data_offset: u64, start_offset: u64) -> HRESULT
{
    deliver(
        this,
        &CallbackEvent::CreateThread {
            handle,
            data_offset,
            start_offset,
        },
    )
}

unsafe extern "system" fn exit_thread(this: This, exit_code: u32) -> HRESULT
{
    deliver(this, &CallbackEvent::ExitThread { exit_code })
}

#[allow(clippy::too_many_arguments)]
unsafe extern "system" fn create_process(
    this: This,
    _image_file_handle: u64,
    _handle: u64,
    base_offset: u64,
    module_size: u32,
    module_name: *const c_char,
    image_name: *const c_char,
    checksum: u32,
    time_date_stamp: u32,
    _initial_thread_handle: u64,
    _thread_data_offset: u64,
    start_offset: u64,
) -> HRESULT
{
    let module_name = text(module_name);
    let image_name = text(image_name);
    deliver(
        this,
        &CallbackEvent::CreateProcess {
            image_base: Address::new(base_offset),
            image_size: module_size,
            module_name: &module_name,
            image_name: &image_name,
            checksum,
            time_date_stamp,
            start_offset,
        },
    )
}

unsafe extern "system" fn exit_process(this: This, exit_code: u32) -> HRESULT
{
    deliver(this, &CallbackEvent::ExitProcess { exit_code })
}

#[allow(clippy::too_many_arguments)]
unsafe extern "system" fn load_module(
    this: This,
    _image_file_handle: u64,
    base_offset: u64,
    module_size: u32,
    module_name: *const c_char,
    image_name: *const c_char,
    checksum: u32,
    time_date_stamp: u32,
) -> HRESULT
{
    let module_name = text(module_name);
    let image_name = text(image_name);
    deliver(
        this,
        &CallbackEvent::ModuleLoad {
            base: Address::new(base_offset),
            size: module_size,
            module_name: &module_name,
            image_name: &image_name,
            checksum,
            time_date_stamp,
        },
    )
}

unsafe extern "system" fn unload_module(this: This, image_base_name: *const c_char, base_offset: u64) -> HRESULT
{
    let image_base_name = text(image_base_name);
    deliver(
        this,
        &CallbackEvent::ModuleUnload {
            image_base_name: &image_base_name,
            base: Address::new(base_offset),
        },
    )
}

unsafe extern "system" fn system_error(this: This, error: u32, level: u32) -> HRESULT
{
    deliver(this, &CallbackEvent::SystemError { error, level })
}

unsafe extern "system" fn session_status(this: This, status: u32) -> HRESULT
{
    deliver(this, &CallbackEvent::SessionStatus { status })
}

unsafe extern "system" fn change_debuggee_state(this: This, flags: u32, argument: u64) -> HRESULT
{
    deliver(this, &CallbackEvent::DebuggeeStateChanged { flags, argument })
}

unsafe extern "system" fn change_engine_state(this: This, flags: u32, argument: u64) -> HRESULT
{
    deliver(this, &CallbackEvent::EngineStateChanged { flags, argument })
}

unsafe extern "system" fn change_symbol_state(this: This, flags: u32, argument: u64) -> HRESULT
{
    deliver(this, &CallbackEvent::SymbolStateChanged { flags, argument })
}
