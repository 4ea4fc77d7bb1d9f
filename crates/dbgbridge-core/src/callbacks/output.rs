//! `IDebugOutputCallbacks` implementation.

use std::ffi::{c_char, CStr};

use super::dispatch;
use super::object::{add_ref, query_interface, release, CallbackObject};
use super::CallbackEvent;
use crate::abi::vtables::{IDebugOutputCallbacksVtbl, IUnknownVtbl, This};
use crate::platform::hresult::{HRESULT, S_OK};
use crate::types::OutputMask;

type Vtbl = IDebugOutputCallbacksVtbl;

pub(crate) static OUTPUT_CALLBACKS_VTBL: Vtbl = Vtbl {
    unknown: IUnknownVtbl {
        query_interface: query_interface::<Vtbl>,
        add_ref: add_ref::<Vtbl>,
        release: release::<Vtbl>,
    },
    output,
};

unsafe extern "system" fn output(this: This, mask: u32, text: *const c_char) -> HRESULT
{
    let object = CallbackObject::<Vtbl>::from_this(this);
    let Some(core) = object.session() else {
        return S_OK;
    };
    let text = if text.is_null() {
        std::borrow::Cow::Borrowed("")
    } else {
        CStr::from_ptr(text).to_string_lossy()
    };
    let event = CallbackEvent::Output {
        mask: OutputMask::from_bits_retain(mask),
        text: &text,
    };
    dispatch::deliver_output(&core, &event)
}
