//! Reference-counted native objects that carry a callback vtable.

use std::ffi::c_void;
use std::ptr::{self, NonNull};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::abi::vtables::{ComInterface, This, IID_IUNKNOWN};
use crate::abi::Guid;
use crate::platform::hresult::{E_NOINTERFACE, E_POINTER, HRESULT, S_OK};
use crate::session::SessionCore;
use crate::types::EventInterest;

/// Heap object the engine sees as an interface pointer.
///
/// The vtable pointer must stay the first field: the engine dereferences the
/// object pointer to find it.
#[repr(C)]
pub(crate) struct CallbackObject<V: ComInterface>
{
    vtbl: &'static V,
    refs: AtomicU32,
    pub(crate) core: Weak<SessionCore>,
    pub(crate) interest: EventInterest,
}

impl<V: ComInterface> CallbackObject<V>
{
    /// Allocate with one reference, owned by the returned handle.
    pub(crate) fn create(vtbl: &'static V, core: &Rc<SessionCore>, interest: EventInterest) -> OwnedCallback<V>
    {
        let object = Box::new(Self {
            vtbl,
            refs: AtomicU32::new(1),
            core: Rc::downgrade(core),
            interest,
        });
        OwnedCallback {
            // SAFETY: Box::into_raw never returns null.
            ptr: unsafe { NonNull::new_unchecked(Box::into_raw(object)) },
        }
    }

    /// Borrow the object behind an interface pointer.
    ///
    /// # Safety
    ///
    /// `this` must be a pointer produced by [`CallbackObject::create`] for the
    /// same `V`, with at least one live reference.
    pub(crate) unsafe fn from_this<'a>(this: This) -> &'a Self
    {
        &*this.cast::<Self>()
    }

    /// Session core, if the session is still alive.
    pub(crate) fn session(&self) -> Option<Rc<SessionCore>>
    {
        self.core.upgrade()
    }
}

/// The crate's own reference to a callback object.
pub(crate) struct OwnedCallback<V: ComInterface>
{
    ptr: NonNull<CallbackObject<V>>,
}

impl<V: ComInterface> OwnedCallback<V>
{
    /// Interface pointer handed to the engine.
    pub(crate) fn as_raw(&self) -> *mut c_void
    {
        self.ptr.as_ptr().cast()
    }
}

impl<V: ComInterface> Drop for OwnedCallback<V>
{
    fn drop(&mut self)
    {
        // SAFETY: this handle owns exactly one reference.
        unsafe {
            release::<V>(self.as_raw());
        }
    }
}

// ============================================================================
// IUnknown
// ============================================================================

pub(crate) unsafe extern "system" fn query_interface<V: ComInterface>(
    this: This,
    iid: *const Guid,
    out: *mut *mut c_void,
) -> HRESULT
{
    if out.is_null() {
        return E_POINTER;
    }
    if iid.is_null() {
        *out = ptr::null_mut();
        return E_POINTER;
    }
    if *iid == V::IID || *iid == IID_IUNKNOWN {
        add_ref::<V>(this);
        *out = this;
        S_OK
    } else {
        *out = ptr::null_mut();
        E_NOINTERFACE
    }
}

pub(crate) unsafe extern "system" fn add_ref<V: ComInterface>(this: This) -> u32
{
    let object = CallbackObject::<V>::from_this(this);
    object.refs.fetch_add(1, Ordering::Relaxed) + 1
}

pub(crate) unsafe extern "system" fn release<V: ComInterface>(this: This) -> u32
{
    let object = CallbackObject::<V>::from_this(this);
    let previous = object.refs.fetch_sub(1, Ordering::AcqRel);
    if previous == 1 {
        drop(Box::from_raw(this.cast::<CallbackObject<V>>()));
    }
    previous - 1
}
