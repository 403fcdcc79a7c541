use crate::errno::Errno;
use std::{cell, ptr};

/// PROJ thread context shared by every handle created through one module table.
///
/// The context carries PROJ's last-error slot. It is plain mutable state inside
/// libproj with no synchronization, which is why `Context` is neither `Send` nor
/// `Sync`: only the interpreter thread that opened the module may touch it.
pub struct Context {
    ctx: ptr::NonNull<proj_sys::PJ_CONTEXT>,
    // libproj only clears the context slot through an object living on it.
    anchor: cell::Cell<Option<ptr::NonNull<proj_sys::PJ>>>,
}

impl Context {
    pub fn new() -> Self {
        // Safety: `proj_context_create` always returns a valid pointer to a thread context.
        unsafe {
            let ctx_ptr = proj_sys::proj_context_create();
            Context::from_raw(ctx_ptr)
        }
    }

    /// # Safety
    ///
    /// Must provide a non-null pointer to a PROJ thread context.
    unsafe fn from_raw(ctx_ptr: *mut proj_sys::PJ_CONTEXT) -> Self {
        debug_assert!(!ctx_ptr.is_null());
        Context {
            ctx: ptr::NonNull::new_unchecked(ctx_ptr),
            anchor: cell::Cell::new(None),
        }
    }

    pub fn as_ptr(&self) -> *mut proj_sys::PJ_CONTEXT {
        self.ctx.as_ptr()
    }

    /// The code left behind by the most recent failing call on this context.
    ///
    /// This is the only place the last-error slot is read.
    pub fn errno(&self) -> Errno {
        Errno(unsafe { proj_sys::proj_context_errno(self.as_ptr()) })
    }

    /// Clears the last-error slot, returning the code it held.
    pub fn errno_reset(&self) -> Errno {
        match self.anchor() {
            Some(anchor) => Errno(unsafe { proj_sys::proj_errno_reset(anchor.as_ptr()) }),
            None => self.errno(),
        }
    }

    fn anchor(&self) -> Option<ptr::NonNull<proj_sys::PJ>> {
        if let Some(anchor) = self.anchor.get() {
            return Some(anchor);
        }
        let anchor = ptr::NonNull::new(unsafe { proj_sys::proj_create(self.as_ptr(), c"+proj=noop".as_ptr()) });
        self.anchor.set(anchor);
        anchor
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // Safety: every `Pj` holds an `Rc<Context>`, so no object created on this
        // context outlives it. The anchor goes first for the same reason.
        unsafe {
            if let Some(anchor) = self.anchor.take() {
                proj_sys::proj_destroy(anchor.as_ptr());
            }
            proj_sys::proj_context_destroy(self.as_ptr());
        }
    }
}
