use crate::context::Context;
use crate::errno::Errno;
use std::{ffi, ptr, rc};
use thiserror::Error;

/// A safe wrapper around `proj_sys::PJ`.
///
/// Owns the object exclusively and destroys it on drop. The shared context is
/// kept alive for as long as any object created on it.
pub(crate) struct Pj {
    pj: ptr::NonNull<proj_sys::PJ>,
    ctx: rc::Rc<Context>,
}

impl Pj {
    pub fn from_definition(ctx: rc::Rc<Context>, definition: &[u8]) -> Result<Self, CreateError> {
        let definition = ffi::CString::new(definition).map_err(CreateError::ArgumentNul)?;
        ctx.errno_reset();
        let pj_ptr = unsafe { proj_sys::proj_create(ctx.as_ptr(), definition.as_ptr()) };
        Pj::from_pj_ptr(ctx, pj_ptr)
    }

    /// The operation converting coordinates of `source` into `target`, both of
    /// which must be CRS objects.
    pub fn from_crs_to_crs(source: &Pj, target: &Pj) -> Result<Self, CreateError> {
        let ctx = rc::Rc::clone(&source.ctx);
        let pj_ptr = unsafe {
            proj_sys::proj_create_crs_to_crs_from_pj(
                ctx.as_ptr(),
                source.as_ptr(),
                target.as_ptr(),
                ptr::null_mut(),
                ptr::null(),
            )
        };
        Pj::from_pj_ptr(ctx, pj_ptr)
    }

    pub fn from_pj_ptr(ctx: rc::Rc<Context>, pj_ptr: *mut proj_sys::PJ) -> Result<Self, CreateError> {
        match ptr::NonNull::new(pj_ptr) {
            Some(pj) => Ok(Pj { pj, ctx }),
            None => {
                let code = ctx.errno();
                Err(match code.message(&ctx) {
                    Ok(message) => CreateError::Proj { code, message },
                    Err(err) => CreateError::MessageUtf8(err),
                })
            }
        }
    }

    /// Same operation with longitude-first, easting-first axis order on both ends.
    pub fn normalize_for_visualization(&self) -> Result<Self, CreateError> {
        let ctx = rc::Rc::clone(&self.ctx);
        let pj_ptr = unsafe { proj_sys::proj_normalize_for_visualization(ctx.as_ptr(), self.as_ptr()) };
        Pj::from_pj_ptr(ctx, pj_ptr)
    }

    pub fn as_ptr(&self) -> *mut proj_sys::PJ {
        self.pj.as_ptr()
    }

    pub fn errno_reset(&self) -> Errno {
        Errno(unsafe { proj_sys::proj_errno_reset(self.as_ptr()) })
    }

    pub fn errno(&self) -> Errno {
        Errno(unsafe { proj_sys::proj_errno(self.as_ptr()) })
    }

    pub fn kind(&self) -> proj_sys::PJ_TYPE {
        unsafe { proj_sys::proj_get_type(self.as_ptr()) }
    }

    /// The CRS a bound CRS is defined on, `None` for any other object.
    pub fn source_crs(&self) -> Option<Self> {
        if self.kind() != proj_sys::PJ_TYPE_PJ_TYPE_BOUND_CRS {
            return None;
        }
        let ctx = rc::Rc::clone(&self.ctx);
        let pj_ptr = unsafe { proj_sys::proj_get_source_crs(ctx.as_ptr(), self.as_ptr()) };
        Pj::from_pj_ptr(ctx, pj_ptr).ok()
    }

    pub fn is_crs(&self) -> bool {
        unsafe { proj_sys::proj_is_crs(self.as_ptr()) != 0 }
    }

    /// Radians per unit of the first axis of a CRS, `None` for non-CRS objects.
    pub fn axis_unit_factor(&self) -> Option<f64> {
        let ctx = rc::Rc::clone(&self.ctx);
        let cs_ptr = unsafe { proj_sys::proj_crs_get_coordinate_system(ctx.as_ptr(), self.as_ptr()) };
        let cs = Pj::from_pj_ptr(ctx, cs_ptr).ok()?;
        let mut factor = 0.0;
        let found = unsafe {
            proj_sys::proj_cs_get_axis_info(
                self.ctx.as_ptr(),
                cs.as_ptr(),
                0,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
                &mut factor,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        (found != 0 && factor > 0.0).then_some(factor)
    }

    pub fn angular_output(&self) -> bool {
        unsafe { proj_sys::proj_angular_output(self.as_ptr(), proj_sys::PJ_DIRECTION_PJ_FWD) != 0 }
    }

    /// PROJ string of the object, `None` when it has no PROJ string form.
    pub fn as_proj_string(
        &self,
        string_type: proj_sys::PJ_PROJ_STRING_TYPE,
    ) -> Result<Option<String>, std::str::Utf8Error> {
        let raw = unsafe {
            proj_sys::proj_as_proj_string(self.ctx.as_ptr(), self.as_ptr(), string_type, ptr::null())
        };
        if raw.is_null() {
            Ok(None)
        } else {
            unsafe { crate::_string(raw) }.map(Some)
        }
    }

    pub fn trans(
        &self,
        direction: proj_sys::PJ_DIRECTION,
        coord: proj_sys::PJ_COORD,
    ) -> proj_sys::PJ_COORD {
        unsafe { proj_sys::proj_trans(self.as_ptr(), direction, coord) }
    }
}

impl Drop for Pj {
    fn drop(&mut self) {
        log::trace!("destroying PJ object {:p}", self.pj);
        unsafe {
            proj_sys::proj_destroy(self.as_ptr());
        }
    }
}

#[derive(Error, Debug)]
pub enum CreateError {
    #[error("A nul byte was found in the PROJ definition: {0}")]
    ArgumentNul(ffi::NulError),
    #[error("The underlying PROJ call failed with code {code}: {message}")]
    Proj { code: Errno, message: String },
    #[error("A UTF8 error occurred when constructing a PROJ error message")]
    MessageUtf8(std::str::Utf8Error),
}

impl CreateError {
    /// The PROJ code behind this failure, if PROJ reported one.
    pub fn code(&self) -> Option<Errno> {
        match self {
            CreateError::Proj { code, .. } => Some(*code),
            _ => None,
        }
    }
}
