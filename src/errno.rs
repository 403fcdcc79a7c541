use crate::context::Context;
use libc::c_int;
use std::{fmt, str};

/// Text reported for code `0`. libproj has no message of its own for success.
pub const NO_ERROR_MESSAGE: &str = "no error";

// Error classes as defined in proj.h. Individual codes are these bits plus a
// low-order detail value.
pub const PROJ_ERR_INVALID_OP: c_int = proj_sys::PROJ_ERR_INVALID_OP as c_int;
pub const PROJ_ERR_COORD_TRANSFM: c_int = proj_sys::PROJ_ERR_COORD_TRANSFM as c_int;
pub const PROJ_ERR_OTHER: c_int = proj_sys::PROJ_ERR_OTHER as c_int;

/// A libproj error or status code. `0` means success.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Errno(pub c_int);

/// The class an [`Errno`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    None,
    InvalidOperation,
    CoordinateTransformation,
    Other,
}

impl Errno {
    pub fn is_ok(self) -> bool {
        self.0 == 0
    }

    pub fn class(self) -> ErrorClass {
        match self.0 {
            0 => ErrorClass::None,
            code if code < 0 => ErrorClass::Other,
            code if code & PROJ_ERR_INVALID_OP != 0 => ErrorClass::InvalidOperation,
            code if code & PROJ_ERR_COORD_TRANSFM != 0 => ErrorClass::CoordinateTransformation,
            _ => ErrorClass::Other,
        }
    }

    pub fn message(&self, context: &Context) -> Result<String, str::Utf8Error> {
        let raw = unsafe { proj_sys::proj_context_errno_string(context.as_ptr(), self.0) };
        if raw.is_null() {
            return Ok(NO_ERROR_MESSAGE.to_string());
        }
        unsafe { crate::_string(raw) }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.0, self.class())
    }
}
