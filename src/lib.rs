#![doc(html_logo_url = "https://raw.githubusercontent.com/georust/meta/master/logo/logo.png")]
//! `luaproj` exposes the [PROJ](https://proj.org) coordinate transformation library to
//! [Lua](https://www.lua.org), through [`mlua`].
//!
//! Built with the `module` feature the crate is a loadable Lua module exporting
//! `luaopen_proj_core`. Install the shared library as `proj/core.so` (`proj/core.dll` on
//! Windows) somewhere on `package.cpath`:
//!
//! ```lua
//! local proj = require "proj.core"
//!
//! local wgs84 = proj.init("+proj=longlat +datum=WGS84")
//! local utm = proj.init("+proj=utm +zone=32 +datum=WGS84")
//! assert(proj.is_latlong(wgs84) and not proj.is_latlong(utm))
//!
//! -- geographic coordinates are in radians
//! local status, x, y = proj.transform(wgs84, utm, math.rad(9), math.rad(48))
//! if status ~= 0 then error(proj.error_string(status)) end
//! ```
//!
//! | Function | Arguments | Returns |
//! |---|---|---|
//! | `init` | definition (any bytes) | handle, or `nil` if PROJ rejects the definition |
//! | `is_latlong` | handle | boolean |
//! | `get_def` | handle, options (`0` PROJ 5 style, `1` PROJ 4 style; any other value raises) | string, or `nil` |
//! | `error_string` | integer code, optional | string; without a code, the last error |
//! | `transform` | handle, handle, x, y | status, x, y |
//!
//! Legacy `pj_get_def` ignored its options argument; here it selects the PROJ string flavour,
//! so values other than `0` and `1` are rejected rather than silently accepted.
//!
//! Handles are released when Lua collects them. Passing anything other than a handle
//! raises a Lua error; failures inside PROJ are returned as `nil` or a nonzero status.
//!
//! Embedding hosts and tests can build the same table with [`open`].
//!
//! # Features
//!
//! - `lua54` (default), `lua53`, `lua52`, `lua51`, `luajit`: Lua version to build against.
//! - `vendored` (default): build Lua from source.
//! - `module`: build a loadable Lua module. Use together with `--no-default-features` and a
//!   Lua version, e.g. `cargo build --release --no-default-features --features lua54,module`.
//! - `bundled_proj`, `bundled_proj_sqlite`: build libproj from source via `proj-sys`.
//!
//! # Requirements
//!
//! Unless `bundled_proj` is enabled, `libproj` 9.4 or later must be installed, along with
//! its `proj.db` resource database.

use libc::c_char;
use std::ffi::CStr;
use std::str;

mod bindings;
mod context;
mod errno;
mod pj;
mod projection;
mod transform;

pub use crate::bindings::open;
pub use crate::context::Context;
pub use crate::errno::{ErrorClass, Errno, NO_ERROR_MESSAGE};
pub use crate::errno::{PROJ_ERR_COORD_TRANSFM, PROJ_ERR_INVALID_OP, PROJ_ERR_OTHER};
pub use crate::pj::CreateError;
pub use crate::projection::{DefinitionFormat, Projection};
pub use crate::transform::{Coord, Transformed};

/// Entry point for `require "proj.core"`.
#[cfg(feature = "module")]
#[mlua::lua_module]
fn proj_core(lua: &mlua::Lua) -> mlua::Result<mlua::Table> {
    open(lua)
}

/// # Safety
///
/// `raw_ptr` must point to a valid nul-terminated string owned by libproj.
pub(crate) unsafe fn _string(raw_ptr: *const c_char) -> Result<String, str::Utf8Error> {
    assert!(!raw_ptr.is_null());
    let c_str = CStr::from_ptr(raw_ptr);
    Ok(str::from_utf8(c_str.to_bytes())?.to_string())
}
