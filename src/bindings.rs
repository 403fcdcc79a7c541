//! The table of functions handed to Lua.
//!
//! Misuse (wrong argument types, a value that is not a live projection handle)
//! raises a Lua error. Failures inside PROJ are returned as values: `init`
//! yields `nil`, `transform` a nonzero status.

use crate::context::Context;
use crate::errno::Errno;
use crate::projection::{DefinitionFormat, Projection};
use crate::transform::Coord;
use libc::c_int;
use mlua::{Integer, Lua, Number, Table, UserDataRef, Value};
use std::rc::Rc;
use std::sync::Arc;

/// Builds the module table: `init`, `is_latlong`, `get_def`, `error_string`
/// and `transform`.
///
/// Every handle created through the table shares one PROJ context, whose
/// last-error slot `error_string` reads when called without a code.
pub fn open(lua: &Lua) -> mlua::Result<Table> {
    let ctx = Rc::new(Context::new());
    let exports = lua.create_table()?;

    let init_ctx = Rc::clone(&ctx);
    exports.set(
        "init",
        lua.create_function(move |_, definition: mlua::String| {
            let definition = definition.as_bytes();
            match Projection::new(Rc::clone(&init_ctx), &definition[..]) {
                Ok(projection) => Ok(Some(projection)),
                Err(err) => {
                    log::debug!("rejected definition {:?}: {err}", String::from_utf8_lossy(&definition[..]));
                    Ok(None)
                }
            }
        })?,
    )?;

    exports.set(
        "is_latlong",
        lua.create_function(|_, projection: UserDataRef<Projection>| Ok(projection.is_latlong()))?,
    )?;

    exports.set(
        "get_def",
        lua.create_function(|_, (projection, options): (UserDataRef<Projection>, Integer)| {
            let format = DefinitionFormat::from_options(options)
                .ok_or_else(|| bad_argument("get_def", 2, "unknown definition option"))?;
            projection.definition(format).map_err(mlua::Error::external)
        })?,
    )?;

    let error_ctx = Rc::clone(&ctx);
    exports.set(
        "error_string",
        lua.create_function(move |lua, code: Value| {
            let code = match code {
                Value::Nil => error_ctx.errno(),
                value => match lua.coerce_integer(value)?.and_then(|code| c_int::try_from(code).ok()) {
                    Some(code) => Errno(code),
                    None => return Err(bad_argument("error_string", 1, "expected an error code or nil")),
                },
            };
            code.message(&error_ctx).map_err(mlua::Error::external)
        })?,
    )?;

    exports.set(
        "transform",
        lua.create_function(
            |_, (input, output, x, y): (UserDataRef<Projection>, UserDataRef<Projection>, Number, Number)| {
                let result = input.transform(&output, Coord::new(x, y));
                Ok((Integer::from(result.status.0), result.coord.x, result.coord.y))
            },
        )?,
    )?;

    Ok(exports)
}

fn bad_argument(function: &str, pos: usize, message: &str) -> mlua::Error {
    mlua::Error::BadArgument {
        to: Some(function.to_string()),
        pos,
        name: None,
        cause: Arc::new(mlua::Error::RuntimeError(message.to_string())),
    }
}
