use crate::errno::{Errno, PROJ_ERR_OTHER};
use crate::pj::Pj;
use crate::projection::Projection;

/// A coordinate pair.
///
/// Geographic coordinates are longitude and latitude in radians, whatever
/// angular unit the coordinate system itself uses; projected coordinates are
/// in the linear unit of their coordinate system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Coord { x, y }
    }
}

/// Outcome of [`Projection::transform`].
///
/// `coord` is filled in whatever `status` says; it is only meaningful when
/// `status` is `0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transformed {
    pub status: Errno,
    pub coord: Coord,
}

impl Projection {
    /// Transform one coordinate pair from this system into `target`.
    ///
    /// Failures are reported through `status`, never as an `Err`. When no
    /// operation between the two systems can be built, the input pair comes
    /// back untouched.
    pub fn transform(&self, target: &Projection, coord: Coord) -> Transformed {
        self.pj().errno_reset();
        let operation = match Pj::from_crs_to_crs(self.pj(), target.pj())
            .and_then(|op| op.normalize_for_visualization())
        {
            Ok(operation) => operation,
            Err(err) => {
                log::debug!("no operation between coordinate systems: {err}");
                let status = err.code().filter(|code| !code.is_ok()).unwrap_or(Errno(PROJ_ERR_OTHER));
                return Transformed { status, coord };
            }
        };

        let (mut x, mut y) = (coord.x, coord.y);
        if let Some(unit) = self.angular_unit() {
            x /= unit;
            y /= unit;
        }

        operation.errno_reset();
        let input = proj_sys::PJ_COORD {
            xyzt: proj_sys::PJ_XYZT { x, y, z: 0.0, t: f64::INFINITY },
        };
        let output = operation.trans(proj_sys::PJ_DIRECTION_PJ_FWD, input);
        let status = operation.errno();
        // Safety: every variant of `PJ_COORD` is four `f64`s.
        let (mut x, mut y) = unsafe { (output.xyzt.x, output.xyzt.y) };

        if let Some(unit) = target.angular_unit() {
            x *= unit;
            y *= unit;
        }
        if !status.is_ok() {
            log::debug!("coordinate transformation failed with code {status}");
        }
        Transformed { status, coord: Coord { x, y } }
    }
}
