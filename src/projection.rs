use crate::context::Context;
use crate::pj::{CreateError, Pj};
use std::rc::Rc;

/// String flavours accepted by [`Projection::definition`], mirroring PROJ's
/// `PJ_PROJ_STRING_TYPE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefinitionFormat {
    Proj5,
    Proj4,
}

impl DefinitionFormat {
    /// Maps the integer options flag used by the Lua surface.
    pub fn from_options(options: i64) -> Option<Self> {
        match options {
            o if o == proj_sys::PJ_PROJ_STRING_TYPE_PJ_PROJ_5 as i64 => Some(DefinitionFormat::Proj5),
            o if o == proj_sys::PJ_PROJ_STRING_TYPE_PJ_PROJ_4 as i64 => Some(DefinitionFormat::Proj4),
            _ => None,
        }
    }

    fn string_type(self) -> proj_sys::PJ_PROJ_STRING_TYPE {
        match self {
            DefinitionFormat::Proj5 => proj_sys::PJ_PROJ_STRING_TYPE_PJ_PROJ_5,
            DefinitionFormat::Proj4 => proj_sys::PJ_PROJ_STRING_TYPE_PJ_PROJ_4,
        }
    }
}

/// A coordinate system handle as handed out to Lua.
///
/// Each `Projection` exclusively owns one PROJ object; it is never cloned. The
/// object is released when the `Projection` is dropped, which for Lua userdata
/// happens in its `__gc` finalizer.
pub struct Projection {
    pj: Pj,
}

impl Projection {
    /// Parses a coordinate system definition.
    ///
    /// Bare PROJ strings describe an operation in modern PROJ, so `+type=crs` is
    /// appended to make them denote a coordinate system. `EPSG:` codes, WKT and
    /// PROJJSON are passed through unchanged.
    ///
    /// The definition is handed to PROJ as raw bytes; it need not be UTF-8.
    pub fn new(ctx: Rc<Context>, definition: impl AsRef<[u8]>) -> Result<Projection, CreateError> {
        let definition = definition.as_ref();
        let pj = if needs_crs_type(definition) {
            let mut typed = definition.trim_ascii_end().to_vec();
            typed.extend_from_slice(b" +type=crs");
            Pj::from_definition(ctx, &typed)?
        } else {
            Pj::from_definition(ctx, definition)?
        };
        log::trace!("created projection from {:?}", String::from_utf8_lossy(definition));
        Ok(Projection { pj })
    }

    /// Whether coordinates in this system are longitude/latitude.
    pub fn is_latlong(&self) -> bool {
        if let Some(source) = self.pj.source_crs() {
            return is_geographic_type(source.kind());
        }
        if self.pj.is_crs() {
            is_geographic_type(self.pj.kind())
        } else {
            self.pj.angular_output()
        }
    }

    /// PROJ string of this system, `None` if PROJ cannot express it as one.
    pub fn definition(&self, format: DefinitionFormat) -> Result<Option<String>, std::str::Utf8Error> {
        self.pj.as_proj_string(format.string_type())
    }

    /// Radians per unit of a geographic system's coordinates, `None` when the
    /// system is not geographic. Falls back to degrees if PROJ reports no unit.
    pub(crate) fn angular_unit(&self) -> Option<f64> {
        if !self.is_latlong() {
            return None;
        }
        let source = self.pj.source_crs();
        let crs = source.as_ref().unwrap_or(&self.pj);
        Some(crs.axis_unit_factor().unwrap_or_else(|| 1f64.to_radians()))
    }

    pub(crate) fn pj(&self) -> &Pj {
        &self.pj
    }
}

impl mlua::UserData for Projection {}

fn needs_crs_type(definition: &[u8]) -> bool {
    let definition = definition.trim_ascii_start();
    definition.starts_with(b"+")
        && !definition
            .split(|byte| byte.is_ascii_whitespace())
            .any(|token| token == b"+type=crs" || token == b"type=crs")
}

fn is_geographic_type(kind: proj_sys::PJ_TYPE) -> bool {
    matches!(
        kind,
        proj_sys::PJ_TYPE_PJ_TYPE_GEOGRAPHIC_CRS
            | proj_sys::PJ_TYPE_PJ_TYPE_GEOGRAPHIC_2D_CRS
            | proj_sys::PJ_TYPE_PJ_TYPE_GEOGRAPHIC_3D_CRS
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn projection(definition: impl AsRef<[u8]>) -> Result<Projection, CreateError> {
        Projection::new(Rc::new(Context::new()), definition)
    }

    #[test]
    fn test_new_projection() {
        let wgs84 = projection("+proj=longlat +datum=WGS84 +no_defs").unwrap();
        let def = wgs84.definition(DefinitionFormat::Proj4).unwrap().unwrap();
        assert!(def.contains("+proj=longlat"));
        assert!(def.contains("+datum=WGS84"));
    }

    #[test]
    fn latlong_detection() {
        assert!(projection("+proj=longlat +datum=WGS84").unwrap().is_latlong());
        assert!(projection("EPSG:4326").unwrap().is_latlong());
        assert!(
            projection("+proj=longlat +ellps=krass +towgs84=33.4,-146.6,-76.3,-0.359,-0.053,0.844,-0.84")
                .unwrap()
                .is_latlong()
        );
        assert!(!projection("+proj=merc +datum=WGS84").unwrap().is_latlong());
        assert!(!projection("EPSG:3857").unwrap().is_latlong());
    }

    #[test]
    fn malformed_definitions() {
        assert!(projection("+proj=nonsense").is_err());
        assert!(projection("EPSG:999999999").is_err());
        assert!(projection("").is_err());
    }

    #[test]
    fn explicit_crs_type_is_kept() {
        let p = projection("+proj=utm +zone=33 +datum=WGS84 +type=crs").unwrap();
        let def = p.definition(DefinitionFormat::Proj5).unwrap().unwrap();
        assert_eq!(def.matches("type=crs").count(), 1);
        assert!(def.contains("+zone=33"));
    }

    #[test]
    fn options_flag() {
        assert_eq!(DefinitionFormat::from_options(0), Some(DefinitionFormat::Proj5));
        assert_eq!(DefinitionFormat::from_options(1), Some(DefinitionFormat::Proj4));
        assert_eq!(DefinitionFormat::from_options(2), None);
        assert_eq!(DefinitionFormat::from_options(-1), None);
    }

    #[test]
    fn crs_type_detection() {
        assert!(needs_crs_type(b"+proj=longlat"));
        assert!(needs_crs_type(b"  +init=epsg:4326"));
        assert!(needs_crs_type(b"+proj=longlat \xff"));
        assert!(!needs_crs_type(b"+proj=longlat +type=crs"));
        assert!(!needs_crs_type(b"EPSG:4326"));
        assert!(!needs_crs_type(b"GEOGCRS[\"WGS 84\"]"));
    }

    #[test]
    fn non_utf8_definitions_are_rejected_by_proj() {
        assert!(projection(b"\xff\xfe").is_err());
        assert!(projection(b"+proj=longlat +datum=\xff").is_err());
    }

    #[test]
    fn angular_units() {
        let wgs84 = projection("EPSG:4326").unwrap();
        assert_relative_eq!(wgs84.angular_unit().unwrap(), 1f64.to_radians(), epsilon = 1e-15);
        let bound = projection("+proj=longlat +ellps=krass +towgs84=33.4,-146.6,-76.3,-0.359,-0.053,0.844,-0.84").unwrap();
        assert_relative_eq!(bound.angular_unit().unwrap(), 1f64.to_radians(), epsilon = 1e-15);
        let ntf_paris = projection("EPSG:4807").unwrap();
        assert_relative_eq!(ntf_paris.angular_unit().unwrap(), std::f64::consts::PI / 200.0, epsilon = 1e-15);
        assert_eq!(projection("EPSG:3857").unwrap().angular_unit(), None);
    }
}
