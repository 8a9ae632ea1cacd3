//! Record format for saving and restoring warp objects.
//!
//! Corners are stored as held by the object: device units, local to the box.
//! Restoring takes them back verbatim, without re-normalizing or re-scaling.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WarpError;
use crate::geometry::{CoordSpace, CornerSet};
use crate::loader::{ImageLoader, PendingWarp};
use crate::object::{DEFAULT_CROSS_ORIGIN, LayoutMode, Placement, WarpObject, WarpOptions, Warpable};
use crate::tessellate::Resolution;

/// Object type tag written to records.
pub const RECORD_TYPE: &str = "photo";
/// Filter type tag of the warp entry in `filters`.
pub const PERSPECTIVE_FILTER: &str = "Perspective";

fn one() -> f32 {
    1.0
}

fn yes() -> bool {
    true
}

/// Serialized form of a warp object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarpRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub src: Option<String>,

    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default = "one")]
    pub scale_x: f32,
    #[serde(default = "one")]
    pub scale_y: f32,
    #[serde(default)]
    pub angle: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective_coords: Option<Vec<[f32; 2]>>,
    #[serde(default = "one")]
    pub pixel_density: f32,
    #[serde(default, alias = "layout")]
    pub layout_mode: LayoutMode,
    #[serde(default)]
    pub has_relative_coordinates: bool,
    #[serde(default = "yes")]
    pub perspective_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,

    #[serde(default)]
    pub filters: Vec<Value>,
    #[serde(default)]
    pub resize_filter: Option<Value>,
    #[serde(default)]
    pub clip_path: Option<Value>,
}

/// The warp's own entry in `filters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerspectiveFilterRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub perspective_coords: Vec<[f32; 2]>,
    #[serde(default = "one")]
    pub pixel_ratio: f32,
    #[serde(default)]
    pub has_relative_coordinates: bool,
}

/// Record fields the object carries without interpreting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Passthrough {
    /// Non-warp entries of `filters`, in order.
    pub filters: Vec<Value>,
    pub resize_filter: Option<Value>,
    pub clip_path: Option<Value>,
}

/// Snapshot of `object` as a record.
pub fn to_record(object: &WarpObject) -> WarpRecord {
    let placement = object.placement();
    let corners = object.corners();
    let coords = corners.to_arrays();

    let warp_filter = PerspectiveFilterRecord {
        kind: PERSPECTIVE_FILTER.to_string(),
        perspective_coords: coords.clone(),
        pixel_ratio: object.pixel_density(),
        has_relative_coordinates: corners.has_relative_coordinates,
    };

    let passthrough = object.passthrough();
    let mut filters = Vec::with_capacity(passthrough.filters.len() + 1);
    match serde_json::to_value(&warp_filter) {
        Ok(v) => filters.push(v),
        Err(e) => log::warn!("warp filter entry not serializable: {e}"),
    }
    filters.extend(passthrough.filters.iter().cloned());

    WarpRecord {
        kind: RECORD_TYPE.to_string(),
        src: Some(object.image().src().to_string()),
        left: placement.left,
        top: placement.top,
        width: placement.width,
        height: placement.height,
        scale_x: placement.scale_x,
        scale_y: placement.scale_y,
        angle: placement.angle,
        perspective_coords: Some(coords),
        pixel_density: object.pixel_density(),
        layout_mode: object.layout_mode(),
        has_relative_coordinates: corners.has_relative_coordinates,
        perspective_mode: object.perspective_mode(),
        cross_origin: Some(object.cross_origin().to_string()),
        resolution: Some(object.resolution()),
        filters,
        resize_filter: passthrough.resize_filter.clone(),
        clip_path: passthrough.clip_path.clone(),
    }
}

pub fn to_json(object: &WarpObject) -> Result<String, WarpError> {
    Ok(serde_json::to_string_pretty(&to_record(object))?)
}

pub fn from_json(json: &str) -> Result<WarpRecord, WarpError> {
    Ok(serde_json::from_str(json)?)
}

impl WarpRecord {
    /// Minimal record for a fresh object over `src`: no corners, default placement.
    pub fn for_source(src: impl Into<String>) -> Self {
        Self {
            kind: RECORD_TYPE.to_string(),
            src: Some(src.into()),
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            perspective_coords: None,
            pixel_density: 1.0,
            layout_mode: LayoutMode::Fit,
            has_relative_coordinates: false,
            perspective_mode: true,
            cross_origin: None,
            resolution: None,
            filters: Vec::new(),
            resize_filter: None,
            clip_path: None,
        }
    }

    /// Image source; a record without one cannot be restored.
    pub fn source(&self) -> Result<&str, WarpError> {
        match self.src.as_deref() {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(WarpError::MissingSource),
        }
    }

    pub fn cross_origin(&self) -> &str {
        self.cross_origin.as_deref().unwrap_or(DEFAULT_CROSS_ORIGIN)
    }

    /// Splits `filters` into the warp entry and everything else.
    pub fn split_filters(&self) -> (Option<PerspectiveFilterRecord>, Vec<Value>) {
        let mut warp = None;
        let mut rest = Vec::new();

        for entry in &self.filters {
            let is_warp = entry.get("type").and_then(Value::as_str) == Some(PERSPECTIVE_FILTER);
            if is_warp && warp.is_none() {
                match serde_json::from_value::<PerspectiveFilterRecord>(entry.clone()) {
                    Ok(f) => {
                        warp = Some(f);
                        continue;
                    }
                    Err(e) => log::warn!("malformed {PERSPECTIVE_FILTER} entry kept as is: {e}"),
                }
            }
            rest.push(entry.clone());
        }

        (warp, rest)
    }

    /// Rebuilds construction options and passthrough data.
    ///
    /// Corners come from `perspectiveCoords`, falling back to the warp filter
    /// entry; both are device units and are taken verbatim.
    pub fn to_options(&self) -> Result<(WarpOptions, Passthrough), WarpError> {
        let (warp_filter, other_filters) = self.split_filters();

        let coords = self
            .perspective_coords
            .as_deref()
            .or(warp_filter.as_ref().map(|f| f.perspective_coords.as_slice()));

        let has_relative = self.has_relative_coordinates
            || warp_filter.as_ref().is_some_and(|f| f.has_relative_coordinates);

        let perspective_coords = coords
            .map(|c| {
                CornerSet::from_slice(c, CoordSpace::Device).map(|mut set| {
                    set.has_relative_coordinates = has_relative;
                    set
                })
            })
            .transpose()?;

        let options = WarpOptions {
            perspective_coords,
            pixel_density: self.pixel_density,
            layout_mode: self.layout_mode,
            cross_origin: self.cross_origin().to_string(),
            resolution: self.resolution.unwrap_or_default(),
            placement: Placement {
                left: self.left,
                top: self.top,
                width: self.width,
                height: self.height,
                scale_x: self.scale_x,
                scale_y: self.scale_y,
                angle: self.angle,
            },
            perspective_mode: self.perspective_mode,
        };

        let passthrough = Passthrough {
            filters: other_filters,
            resize_filter: self.resize_filter.clone(),
            clip_path: self.clip_path.clone(),
        };

        Ok((options, passthrough))
    }
}

impl WarpObject {
    /// Starts restoring an object: fetches the image, then rebuilds it from the
    /// record once the image arrives.
    pub fn from_record(record: WarpRecord, loader: &dyn ImageLoader) -> Result<PendingWarp, WarpError> {
        let src = record.source()?.to_string();
        let task = loader.load(&src, record.cross_origin());
        Ok(PendingWarp::new(task, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceImage;
    use serde_json::json;

    fn sample_object() -> WarpObject {
        let corners =
            CornerSet::from_slice(&[[0.0, 0.0], [240.0, 20.0], [200.0, 160.0], [0.0, 160.0]], CoordSpace::Device)
                .unwrap();
        let mut obj = WarpObject::new(
            SourceImage::checkerboard(200, 160, 10),
            WarpOptions {
                perspective_coords: Some(corners),
                pixel_density: 2.0,
                placement: Placement { left: 12.0, top: 34.0, angle: 15.0, ..Placement::default() },
                ..Default::default()
            },
        )
        .unwrap();
        obj.set_passthrough(Passthrough {
            filters: vec![json!({ "type": "Brightness", "brightness": 0.1 })],
            resize_filter: Some(json!({ "type": "Resize" })),
            clip_path: Some(json!({ "type": "rect", "width": 10 })),
        });
        obj
    }

    // ── to_record ─────────────────────────────────────────────────────────

    #[test]
    fn record_carries_corners_and_filter_entry() {
        let record = to_record(&sample_object());
        assert_eq!(record.kind, RECORD_TYPE);
        assert_eq!(record.pixel_density, 2.0);
        assert_eq!(record.width, 120.0);
        assert_eq!(record.height, 80.0);
        assert_eq!(record.perspective_coords.as_ref().unwrap()[1], [240.0, 20.0]);
        assert_eq!(record.filters.len(), 2);
        assert_eq!(record.filters[0]["type"], PERSPECTIVE_FILTER);
        assert_eq!(record.filters[0]["pixelRatio"], 2.0);
        assert_eq!(record.filters[1]["type"], "Brightness");
        assert_eq!(record.cross_origin(), DEFAULT_CROSS_ORIGIN);
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let json = to_json(&sample_object()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        for key in ["type", "src", "perspectiveCoords", "pixelDensity", "layoutMode", "hasRelativeCoordinates", "scaleX", "resizeFilter", "clipPath"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["layoutMode"], "fit");
    }

    // ── from_json ─────────────────────────────────────────────────────────

    #[test]
    fn minimal_record_gets_defaults() {
        let record = from_json(r#"{ "type": "photo", "src": "a.png" }"#).unwrap();
        assert_eq!(record.scale_x, 1.0);
        assert_eq!(record.pixel_density, 1.0);
        assert!(record.perspective_mode);
        assert!(record.perspective_coords.is_none());

        let (options, passthrough) = record.to_options().unwrap();
        assert!(options.perspective_coords.is_none());
        assert_eq!(passthrough, Passthrough::default());
    }

    #[test]
    fn fresh_record_matches_minimal_json() {
        let parsed = from_json(r#"{ "type": "photo", "src": "a.png" }"#).unwrap();
        assert_eq!(WarpRecord::for_source("a.png"), parsed);
    }

    #[test]
    fn layout_alias_is_accepted() {
        let record = from_json(r#"{ "type": "photo", "src": "a.png", "layout": "stretch" }"#).unwrap();
        assert_eq!(record.layout_mode, LayoutMode::Stretch);
    }

    #[test]
    fn bad_json_is_a_record_error() {
        assert!(matches!(from_json("{ nope"), Err(WarpError::Record(_))));
    }

    #[test]
    fn missing_source_is_rejected() {
        let record = from_json(r#"{ "type": "photo" }"#).unwrap();
        assert!(matches!(record.source(), Err(WarpError::MissingSource)));
        let empty = from_json(r#"{ "type": "photo", "src": "" }"#).unwrap();
        assert!(matches!(empty.source(), Err(WarpError::MissingSource)));
    }

    // ── to_options ────────────────────────────────────────────────────────

    #[test]
    fn wrong_corner_count_is_rejected() {
        let record = from_json(r#"{ "type": "photo", "src": "a.png", "perspectiveCoords": [[0,0],[1,0],[1,1]] }"#).unwrap();
        assert!(matches!(record.to_options(), Err(WarpError::CornerCount(3))));
    }

    #[test]
    fn corners_fall_back_to_filter_entry() {
        let record = from_json(
            r#"{ "type": "photo", "src": "a.png",
                 "filters": [ { "type": "Perspective", "perspectiveCoords": [[0,0],[8,0],[8,6],[0,6]],
                                "pixelRatio": 2, "hasRelativeCoordinates": true } ] }"#,
        )
        .unwrap();
        let (options, passthrough) = record.to_options().unwrap();
        let corners = options.perspective_coords.unwrap();
        assert_eq!(corners.space(), CoordSpace::Device);
        assert!(corners.has_relative_coordinates);
        assert_eq!(corners.to_arrays()[2], [8.0, 6.0]);
        assert!(passthrough.filters.is_empty());
    }
}
