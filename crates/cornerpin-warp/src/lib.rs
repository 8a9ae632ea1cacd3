//! Corner-pin image warping.
//!
//! A [`WarpObject`] pins an image to four movable corners. The corners span a
//! bilinear patch that is tessellated into a UV-mapped mesh; the GPU pass in
//! [`render`] redraws the image across that mesh. [`control`] turns pointer
//! input into corner drags, [`persist`] reads and writes JSON records, and
//! [`loader`] fetches the image before an object is built.

pub mod config;
pub mod control;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod object;
pub mod persist;
pub mod render;
pub mod source;
pub mod tessellate;

pub use config::WarpConfig;
pub use control::{CornerControls, CursorHint, DragState, HandleDescriptor, View};
pub use error::WarpError;
pub use geometry::{BoundsRect, CoordSpace, CornerSet};
pub use loader::{FileLoader, ImageLoader, LoadTask, PendingWarp};
pub use object::{LayoutMode, Placement, WarpObject, WarpOptions, Warpable};
pub use persist::{WarpRecord, from_json, to_json, to_record};
pub use source::SourceImage;
pub use tessellate::{MAX_SEGMENTS, Resolution, TessellatedMesh, tessellate};
