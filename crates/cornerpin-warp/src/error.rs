/// Errors surfaced by the warp library.
///
/// Geometry anomalies (zero bounds, degenerate meshes) are absorbed and never
/// reported here.
#[derive(thiserror::Error, Debug)]
pub enum WarpError {
    /// A corner set must hold exactly four points.
    #[error("expected 4 corner points, got {0}")]
    CornerCount(usize),

    /// Pixel density must be finite and strictly positive.
    #[error("invalid pixel density {0}")]
    InvalidDensity(f32),

    /// A record or option set carried no image source.
    #[error("missing image source")]
    MissingSource,

    /// The image could not be fetched or decoded.
    #[error("failed to load image `{src}`: {reason}")]
    ImageLoad { src: String, reason: String },

    /// The record is not valid JSON or does not match the expected shape.
    #[error("invalid warp record")]
    Record(#[from] serde_json::Error),
}

impl WarpError {
    pub(crate) fn image_load(src: &str, reason: impl ToString) -> Self {
        WarpError::ImageLoad { src: src.to_string(), reason: reason.to_string() }
    }
}
