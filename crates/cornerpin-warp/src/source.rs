use std::sync::Arc;

use cornerpin_engine::coords::Vec2;

use crate::error::WarpError;

/// Decoded RGBA8 image (straight alpha, sRGB encoded).
///
/// Pixel storage is shared; clones are cheap and compare by identity on the GPU
/// side so an unchanged image is uploaded once.
#[derive(Debug, Clone)]
pub struct SourceImage {
    src: String,
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl SourceImage {
    /// Wraps raw RGBA8 rows. The buffer must hold exactly `width * height * 4` bytes.
    pub fn from_rgba8(src: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, WarpError> {
        let src = src.into();
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(WarpError::image_load(
                &src,
                format!("{width}x{height} image needs {expected} bytes, got {}", pixels.len()),
            ));
        }
        Ok(Self { src, width, height, pixels: pixels.into() })
    }

    /// Decodes an encoded image (PNG, JPEG, ...) from memory.
    pub fn decode(src: impl Into<String>, bytes: &[u8]) -> Result<Self, WarpError> {
        let src = src.into();
        let decoded = image::load_from_memory(bytes).map_err(|e| WarpError::image_load(&src, e))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(src, width, height, rgba.into_raw())
    }

    /// Two-tone checkerboard, used when no image is supplied.
    pub fn checkerboard(width: u32, height: u32, cell: u32) -> Self {
        let cell = cell.max(1);
        let width = width.max(1);
        let height = height.max(1);
        let light = [236u8, 236, 236, 255];
        let dark = [54u8, 96, 146, 255];

        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let odd = ((x / cell) + (y / cell)) % 2 == 1;
                pixels.extend_from_slice(if odd { &dark } else { &light });
            }
        }

        Self {
            src: format!("checkerboard:{width}x{height}"),
            width,
            height,
            pixels: pixels.into(),
        }
    }

    #[inline]
    pub fn src(&self) -> &str {
        &self.src
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Natural size in image pixels.
    #[inline]
    pub fn natural_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// True when both values share the same pixel storage.
    #[inline]
    pub fn same_pixels(&self, other: &SourceImage) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_length_is_checked() {
        assert!(SourceImage::from_rgba8("a", 2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            SourceImage::from_rgba8("a", 2, 2, vec![0; 15]),
            Err(WarpError::ImageLoad { .. })
        ));
        assert!(SourceImage::from_rgba8("a", 0, 2, vec![]).is_err());
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = SourceImage::decode("broken.png", b"not an image").unwrap_err();
        match err {
            WarpError::ImageLoad { src, .. } => assert_eq!(src, "broken.png"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decode_png_roundtrip() {
        let mut img = image::RgbaImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgba([10, 20, 30, 40]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let decoded = SourceImage::decode("mem.png", &bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        let last = &decoded.pixels()[(1 * 3 + 2) * 4..];
        assert_eq!(last, &[10, 20, 30, 40]);
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let img = SourceImage::checkerboard(4, 4, 2);
        let px = |x: usize, y: usize| &img.pixels()[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
        assert_eq!(px(0, 0), px(1, 1));
        assert_ne!(px(0, 0), px(2, 0));
        assert_eq!(img.natural_size(), Vec2::new(4.0, 4.0));
        assert!(img.same_pixels(&img.clone()));
    }
}
