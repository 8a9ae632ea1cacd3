use crate::source::SourceImage;

/// Format of every warp texture; the source pixels are sRGB-encoded RGBA8.
pub const WARP_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// GPU copy of a decoded source image.
pub struct SourceTexture {
    image: SourceImage,
    view: wgpu::TextureView,
    _texture: wgpu::Texture,
}

/// True when a `width` x `height` texture is within the device's 2D limit.
#[inline]
pub fn fits_texture_limit(width: u32, height: u32, max_side: u32) -> bool {
    width <= max_side && height <= max_side
}

impl SourceTexture {
    /// Uploads `image`; `None` (with a warning) when either side exceeds
    /// `max_side`, since the device would reject the texture.
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &SourceImage, max_side: u32) -> Option<Self> {
        if !fits_texture_limit(image.width(), image.height(), max_side) {
            log::warn!(
                "source '{}' is {}x{}, over the device texture limit of {max_side}; not drawn",
                image.src(),
                image.width(),
                image.height(),
            );
            return None;
        }

        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cornerpin source texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: WARP_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width()),
                rows_per_image: Some(image.height()),
            },
            size,
        );

        log::debug!("uploaded source '{}' ({}x{})", image.src(), image.width(), image.height());

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Some(Self { image: image.clone(), view, _texture: texture })
    }

    /// True when this upload holds the same pixel buffer as `image`.
    #[inline]
    pub fn holds(&self, image: &SourceImage) -> bool {
        self.image.same_pixels(image)
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

/// Offscreen color target a filter renders into.
pub struct RenderTexture {
    width: u32,
    height: u32,
    view: wgpu::TextureView,
    _texture: wgpu::Texture,
}

impl RenderTexture {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cornerpin warp target"),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: WARP_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { width, height, view, _texture: texture }
    }

    /// Reuses `slot` when the size matches, otherwise reallocates it.
    pub fn ensure<'s>(slot: &'s mut Option<Self>, device: &wgpu::Device, width: u32, height: u32) -> &'s Self {
        let stale = slot.as_ref().is_none_or(|t| t.width != width || t.height != height);
        if stale {
            log::trace!("warp target -> {width}x{height}");
            *slot = Some(Self::new(device, width, height));
        }
        slot.get_or_insert_with(|| Self::new(device, width, height))
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_limit_is_inclusive_per_side() {
        assert!(fits_texture_limit(8192, 8192, 8192));
        assert!(fits_texture_limit(1, 8192, 8192));
        assert!(!fits_texture_limit(8193, 1, 8192));
        assert!(!fits_texture_limit(1, 8193, 8192));
    }

    #[test]
    fn oversized_source_is_caught_before_upload() {
        let image = SourceImage::checkerboard(300, 20, 4);
        assert!(!fits_texture_limit(image.width(), image.height(), 256));
        assert!(fits_texture_limit(image.width(), image.height(), 2048));
    }
}
