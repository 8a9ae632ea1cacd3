/// Linear RGBA with premultiplied alpha, as blended by every pipeline here.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    /// Straight-alpha linear components; clamped to `0..=1`.
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self { r: r.clamp(0.0, 1.0) * a, g: g.clamp(0.0, 1.0) * a, b: b.clamp(0.0, 1.0) * a, a }
    }

    /// 8-bit sRGB channels with straight alpha, e.g. from a config file.
    pub fn from_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        Self::from_straight(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a as f32 / 255.0)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color { r: self.r as f64, g: self.g as f64, b: self.b as f64, a: self.a as f64 }
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_alpha_is_premultiplied() {
        let c = Color::from_straight(1.0, 0.5, 0.0, 0.5);
        assert_eq!(c.to_array(), [0.5, 0.25, 0.0, 0.5]);
    }

    #[test]
    fn srgb_extremes_are_exact() {
        assert_eq!(Color::from_rgba8([255, 0, 0, 255]).to_array(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(Color::from_rgba8([0, 0, 0, 0]), Color::TRANSPARENT);
    }

    #[test]
    fn srgb_midtone_is_darker_in_linear() {
        let c = Color::from_rgba8([128, 128, 128, 255]);
        assert!((c.r - 0.2158).abs() < 1e-3);
    }
}
