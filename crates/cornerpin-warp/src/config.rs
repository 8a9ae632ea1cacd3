use cornerpin_engine::paint::Color;
use serde::{Deserialize, Serialize};

use crate::tessellate::Resolution;

/// Tunables for tessellation and the handle overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WarpConfig {
    pub resolution: Resolution,

    /// Drawn handle radius, screen px.
    pub handle_radius: f32,
    /// Pick radius around a handle, screen px.
    pub hit_radius: f32,
    pub handle_color: [u8; 4],

    pub edge_width: f32,
    pub edge_color: [u8; 4],

    pub clear_color: [u8; 4],
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            handle_radius: 4.0,
            hit_radius: 10.0,
            handle_color: [0, 128, 0, 255],
            edge_width: 1.0,
            edge_color: [0, 128, 0, 255],
            clear_color: [38, 38, 42, 255],
        }
    }
}

impl WarpConfig {
    #[inline]
    pub fn handle_color(&self) -> Color {
        Color::from_rgba8(self.handle_color)
    }

    #[inline]
    pub fn edge_color(&self) -> Color {
        Color::from_rgba8(self.edge_color)
    }

    #[inline]
    pub fn clear_color(&self) -> Color {
        Color::from_rgba8(self.clear_color)
    }
}
