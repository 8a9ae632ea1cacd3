//! GPU side of the warp: the perspective filter pass, the surface composite and
//! the program cache they share.
//!
//! Every draw kind uses one WGSL module (`shaders/warp.wgsl`): pixel-space
//! positions plus UVs, mapped to NDC by a `step` uniform.

mod buffers;
mod cache;
mod filter;
mod surface;
mod texture;

use bytemuck::{Pod, Zeroable};

pub use buffers::{MeshBuffers, UploadedMesh};
pub use cache::{Program, ProgramCache, ProgramKey};
pub use filter::{FilterPass, PerspectiveFilter, composite};
pub use surface::{WarpSurface, local_to_screen};
pub use texture::{RenderTexture, SourceTexture, WARP_TEXTURE_FORMAT, fits_texture_limit};

/// Program variants held by [`ProgramCache`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FilterKind {
    /// Mesh warp into an offscreen target.
    Perspective,
    /// Textured quad onto the frame surface, premultiplied blending.
    Composite,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct WarpUniform {
    /// `(1 / width, 1 / height)` of the target in the units positions use.
    pub step: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

impl WarpUniform {
    pub fn for_size(width: f32, height: f32) -> Self {
        Self {
            step: [1.0 / width.max(1.0), 1.0 / height.max(1.0)],
            _pad: [0.0; 2],
        }
    }

    /// Maps a pixel position to NDC the same way `vs_main` does.
    pub fn to_ndc(&self, p: [f32; 2]) -> [f32; 2] {
        [p[0] * self.step[0] * 2.0 - 1.0, 1.0 - p[1] * self.step[1] * 2.0]
    }
}
