use std::borrow::Cow;

use crate::tessellate::IndexData;

use super::WarpUniform;

/// Grow-only GPU buffers for one textured mesh draw.
///
/// Each draw kind of each object owns its own set: queue writes land before
/// the encoder runs, so two draws sharing buffers would see the last write.
pub struct MeshBuffers {
    label: &'static str,
    generation: u64,

    positions: Option<wgpu::Buffer>,
    uvs: Option<wgpu::Buffer>,
    vertex_capacity: usize,

    indices: Option<wgpu::Buffer>,
    index_capacity: u64,

    uniform: Option<wgpu::Buffer>,
}

/// Buffers written for the current draw.
pub struct UploadedMesh<'a> {
    pub positions: wgpu::BufferSlice<'a>,
    pub uvs: wgpu::BufferSlice<'a>,
    pub indices: wgpu::BufferSlice<'a>,
    pub index_format: wgpu::IndexFormat,
    pub index_count: u32,
    pub uniform: &'a wgpu::Buffer,
}

impl MeshBuffers {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            generation: 0,
            positions: None,
            uvs: None,
            vertex_capacity: 0,
            indices: None,
            index_capacity: 0,
            uniform: None,
        }
    }

    /// Writes one mesh and its uniform; `None` when there is nothing to draw.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        generation: u64,
        positions: &[[f32; 2]],
        uvs: &[[f32; 2]],
        indices: &IndexData,
        uniform: &WarpUniform,
    ) -> Option<UploadedMesh<'_>> {
        if positions.is_empty() || indices.is_empty() || positions.len() != uvs.len() {
            return None;
        }
        if self.generation != generation {
            *self = Self { generation, ..Self::new(self.label) };
        }

        self.ensure_vertex_capacity(device, positions.len());
        let index_bytes = padded(indices.as_bytes());
        self.ensure_index_capacity(device, index_bytes.len() as u64);
        if self.uniform.is_none() {
            self.uniform = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: std::mem::size_of::<WarpUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }

        let (Some(pos_buf), Some(uv_buf), Some(index_buf), Some(ubo)) = (
            self.positions.as_ref(),
            self.uvs.as_ref(),
            self.indices.as_ref(),
            self.uniform.as_ref(),
        ) else {
            return None;
        };

        let vertex_bytes = std::mem::size_of_val(positions) as u64;
        queue.write_buffer(pos_buf, 0, bytemuck::cast_slice(positions));
        queue.write_buffer(uv_buf, 0, bytemuck::cast_slice(uvs));
        queue.write_buffer(index_buf, 0, &index_bytes);
        queue.write_buffer(ubo, 0, bytemuck::bytes_of(uniform));

        Some(UploadedMesh {
            positions: pos_buf.slice(..vertex_bytes),
            uvs: uv_buf.slice(..vertex_bytes),
            indices: index_buf.slice(..indices.as_bytes().len() as u64),
            index_format: indices.format(),
            index_count: indices.len() as u32,
            uniform: ubo,
        })
    }

    fn ensure_vertex_capacity(&mut self, device: &wgpu::Device, required: usize) {
        if required <= self.vertex_capacity && self.positions.is_some() && self.uvs.is_some() {
            return;
        }
        let cap = grown_capacity(required);
        let size = (cap * std::mem::size_of::<[f32; 2]>()) as u64;
        let make = |what: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{} {what}", self.label)),
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        self.positions = Some(make("positions"));
        self.uvs = Some(make("uvs"));
        self.vertex_capacity = cap;
    }

    fn ensure_index_capacity(&mut self, device: &wgpu::Device, required: u64) {
        if required <= self.index_capacity && self.indices.is_some() {
            return;
        }
        let cap = (required as usize).next_power_of_two().max(256) as u64;
        self.indices = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} indices", self.label)),
            size: cap,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.index_capacity = cap;
    }
}

#[inline]
fn grown_capacity(required: usize) -> usize {
    required.next_power_of_two().max(64)
}

/// Pads to the 4-byte multiple queue writes require.
fn padded(bytes: &[u8]) -> Cow<'_, [u8]> {
    let rem = bytes.len() % wgpu::COPY_BUFFER_ALIGNMENT as usize;
    if rem == 0 {
        return Cow::Borrowed(bytes);
    }
    let mut out = bytes.to_vec();
    out.resize(bytes.len() + (wgpu::COPY_BUFFER_ALIGNMENT as usize - rem), 0);
    Cow::Owned(out)
}
