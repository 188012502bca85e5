use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use movie::BYTES_PER_PIXEL;

use super::shaders::{PASSTHROUGH_COMPUTE, WORKGROUP_SIZE};

/// Format of every output texture; writable from compute without extra features.
pub(crate) const FRAME_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// CPU mirror of the kernel's `FrameInfo` uniform.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub(crate) struct FrameInfo {
    pub width: u32,
    pub height: u32,
    _pad: [u32; 2],
}

impl FrameInfo {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            _pad: [0; 2],
        }
    }
}

/// Workgroup counts covering a `width` x `height` frame.
pub(crate) fn dispatch_size(width: u32, height: u32) -> (u32, u32) {
    (
        width.div_ceil(WORKGROUP_SIZE.0),
        height.div_ceil(WORKGROUP_SIZE.1),
    )
}

/// One output texture plus the bind groups that write and sample it.
pub(crate) struct FrameSlot {
    pub index: usize,
    pub _texture: wgpu::Texture,
    pub compute_bind_group: wgpu::BindGroup,
    pub sample_bind_group: wgpu::BindGroup,
}

/// Upload buffer, pass-through pipeline, and the layout shared by every slot.
pub(crate) struct ComputeStage {
    pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    pixel_buffer: wgpu::Buffer,
    info_buffer: wgpu::Buffer,
    frame_size: (u32, u32),
}

impl ComputeStage {
    pub(crate) fn new(device: &wgpu::Device, frame_size: (u32, u32)) -> Self {
        let (width, height) = frame_size;
        let pixel_bytes = width as u64 * height as u64 * BYTES_PER_PIXEL as u64;

        let pixel_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("image buffer"),
            size: pixel_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let info = FrameInfo::new(width, height);
        let info_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame info"),
            contents: bytemuck::bytes_of(&info),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("passthrough layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: FRAME_TEXTURE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("passthrough compute"),
            source: wgpu::ShaderSource::Wgsl(PASSTHROUGH_COMPUTE.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("passthrough pipeline layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("passthrough pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some("passthrough"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Self {
            pipeline,
            layout,
            pixel_buffer,
            info_buffer,
            frame_size,
        }
    }

    /// Allocates output texture `index` and binds it for both pipelines.
    pub(crate) fn create_slot(
        &self,
        device: &wgpu::Device,
        sample_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        index: usize,
    ) -> FrameSlot {
        let (width, height) = self.frame_size;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("output texture {index}")),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FRAME_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let compute_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("passthrough bind group {index}")),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.info_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.pixel_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
            ],
        });
        let sample_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("quad bind group {index}")),
            layout: sample_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        FrameSlot {
            index,
            _texture: texture,
            compute_bind_group,
            sample_bind_group,
        }
    }

    /// Copies the frame's bytes into the upload buffer.
    pub(crate) fn upload(&self, queue: &wgpu::Queue, pixels: &[u8]) {
        queue.write_buffer(&self.pixel_buffer, 0, pixels);
    }

    /// Records one dispatch writing `slot`.
    pub(crate) fn encode(&self, encoder: &mut wgpu::CommandEncoder, slot: &FrameSlot) {
        let (groups_x, groups_y) = dispatch_size(self.frame_size.0, self.frame_size.1);
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("compute processing"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &slot.compute_bind_group, &[]);
        pass.dispatch_workgroups(groups_x, groups_y, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn dispatch_covers_partial_workgroups() {
        assert_eq!(dispatch_size(360, 230), (45, 29));
        assert_eq!(dispatch_size(8, 8), (1, 1));
        assert_eq!(dispatch_size(1, 1), (1, 1));
        assert_eq!(dispatch_size(17, 9), (3, 2));
    }

    #[test]
    fn frame_info_matches_uniform_layout() {
        assert_eq!(size_of::<FrameInfo>(), 16);
        let info = FrameInfo::new(360, 230);
        let words: &[u32] = bytemuck::cast_slice(bytemuck::bytes_of(&info));
        assert_eq!(words, &[360, 230, 0, 0]);
    }
}
