//! WGSL sources for the two pipelines.

/// Pass-through kernel: unpacks RGBA8 pixels from the upload buffer into the
/// current output texture. Dimensions live in a 16-byte uniform matching
/// [`super::compute::FrameInfo`].
pub(crate) const PASSTHROUGH_COMPUTE: &str = r"
struct FrameInfo {
    width: u32,
    height: u32,
    _pad0: u32,
    _pad1: u32,
};

@group(0) @binding(0) var<uniform> frame: FrameInfo;
@group(0) @binding(1) var<storage, read> pixels: array<u32>;
@group(0) @binding(2) var output: texture_storage_2d<rgba8unorm, write>;

@compute @workgroup_size(8, 8, 1)
fn passthrough(@builtin(global_invocation_id) id: vec3<u32>) {
    if (id.x >= frame.width || id.y >= frame.height) {
        return;
    }
    let index = id.y * frame.width + id.x;
    textureStore(output, vec2<i32>(id.xy), unpack4x8unorm(pixels[index]));
}
";

/// Textured full-screen quad.
pub(crate) const QUAD_RENDER: &str = r"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn quad_vertex(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = vec4<f32>(input.position, 0.0, 1.0);
    out.uv = input.uv;
    return out;
}

@group(0) @binding(0) var frame_texture: texture_2d<f32>;
@group(0) @binding(1) var frame_sampler: sampler;

@fragment
fn quad_fragment(input: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(frame_texture, frame_sampler, input.uv);
}
";

/// Must match `@workgroup_size` in [`PASSTHROUGH_COMPUTE`].
pub(crate) const WORKGROUP_SIZE: (u32, u32) = (8, 8);

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::naga;

    fn entry_points(source: &str) -> Vec<String> {
        let module = naga::front::wgsl::parse_str(source).expect("WGSL parses");
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        );
        validator.validate(&module).expect("WGSL validates");
        module
            .entry_points
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    #[test]
    fn compute_kernel_validates_with_declared_workgroup() {
        let module = naga::front::wgsl::parse_str(PASSTHROUGH_COMPUTE).unwrap();
        let entry = &module.entry_points[0];
        assert_eq!(entry.name, "passthrough");
        assert_eq!(
            entry.workgroup_size,
            [WORKGROUP_SIZE.0, WORKGROUP_SIZE.1, 1]
        );
        assert_eq!(entry_points(PASSTHROUGH_COMPUTE), ["passthrough"]);
    }

    #[test]
    fn quad_shader_exposes_both_stages() {
        assert_eq!(
            entry_points(QUAD_RENDER),
            ["quad_vertex", "quad_fragment"]
        );
    }
}
