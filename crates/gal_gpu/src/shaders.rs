//! WGSL shaders

/// Shader for tessellated meshes.
///
/// Vertices arrive in screen pixels with the normalized depth in `z`; the
/// vertex stage maps them to clip space. Colors are output premultiplied.
pub const MESH_SHADER: &str = r#"
struct Uniforms {
    viewport: vec2<f32>,
    _padding: vec2<f32>,
}

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let ndc = vec2<f32>(
        in.position.x / uniforms.viewport.x * 2.0 - 1.0,
        1.0 - in.position.y / uniforms.viewport.y * 2.0,
    );
    out.position = vec4<f32>(ndc, in.position.z, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color.rgb * in.color.a, in.color.a);
}
"#;

/// Uniforms of [`MESH_SHADER`]
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniforms {
    pub viewport: [f32; 2],
    pub _padding: [f32; 2],
}
