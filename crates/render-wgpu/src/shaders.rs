/// WGSL shader for instanced meshes with normal or matcap shading.
pub const MESH_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
};

struct MaterialParams {
    // x: 0 = normal, 1 = matcap
    mode: vec4<u32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var<uniform> material: MaterialParams;
@group(1) @binding(1)
var matcap_texture: texture_2d<f32>;
@group(1) @binding(2)
var matcap_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_normal: vec3<f32>,
    @location(1) view_position: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    // Instances are uniformly scaled, so the model matrix also transforms normals.
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.view_normal = (uniforms.view * vec4<f32>(world_normal, 0.0)).xyz;
    out.view_position = (uniforms.view * world_pos).xyz;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.view_normal);

    let view_dir = normalize(-in.view_position);
    let x = normalize(vec3<f32>(view_dir.z, 0.0, -view_dir.x));
    let y = cross(view_dir, x);
    let uv = vec2<f32>(dot(x, normal), dot(y, normal)) * 0.495 + 0.5;
    // Texture rows run top-down.
    let matcap = textureSample(matcap_texture, matcap_sampler, vec2<f32>(uv.x, 1.0 - uv.y));

    if material.mode.x == 1u {
        return vec4<f32>(matcap.rgb, 1.0);
    }
    return vec4<f32>(normal * 0.5 + 0.5, 1.0);
}
"#;
