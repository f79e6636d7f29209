/// WGSL for scene objects.
///
/// `fs_lit` shades with three point lights, a premultiplied ambient term and
/// a Blinn-Phong highlight. `fs_standard` uses a fixed key light. Both sample
/// the bound texture; untextured materials get a 1×1 white texture and
/// `use_texture == 0`.
pub const SCENE_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    // rgb tint, a = opacity
    base_color: vec4<f32>,
    light_color: array<vec4<f32>, 3>,
    light_pos: array<vec4<f32>, 3>,
    ambient: vec4<f32>,
    // x = time, y = shininess, z = use_texture
    params: vec4<f32>,
    // xy = uv repeat
    uv_transform: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

@group(1) @binding(0)
var<uniform> object: Object;

@group(2) @binding(0)
var base_texture: texture_2d<f32>;
@group(2) @binding(1)
var base_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = object.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize((object.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.uv = vertex.uv * object.uv_transform.xy;
    return out;
}

fn albedo(uv: vec2<f32>) -> vec3<f32> {
    let texel = textureSample(base_texture, base_sampler, uv).rgb;
    let tint = object.base_color.rgb;
    return select(tint, texel * tint, object.params.z > 0.5);
}

@fragment
fn fs_lit(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    let base = albedo(in.uv);
    var n = normalize(in.world_normal);
    if (!front) {
        n = -n;
    }
    let v = normalize(frame.camera_pos.xyz - in.world_pos);
    let shininess = max(object.params.y, 1.0);

    var light = object.ambient.rgb;
    for (var i = 0u; i < 3u; i = i + 1u) {
        let l = normalize(object.light_pos[i].xyz - in.world_pos);
        let h = normalize(l + v);
        let diffuse = max(dot(n, l), 0.0);
        let specular = pow(max(dot(n, h), 0.0), shininess);
        light = light + object.light_color[i].rgb * (diffuse + specular);
    }
    return vec4<f32>(base * light, object.base_color.a);
}

@fragment
fn fs_standard(in: VertexOutput, @builtin(front_facing) front: bool) -> @location(0) vec4<f32> {
    let base = albedo(in.uv);
    var n = normalize(in.world_normal);
    if (!front) {
        n = -n;
    }
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let lighting = 0.3 + max(dot(n, light_dir), 0.0) * 0.7;
    return vec4<f32>(base * lighting, object.base_color.a);
}
"#;
