/// Full-screen gradient sky. The view ray for each pixel is rebuilt from the
/// inverse view-projection, so the sky rotates with the camera but never
/// translates.
pub const SKY_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    inv_view_proj: mat4x4<f32>,
    // xyz: eye position, w: ground extent
    camera: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

const ZENITH: vec3<f32> = vec3<f32>(0.16, 0.36, 0.78);
const HORIZON: vec3<f32> = vec3<f32>(0.72, 0.83, 0.95);
const NADIR: vec3<f32> = vec3<f32>(0.32, 0.34, 0.36);
const SUN_DIR: vec3<f32> = vec3<f32>(0.48, 0.6, 0.64);

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

@vertex
fn vs_sky(@builtin(vertex_index) index: u32) -> SkyOutput {
    // One oversized triangle covering the viewport.
    let x = f32((index << 1u) & 2u) * 2.0 - 1.0;
    let y = f32(index & 2u) * 2.0 - 1.0;
    var out: SkyOutput;
    out.clip_position = vec4<f32>(x, y, 0.0, 1.0);
    out.ndc = vec2<f32>(x, y);
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    let far = uniforms.inv_view_proj * vec4<f32>(in.ndc, 1.0, 1.0);
    let dir = normalize(far.xyz / far.w - uniforms.camera.xyz);

    var color: vec3<f32>;
    if (dir.y >= 0.0) {
        color = mix(HORIZON, ZENITH, pow(dir.y, 0.6));
    } else {
        color = mix(HORIZON, NADIR, pow(-dir.y, 0.4));
    }
    let sun = pow(max(dot(dir, normalize(SUN_DIR)), 0.0), 512.0);
    color = color + vec3<f32>(1.0, 0.95, 0.8) * sun;
    return vec4<f32>(color, 1.0);
}
"#;

/// Checkered ground plane at y = 0, drawn as a quad centred under the camera
/// and faded into the horizon colour toward its edge.
pub const GROUND_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    inv_view_proj: mat4x4<f32>,
    camera: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

const HORIZON: vec3<f32> = vec3<f32>(0.72, 0.83, 0.95);
const LIGHT: vec3<f32> = vec3<f32>(0.42, 0.55, 0.36);
const DARK: vec3<f32> = vec3<f32>(0.30, 0.42, 0.26);
const CELL: f32 = 4.0;

struct GroundOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world: vec3<f32>,
};

@vertex
fn vs_ground(@builtin(vertex_index) index: u32) -> GroundOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>( 1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0, -1.0),
    );
    let extent = uniforms.camera.w;
    let c = corners[index] * extent;
    let world = vec3<f32>(uniforms.camera.x + c.x, 0.0, uniforms.camera.z + c.y);

    var out: GroundOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(world, 1.0);
    out.world = world;
    return out;
}

@fragment
fn fs_ground(in: GroundOutput) -> @location(0) vec4<f32> {
    let cell = floor(in.world.xz / CELL);
    let parity = abs(cell.x + cell.y) % 2.0;
    let base = select(LIGHT, DARK, parity > 0.5);

    let extent = uniforms.camera.w;
    let dist = distance(in.world.xz, uniforms.camera.xz);
    let fog = smoothstep(extent * 0.15, extent * 0.9, dist);
    return vec4<f32>(mix(base, HORIZON, fog), 1.0);
}
"#;
