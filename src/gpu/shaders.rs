//! WGSL sources for the dot and connection-line pipelines.

/// Shared uniform block. Must match [`super::Uniforms`].
const UNIFORMS: &str = r#"
struct Uniforms {
    model_view: mat4x4<f32>,
    proj: mat4x4<f32>,
    zoom: f32,
    sides: f32,
    _padding: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;
"#;

/// Instanced camera-facing quads masked to a regular polygon.
const DOT_BODY: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) local: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
    @location(2) color: vec4<f32>,
) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index];

    // Expand in view space so the polygon always faces the camera.
    let center = uniforms.model_view * vec4<f32>(position, 1.0);
    let offset = corner * size * uniforms.zoom;

    var out: VertexOutput;
    out.clip_position = uniforms.proj * vec4<f32>(center.xy + offset, center.z, center.w);
    out.color = color;
    out.local = corner;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = max(uniforms.sides, 3.0);
    let segment = 6.28318530718 / n;
    let angle = atan2(in.local.y, in.local.x);
    // Angle from the nearest edge normal.
    let a = angle - segment * floor(angle / segment) - segment * 0.5;
    if length(in.local) * cos(a) > cos(segment * 0.5) {
        discard;
    }
    return in.color;
}
"#;

const LINE_BODY: &str = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return uniforms.proj * uniforms.model_view * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 120.0 / 255.0);
}
"#;

pub fn dot_shader() -> String {
    format!("{UNIFORMS}{DOT_BODY}")
}

pub fn line_shader() -> String {
    format!("{UNIFORMS}{LINE_BODY}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code).map_err(|e| format!("WGSL parse error: {:?}", e))?;
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;
        Ok(())
    }

    #[test]
    fn test_dot_shader_validates() {
        let src = dot_shader();
        assert!(src.contains("discard"));
        validate_wgsl(&src).unwrap();
    }

    #[test]
    fn test_line_shader_validates() {
        validate_wgsl(&line_shader()).unwrap();
    }
}
