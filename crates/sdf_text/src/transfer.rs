//! CPU mirror of the fragment shader's distance-to-alpha transfer.
//!
//! `shade` computes exactly what `fs_main` in `shaders/sdf_text.wgsl` does
//! for one pixel, so the software preview and tests share the GPU math.

use crate::uniforms::TextUniforms;

/// GLSL/WGSL `smoothstep`.  A zero-width edge degrades to a step.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Glyph body coverage for a normalized distance `d` in `[0, 1]`.
pub fn fill_alpha(d: f32, smoothness: f32) -> f32 {
    smoothstep(0.5 - smoothness, 0.5 + smoothness, d)
}

/// Coverage of the glyph grown by `width`.
pub fn outline_alpha(d: f32, width: f32, smoothness: f32) -> f32 {
    smoothstep(0.5 - width - smoothness, 0.5 - width + smoothness, d)
}

pub fn shadow_alpha(d: f32, blur: f32) -> f32 {
    smoothstep(0.5 - blur, 0.5 + blur, d)
}

/// Straight-alpha RGBA for one pixel.
///
/// `d` is the field sampled at the pixel, `shadow_d` the field sampled at
/// the pixel minus the shadow offset.
pub fn shade(d: f32, shadow_d: f32, u: &TextUniforms) -> [f32; 4] {
    let [r, g, b, a] = u.color;
    let fill = fill_alpha(d, u.smoothness);
    let mut rgb = [r, g, b];
    let mut alpha = fill * a;

    if u.outline() {
        let outline = outline_alpha(d, u.outline_width, u.smoothness) * u.outline_color[3];
        rgb = mix3(
            [u.outline_color[0], u.outline_color[1], u.outline_color[2]],
            [r, g, b],
            fill,
        );
        alpha = alpha.max(outline);
    }

    if u.shadow() {
        let shadow = shadow_alpha(shadow_d, u.shadow_blur) * u.shadow_color[3];
        let out_a = alpha + shadow * (1.0 - alpha);
        let t = if out_a > 0.0 { alpha / out_a } else { 0.0 };
        rgb = mix3([u.shadow_color[0], u.shadow_color[1], u.shadow_color[2]], rgb, t);
        alpha = out_a;
    }

    [rgb[0], rgb[1], rgb[2], alpha]
}

fn mix3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}
