//! Uniform blocks shared with `shaders/sdf_text.wgsl`.
//!
//! Field order and padding must match the WGSL structs byte for byte.

use crate::style::TextStyle;
use sdf_core::Color;

/// Group 0, binding 0.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewportUniforms {
    pub resolution: [f32; 2],
    pub _pad: [f32; 2],
}

impl ViewportUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            _pad: [0.0; 2],
        }
    }
}

/// Group 0, binding 1 (dynamic offset, one block per run).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextUniforms {
    pub color: [f32; 4],
    pub outline_color: [f32; 4],
    pub shadow_color: [f32; 4],
    pub shadow_offset: [f32; 2],
    pub outline_width: f32,
    pub smoothness: f32,
    pub shadow_blur: f32,
    pub enable_outline: u32,
    pub enable_shadow: u32,
    pub _pad: u32,
}

impl TextUniforms {
    pub fn new(color: Color, style: &TextStyle) -> Self {
        Self {
            color: color.to_array(),
            outline_color: style.outline_color.to_array(),
            shadow_color: style.shadow_color.to_array(),
            shadow_offset: style.shadow_offset.to_array(),
            outline_width: style.outline_width,
            smoothness: style.smoothness,
            shadow_blur: style.shadow_blur,
            enable_outline: style.outline_enabled as u32,
            enable_shadow: style.shadow_enabled as u32,
            _pad: 0,
        }
    }

    pub fn outline(&self) -> bool {
        self.enable_outline != 0
    }

    pub fn shadow(&self) -> bool {
        self.enable_shadow != 0
    }
}
