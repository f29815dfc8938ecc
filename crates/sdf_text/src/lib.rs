//! SDF text layout and rendering.
//!
//! [`TextRenderer`] turns a [`TextSpan`] into glyph quads inside a
//! [`TextBatch`]; the batch is then drawn either by the wgpu
//! [`SdfTextPipeline`] (feature `gpu`) or by the CPU [`SoftwareTarget`].
//! Both backends shade with the same transfer function (see [`transfer`]).

pub mod batch;
pub mod layout;
pub mod quad;
pub mod renderer;
pub mod software;
pub mod style;
pub mod transfer;
pub mod uniforms;

#[cfg(feature = "gpu")]
pub mod pipeline;

pub use batch::{TextBatch, TextRun};
pub use layout::{layout_text, measure, GlyphNotFound, PenState, TextLayout};
pub use quad::{GlyphQuad, GlyphVertex};
pub use renderer::{RenderError, RenderReport, TextRenderer};
pub use software::SoftwareTarget;
pub use style::{MissingGlyphPolicy, TextSpan, TextStyle};
pub use uniforms::{TextUniforms, ViewportUniforms};

#[cfg(feature = "gpu")]
pub use pipeline::SdfTextPipeline;
