// sdf_core: tipos básicos compartidos por el atlas y el renderer de texto

pub mod color;

// headless wgpu context, only compiled when a GPU backend is wanted
#[cfg(feature = "gpu")]
pub mod context;

pub use color::Color;

// re-export glam so downstream crates agree on one version
pub use glam;
pub use glam::{IVec2, Vec2};
