//! Signed-distance-field glyph atlas generation.
//!
//! The pipeline runs once per font load:
//!
//! ```text
//! font file ─► GlyphRasterizer ─► GlyphBitmap ─► DistanceField
//!           ─► AtlasPacker ─► TextureStore ─► GlyphTable (inside FontAtlas)
//! ```
//!
//! Everything except [`texture::gpu`] is plain CPU code, so the whole load
//! path can be exercised with a synthetic rasterizer and a
//! [`MemoryTextureStore`].

pub mod atlas;
pub mod bitmap;
pub mod distance_field;
pub mod error;
pub mod packer;
pub mod rasterizer;
pub mod table;
pub mod texture;

pub use atlas::{AtlasLoader, AtlasSettings, FontAtlas, FontSource, LoadReport};
pub use bitmap::GlyphBitmap;
pub use distance_field::DistanceField;
pub use error::{GlyphRasterFailed, LoadError, RasterError, UploadError};
pub use packer::{AtlasFull, AtlasPacker, AtlasRegion, PackedAtlas, UvRect};
pub use rasterizer::{FontdueRasterizer, GlyphRasterizer, RasterGlyph};
pub use table::{GlyphEntry, GlyphTable, CHAR_RANGE, END_CODE, FIRST_CODE};
pub use texture::{MemoryTexture, MemoryTextureStore, TextureHandle, TextureStore};

#[cfg(feature = "gpu")]
pub use texture::gpu::{GpuAtlasTexture, GpuTextureStore};
