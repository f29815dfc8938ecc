//! Texture stores own the atlas textures and hand out opaque handles.
//!
//! Glyph entries only keep a [`TextureHandle`]; whoever owns the store owns
//! the actual texture memory and decides when it is released.

use std::collections::HashMap;

use crate::error::UploadError;

/// Opaque id of an uploaded single-channel texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(u64);

impl TextureHandle {
    /// Wraps an id issued by some other texture owner.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

pub trait TextureStore {
    /// Uploads a tightly packed 8-bit single-channel image.
    fn create_r8(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureHandle, UploadError>;

    /// Releases a texture.  Unknown handles are ignored.
    fn destroy(&mut self, handle: TextureHandle);
}

fn check_upload(width: u32, height: u32, pixels: &[u8]) -> Result<(), UploadError> {
    if width == 0 || height == 0 {
        return Err(UploadError::ZeroSized { width, height });
    }
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(UploadError::SizeMismatch {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

/// CPU copy of an uploaded texture.
#[derive(Debug, Clone)]
pub struct MemoryTexture {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Keeps textures in host memory.  Used headless (atlas baking, tests).
#[derive(Debug, Default)]
pub struct MemoryTextureStore {
    next_id: u64,
    textures: HashMap<TextureHandle, MemoryTexture>,
    created: usize,
    destroyed: usize,
}

impl MemoryTextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&MemoryTexture> {
        self.textures.get(&handle)
    }

    /// Number of textures currently alive.
    pub fn live(&self) -> usize {
        self.textures.len()
    }

    /// Total textures ever created / destroyed by this store.
    pub fn created(&self) -> usize {
        self.created
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed
    }
}

impl TextureStore for MemoryTextureStore {
    fn create_r8(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureHandle, UploadError> {
        check_upload(width, height, pixels)?;
        self.next_id += 1;
        let handle = TextureHandle(self.next_id);
        self.textures.insert(
            handle,
            MemoryTexture {
                label: label.to_string(),
                width,
                height,
                pixels: pixels.to_vec(),
            },
        );
        self.created += 1;
        Ok(handle)
    }

    fn destroy(&mut self, handle: TextureHandle) {
        if self.textures.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }
}

#[cfg(feature = "gpu")]
pub mod gpu {
    //! `R8Unorm` atlas textures on a wgpu device.

    use std::collections::HashMap;
    use std::sync::Arc;

    use super::{check_upload, TextureHandle, TextureStore};
    use crate::error::UploadError;

    /// GPU side of an atlas: texture, default view and the linear
    /// clamp-to-edge sampler the SDF shader expects.
    pub struct GpuAtlasTexture {
        pub texture: wgpu::Texture,
        pub view: wgpu::TextureView,
        pub sampler: wgpu::Sampler,
        pub width: u32,
        pub height: u32,
    }

    pub struct GpuTextureStore {
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        next_id: u64,
        textures: HashMap<TextureHandle, GpuAtlasTexture>,
    }

    impl GpuTextureStore {
        pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
            Self {
                device,
                queue,
                next_id: 0,
                textures: HashMap::new(),
            }
        }

        pub fn get(&self, handle: TextureHandle) -> Option<&GpuAtlasTexture> {
            self.textures.get(&handle)
        }

        pub fn live(&self) -> usize {
            self.textures.len()
        }
    }

    impl TextureStore for GpuTextureStore {
        fn create_r8(
            &mut self,
            label: &str,
            width: u32,
            height: u32,
            pixels: &[u8],
        ) -> Result<TextureHandle, UploadError> {
            check_upload(width, height, pixels)?;
            let max = self.device.limits().max_texture_dimension_2d;
            if width > max || height > max {
                return Err(UploadError::TooLarge { width, height, max });
            }

            let size = wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            };
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::R8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            // one byte per texel, rows are tightly packed
            self.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(width),
                    rows_per_image: Some(height),
                },
                size,
            );

            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("SDF Atlas Sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            });

            self.next_id += 1;
            let handle = TextureHandle(self.next_id);
            self.textures.insert(
                handle,
                GpuAtlasTexture {
                    texture,
                    view,
                    sampler,
                    width,
                    height,
                },
            );
            log::debug!("uploaded atlas texture {label} ({width}x{height}) as {handle:?}");
            Ok(handle)
        }

        fn destroy(&mut self, handle: TextureHandle) {
            if let Some(atlas) = self.textures.remove(&handle) {
                atlas.texture.destroy();
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_tracks_lifetimes() {
        let mut store = MemoryTextureStore::new();
        let a = store.create_r8("a", 2, 2, &[1, 2, 3, 4]).unwrap();
        let b = store.create_r8("b", 1, 1, &[9]).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.live(), 2);
        assert_eq!(store.get(a).unwrap().pixels, vec![1, 2, 3, 4]);

        store.destroy(a);
        store.destroy(a);
        assert_eq!(store.live(), 1);
        assert_eq!(store.destroyed(), 1);
        assert_eq!(store.created(), 2);
    }

    #[test]
    fn memory_store_rejects_short_buffers() {
        let mut store = MemoryTextureStore::new();
        let err = store.create_r8("bad", 4, 4, &[0; 15]).unwrap_err();
        assert_eq!(
            err,
            UploadError::SizeMismatch {
                expected: 16,
                actual: 15
            }
        );
        assert_eq!(store.live(), 0);
    }

    #[test]
    fn zero_sized_textures_are_refused() {
        let mut store = MemoryTextureStore::new();
        assert_eq!(
            store.create_r8("flat", 0, 1024, &[]).unwrap_err(),
            UploadError::ZeroSized {
                width: 0,
                height: 1024
            }
        );
        assert_eq!(store.created(), 0);
    }
}
