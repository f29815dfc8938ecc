//! Font loading: rasterize → distance field → pack → upload → glyph table.

use std::path::{Path, PathBuf};

use glam::IVec2;

use crate::distance_field::DistanceField;
use crate::error::{GlyphRasterFailed, LoadError};
use crate::packer::{AtlasPacker, AtlasRegion};
use crate::rasterizer::{FontdueRasterizer, GlyphRasterizer};
use crate::table::{GlyphEntry, GlyphTable, CHAR_RANGE, END_CODE};
use crate::texture::{TextureHandle, TextureStore};

pub const ATLAS_LABEL: &str = "SDF Font Atlas";

/// Parameters of one atlas build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasSettings {
    /// Rasterization size in pixels.
    pub pixel_size: u32,
    /// Distance-field padding / search radius in texels.
    pub spread: u32,
    pub atlas_width: u32,
    pub atlas_height: u32,
}

impl Default for AtlasSettings {
    fn default() -> Self {
        Self {
            pixel_size: 48,
            spread: 6,
            atlas_width: 1024,
            atlas_height: 1024,
        }
    }
}

impl AtlasSettings {
    pub fn with_pixel_size(mut self, pixel_size: u32) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    pub fn with_spread(mut self, spread: u32) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_atlas_size(mut self, width: u32, height: u32) -> Self {
        self.atlas_width = width;
        self.atlas_height = height;
        self
    }
}

/// Diagnostics gathered during one load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Glyphs with an atlas region (blank glyphs included).
    pub placed: usize,
    /// Placed glyphs with no bitmap (space and friends).
    pub blank: usize,
    pub skipped: Vec<GlyphRasterFailed>,
    /// First code that did not fit; everything from here to 127 is absent.
    pub first_unplaced: Option<u8>,
}

impl LoadReport {
    pub fn overflowed(&self) -> bool {
        self.first_unplaced.is_some()
    }

    /// Codes dropped because the atlas filled up.
    pub fn unplaced(&self) -> impl Iterator<Item = u8> {
        self.first_unplaced.into_iter().flat_map(|first| first..END_CODE)
    }
}

/// A loaded font: glyph table plus the one atlas texture every entry
/// points at.
///
/// The texture lives in whichever [`TextureStore`] built the atlas.  Call
/// [`FontAtlas::release`] with that store when the atlas is replaced or torn
/// down; dropping a `FontAtlas` does not free GPU memory.
#[derive(Debug)]
pub struct FontAtlas {
    table: GlyphTable,
    texture: Option<TextureHandle>,
    settings: AtlasSettings,
    report: LoadReport,
}

impl FontAtlas {
    /// An atlas with no glyphs and no texture.  Renderers start from this
    /// until the first successful load.
    pub fn empty(settings: AtlasSettings) -> Self {
        Self {
            table: GlyphTable::new(),
            texture: None,
            settings,
            report: LoadReport::default(),
        }
    }

    /// Loads the printable ASCII range of a font file with the default
    /// 1024×1024 atlas.
    pub fn load(
        path: impl AsRef<Path>,
        pixel_size: u32,
        spread: u32,
        store: &mut dyn TextureStore,
    ) -> Result<Self, LoadError> {
        let settings = AtlasSettings::default()
            .with_pixel_size(pixel_size)
            .with_spread(spread);
        Self::load_with(path, settings, store)
    }

    pub fn load_with(
        path: impl AsRef<Path>,
        settings: AtlasSettings,
        store: &mut dyn TextureStore,
    ) -> Result<Self, LoadError> {
        let path = path.as_ref();
        log::info!("loading SDF font {} at {}px", path.display(), settings.pixel_size);
        let mut rasterizer = match FontdueRasterizer::open(path, settings.pixel_size) {
            Ok(r) => r,
            Err(e) => {
                log::error!("{e}");
                return Err(e);
            }
        };
        Self::build(&mut rasterizer, settings, store)
    }

    /// Runs the full pipeline over codes 32..128 with any rasterizer.
    ///
    /// Per-glyph raster failures are logged and recorded in the report.
    /// Running out of atlas space returns [`LoadError::AtlasOverflow`] with
    /// the partial atlas attached.
    pub fn build(
        rasterizer: &mut dyn GlyphRasterizer,
        settings: AtlasSettings,
        store: &mut dyn TextureStore,
    ) -> Result<Self, LoadError> {
        let AtlasSettings {
            spread,
            atlas_width,
            atlas_height,
            ..
        } = settings;

        let mut packer = AtlasPacker::new(atlas_width, atlas_height);
        let mut report = LoadReport::default();
        let mut pending: Vec<(u8, IVec2, i32, AtlasRegion)> = Vec::with_capacity(CHAR_RANGE.len());

        for code in CHAR_RANGE {
            let glyph = match rasterizer.rasterize(code) {
                Ok(glyph) => glyph,
                Err(reason) => {
                    let failure = GlyphRasterFailed::new(code, reason);
                    log::warn!("{failure}");
                    report.skipped.push(failure);
                    continue;
                }
            };

            let field = DistanceField::generate(&glyph.bitmap, spread);
            match &field {
                Some(f) => log::debug!(
                    "glyph {:?}: {}x{} bitmap -> {}x{} field",
                    code as char,
                    glyph.bitmap.width(),
                    glyph.bitmap.height(),
                    f.width(),
                    f.height()
                ),
                None => report.blank += 1,
            }

            match packer.insert(code, field.as_ref()) {
                Ok(region) => pending.push((code, glyph.bearing, glyph.advance, region)),
                Err(full) => {
                    log::error!("{full}; remaining glyphs will render as missing");
                    report.first_unplaced = Some(full.code);
                    break;
                }
            }
        }

        let packed = packer.finish();
        let texture = store.create_r8(ATLAS_LABEL, packed.width, packed.height, &packed.pixels)?;

        let mut table = GlyphTable::new();
        for (code, bearing, advance, region) in pending {
            table.insert(
                code,
                GlyphEntry {
                    texture,
                    size: IVec2::new(region.width as i32, region.height as i32),
                    bearing,
                    advance,
                    region,
                    uv: region.uv(packed.width, packed.height),
                },
            );
        }
        report.placed = table.len();

        log::info!(
            "SDF atlas ready: {} glyphs ({} blank, {} skipped) in {}x{}",
            report.placed,
            report.blank,
            report.skipped.len(),
            atlas_width,
            atlas_height
        );

        let atlas = Self {
            table,
            texture: Some(texture),
            settings,
            report,
        };

        match atlas.report.first_unplaced {
            Some(first_unplaced) => Err(LoadError::AtlasOverflow {
                placed: atlas.report.placed,
                first_unplaced,
                partial: Box::new(atlas),
            }),
            None => Ok(atlas),
        }
    }

    /// Frees the atlas texture.  Consumes the atlas so the handle cannot be
    /// used afterwards.
    pub fn release(self, store: &mut dyn TextureStore) {
        if let Some(texture) = self.texture {
            log::debug!("releasing atlas texture {texture:?}");
            store.destroy(texture);
        }
    }

    pub fn table(&self) -> &GlyphTable {
        &self.table
    }

    pub fn glyph(&self, ch: char) -> Option<&GlyphEntry> {
        self.table.get_char(ch)
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn settings(&self) -> &AtlasSettings {
        &self.settings
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Something that can (re)build a [`FontAtlas`] on demand.  The text
/// renderer keeps one around to recover from an empty table.
pub trait AtlasLoader {
    fn load_atlas(&mut self, store: &mut dyn TextureStore) -> Result<FontAtlas, LoadError>;
}

impl<F> AtlasLoader for F
where
    F: FnMut(&mut dyn TextureStore) -> Result<FontAtlas, LoadError>,
{
    fn load_atlas(&mut self, store: &mut dyn TextureStore) -> Result<FontAtlas, LoadError> {
        self(store)
    }
}

/// A font file plus the settings to bake it with.
#[derive(Debug, Clone)]
pub struct FontSource {
    pub path: PathBuf,
    pub settings: AtlasSettings,
}

impl FontSource {
    pub fn new(path: impl Into<PathBuf>, settings: AtlasSettings) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }
}

impl AtlasLoader for FontSource {
    fn load_atlas(&mut self, store: &mut dyn TextureStore) -> Result<FontAtlas, LoadError> {
        FontAtlas::load_with(&self.path, self.settings, store)
    }
}
