use std::collections::HashSet;

use sdf_font::{AtlasLoader, FontAtlas, LoadError, TextureStore};
use thiserror::Error;

use crate::batch::TextBatch;
use crate::layout::{layout_text, measure, GlyphNotFound};
use crate::style::{MissingGlyphPolicy, TextSpan, TextStyle};
use crate::uniforms::TextUniforms;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The glyph table was empty and one reload did not fill it.
    #[error("glyph table is empty at render time (reload attempted: {reload_attempted})")]
    EmptyTableAtRenderTime {
        reload_attempted: bool,
        #[source]
        cause: Option<LoadError>,
    },
}

/// Outcome of a successful render call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Quads pushed into the batch.
    pub drawn: usize,
    pub missing: Vec<GlyphNotFound>,
    /// The atlas was reloaded before drawing.
    pub reloaded: bool,
}

/// Owns a [`FontAtlas`] and lays text out against it.
///
/// If the atlas is empty when a render call starts the renderer asks its
/// [`AtlasLoader`] for a new one, once per call.
pub struct TextRenderer {
    atlas: FontAtlas,
    loader: Option<Box<dyn AtlasLoader>>,
    missing_policy: MissingGlyphPolicy,
    warned: HashSet<char>,
}

impl TextRenderer {
    pub fn new(atlas: FontAtlas) -> Self {
        Self {
            atlas,
            loader: None,
            missing_policy: MissingGlyphPolicy::default(),
            warned: HashSet::new(),
        }
    }

    /// Loads the first atlas through `loader` and keeps the loader for
    /// later reloads.  An overflowing atlas is kept with the glyphs that fit.
    pub fn load(mut loader: impl AtlasLoader + 'static, store: &mut dyn TextureStore) -> Result<Self, LoadError> {
        let atlas = match loader.load_atlas(store) {
            Ok(atlas) => atlas,
            Err(LoadError::AtlasOverflow {
                placed,
                first_unplaced,
                partial,
            }) => {
                log::warn!("atlas overflow at code {first_unplaced}, keeping {placed} glyphs");
                *partial
            }
            Err(err) => return Err(err),
        };
        Ok(Self::new(atlas).with_loader(loader))
    }

    pub fn with_loader(mut self, loader: impl AtlasLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    pub fn with_missing_glyph_policy(mut self, policy: MissingGlyphPolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    pub fn atlas(&self) -> &FontAtlas {
        &self.atlas
    }

    pub fn missing_glyph_policy(&self) -> MissingGlyphPolicy {
        self.missing_policy
    }

    /// Swaps in a new atlas and releases the old texture.
    pub fn replace_atlas(&mut self, atlas: FontAtlas, store: &mut dyn TextureStore) {
        let old = std::mem::replace(&mut self.atlas, atlas);
        old.release(store);
        self.warned.clear();
    }

    /// Releases the atlas texture.
    pub fn release(self, store: &mut dyn TextureStore) {
        self.atlas.release(store);
    }

    /// Advance width of `text` at `scale`.
    pub fn measure(&self, text: &str, scale: f32, style: &TextStyle) -> f32 {
        measure(self.atlas.table(), text, scale, style, self.missing_policy)
    }

    /// Lays `span` out and appends it to `batch` as one run.
    pub fn render(
        &mut self,
        store: &mut dyn TextureStore,
        batch: &mut TextBatch,
        span: &TextSpan<'_>,
    ) -> Result<RenderReport, RenderError> {
        let reloaded = self.ensure_loaded(store)?;
        let Some(texture) = self.atlas.texture() else {
            return Err(RenderError::EmptyTableAtRenderTime {
                reload_attempted: reloaded,
                cause: None,
            });
        };

        let layout = layout_text(self.atlas.table(), span, self.missing_policy);
        for miss in &layout.missing {
            if self.warned.insert(miss.ch) {
                log::warn!("character {:?} not found in SDF atlas", miss.ch);
            } else {
                log::debug!("character {:?} not found in SDF atlas", miss.ch);
            }
        }

        let drawn = layout.quads.len();
        if drawn == 0 && span.text.chars().any(|c| !c.is_whitespace()) {
            log::warn!("no characters rendered for {:?}", span.text);
        } else {
            log::debug!("rendered {drawn} glyphs for {:?}", span.text);
        }

        batch.push_run(texture, TextUniforms::new(span.color, &span.style), layout.quads);
        Ok(RenderReport {
            drawn,
            missing: layout.missing,
            reloaded,
        })
    }

    /// Reloads once if the table is empty.  Returns whether a reload ran.
    fn ensure_loaded(&mut self, store: &mut dyn TextureStore) -> Result<bool, RenderError> {
        if !self.atlas.is_empty() {
            return Ok(false);
        }
        log::warn!("SDF glyph table is empty, reloading font");
        let Some(loader) = self.loader.as_mut() else {
            log::error!("SDF glyph table is empty and no font loader is set");
            return Err(RenderError::EmptyTableAtRenderTime {
                reload_attempted: false,
                cause: None,
            });
        };

        let settings = *self.atlas.settings();
        let old = std::mem::replace(&mut self.atlas, FontAtlas::empty(settings));
        old.release(store);
        self.warned.clear();

        let mut cause = None;
        match loader.load_atlas(store) {
            Ok(atlas) => self.atlas = atlas,
            Err(LoadError::AtlasOverflow {
                placed,
                first_unplaced,
                partial,
            }) => {
                log::error!("atlas overflow during reload at code {first_unplaced}, {placed} glyphs kept");
                self.atlas = *partial;
            }
            Err(err) => {
                log::error!("font reload failed: {err}");
                cause = Some(err);
            }
        }

        if self.atlas.is_empty() {
            return Err(RenderError::EmptyTableAtRenderTime {
                reload_attempted: true,
                cause,
            });
        }
        log::info!("font reloaded, {} glyphs", self.atlas.table().len());
        Ok(true)
    }
}
