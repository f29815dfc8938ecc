use std::path::Path;

use anyhow::Context;
use sdf_core::Color;
use sdf_font::{
    AtlasLoader, DistanceField, FontSource, LoadReport, MemoryTexture, MemoryTextureStore,
};
use sdf_text::{SoftwareTarget, TextBatch, TextRenderer, TextSpan};

use crate::config::BakeConfig;

/// What a bake produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BakeSummary {
    pub placed: usize,
    pub skipped: usize,
    pub overflowed: bool,
    pub drawn: usize,
    pub missing: usize,
}

/// Bakes the font named in `cfg`.
pub fn bake(cfg: &BakeConfig) -> anyhow::Result<BakeSummary> {
    let source = FontSource::new(&cfg.font.path, cfg.atlas_settings());
    bake_with(cfg, source)
}

/// Bakes with an arbitrary atlas loader: loads the atlas, lays out the
/// preview lines, then writes whichever outputs are configured.
pub fn bake_with(cfg: &BakeConfig, loader: impl AtlasLoader + 'static) -> anyhow::Result<BakeSummary> {
    let mut store = MemoryTextureStore::new();
    let mut renderer = TextRenderer::load(loader, &mut store)
        .with_context(|| format!("failed to load font {}", cfg.font.path.display()))?
        .with_missing_glyph_policy(cfg.render.missing_glyph_policy());

    let report = renderer.atlas().report().clone();
    log_report(&report);

    let mut summary = BakeSummary {
        placed: report.placed,
        skipped: report.skipped.len(),
        overflowed: report.overflowed(),
        ..BakeSummary::default()
    };

    let mut batch = TextBatch::new();
    for line in &cfg.preview.lines {
        let span = TextSpan::new(&line.text, line.origin())
            .with_scale(line.scale)
            .with_color(line.color())
            .with_style(line.style(&cfg.render));
        let rendered = renderer
            .render(&mut store, &mut batch, &span)
            .with_context(|| format!("failed to lay out {:?}", line.text))?;
        summary.drawn += rendered.drawn;
        summary.missing += rendered.missing.len();
    }

    let texture = renderer
        .atlas()
        .texture()
        .and_then(|handle| store.get(handle))
        .context("atlas texture missing after load")?;

    dump_glyphs(&renderer, texture, &cfg.atlas.dump_glyphs);

    if let Some(path) = &cfg.atlas.output {
        export_atlas(texture, path)?;
        log::info!("atlas written to {}", path.display());
    }

    if let Some(path) = &cfg.preview.output {
        let preview = &cfg.preview;
        let mut target = SoftwareTarget::new(preview.width, preview.height, Color::from(preview.background));
        let drawn = target.draw_batch(&batch, texture);
        image::save_buffer(
            path,
            &target.to_rgba8(),
            preview.width,
            preview.height,
            image::ColorType::Rgba8,
        )
        .with_context(|| format!("failed to write preview {}", path.display()))?;
        log::info!("preview with {drawn} glyphs written to {}", path.display());
    }

    renderer.release(&mut store);
    Ok(summary)
}

fn log_report(report: &LoadReport) {
    log::info!("{} glyphs placed ({} blank)", report.placed, report.blank);
    for skipped in &report.skipped {
        log::warn!("{skipped}");
    }
    if let Some(code) = report.first_unplaced {
        log::error!(
            "atlas full at code {code}, {} glyphs missing",
            report.unplaced().count()
        );
    }
}

fn dump_glyphs(renderer: &TextRenderer, texture: &MemoryTexture, glyphs: &str) {
    let spread = renderer.atlas().settings().spread;
    for ch in glyphs.chars() {
        let Some(entry) = renderer.atlas().glyph(ch) else {
            log::warn!("cannot dump {ch:?}: not in atlas");
            continue;
        };
        match DistanceField::from_region(&texture.pixels, texture.width, entry.region, spread) {
            Some(field) => log::debug!("{ch:?} {}x{}:\n{}", field.width(), field.height(), field.to_ascii()),
            None => log::debug!("{ch:?} is blank"),
        }
    }
}

/// Writes the atlas as an 8-bit grayscale PNG.
pub fn export_atlas(texture: &MemoryTexture, path: &Path) -> anyhow::Result<()> {
    image::save_buffer(
        path,
        &texture.pixels,
        texture.width,
        texture.height,
        image::ColorType::L8,
    )
    .with_context(|| format!("failed to write atlas {}", path.display()))
}
