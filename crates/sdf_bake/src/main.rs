//! `sdf_bake [config.toml]`
//!
//! Loads a font into an SDF atlas, writes the atlas as a grayscale PNG and
//! renders the configured preview lines on the CPU.  Without an argument
//! `sdf_bake.toml` in the working directory is used if present.

mod bake;
mod config;
mod logging;

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::BakeConfig;

const DEFAULT_CONFIG: &str = "sdf_bake.toml";

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| Path::new(DEFAULT_CONFIG).exists().then(|| PathBuf::from(DEFAULT_CONFIG)));
    let config = match &config_path {
        Some(path) => BakeConfig::load(path)?,
        None => BakeConfig::default(),
    };

    let env_level = std::env::var("RUST_LOG").ok();
    logging::init(logging::effective_level(&config.log.level, env_level.as_deref()))
        .context("failed to install logger")?;
    match &config_path {
        Some(path) => log::info!("using config {}", path.display()),
        None => log::info!("no config given, using defaults"),
    }

    let summary = bake::bake(&config)?;
    log::info!(
        "done: {} glyphs placed, {} skipped, {} drawn, {} missing{}",
        summary.placed,
        summary.skipped,
        summary.drawn,
        summary.missing,
        if summary.overflowed { " (atlas overflowed)" } else { "" }
    );
    Ok(())
}
