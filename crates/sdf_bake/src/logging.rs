use std::str::FromStr;
use std::time::Instant;

use log::LevelFilter;

/// Parses a level name, falling back to `Info` for unknown names.
pub fn parse_level(name: &str) -> LevelFilter {
    LevelFilter::from_str(name.trim()).unwrap_or(LevelFilter::Info)
}

/// Level from `RUST_LOG` when it names a plain level, else `configured`.
pub fn effective_level(configured: &str, env: Option<&str>) -> LevelFilter {
    env.and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .unwrap_or_else(|| parse_level(configured))
}

/// Installs the global logger: `[   0.012s INFO  sdf_font::atlas] msg` on
/// stdout.  Timestamps are seconds since startup.
pub fn init(level: LevelFilter) -> anyhow::Result<()> {
    let start = Instant::now();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{:>8.3}s {:<5} {}] {}",
                start.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_config() {
        assert_eq!(effective_level("info", Some("debug")), LevelFilter::Debug);
        assert_eq!(effective_level("warn", None), LevelFilter::Warn);
        assert_eq!(effective_level("warn", Some("sdf_font=trace")), LevelFilter::Warn);
        assert_eq!(parse_level("nonsense"), LevelFilter::Info);
        assert_eq!(parse_level(" ERROR "), LevelFilter::Error);
    }
}
