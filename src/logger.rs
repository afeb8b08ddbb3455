use anyhow::Result;
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Logs go to stderr so stdout only carries the JSON response; `RUST_LOG` overrides the level.
pub fn init() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    Ok(())
}
