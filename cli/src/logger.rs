use log::{Level, LevelFilter};
use std::io::Write;

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug | Level::Trace => "DEBUG",
    }
}

/// init sets up console logging with `LEVEL: message` lines on stdout. The level is debug or info
/// depending on the debug flag, RUST_LOG overrides it.
pub fn init(debug: bool) -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(if debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "{}: {}", level_label(record.level()), record.args()))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Could not set up logging: {}", e))
}
