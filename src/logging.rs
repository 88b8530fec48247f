//! Log output for programs built on this crate.
//!
//! The library itself only emits `debug` and `trace` records through the
//! [`log`] facade. Hosts that want them on stderr can call [`init`] once.

use log::LevelFilter;

/// Installs a stderr logger with local timestamps.
///
/// Fails if a logger has already been installed.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}
