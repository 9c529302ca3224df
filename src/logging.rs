// Author: Dustin Pilgrim
// License: MIT

use std::path::PathBuf;

/// Initialize eventline once, before anything can log.
///
/// Console output is always on; this program runs from a timer and the
/// journal picks the console up. File output under the cache dir is best
/// effort.
pub fn init(verbose: bool) {
    futures_executor::block_on(eventline::runtime::init());

    eventline::runtime::enable_console_output(true);
    eventline::runtime::enable_console_color(true);
    set_verbose(verbose);

    let path = log_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(err) = eventline::runtime::enable_file_output(&path) {
        eventline::warn!("could not enable file logging at {}: {}", path.display(), err);
    }
}

/// Raise or restore the log level. Called again once the config file has
/// had its say.
pub fn set_verbose(verbose: bool) {
    if verbose {
        eventline::runtime::set_log_level(eventline::runtime::LogLevel::Debug);
    } else {
        eventline::runtime::set_log_level(eventline::runtime::LogLevel::Info);
    }
}

fn log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("stop-idle-sessions")
        .join("stop-idle-sessions.log")
}
