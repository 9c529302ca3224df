// Author: Dustin Pilgrim
// License: MIT

//! Terminal device nodes under /dev.

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use filetime::FileTime;

use crate::core::error::Error;
use crate::core::session::Terminal;
use crate::core::sources::TerminalProbe;

/// Stats `/dev/<tty>` for its activity timestamps.
pub struct DevTerminalProbe;

impl TerminalProbe for DevTerminalProbe {
    fn open(&self, tty: &str) -> Result<Terminal, Error> {
        let path = device_path(tty);
        let metadata = fs::metadata(&path)
            .map_err(|err| Error::Terminal(format!("{}: {err}", path.display())))?;

        let atime = metadata
            .accessed()
            .map_err(|err| Error::Terminal(format!("{}: {err}", path.display())))?;
        let mtime = metadata
            .modified()
            .map_err(|err| Error::Terminal(format!("{}: {err}", path.display())))?;

        Ok(Terminal {
            name: tty.to_string(),
            atime: DateTime::<Local>::from(atime),
            mtime: DateTime::<Local>::from(mtime),
        })
    }

    fn set_atime(&self, tty: &str, when: DateTime<Local>) -> Result<(), Error> {
        let path = device_path(tty);
        let when = FileTime::from_system_time(SystemTime::from(when));
        filetime::set_file_atime(&path, when)
            .map_err(|err| Error::Terminal(format!("{}: {err}", path.display())))
    }
}

fn device_path(tty: &str) -> PathBuf {
    PathBuf::from("/dev").join(tty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_paths_resolve_under_dev() {
        assert_eq!(device_path("pts/3"), PathBuf::from("/dev/pts/3"));
        assert_eq!(device_path("tty1"), PathBuf::from("/dev/tty1"));
    }

    #[test]
    fn a_missing_device_is_a_terminal_error() {
        let err = DevTerminalProbe.open("pts/no-such-terminal").unwrap_err();
        assert!(matches!(err, Error::Terminal(_)));
    }
}
