// Author: Dustin Pilgrim
// License: MIT

//! Processes of a session scope, read from the cgroup hierarchy.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core::error::Error;
use crate::core::process::{DISPLAY_VAR, Process, XAUTHORITY_VAR};
use crate::core::sources::ProcessSource;

/// Walks `<scope>/cgroup.procs` and fills in each pid from procfs.
pub struct CgroupProcessSource;

impl ProcessSource for CgroupProcessSource {
    fn in_scope(&self, scope_path: &Path) -> Result<Vec<Process>, Error> {
        let procs_file = scope_path.join("cgroup.procs");
        let listing = fs::read_to_string(&procs_file).map_err(|err| {
            Error::SessionParse(format!(
                "could not read {}: {err}",
                procs_file.display()
            ))
        })?;

        let mut processes = Vec::new();
        for line in listing.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let pid: i32 = line.parse().map_err(|_| {
                Error::SessionParse(format!(
                    "unparseable pid {line:?} in {}",
                    procs_file.display()
                ))
            })?;

            // Pids listed a moment ago may be gone by now.
            if let Some(process) = read_process(pid) {
                processes.push(process);
            }
        }

        Ok(processes)
    }
}

fn read_process(pid: i32) -> Option<Process> {
    let handle = procfs::process::Process::new(pid).ok()?;

    let cmdline = handle.cmdline().ok()?.join(" ");

    // Kernel threads and privileged processes can refuse the environ
    // read; they just contribute no display candidates.
    let environ = match handle.environ() {
        Ok(environ) => restrict_environ(environ),
        Err(err) => {
            eventline::debug!("procs: could not read environ of pid {}: {}", pid, err);
            HashMap::new()
        }
    };

    Some(Process { pid, cmdline, environ })
}

fn restrict_environ(
    environ: HashMap<std::ffi::OsString, std::ffi::OsString>,
) -> HashMap<String, String> {
    let mut restricted = HashMap::new();
    for key in [DISPLAY_VAR, XAUTHORITY_VAR] {
        if let Some(value) = environ.get(std::ffi::OsStr::new(key)) {
            if let Some(value) = value.to_str() {
                restricted.insert(key.to_string(), value.to_string());
            }
        }
    }
    restricted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn environ_is_restricted_to_the_display_variables() {
        let environ: HashMap<OsString, OsString> = [
            ("DISPLAY", ":1"),
            ("XAUTHORITY", "/u/.Xauthority"),
            ("HOME", "/u"),
            ("SSH_TTY", "/dev/pts/3"),
        ]
        .iter()
        .map(|(k, v)| (OsString::from(k), OsString::from(v)))
        .collect();

        let restricted = restrict_environ(environ);

        assert_eq!(restricted.len(), 2);
        assert_eq!(restricted.get("DISPLAY").map(String::as_str), Some(":1"));
        assert_eq!(
            restricted.get("XAUTHORITY").map(String::as_str),
            Some("/u/.Xauthority")
        );
    }
}
