// Author: Dustin Pilgrim
// License: MIT

use std::collections::HashMap;

/// The two environment variables a process contributes to display probing.
pub const DISPLAY_VAR: &str = "DISPLAY";
pub const XAUTHORITY_VAR: &str = "XAUTHORITY";

/// A process as observed inside a session's scope.
///
/// The environment is restricted to `DISPLAY` and `XAUTHORITY` at the
/// adapter boundary; nothing else is ever consulted.
#[derive(Debug, Clone, Eq)]
pub struct Process {
    pub pid: i32,
    pub cmdline: String,
    pub environ: HashMap<String, String>,
}

impl Process {
    pub fn display(&self) -> Option<&str> {
        self.environ.get(DISPLAY_VAR).map(String::as_str)
    }

    pub fn xauthority(&self) -> Option<&str> {
        self.environ.get(XAUTHORITY_VAR).map(String::as_str)
    }
}

// Identity is the pid alone; two observations of the same pid are the
// same process even if one of them saw a stale cmdline.
impl PartialEq for Process {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid
    }
}

impl std::hash::Hash for Process {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.pid.hash(state);
    }
}
