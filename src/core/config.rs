// Author: Dustin Pilgrim
// License: MIT

/// Effective settings for one enforcement pass, after the config file and
/// the command line have been merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Log what would happen, terminate nothing.
    pub dry_run: bool,
    /// Raise logging to debug.
    pub verbose: bool,
    /// Users whose sessions are never enforced.
    pub excluded_users: Vec<String>,
    /// Idleness threshold in minutes.
    pub timeout_minutes: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dry_run: false,
            verbose: false,
            excluded_users: Vec::new(),
            timeout_minutes: 15,
        }
    }
}
