// Author: Dustin Pilgrim
// License: MIT

//! The narrow contracts the platform has to satisfy.
//!
//! Everything the graph builder and the enforcer know about the host comes
//! through these traits; the real implementations live under
//! `crate::services`, the test ones under `crate::core::mock`.

use chrono::{DateTime, Local};

use crate::core::error::Error;
use crate::core::net::SocketSnapshot;
use crate::core::process::Process;
use crate::core::session::{LogindSession, Terminal};

/// The session manager: enumeration plus the one side effect this program
/// ever performs.
pub trait SessionSource {
    fn list(&self) -> Result<Vec<LogindSession>, Error>;

    /// Ask the session manager to terminate the session's leader process.
    ///
    /// Idempotent: a leader that already exited is not an error.
    fn terminate_leader(&self, session_id: &str) -> Result<(), Error>;
}

/// One sweep of the host's TCP table.
pub trait SocketSource {
    fn snapshot(&self) -> Result<SocketSnapshot, Error>;
}

/// Processes inside a control-group scope.
pub trait ProcessSource {
    /// Processes that exit between enumeration and read are silently
    /// omitted; environments are restricted to DISPLAY and XAUTHORITY.
    fn in_scope(&self, scope_path: &std::path::Path) -> Result<Vec<Process>, Error>;
}

/// uid to symbolic username.
pub trait UserDirectory {
    fn uid_to_name(&self, uid: u32) -> Result<String, Error>;
}

/// Terminal device nodes under /dev.
pub trait TerminalProbe {
    fn open(&self, tty: &str) -> Result<Terminal, Error>;

    /// Set the device's atime. Only exercised by the `touch-atime` feature.
    fn set_atime(&self, tty: &str, when: DateTime<Local>) -> Result<(), Error>;
}

/// The X11 Screen Saver extension on a given display.
pub trait DisplayProbe {
    /// Milliseconds since the display last saw user input.
    fn idle_ms(&self, display: &str, xauthority: &str) -> Result<u64, Error>;
}

/// The full set of adapters one evaluation pass runs against.
pub struct Platform<'a> {
    pub sessions: &'a dyn SessionSource,
    pub sockets: &'a dyn SocketSource,
    pub processes: &'a dyn ProcessSource,
    pub users: &'a dyn UserDirectory,
    pub terminals: &'a dyn TerminalProbe,
    pub displays: &'a dyn DisplayProbe,
}
