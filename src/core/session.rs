// Author: Dustin Pilgrim
// License: MIT

use std::path::PathBuf;

use chrono::{DateTime, Local, TimeDelta};

use crate::core::process::Process;

/// The session type logind reports for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKind {
    Tty,
    X11,
    Wayland,
    Mir,
    Unspecified,
    Other(String),
}

impl SessionKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "tty" => SessionKind::Tty,
            "x11" => SessionKind::X11,
            "wayland" => SessionKind::Wayland,
            "mir" => SessionKind::Mir,
            "unspecified" => SessionKind::Unspecified,
            other => SessionKind::Other(other.to_string()),
        }
    }

    /// Graphical seats bring their own screensaver and are never enforced.
    pub fn is_graphical(&self) -> bool {
        matches!(self, SessionKind::X11 | SessionKind::Wayland | SessionKind::Mir)
    }
}

/// A session as logind describes it, before any cross-referencing.
#[derive(Debug, Clone)]
pub struct LogindSession {
    /// Opaque session id, e.g. "7" or "c1".
    pub id: String,
    pub uid: u32,
    pub kind: SessionKind,
    /// Assigned terminal relative to /dev, empty when there is none.
    pub tty: String,
    /// Session leader pid; 0 means the leader already exited ("lingering").
    pub leader: i32,
    /// Scope unit name, e.g. "session-7.scope".
    pub scope: String,
    /// Absolute cgroup hierarchy path of the scope.
    pub scope_path: PathBuf,
}

/// A terminal device with its activity timestamps captured at open time.
///
/// Holds no kernel resources; it merely remembers what the probe saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    /// Device name relative to /dev, e.g. "pts/3" or "tty1".
    pub name: String,
    /// Touched by keyboard input.
    pub atime: DateTime<Local>,
    /// Touched by keyboard input and by program output.
    pub mtime: DateTime<Local>,
}

/// A process inside a session, with its tunnel edges.
#[derive(Debug, Clone, Eq)]
pub struct SessionProcess {
    pub process: Process,
    /// Pids of server-side loopback peers this process is a client of.
    pub tunnel_backends: Vec<i32>,
    /// Arena indices of the sessions those backends belong to.
    /// Empty until the second build pass; may reference the containing
    /// session itself.
    pub backend_sessions: Vec<usize>,
}

impl PartialEq for SessionProcess {
    fn eq(&self, other: &Self) -> bool {
        self.process.pid == other.process.pid
    }
}

/// A fully cross-referenced login session.
#[derive(Debug, Clone)]
pub struct Session {
    pub logind: LogindSession,
    pub username: String,
    pub tty: Option<Terminal>,
    /// Representative graphical display, e.g. ":1".
    pub display: Option<String>,
    /// Idle duration the display's screen saver reported.
    pub display_idle: Option<TimeDelta>,
    pub processes: Vec<SessionProcess>,
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.logind.id == other.logind.id
    }
}

impl Session {
    /// The tty name for log lines, with a placeholder when unassigned.
    pub fn tty_label(&self) -> &str {
        self.tty.as_ref().map(|t| t.name.as_str()).unwrap_or("notty")
    }
}

/// The arena every session lives in for one evaluation pass.
///
/// Tunnel edges are arena indices, so cyclic session relationships (a
/// session tunneling into itself included) are just numbers, not owning
/// references.
#[derive(Debug, Clone, Default)]
pub struct SessionGraph {
    pub sessions: Vec<Session>,
}
