// Author: Dustin Pilgrim
// License: MIT

//! In-memory adapter implementations for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::core::error::Error;
use crate::core::net::SocketSnapshot;
use crate::core::process::Process;
use crate::core::session::{LogindSession, SessionKind, Terminal};
use crate::core::sources::{
    DisplayProbe, ProcessSource, SessionSource, SocketSource, TerminalProbe, UserDirectory,
};

pub fn process(pid: i32, cmdline: &str, environ: &[(&str, &str)]) -> Process {
    Process {
        pid,
        cmdline: cmdline.to_string(),
        environ: environ
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

pub fn logind_session(id: &str, uid: u32, kind: SessionKind, tty: &str, leader: i32) -> LogindSession {
    LogindSession {
        id: id.to_string(),
        uid,
        kind,
        tty: tty.to_string(),
        leader,
        scope: format!("session-{id}.scope"),
        scope_path: PathBuf::from(format!(
            "/sys/fs/cgroup/user.slice/user-{uid}.slice/session-{id}.scope"
        )),
    }
}

#[derive(Default)]
pub struct FakeSessions {
    pub records: Vec<LogindSession>,
    pub fail_listing: bool,
    pub terminated: RefCell<Vec<String>>,
}

impl SessionSource for FakeSessions {
    fn list(&self) -> Result<Vec<LogindSession>, Error> {
        if self.fail_listing {
            return Err(Error::SessionEnumeration("bus unreachable".into()));
        }
        Ok(self.records.clone())
    }

    fn terminate_leader(&self, session_id: &str) -> Result<(), Error> {
        self.terminated.borrow_mut().push(session_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSockets {
    pub snapshot: SocketSnapshot,
    pub fail: bool,
}

impl SocketSource for FakeSockets {
    fn snapshot(&self) -> Result<SocketSnapshot, Error> {
        if self.fail {
            return Err(Error::SocketTable("garbled table".into()));
        }
        Ok(self.snapshot.clone())
    }
}

#[derive(Default)]
pub struct FakeProcesses {
    pub by_scope: HashMap<PathBuf, Vec<Process>>,
    pub fail_scopes: Vec<PathBuf>,
}

impl ProcessSource for FakeProcesses {
    fn in_scope(&self, scope_path: &Path) -> Result<Vec<Process>, Error> {
        if self.fail_scopes.iter().any(|p| p == scope_path) {
            return Err(Error::SessionParse(format!(
                "could not read processes under {}",
                scope_path.display()
            )));
        }
        Ok(self.by_scope.get(scope_path).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeUsers {
    pub names: HashMap<u32, String>,
    pub lookups: RefCell<Vec<u32>>,
}

impl FakeUsers {
    pub fn with(names: &[(u32, &str)]) -> Self {
        Self {
            names: names.iter().map(|(u, n)| (*u, n.to_string())).collect(),
            lookups: RefCell::new(Vec::new()),
        }
    }
}

impl UserDirectory for FakeUsers {
    fn uid_to_name(&self, uid: u32) -> Result<String, Error> {
        self.lookups.borrow_mut().push(uid);
        self.names
            .get(&uid)
            .cloned()
            .ok_or_else(|| Error::UserLookup(format!("uid {uid}")))
    }
}

#[derive(Default)]
pub struct FakeTerminals {
    pub by_name: HashMap<String, (DateTime<Local>, DateTime<Local>)>,
    pub atime_sets: RefCell<Vec<(String, DateTime<Local>)>>,
    pub fail_atime_sets: bool,
}

impl FakeTerminals {
    pub fn with(entries: &[(&str, DateTime<Local>, DateTime<Local>)]) -> Self {
        Self {
            by_name: entries
                .iter()
                .map(|(n, a, m)| (n.to_string(), (*a, *m)))
                .collect(),
            atime_sets: RefCell::new(Vec::new()),
            fail_atime_sets: false,
        }
    }
}

impl TerminalProbe for FakeTerminals {
    fn open(&self, tty: &str) -> Result<Terminal, Error> {
        let (atime, mtime) = self
            .by_name
            .get(tty)
            .copied()
            .ok_or_else(|| Error::Terminal(format!("/dev/{tty}")))?;
        Ok(Terminal { name: tty.to_string(), atime, mtime })
    }

    fn set_atime(&self, tty: &str, when: DateTime<Local>) -> Result<(), Error> {
        if self.fail_atime_sets {
            return Err(Error::Terminal(format!("/dev/{tty}: read-only")));
        }
        self.atime_sets.borrow_mut().push((tty.to_string(), when));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeDisplays {
    pub idle_ms: HashMap<(String, String), u64>,
    pub queries: RefCell<Vec<(String, String)>>,
}

impl FakeDisplays {
    pub fn with(entries: &[(&str, &str, u64)]) -> Self {
        Self {
            idle_ms: entries
                .iter()
                .map(|(d, x, ms)| ((d.to_string(), x.to_string()), *ms))
                .collect(),
            queries: RefCell::new(Vec::new()),
        }
    }
}

impl DisplayProbe for FakeDisplays {
    fn idle_ms(&self, display: &str, xauthority: &str) -> Result<u64, Error> {
        self.queries
            .borrow_mut()
            .push((display.to_string(), xauthority.to_string()));
        self.idle_ms
            .get(&(display.to_string(), xauthority.to_string()))
            .copied()
            .ok_or_else(|| Error::Display(display.to_string()))
    }
}
