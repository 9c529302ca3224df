// Author: Dustin Pilgrim
// License: MIT

//! Builds the cross-referenced session graph for one evaluation pass.

use std::collections::HashMap;

use chrono::TimeDelta;

use crate::core::error::Error;
use crate::core::net::{LoopbackConnection, resolve_loopback_connections};
use crate::core::process::Process;
use crate::core::session::{LogindSession, Session, SessionGraph, SessionProcess, Terminal};
use crate::core::sources::{DisplayProbe, Platform};

/// Assemble every logind session into a [`SessionGraph`].
///
/// Pass one builds each session in isolation (processes, tunnel backend
/// pids, terminal, representative display). Pass two resolves backend pids
/// to arena indices across all sessions. A session whose assembly fails
/// with a session-scoped error is logged and dropped; enumeration and
/// socket-table failures abort the pass.
pub fn build_session_graph(platform: &Platform<'_>) -> Result<SessionGraph, Error> {
    let records = platform.sessions.list()?;
    let snapshot = platform.sockets.snapshot()?;
    let connections = resolve_loopback_connections(&snapshot);

    let mut usernames: HashMap<u32, String> = HashMap::new();
    let mut sessions: Vec<Session> = Vec::new();

    for record in records {
        match assemble_session(platform, &record, &connections, &mut usernames) {
            Ok(session) => sessions.push(session),
            Err(err) if err.is_session_scoped() => {
                eventline::warn!(
                    "graph: could not assemble session {}: {}",
                    record.id,
                    err
                );
            }
            Err(err) => return Err(err),
        }
    }

    resolve_backend_sessions(&mut sessions);

    eventline::debug!("graph: identified {} sessions to be reviewed", sessions.len());
    for (index, session) in sessions.iter().enumerate() {
        let tunnels: usize = session.processes.iter().map(|p| p.tunnel_backends.len()).sum();
        let backends: usize = session.processes.iter().map(|p| p.backend_sessions.len()).sum();
        eventline::debug!(
            "graph: {} (id={}): {}@{} with {} processes and {} active tunnels to {} backend sessions",
            index + 1,
            session.logind.id,
            session.username,
            session.tty_label(),
            session.processes.len(),
            tunnels,
            backends
        );
    }

    Ok(SessionGraph { sessions })
}

fn assemble_session(
    platform: &Platform<'_>,
    record: &LogindSession,
    connections: &[LoopbackConnection],
    usernames: &mut HashMap<u32, String>,
) -> Result<Session, Error> {
    let username = match usernames.get(&record.uid) {
        Some(name) => name.clone(),
        None => {
            let name = platform.users.uid_to_name(record.uid)?;
            usernames.insert(record.uid, name.clone());
            name
        }
    };

    let mut collector = DisplayCollector::default();
    let mut processes: Vec<SessionProcess> = Vec::new();

    for process in platform.processes.in_scope(&record.scope_path)? {
        collector.add(&process);

        let mut tunnel_backends: Vec<i32> = Vec::new();
        for connection in connections {
            if !connection.client.pids.contains(&process.pid) {
                continue;
            }
            for &backend in &connection.server.pids {
                if !tunnel_backends.contains(&backend) {
                    tunnel_backends.push(backend);
                }
            }
        }

        processes.push(SessionProcess {
            process,
            tunnel_backends,
            backend_sessions: Vec::new(),
        });
    }

    let tty = match record.tty.as_str() {
        "" => None,
        name => Some(open_terminal(platform, name)?),
    };

    let (display, display_idle) = match collector.least_idle(platform.displays) {
        Some((display, idle)) => (Some(display), Some(idle)),
        None => (None, None),
    };

    Ok(Session {
        logind: record.clone(),
        username,
        tty,
        display,
        display_idle,
        processes,
    })
}

fn open_terminal(platform: &Platform<'_>, name: &str) -> Result<Terminal, Error> {
    let tty = platform.terminals.open(name)?;

    // Program output bumps mtime only; aligning atime up lets logind's own
    // idle accounting see it too.
    #[cfg(feature = "touch-atime")]
    if tty.atime < tty.mtime {
        if let Err(err) = platform.terminals.set_atime(name, tty.mtime) {
            eventline::debug!("graph: could not align atime on {}: {}", name, err);
        }
    }

    Ok(tty)
}

/// Pass two: turn backend pids into arena indices.
///
/// Quadratic over sessions and their processes; the platform caps both at
/// small numbers. Duplicate edges are permitted, self-edges included.
fn resolve_backend_sessions(sessions: &mut [Session]) {
    let mut edges: Vec<(usize, usize, usize)> = Vec::new();

    for (a, session_a) in sessions.iter().enumerate() {
        for (pi, process_a) in session_a.processes.iter().enumerate() {
            for (b, session_b) in sessions.iter().enumerate() {
                for process_b in &session_b.processes {
                    if process_a.tunnel_backends.contains(&process_b.process.pid) {
                        edges.push((a, pi, b));
                    }
                }
            }
        }
    }

    for (a, pi, b) in edges {
        sessions[a].processes[pi].backend_sessions.push(b);
    }
}

/// Gathers the X11-capable processes of one session and picks the display
/// with the most recent activity.
#[derive(Debug, Default)]
struct DisplayCollector {
    candidates: Vec<(String, String)>,
}

impl DisplayCollector {
    /// Consider a process. Only processes carrying both DISPLAY and
    /// XAUTHORITY can be probed.
    fn add(&mut self, process: &Process) {
        let (Some(display), Some(xauthority)) = (process.display(), process.xauthority()) else {
            return;
        };
        let pair = (display.to_string(), xauthority.to_string());
        if !self.candidates.contains(&pair) {
            self.candidates.push(pair);
        }
    }

    /// Probe each distinct candidate once and keep the smallest idle.
    fn least_idle(&self, probe: &dyn DisplayProbe) -> Option<(String, TimeDelta)> {
        let mut best: Option<(String, TimeDelta)> = None;

        for (display, xauthority) in &self.candidates {
            let idle = match probe.idle_ms(display, xauthority) {
                Ok(ms) => TimeDelta::milliseconds(ms as i64),
                Err(err) => {
                    eventline::debug!("graph: display {} gave no idle reading: {}", display, err);
                    continue;
                }
            };

            match &best {
                Some((_, current)) if *current <= idle => {}
                _ => best = Some((display.clone(), idle)),
            }
        }

        best
    }
}
