// Author: Dustin Pilgrim
// License: MIT

//! The most optimistic idleness figure a session can claim.

use chrono::{DateTime, Local, TimeDelta};

use crate::core::error::Error;
use crate::core::session::SessionGraph;

/// Compute how long a session has been idle, taking the minimum over every
/// activity signal that applies: terminal atime, terminal mtime, X11
/// screen-saver idleness, and the idleness of tunneled backend sessions.
///
/// Any credible evidence of activity wins. If the user's own keyboard has
/// been quiet for 10 minutes but a VNC session tunneled out of this one saw
/// activity 5 minutes ago, the session is 5 minutes idle.
///
/// Backend sessions are evaluated exactly one level deep. The depth bound
/// is what keeps self-tunnels and circular tunnel pairs finite, so it is
/// enforced by construction rather than with a visited set.
pub fn session_idleness(
    graph: &SessionGraph,
    index: usize,
    now: DateTime<Local>,
) -> Result<TimeDelta, Error> {
    evaluate(graph, index, now, false)
}

fn evaluate(
    graph: &SessionGraph,
    index: usize,
    now: DateTime<Local>,
    nested: bool,
) -> Result<TimeDelta, Error> {
    let session = &graph.sessions[index];

    let mut minimum: Option<TimeDelta> = None;
    let mut determined_by = String::new();

    // Keyboard input touches the terminal's atime.
    if let Some(tty) = &session.tty {
        let idle = now - tty.atime;
        if minimum.is_none_or(|current| idle < current) {
            minimum = Some(idle);
            determined_by = format!("atime on {}", tty.name);
        }
    }

    // Program output touches the mtime as well.
    if let Some(tty) = &session.tty {
        let idle = now - tty.mtime;
        if minimum.is_none_or(|current| idle < current) {
            minimum = Some(idle);
            determined_by = format!("mtime on {}", tty.name);
        }
    }

    if let Some(idle) = session.display_idle {
        if minimum.is_none_or(|current| idle < current) {
            minimum = Some(idle);
            determined_by = format!(
                "X11 idleness on DISPLAY={}",
                session.display.as_deref().unwrap_or("?")
            );
        }
    }

    if !nested {
        for session_process in &session.processes {
            for &backend in &session_process.backend_sessions {
                // Backends are consulted regardless of their own
                // eligibility; a graphical backend still proves activity.
                let Ok(idle) = evaluate(graph, backend, now, true) else {
                    continue;
                };
                if minimum.is_none_or(|current| idle < current) {
                    minimum = Some(idle);
                    determined_by = format!(
                        "idleness of nested session {}",
                        graph.sessions[backend].logind.id
                    );
                }
            }
        }
    }

    let Some(minimum) = minimum else {
        return Err(Error::SessionParse(format!(
            "no idleness source for session {}",
            session.logind.id
        )));
    };

    eventline::debug!(
        "idleness: session {} idle for {} seconds based on {}",
        session.logind.id,
        minimum.num_seconds(),
        determined_by
    );

    Ok(minimum)
}
