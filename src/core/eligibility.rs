// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

use crate::core::session::Session;

/// Why a session is exempt from idleness enforcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Graphical seats are protected by their screensaver, not by us.
    GraphicalSeat,
    /// No assigned terminal means the session is not interactive.
    NoTerminal,
    /// The operator excluded this user outright.
    ExcludedUser,
    /// The leader already exited; there is nothing left to stop.
    Lingering,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::GraphicalSeat => write!(f, "graphical session"),
            SkipReason::NoTerminal => write!(f, "noninteractive session"),
            SkipReason::ExcludedUser => write!(f, "excluded user"),
            SkipReason::Lingering => write!(f, "lingering session (leader=pid 0)"),
        }
    }
}

/// Check a session against the exemption rules, first match wins.
///
/// `None` means the session is subject to enforcement. Tunneled *backend*
/// sessions are deliberately never passed through this check; their
/// activity counts even when they would be exempt themselves.
pub fn skip_reason(session: &Session, excluded_users: &[String]) -> Option<SkipReason> {
    if session.logind.kind.is_graphical() {
        return Some(SkipReason::GraphicalSeat);
    }

    if session.tty.is_none() {
        return Some(SkipReason::NoTerminal);
    }

    if excluded_users.iter().any(|user| *user == session.username) {
        return Some(SkipReason::ExcludedUser);
    }

    if session.logind.leader == 0 {
        return Some(SkipReason::Lingering);
    }

    None
}
