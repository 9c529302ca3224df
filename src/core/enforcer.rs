// Author: Dustin Pilgrim
// License: MIT

//! Compares each eligible session against the timeout and pulls the
//! trigger.

use chrono::{DateTime, Local, TimeDelta};

use crate::core::config::Settings;
use crate::core::eligibility::skip_reason;
use crate::core::idleness::session_idleness;
use crate::core::session::SessionGraph;
use crate::core::sources::SessionSource;

/// Run one enforcement pass over a built session graph.
///
/// Every eligible session whose idleness reaches the configured threshold
/// gets its leader terminated, unless dry-run is set. Per-session
/// evaluation failures are logged and leave that session alone.
pub fn enforce(
    graph: &SessionGraph,
    sessions: &dyn SessionSource,
    settings: &Settings,
    now: DateTime<Local>,
) {
    let threshold = TimeDelta::seconds(60 * settings.timeout_minutes as i64);

    for (index, session) in graph.sessions.iter().enumerate() {
        if let Some(reason) = skip_reason(session, &settings.excluded_users) {
            eventline::debug!(
                "enforcer: skipping session id={} ({})",
                session.logind.id,
                reason
            );
            continue;
        }

        let idle = match session_idleness(graph, index, now) {
            Ok(idle) => idle,
            Err(err) => {
                eventline::warn!(
                    "enforcer: could not determine idletime for session={}, owned by {}@{}: {}",
                    session.logind.id,
                    session.username,
                    session.tty_label(),
                    err
                );
                continue;
            }
        };

        if idle < threshold {
            continue;
        }

        eventline::warn!(
            "enforcer: stopping pid={}, leader of session={}, owned by {}@{}, which has been idle for {} minutes",
            session.logind.leader,
            session.logind.id,
            session.username,
            session.tty_label(),
            idle.num_seconds() / 60
        );

        if settings.dry_run {
            continue;
        }

        if let Err(err) = sessions.terminate_leader(&session.logind.id) {
            eventline::warn!(
                "enforcer: could not terminate leader of session={}: {}",
                session.logind.id,
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::mock::{FakeSessions, logind_session};
    use crate::core::session::{Session, SessionKind, Terminal};

    fn settings(timeout_minutes: u64) -> Settings {
        Settings { timeout_minutes, ..Settings::default() }
    }

    fn tty_session(id: &str, leader: i32, idle_minutes: i64, now: DateTime<Local>) -> Session {
        let then = now - TimeDelta::minutes(idle_minutes);
        Session {
            logind: logind_session(id, 1000, SessionKind::Tty, "pts/0", leader),
            username: "alice".into(),
            tty: Some(Terminal { name: "pts/0".into(), atime: then, mtime: then }),
            display: None,
            display_idle: None,
            processes: Vec::new(),
        }
    }

    #[test]
    fn idle_sessions_past_the_threshold_are_terminated() {
        let now = Local::now();
        let graph = SessionGraph { sessions: vec![tty_session("7", 100, 30, now)] };
        let source = FakeSessions::default();

        enforce(&graph, &source, &settings(15), now);

        assert_eq!(source.terminated.borrow().as_slice(), &["7".to_string()]);
    }

    #[test]
    fn hitting_the_threshold_exactly_counts() {
        let now = Local::now();
        let graph = SessionGraph { sessions: vec![tty_session("7", 100, 15, now)] };
        let source = FakeSessions::default();

        enforce(&graph, &source, &settings(15), now);

        assert_eq!(source.terminated.borrow().len(), 1);
    }

    #[test]
    fn active_sessions_are_left_alone() {
        let now = Local::now();
        let graph = SessionGraph { sessions: vec![tty_session("7", 100, 1, now)] };
        let source = FakeSessions::default();

        enforce(&graph, &source, &settings(15), now);

        assert!(source.terminated.borrow().is_empty());
    }

    #[test]
    fn dry_run_terminates_nothing() {
        let now = Local::now();
        let graph = SessionGraph { sessions: vec![tty_session("7", 100, 30, now)] };
        let source = FakeSessions::default();
        let settings = Settings { dry_run: true, ..settings(15) };

        enforce(&graph, &source, &settings, now);

        assert!(source.terminated.borrow().is_empty());
    }

    #[test]
    fn a_zero_timeout_catches_every_eligible_session() {
        let now = Local::now();
        let graph = SessionGraph { sessions: vec![tty_session("7", 100, 0, now)] };
        let source = FakeSessions::default();

        enforce(&graph, &source, &settings(0), now);

        assert_eq!(source.terminated.borrow().len(), 1);
    }

    #[test]
    fn clock_skew_never_triggers_termination() {
        let now = Local::now();
        // atime three minutes in the future.
        let graph = SessionGraph { sessions: vec![tty_session("7", 100, -3, now)] };
        let source = FakeSessions::default();

        enforce(&graph, &source, &settings(15), now);

        assert!(source.terminated.borrow().is_empty());
    }

    #[test]
    fn ineligible_sessions_are_never_evaluated() {
        let now = Local::now();
        let mut lingering = tty_session("8", 0, 600, now);
        lingering.logind.leader = 0;
        let graph = SessionGraph { sessions: vec![lingering] };
        let source = FakeSessions::default();

        enforce(&graph, &source, &settings(15), now);

        assert!(source.terminated.borrow().is_empty());
    }

    #[test]
    fn excluded_users_survive_any_idleness() {
        let now = Local::now();
        let graph = SessionGraph { sessions: vec![tty_session("16", 100, 600, now)] };
        let source = FakeSessions::default();
        let settings = Settings {
            excluded_users: vec!["alice".into()],
            ..settings(15)
        };

        enforce(&graph, &source, &settings, now);

        assert!(source.terminated.borrow().is_empty());
    }

    #[test]
    fn only_the_idle_sessions_of_a_mixed_graph_are_stopped() {
        let now = Local::now();
        let graph = SessionGraph {
            sessions: vec![
                tty_session("1", 100, 30, now),
                tty_session("2", 200, 1, now),
                tty_session("3", 300, 45, now),
            ],
        };
        let source = FakeSessions::default();

        enforce(&graph, &source, &settings(15), now);

        assert_eq!(
            source.terminated.borrow().as_slice(),
            &["1".to_string(), "3".to_string()]
        );
    }
}
