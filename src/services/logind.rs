// Author: Dustin Pilgrim
// License: MIT

//! systemd-logind over the system bus, blocking.

use std::path::{Path, PathBuf};

use zbus::blocking::Connection;
use zbus::proxy;
use zbus::zvariant::OwnedObjectPath;

use crate::core::error::Error;
use crate::core::session::{LogindSession, SessionKind};
use crate::core::sources::SessionSource;

const SIGTERM: i32 = 15;

#[proxy(
    interface = "org.freedesktop.login1.Manager",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1"
)]
trait LoginManager {
    /// List sessions as (id, uid, username, seat, object path).
    #[zbus(name = "ListSessions")]
    fn list_sessions(
        &self,
    ) -> zbus::Result<Vec<(String, u32, String, String, OwnedObjectPath)>>;

    /// Deliver a signal to one process of a session.
    #[zbus(name = "KillSession")]
    fn kill_session(&self, session_id: &str, who: &str, signal: i32) -> zbus::Result<()>;
}

#[proxy(
    interface = "org.freedesktop.login1.Session",
    default_service = "org.freedesktop.login1"
)]
trait LoginSession {
    #[zbus(property)]
    fn user(&self) -> zbus::Result<(u32, OwnedObjectPath)>;

    #[zbus(property)]
    fn type_(&self) -> zbus::Result<String>;

    #[zbus(property, name = "TTY")]
    fn tty(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn leader(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn scope(&self) -> zbus::Result<String>;
}

/// The live session manager.
pub struct LogindSessionSource {
    connection: Connection,
}

impl LogindSessionSource {
    pub fn connect() -> Result<Self, Error> {
        let connection = Connection::system()
            .map_err(|err| Error::SessionEnumeration(err.to_string()))?;
        Ok(Self { connection })
    }

    fn manager(&self) -> Result<LoginManagerProxyBlocking<'_>, Error> {
        LoginManagerProxyBlocking::new(&self.connection)
            .map_err(|err| Error::SessionEnumeration(err.to_string()))
    }

    fn read_session(
        &self,
        id: &str,
        path: OwnedObjectPath,
    ) -> Result<LogindSession, zbus::Error> {
        let session = LoginSessionProxyBlocking::builder(&self.connection)
            .path(path)?
            .build()?;

        let (uid, _user_path) = session.user()?;
        let kind = SessionKind::parse(&session.type_()?);
        let tty = session.tty()?;
        let leader = session.leader()? as i32;
        let scope = session.scope()?;
        let scope_path = scope_cgroup_path(uid, &scope);

        Ok(LogindSession {
            id: id.to_string(),
            uid,
            kind,
            tty,
            leader,
            scope,
            scope_path,
        })
    }
}

impl SessionSource for LogindSessionSource {
    fn list(&self) -> Result<Vec<LogindSession>, Error> {
        let listed = self
            .manager()?
            .list_sessions()
            .map_err(|err| Error::SessionEnumeration(err.to_string()))?;

        let mut sessions = Vec::new();
        for (id, _uid, _username, _seat, path) in listed {
            match self.read_session(&id, path) {
                Ok(session) => sessions.push(session),
                // Sessions come and go between the listing and the
                // property reads.
                Err(err) => {
                    eventline::debug!("logind: session {} vanished during enumeration: {}", id, err);
                }
            }
        }

        Ok(sessions)
    }

    fn terminate_leader(&self, session_id: &str) -> Result<(), Error> {
        match self.manager()?.kill_session(session_id, "leader", SIGTERM) {
            Ok(()) => Ok(()),
            Err(zbus::Error::MethodError(ref name, _, _)) if session_already_gone(name.as_str()) => {
                Ok(())
            }
            Err(err) => Err(Error::SessionParse(format!(
                "could not signal the leader of session {session_id}: {err}"
            ))),
        }
    }
}

/// Errors that mean the session or its leader ended on its own, which is
/// the outcome we wanted anyway.
fn session_already_gone(error_name: &str) -> bool {
    matches!(
        error_name,
        "org.freedesktop.login1.NoSuchSession"
            | "org.freedesktop.login1.NoSuchProcess"
            | "org.freedesktop.DBus.Error.UnknownObject"
    )
}

/// Absolute cgroup path of a session scope.
fn scope_cgroup_path(uid: u32, scope: &str) -> PathBuf {
    scope_path_under(&cgroup_root(), uid, scope)
}

fn cgroup_root() -> PathBuf {
    // The unified (v2) hierarchy mounts controllers at the top; v1 keeps
    // the named systemd hierarchy one level down.
    if Path::new("/sys/fs/cgroup/cgroup.controllers").exists() {
        PathBuf::from("/sys/fs/cgroup")
    } else {
        PathBuf::from("/sys/fs/cgroup/systemd")
    }
}

fn scope_path_under(root: &Path, uid: u32, scope: &str) -> PathBuf {
    root.join("user.slice")
        .join(format!("user-{uid}.slice"))
        .join(scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_paths_follow_the_logind_layout() {
        let path = scope_path_under(Path::new("/sys/fs/cgroup"), 1000, "session-7.scope");
        assert_eq!(
            path,
            PathBuf::from("/sys/fs/cgroup/user.slice/user-1000.slice/session-7.scope")
        );
    }

    #[test]
    fn gone_sessions_count_as_terminated() {
        assert!(session_already_gone("org.freedesktop.login1.NoSuchSession"));
        assert!(session_already_gone("org.freedesktop.login1.NoSuchProcess"));
        assert!(!session_already_gone("org.freedesktop.DBus.Error.AccessDenied"));
    }
}
