// Author: Dustin Pilgrim
// License: MIT

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The session manager could not be enumerated at all.
    ///
    /// Fatal for the whole pass.
    SessionEnumeration(String),

    /// The TCP socket table could not be read or parsed.
    ///
    /// Fatal for the whole pass.
    SocketTable(String),

    /// Something about one particular session could not be assembled or
    /// evaluated. The session is skipped; the pass continues.
    SessionParse(String),

    /// A uid could not be resolved to a username.
    UserLookup(String),

    /// A terminal device node was absent or inaccessible.
    Terminal(String),

    /// A graphical display did not answer the idle query.
    Display(String),
}

impl Error {
    /// Whether this error is confined to a single session.
    ///
    /// Session-scoped errors are logged and the offending session is
    /// dropped; everything else aborts the pass.
    pub fn is_session_scoped(&self) -> bool {
        matches!(
            self,
            Error::SessionParse(_) | Error::UserLookup(_) | Error::Terminal(_) | Error::Display(_)
        )
    }
}

// ---------------- Display ----------------

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SessionEnumeration(msg) =>
                write!(f, "could not enumerate logind sessions: {msg}"),
            Error::SocketTable(msg) =>
                write!(f, "could not read the TCP socket table: {msg}"),
            Error::SessionParse(msg) =>
                write!(f, "{msg}"),
            Error::UserLookup(msg) =>
                write!(f, "could not resolve user: {msg}"),
            Error::Terminal(msg) =>
                write!(f, "terminal unavailable: {msg}"),
            Error::Display(msg) =>
                write!(f, "display unavailable: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
