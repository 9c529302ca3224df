// Author: Dustin Pilgrim
// License: MIT

use std::io;

use chrono::Local;

use crate::cli::Args;
use crate::core::enforcer::enforce;
use crate::core::error::Error;
use crate::core::graph::build_session_graph;
use crate::core::sources::Platform;
use crate::services::logind::LogindSessionSource;
use crate::services::procs::CgroupProcessSource;
use crate::services::sockets::ProcNetSocketSource;
use crate::services::terminal::DevTerminalProbe;
use crate::services::users::NssUserDirectory;
use crate::services::x11::ScreenSaverProbe;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

/// One full evaluation pass: build the session graph, enforce the
/// timeout, exit.
pub fn run(args: Args) -> Result<(), AnyError> {
    crate::logging::init(args.verbose);

    let mut settings = crate::config::load(args.config_file.as_deref()).map_err(|err| {
        eventline::error!("{err}");
        io::Error::new(io::ErrorKind::InvalidData, err)
    })?;
    crate::config::apply_cli(&mut settings, &args);

    if settings.verbose {
        crate::logging::set_verbose(true);
    }

    let sessions = LogindSessionSource::connect().map_err(fatal)?;
    let sockets = ProcNetSocketSource;
    let processes = CgroupProcessSource;
    let users = NssUserDirectory;
    let terminals = DevTerminalProbe;
    let displays = ScreenSaverProbe;

    let platform = Platform {
        sessions: &sessions,
        sockets: &sockets,
        processes: &processes,
        users: &users,
        terminals: &terminals,
        displays: &displays,
    };

    let now = Local::now();
    let graph = build_session_graph(&platform).map_err(fatal)?;
    enforce(&graph, &sessions, &settings, now);

    Ok(())
}

fn fatal(err: Error) -> AnyError {
    eventline::error!("{err}");
    Box::new(err)
}
