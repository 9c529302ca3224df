// Author: Dustin Pilgrim
// License: MIT

//! X11 Screen Saver extension queries.

use x11rb::connection::Connection;
use x11rb::protocol::screensaver::ConnectionExt as _;

use crate::core::error::Error;
use crate::core::sources::DisplayProbe;

/// Connects to a display per probe and asks the screen saver how long the
/// user has been quiet.
pub struct ScreenSaverProbe;

impl DisplayProbe for ScreenSaverProbe {
    fn idle_ms(&self, display: &str, xauthority: &str) -> Result<u64, Error> {
        // x11rb picks its auth cookie up from XAUTHORITY. The process is
        // single-threaded, so the variable cannot race.
        unsafe { std::env::set_var("XAUTHORITY", xauthority) };

        let (connection, screen_num) = x11rb::connect(Some(display))
            .map_err(|err| Error::Display(format!("{display}: {err}")))?;

        let root = connection.setup().roots[screen_num].root;

        let reply = connection
            .screensaver_query_info(root)
            .map_err(|err| Error::Display(format!("{display}: {err}")))?
            .reply()
            .map_err(|err| Error::Display(format!("{display}: {err}")))?;

        Ok(u64::from(reply.ms_since_user_input))
    }
}
