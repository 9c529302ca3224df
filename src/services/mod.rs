// Author: Dustin Pilgrim
// License: MIT

pub mod logind;
pub mod procs;
pub mod sockets;
pub mod terminal;
pub mod users;
pub mod x11;
