// Author: Dustin Pilgrim
// License: MIT

//! One sweep of /proc/net/tcp and /proc/net/tcp6, with pid attribution.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use procfs::net::TcpState;
use procfs::process::FDTarget;

use crate::core::error::Error;
use crate::core::net::{Socket, SocketSnapshot};
use crate::core::sources::SocketSource;

/// Reads the kernel's TCP tables through procfs.
pub struct ProcNetSocketSource;

impl SocketSource for ProcNetSocketSource {
    fn snapshot(&self) -> Result<SocketSnapshot, Error> {
        let pids_by_inode = socket_holders()?;

        let mut entries = procfs::net::tcp()
            .map_err(|err| Error::SocketTable(err.to_string()))?;
        entries.extend(
            procfs::net::tcp6()
                .map_err(|err| Error::SocketTable(err.to_string()))?,
        );

        // Pid sets keyed two ways: every socket we met, and every local
        // address, so an established entry can name the processes on the
        // far side of a loopback connection.
        let mut listening_ports: HashSet<u16> = HashSet::new();
        let mut pids_by_addr: HashMap<SocketAddr, Vec<i32>> = HashMap::new();

        for entry in &entries {
            let pids = pids_by_inode.get(&entry.inode).cloned().unwrap_or_default();
            let known = pids_by_addr.entry(entry.local_address).or_default();
            for pid in pids {
                if !known.contains(&pid) {
                    known.push(pid);
                }
            }

            if entry.state == TcpState::Listen {
                listening_ports.insert(entry.local_address.port());
            }
        }

        let mut established = Vec::new();
        for entry in &entries {
            if entry.state != TcpState::Established {
                continue;
            }

            let local = socket_at(entry.local_address, &pids_by_addr);
            let peer = socket_at(entry.remote_address, &pids_by_addr);
            established.push((local, peer));
        }

        Ok(SocketSnapshot { listening_ports, established })
    }
}

fn socket_at(addr: SocketAddr, pids_by_addr: &HashMap<SocketAddr, Vec<i32>>) -> Socket {
    Socket {
        addr: addr.ip(),
        port: addr.port(),
        pids: pids_by_addr.get(&addr).cloned().unwrap_or_default(),
    }
}

/// Map socket inodes to the pids holding descriptors on them.
///
/// Processes whose fd tables cannot be read (they exited, or we lack the
/// privilege) are skipped; their sockets simply end up with no holders.
fn socket_holders() -> Result<HashMap<u64, Vec<i32>>, Error> {
    let mut holders: HashMap<u64, Vec<i32>> = HashMap::new();

    let processes = procfs::process::all_processes()
        .map_err(|err| Error::SocketTable(err.to_string()))?;

    for process in processes {
        let Ok(process) = process else { continue };
        let Ok(fds) = process.fd() else { continue };

        for fd in fds {
            let Ok(fd) = fd else { continue };
            if let FDTarget::Socket(inode) = fd.target {
                let pids = holders.entry(inode).or_default();
                if !pids.contains(&process.pid) {
                    pids.push(process.pid);
                }
            }
        }
    }

    Ok(holders)
}
