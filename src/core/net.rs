// Author: Dustin Pilgrim
// License: MIT

use std::collections::HashSet;
use std::net::IpAddr;

/// One endpoint of a TCP connection, together with every process holding
/// an open descriptor on it.
#[derive(Debug, Clone, Eq)]
pub struct Socket {
    pub addr: IpAddr,
    pub port: u16,
    pub pids: Vec<i32>,
}

// Identity is the (address, port) pair; the pid set is payload.
impl PartialEq for Socket {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr && self.port == other.port
    }
}

impl Socket {
    pub fn is_loopback(&self) -> bool {
        self.addr.is_loopback()
    }
}

/// Everything the socket adapter observed in one sweep of the TCP table.
#[derive(Debug, Clone, Default)]
pub struct SocketSnapshot {
    pub listening_ports: HashSet<u16>,
    pub established: Vec<(Socket, Socket)>,
}

/// A directed loopback connection: `client` initiated it, `server` was
/// listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopbackConnection {
    pub client: Socket,
    pub server: Socket,
}

/// Orient the established loopback pairs of a snapshot.
///
/// A pair becomes a connection only when exactly one endpoint's port is in
/// the listening set; that endpoint is the server. Pairs where both or
/// neither endpoint is listening carry no usable direction and are
/// discarded. Each connection shows up once per side of the TCP table, so
/// the result is deduplicated by endpoint identity.
pub fn resolve_loopback_connections(snapshot: &SocketSnapshot) -> Vec<LoopbackConnection> {
    let mut connections: Vec<LoopbackConnection> = Vec::new();

    for (local, peer) in &snapshot.established {
        if !local.is_loopback() || !peer.is_loopback() {
            continue;
        }

        let local_listens = snapshot.listening_ports.contains(&local.port);
        let peer_listens = snapshot.listening_ports.contains(&peer.port);

        let connection = match (local_listens, peer_listens) {
            (true, false) => LoopbackConnection {
                client: peer.clone(),
                server: local.clone(),
            },
            (false, true) => LoopbackConnection {
                client: local.clone(),
                server: peer.clone(),
            },
            // Ambiguous direction; nothing to infer.
            _ => continue,
        };

        if !connections.contains(&connection) {
            connections.push(connection);
        }
    }

    connections
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn sock(addr: IpAddr, port: u16, pids: &[i32]) -> Socket {
        Socket { addr, port, pids: pids.to_vec() }
    }

    fn lo4(port: u16, pids: &[i32]) -> Socket {
        sock(IpAddr::V4(Ipv4Addr::LOCALHOST), port, pids)
    }

    fn lo6(port: u16, pids: &[i32]) -> Socket {
        sock(IpAddr::V6(Ipv6Addr::LOCALHOST), port, pids)
    }

    #[test]
    fn orients_by_the_listening_side() {
        let snapshot = SocketSnapshot {
            listening_ports: [5901].into(),
            established: vec![(lo4(38222, &[100]), lo4(5901, &[200]))],
        };

        let conns = resolve_loopback_connections(&snapshot);
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].client.port, 38222);
        assert_eq!(conns[0].client.pids, vec![100]);
        assert_eq!(conns[0].server.port, 5901);
        assert_eq!(conns[0].server.pids, vec![200]);
    }

    #[test]
    fn both_table_sides_collapse_to_one_connection() {
        // The same connection as seen from each end of the TCP table.
        let snapshot = SocketSnapshot {
            listening_ports: [5901].into(),
            established: vec![
                (lo4(38222, &[100]), lo4(5901, &[200])),
                (lo4(5901, &[200]), lo4(38222, &[100])),
            ],
        };

        let conns = resolve_loopback_connections(&snapshot);
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].client.port, 38222);
    }

    #[test]
    fn ambiguous_pairs_are_discarded() {
        let snapshot = SocketSnapshot {
            listening_ports: [5901, 6010].into(),
            established: vec![
                // Both listening.
                (lo4(5901, &[1]), lo4(6010, &[2])),
                // Neither listening.
                (lo4(40000, &[3]), lo4(40001, &[4])),
            ],
        };

        assert!(resolve_loopback_connections(&snapshot).is_empty());
    }

    #[test]
    fn non_loopback_pairs_are_ignored() {
        let remote = sock(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 9)), 22, &[5]);
        let snapshot = SocketSnapshot {
            listening_ports: [22].into(),
            established: vec![(remote, lo4(51000, &[6]))],
        };

        assert!(resolve_loopback_connections(&snapshot).is_empty());
    }

    #[test]
    fn ipv6_loopback_counts() {
        let snapshot = SocketSnapshot {
            listening_ports: [5901].into(),
            established: vec![(lo6(43000, &[10]), lo6(5901, &[20]))],
        };

        let conns = resolve_loopback_connections(&snapshot);
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].server.pids, vec![20]);
    }

    #[test]
    fn every_connection_has_exactly_one_listening_endpoint() {
        let snapshot = SocketSnapshot {
            listening_ports: [5901, 5902].into(),
            established: vec![
                (lo4(38222, &[1]), lo4(5901, &[2])),
                (lo4(38223, &[3]), lo4(5902, &[4])),
                (lo4(5901, &[2]), lo4(38222, &[1])),
            ],
        };

        for conn in resolve_loopback_connections(&snapshot) {
            assert!(snapshot.listening_ports.contains(&conn.server.port));
            assert!(!snapshot.listening_ports.contains(&conn.client.port));
        }
    }
}
