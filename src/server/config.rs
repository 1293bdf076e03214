use std::net::{Ipv4Addr, SocketAddr};

use crate::session::state::SessionOpts;

/// Default port, overridable through `PORT` by the CLI.
pub const DEFAULT_PORT: u16 = 8080;

/// Largest accepted upload body.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub max_upload_bytes: usize,
    pub session: SessionOpts,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session: SessionOpts::default(),
        }
    }
}
