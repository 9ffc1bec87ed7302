//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use roster::inbound::http::state::HttpState;

/// Everything [`create_server`](super::create_server) needs besides health
/// state.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, http_state: HttpState) -> Self {
        Self {
            bind_addr,
            http_state,
        }
    }
}
