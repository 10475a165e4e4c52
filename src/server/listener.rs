use std::io;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpSocket, lookup_host};
use tracing::info;

const LISTEN_BACKLOG: u32 = 1024;

/// Resolves `addr` and binds a listening socket with `SO_REUSEADDR` and TCP
/// keepalive. Any failure is returned to the caller, which is expected to exit.
pub async fn bind_listener(addr: &str) -> io::Result<TcpListener> {
    let addr: SocketAddr = lookup_host(addr).await?.next().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("bind address {addr} did not resolve"),
        )
    })?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.set_keepalive(true)?;
    socket.bind(addr)?;
    let listener = socket.listen(LISTEN_BACKLOG)?;
    info!(address = %listener.local_addr()?, "HTTP server listening with TCP keepalive");
    Ok(listener)
}
