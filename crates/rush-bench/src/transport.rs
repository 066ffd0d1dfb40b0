//! Unix domain socket connection setup.
//!
//! A configured timeout bounds the connect itself (through `socket2`, since
//! the standard library has no connect timeout for Unix sockets) and every
//! subsequent read and write on the stream.

use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream;
use std::time::Duration;

use camino::Utf8Path;
use socket2::{Domain, SockAddr, Socket, Type};

/// Opens a fresh stream to `path`, applying `timeout` when present.
pub(crate) fn connect(path: &Utf8Path, timeout: Option<Duration>) -> io::Result<UnixStream> {
    let stream = match timeout {
        Some(limit) => connect_with_timeout(path, limit)?,
        None => UnixStream::connect(path.as_std_path())?,
    };
    stream.set_read_timeout(timeout)?;
    stream.set_write_timeout(timeout)?;
    Ok(stream)
}

fn connect_with_timeout(path: &Utf8Path, limit: Duration) -> io::Result<UnixStream> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path.as_std_path())?;
    socket.connect_timeout(&address, limit)?;
    Ok(UnixStream::from(OwnedFd::from(socket)))
}
