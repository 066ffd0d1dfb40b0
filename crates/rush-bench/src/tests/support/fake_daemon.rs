//! Fake rush daemon for client and CLI tests.
//!
//! Listens on a Unix socket inside a temporary directory, serves a fixed
//! number of connections according to a [`Behaviour`], and records every
//! request payload it decoded.

use std::io::{self, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use rush_wire::{encode_frame, read_frame};
use serde_json::{Value, json};
use tempfile::TempDir;

const ACCEPT_DEADLINE: Duration = Duration::from_secs(5);

/// How the fake daemon answers each connection.
#[derive(Debug, Clone)]
pub(crate) enum Behaviour {
    /// Echoes the request id with `payload`.
    Respond(Value),
    /// Answers with a fixed id regardless of the request.
    WrongId(u32),
    /// Declares a full frame but closes after `sent` body bytes.
    Truncate { sent: usize },
    /// Writes the response one byte at a time.
    Trickle(Value),
    /// Reads the request and holds the connection open without answering.
    Stall(Duration),
}

impl Behaviour {
    /// A successful execution result with exit code zero.
    pub(crate) fn success() -> Self {
        Self::Respond(json!({
            "type": "execution_result",
            "exit_code": 0,
            "stdout": "",
            "stderr": "",
        }))
    }

    fn success_payload() -> Value {
        json!({ "type": "execution_result", "exit_code": 0 })
    }
}

pub(crate) struct FakeDaemon {
    _dir: TempDir,
    socket: Utf8PathBuf,
    requests: Arc<Mutex<Vec<Value>>>,
    handle: Option<thread::JoinHandle<Result<()>>>,
}

impl FakeDaemon {
    /// Spawns a daemon that serves `connections` connections.
    pub(crate) fn spawn(behaviour: Behaviour, connections: usize) -> Result<Self> {
        let dir = TempDir::new().context("create socket dir")?;
        let socket = Utf8PathBuf::from_path_buf(dir.path().join("daemon.sock"))
            .map_err(|path| anyhow!("non-UTF-8 temp path {}", path.display()))?;
        let listener = UnixListener::bind(&socket).context("bind fake daemon")?;
        listener
            .set_nonblocking(true)
            .context("fake daemon nonblocking")?;

        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || serve(&listener, &behaviour, connections, &recorded));
        Ok(Self {
            _dir: dir,
            socket,
            requests,
            handle: Some(handle),
        })
    }

    pub(crate) fn socket(&self) -> &Utf8Path {
        self.socket.as_path()
    }

    /// Waits for the serving thread and returns the recorded requests.
    pub(crate) fn finish(mut self) -> Result<Vec<Value>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake daemon thread panicked"))??;
        }
        let requests = self
            .requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        Ok(requests.clone())
    }
}

impl Drop for FakeDaemon {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            drop(handle.join());
        }
    }
}

/// Returns a socket path whose listener has already gone away.
pub(crate) fn refused_socket() -> Result<(TempDir, Utf8PathBuf)> {
    let dir = TempDir::new().context("create socket dir")?;
    let socket = Utf8PathBuf::from_path_buf(dir.path().join("stale.sock"))
        .map_err(|path| anyhow!("non-UTF-8 temp path {}", path.display()))?;
    drop(UnixListener::bind(&socket).context("bind stale listener")?);
    Ok((dir, socket))
}

fn serve(
    listener: &UnixListener,
    behaviour: &Behaviour,
    connections: usize,
    requests: &Mutex<Vec<Value>>,
) -> Result<()> {
    for _ in 0..connections {
        let Some(stream) = accept(listener)? else {
            return Ok(());
        };
        handle_connection(stream, behaviour, requests)?;
    }
    Ok(())
}

fn accept(listener: &UnixListener) -> Result<Option<UnixStream>> {
    let deadline = Instant::now() + ACCEPT_DEADLINE;
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false).context("blocking stream")?;
                return Ok(Some(stream));
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                // The client may abort before using every connection.
                if Instant::now() >= deadline {
                    return Ok(None);
                }
                thread::sleep(Duration::from_millis(2));
            }
            Err(error) => return Err(error).context("accept connection"),
        }
    }
}

fn handle_connection(
    mut stream: UnixStream,
    behaviour: &Behaviour,
    requests: &Mutex<Vec<Value>>,
) -> Result<()> {
    let frame = read_frame::<Value, _>(&mut stream).context("read request frame")?;
    requests
        .lock()
        .map_err(|error| anyhow!("lock requests: {error}"))?
        .push(frame.message);

    match behaviour {
        Behaviour::Respond(payload) => {
            let bytes = encode_frame(frame.correlation_id, payload)?;
            stream.write_all(&bytes).context("write response")?;
        }
        Behaviour::WrongId(id) => {
            let bytes = encode_frame(*id, &Behaviour::success_payload())?;
            stream.write_all(&bytes).context("write response")?;
        }
        Behaviour::Truncate { sent } => {
            let bytes = encode_frame(frame.correlation_id, &Behaviour::success_payload())?;
            let cut = (4 + sent).min(bytes.len().saturating_sub(1));
            stream
                .write_all(bytes.get(..cut).context("truncate frame")?)
                .context("write partial response")?;
        }
        Behaviour::Trickle(payload) => {
            for byte in encode_frame(frame.correlation_id, payload)? {
                stream.write_all(&[byte]).context("write response byte")?;
                stream.flush().context("flush response byte")?;
            }
        }
        Behaviour::Stall(hold) => thread::sleep(*hold),
    }
    Ok(())
}
