//! Readers that imitate awkward stream transports.

use std::collections::VecDeque;
use std::io::{self, Read};

/// Delivers at most `chunk` bytes per read call.
pub(super) struct ChunkedReader {
    data: Vec<u8>,
    position: usize,
    chunk: usize,
}

impl ChunkedReader {
    pub(super) fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self {
            data,
            position: 0,
            chunk,
        }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.data.get(self.position..).unwrap_or_default();
        let count = remaining.len().min(self.chunk).min(buf.len());
        let (target, _) = buf.split_at_mut(count);
        target.copy_from_slice(&remaining[..count]);
        self.position += count;
        Ok(count)
    }
}

/// Plays back a fixed script of read outcomes.
pub(super) struct ScriptedReader {
    steps: VecDeque<io::Result<Vec<u8>>>,
}

impl ScriptedReader {
    pub(super) fn new(steps: Vec<io::Result<Vec<u8>>>) -> Self {
        Self {
            steps: steps.into(),
        }
    }
}

impl Read for ScriptedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.steps.pop_front() {
            None => Ok(0),
            Some(Err(error)) => Err(error),
            Some(Ok(bytes)) => {
                assert!(bytes.len() <= buf.len(), "scripted chunk larger than buffer");
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            }
        }
    }
}
