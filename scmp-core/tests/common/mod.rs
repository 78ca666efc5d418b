#![allow(dead_code)]

use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use rand::RngCore;
use scmp_core::StreamSource;
use tokio::io::{AsyncRead, ReadBuf};

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// In-memory, non-seekable source that answers each read with at most
/// `ratio * requested + 1` bytes.
pub struct ChunkedReader {
    data: Vec<u8>,
    pos: usize,
    ratio: f64,
}

impl ChunkedReader {
    pub fn new(data: Vec<u8>, ratio: f64) -> Self {
        ChunkedReader { data, pos: 0, ratio }
    }

    pub fn full(data: Vec<u8>) -> Self {
        ChunkedReader::new(data, 1.0)
    }
}

impl AsyncRead for ChunkedReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let requested = buf.remaining();
        let cap = requested.min((requested as f64 * self.ratio) as usize + 1);
        let start = self.pos;
        let n = cap.min(self.data.len() - start);
        buf.put_slice(&self.data[start..start + n]);
        self.pos += n;
        Poll::Ready(Ok(()))
    }
}

impl StreamSource for ChunkedReader {}

/// Serves `good` bytes, then fails every read.
pub struct FailingReader {
    good: usize,
}

impl FailingReader {
    pub fn after(good: usize) -> Self {
        FailingReader { good }
    }
}

impl AsyncRead for FailingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.good == 0 {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "device unplugged")));
        }
        let n = self.good.min(buf.remaining());
        buf.put_slice(&vec![0u8; n]);
        self.good -= n;
        Poll::Ready(Ok(()))
    }
}

impl StreamSource for FailingReader {}

/// A source whose reads never complete, like an idle socket.
pub struct StalledReader;

impl AsyncRead for StalledReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Pending
    }
}

impl StreamSource for StalledReader {}
