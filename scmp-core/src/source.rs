//! Byte sources the comparison engine can read from.
//!
//! A source is anything that implements [`tokio::io::AsyncRead`]. On top of that,
//! [`StreamSource`] lets a source state whether it knows its own length. Sources
//! that cannot answer cheaply (pipes, sockets, stdin) should be wrapped in
//! [`Unseekable`].

use std::{
    io::{self, Cursor},
    pin::Pin,
    task::{Context, Poll},
};

use async_trait::async_trait;
use tokio::{
    fs::File,
    io::{AsyncRead, AsyncSeekExt, ReadBuf},
};

#[async_trait]
pub trait StreamSource: AsyncRead + Unpin + Send {
    /// Whether [`length`](StreamSource::length) returns a reliable answer.
    fn can_seek(&self) -> bool {
        false
    }

    /// Number of bytes left to read from the current position.
    ///
    /// Only meaningful when [`can_seek`](StreamSource::can_seek) returns `true`.
    async fn length(&mut self) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "source does not report its length",
        ))
    }
}

#[async_trait]
impl StreamSource for File {
    fn can_seek(&self) -> bool {
        true
    }

    async fn length(&mut self) -> io::Result<u64> {
        let len = self.metadata().await?.len();
        let pos = self.stream_position().await?;
        Ok(len.saturating_sub(pos))
    }
}

#[async_trait]
impl<T> StreamSource for Cursor<T>
where
    T: AsRef<[u8]> + Unpin + Send,
{
    fn can_seek(&self) -> bool {
        true
    }

    async fn length(&mut self) -> io::Result<u64> {
        let len = self.get_ref().as_ref().len() as u64;
        Ok(len.saturating_sub(self.position()))
    }
}

#[async_trait]
impl<'a> StreamSource for &'a [u8] {
    fn can_seek(&self) -> bool {
        true
    }

    async fn length(&mut self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }
}

/// Hides the length of the wrapped reader.
///
/// Use this for readers whose length is unknown or expensive to learn, so that
/// [`LengthCompare::Auto`](crate::stream::LengthCompare::Auto) never asks.
#[derive(Debug)]
pub struct Unseekable<R> {
    inner: R,
}

impl<R> Unseekable<R> {
    pub fn new(inner: R) -> Self {
        Unseekable { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for Unseekable<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl<R: AsyncRead + Unpin + Send> StreamSource for Unseekable<R> {}
