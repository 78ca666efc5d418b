//! Buffered equality check over two independent byte sources.
//!
//! [`StreamComparer`] owns two fixed-size buffers and reads both sources in
//! lockstep. The sources are free to return short reads: whenever one side
//! produces fewer bytes than the other, the lagging side is read again until it
//! has covered everything the leading side already produced, so both sides are
//! back at the same offset before the next paired read.

use std::{cmp::Ordering, future::Future};

use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    error::{CompareError, Result, Side},
    range::range_equal,
    source::StreamSource,
};

pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Whether to compare source lengths before reading any content.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LengthCompare {
    /// Compare lengths only when both sources report `can_seek()`.
    #[default]
    Auto,
    /// Always query both lengths, even if a source claims it cannot seek.
    Always,
    /// Never query lengths.
    Never,
}

impl LengthCompare {
    // Seekability is only a proxy: a source may know its length without being
    // seekable. `Always` exists for callers who know better.
    fn should_query(self, a_can_seek: bool, b_can_seek: bool) -> bool {
        match self {
            LengthCompare::Auto => a_can_seek && b_can_seek,
            LengthCompare::Always => true,
            LengthCompare::Never => false,
        }
    }
}

impl From<Option<bool>> for LengthCompare {
    fn from(force: Option<bool>) -> Self {
        match force {
            None => LengthCompare::Auto,
            Some(true) => LengthCompare::Always,
            Some(false) => LengthCompare::Never,
        }
    }
}

/// Progress of the two sources within one outer iteration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Alignment {
    /// Both sides have produced the same number of bytes.
    Aligned,
    /// `lagging` still owes `remaining` bytes to match what the other side read.
    CatchingUp { lagging: Side, remaining: usize },
}

impl Alignment {
    pub(crate) fn after_reads(read_a: usize, read_b: usize) -> Alignment {
        match read_a.cmp(&read_b) {
            Ordering::Equal => Alignment::Aligned,
            Ordering::Less => Alignment::CatchingUp {
                lagging: Side::A,
                remaining: read_b - read_a,
            },
            Ordering::Greater => Alignment::CatchingUp {
                lagging: Side::B,
                remaining: read_a - read_b,
            },
        }
    }

    /// State after the lagging side supplied `supplied` more matching bytes.
    pub(crate) fn advance(self, supplied: usize) -> Alignment {
        match self {
            Alignment::Aligned => {
                debug_assert_eq!(supplied, 0, "aligned sources owe nothing");
                Alignment::Aligned
            }
            Alignment::CatchingUp { lagging, remaining } => {
                debug_assert!(supplied <= remaining, "read past the unmatched region");
                match remaining - supplied {
                    0 => Alignment::Aligned,
                    remaining => Alignment::CatchingUp { lagging, remaining },
                }
            }
        }
    }
}

/// Compares two byte sources for equal content.
///
/// Both buffers are allocated once, at construction, and reused by every call.
/// A comparer takes `&mut self`, so a single instance cannot run two comparisons
/// at the same time; use one instance per concurrent comparison.
///
/// ```
/// use scmp_core::{LengthCompare, StreamComparer};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> scmp_core::Result<()> {
/// let mut comparer = StreamComparer::new();
/// let mut a: &[u8] = b"same bytes";
/// let mut b: &[u8] = b"same bytes";
/// assert!(comparer.are_equal(&mut a, &mut b, LengthCompare::Auto).await?);
/// # Ok(())
/// # }
/// ```
///
/// Both sources are borrowed mutably, so the same handle can never be compared
/// against itself; reading one side would otherwise move the other:
///
/// ```compile_fail
/// use scmp_core::{LengthCompare, StreamComparer};
///
/// # async fn demo() -> scmp_core::Result<()> {
/// let mut comparer = StreamComparer::new();
/// let mut src: &[u8] = b"one handle";
/// comparer.are_equal(&mut src, &mut src, LengthCompare::Auto).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StreamComparer {
    buffer_size: usize,
    buf_a: Box<[u8]>,
    buf_b: Box<[u8]>,
}

impl Default for StreamComparer {
    fn default() -> Self {
        StreamComparer::new()
    }
}

impl StreamComparer {
    pub fn new() -> Self {
        StreamComparer::allocate(DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(buffer_size: usize) -> Result<Self> {
        if buffer_size == 0 {
            return Err(CompareError::InvalidBufferSize);
        }
        Ok(StreamComparer::allocate(buffer_size))
    }

    fn allocate(buffer_size: usize) -> Self {
        StreamComparer {
            buffer_size,
            buf_a: vec![0; buffer_size].into_boxed_slice(),
            buf_b: vec![0; buffer_size].into_boxed_slice(),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Returns `Ok(true)` if `a` and `b` yield the same bytes until both are exhausted.
    ///
    /// Reading starts at each source's current position and consumes the sources;
    /// they are left wherever the comparison stopped.
    pub async fn are_equal<A, B>(
        &mut self,
        a: &mut A,
        b: &mut B,
        length_compare: LengthCompare,
    ) -> Result<bool>
    where
        A: StreamSource + ?Sized,
        B: StreamSource + ?Sized,
    {
        self.compare(a, b, None, length_compare).await
    }

    /// Like [`are_equal`](StreamComparer::are_equal), but gives up with
    /// [`CompareError::Cancelled`] as soon as `cancel` is triggered.
    ///
    /// The token is observed while waiting on reads and length queries. A token that
    /// is already triggered aborts the call before anything is read.
    pub async fn are_equal_with_cancel<A, B>(
        &mut self,
        a: &mut A,
        b: &mut B,
        cancel: &CancellationToken,
        length_compare: LengthCompare,
    ) -> Result<bool>
    where
        A: StreamSource + ?Sized,
        B: StreamSource + ?Sized,
    {
        self.compare(a, b, Some(cancel), length_compare).await
    }

    async fn compare<A, B>(
        &mut self,
        a: &mut A,
        b: &mut B,
        cancel: Option<&CancellationToken>,
        length_compare: LengthCompare,
    ) -> Result<bool>
    where
        A: StreamSource + ?Sized,
        B: StreamSource + ?Sized,
    {
        debug!(buffer_size = self.buffer_size, ?length_compare, "comparing streams");
        let lengths_compared = length_compare.should_query(a.can_seek(), b.can_seek());
        if lengths_compared {
            let (len_a, len_b) = cancellable(cancel, async { tokio::join!(a.length(), b.length()) }).await?;
            let len_a = len_a.map_err(|source| CompareError::Length { side: Side::A, source })?;
            let len_b = len_b.map_err(|source| CompareError::Length { side: Side::B, source })?;
            if len_a != len_b {
                debug!(len_a, len_b, "source lengths differ");
                return Ok(false);
            }
        }

        let StreamComparer { buf_a, buf_b, .. } = self;
        let (mut offset_a, mut offset_b) = (0u64, 0u64);
        let mut previous_offset = None;

        loop {
            debug_assert_eq!(offset_a, offset_b, "outer iteration started misaligned");
            debug_assert_ne!(previous_offset, Some(offset_a), "outer iteration made no progress");
            previous_offset = Some(offset_a);

            let (read_a, read_b) = cancellable(cancel, async {
                tokio::join!(a.read(&mut buf_a[..]), b.read(&mut buf_b[..]))
            })
            .await?;
            let read_a = read_a.map_err(|source| CompareError::Read { side: Side::A, source })?;
            let read_b = read_b.map_err(|source| CompareError::Read { side: Side::B, source })?;
            trace!(offset = offset_a, read_a, read_b, "paired read");

            if read_a == 0 && read_b == 0 {
                return Ok(true);
            }

            let shared = read_a.min(read_b);
            if !range_equal(&buf_a[..], 0, &buf_b[..], 0, shared) {
                debug!(offset = offset_a, "content differs");
                return Ok(false);
            }
            offset_a += read_a as u64;
            offset_b += read_b as u64;

            let lead_len = read_a.max(read_b);
            let mut compared = shared;
            let mut state = Alignment::after_reads(read_a, read_b);

            while let Alignment::CatchingUp { lagging, remaining } = state {
                let supplied = match lagging {
                    Side::A => read_side(a, &mut buf_a[..remaining], Side::A, cancel).await?,
                    Side::B => read_side(b, &mut buf_b[..remaining], Side::B, cancel).await?,
                };
                trace!(side = %lagging, remaining, supplied, "catch-up read");

                if supplied == 0 {
                    debug_assert!(
                        !lengths_compared,
                        "source ended early although both reported the same length"
                    );
                    debug!(shorter = %lagging, longer = %lagging.other(), "source ended early");
                    return Ok(false);
                }

                let (lag_buf, lead_buf) = match lagging {
                    Side::A => (&buf_a[..], &buf_b[..]),
                    Side::B => (&buf_b[..], &buf_a[..]),
                };
                if !range_equal(lag_buf, 0, lead_buf, lead_len - remaining, supplied) {
                    debug!(offset = offset_a.min(offset_b), "content differs");
                    return Ok(false);
                }

                match lagging {
                    Side::A => offset_a += supplied as u64,
                    Side::B => offset_b += supplied as u64,
                }
                compared += supplied;
                state = state.advance(supplied);
            }

            debug_assert_eq!(compared, lead_len);
        }
    }
}

async fn read_side<S>(
    src: &mut S,
    buf: &mut [u8],
    side: Side,
    cancel: Option<&CancellationToken>,
) -> Result<usize>
where
    S: StreamSource + ?Sized,
{
    cancellable(cancel, src.read(buf))
        .await?
        .map_err(|source| CompareError::Read { side, source })
}

/// Awaits `fut` unless `cancel` fires first. An already-triggered token wins without
/// polling `fut`.
async fn cancellable<F: Future>(cancel: Option<&CancellationToken>, fut: F) -> Result<F::Output> {
    match cancel {
        None => Ok(fut.await),
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(CompareError::Cancelled),
            out = fut => Ok(out),
        },
    }
}
