//! Content equality for byte streams and files, without reading either side into
//! memory.
//!
//! [`StreamComparer`] reads two [`StreamSource`]s through a pair of fixed-size
//! buffers and copes with sources that hand back different amounts of data per
//! read. [`FileComparer`] adds path handling on top: same-path and size
//! short-circuits, then a stream comparison of the opened files. The
//! [`directories`] module builds tree comparisons out of file comparisons.

pub mod directories;
pub mod error;
pub mod files;
pub mod range;
pub mod source;
pub mod stream;

pub use error::{CompareError, Result, Side};
pub use files::FileComparer;
pub use range::range_equal;
pub use source::{StreamSource, Unseekable};
pub use stream::{LengthCompare, StreamComparer, DEFAULT_BUFFER_SIZE};
pub use tokio_util::sync::CancellationToken;
