use std::{
    env, io,
    path::{Component, Path, PathBuf},
};

use tokio::fs::{self, File};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    error::Result,
    stream::{LengthCompare, StreamComparer},
};

/// Compares files by path.
///
/// Wraps a [`StreamComparer`], so the same buffer rules apply: one comparer per
/// concurrent comparison.
#[derive(Debug, Default)]
pub struct FileComparer {
    comparer: StreamComparer,
}

impl FileComparer {
    pub fn new() -> Self {
        FileComparer {
            comparer: StreamComparer::new(),
        }
    }

    pub fn with_buffer_size(buffer_size: usize) -> Result<Self> {
        Ok(FileComparer {
            comparer: StreamComparer::with_buffer_size(buffer_size)?,
        })
    }

    pub fn buffer_size(&self) -> usize {
        self.comparer.buffer_size()
    }

    pub async fn are_equal<P1: AsRef<Path>, P2: AsRef<Path>>(
        &mut self,
        file1: P1,
        file2: P2,
    ) -> Result<bool> {
        self.compare(file1.as_ref(), file2.as_ref(), None).await
    }

    pub async fn are_equal_with_cancel<P1: AsRef<Path>, P2: AsRef<Path>>(
        &mut self,
        file1: P1,
        file2: P2,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        self.compare(file1.as_ref(), file2.as_ref(), Some(cancel)).await
    }

    async fn compare(
        &mut self,
        file1: &Path,
        file2: &Path,
        cancel: Option<&CancellationToken>,
    ) -> Result<bool> {
        debug!(file1 = %file1.display(), file2 = %file2.display(), "comparing files");
        let (file1, file2) = (absolute(file1)?, absolute(file2)?);
        if file1 == file2 {
            debug!("both paths name the same file");
            return Ok(true);
        }

        // If file lengths differ, the file contents differ.
        let (meta1, meta2) = tokio::try_join!(fs::metadata(&file1), fs::metadata(&file2))?;
        if meta1.len() != meta2.len() {
            debug!(len1 = meta1.len(), len2 = meta2.len(), "file lengths differ");
            return Ok(false);
        }

        // Both handles close when they drop, whichever way we leave.
        let (mut f1, mut f2) = tokio::try_join!(File::open(&file1), File::open(&file2))?;
        match cancel {
            Some(token) => {
                self.comparer
                    .are_equal_with_cancel(&mut f1, &mut f2, token, LengthCompare::Never)
                    .await
            }
            None => {
                self.comparer
                    .are_equal(&mut f1, &mut f2, LengthCompare::Never)
                    .await
            }
        }
    }
}

/// Makes `path` absolute and folds `.` and `..` components lexically.
///
/// Only the current directory is consulted; `path` itself need not exist.
/// Symlinks are not resolved, so `x/link/../b` folds to `x/b` even when `link`
/// points elsewhere, and two such spellings compare equal without any I/O.
pub(crate) fn absolute(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
