use std::{
    cmp::Ordering,
    io,
    path::{Path, PathBuf},
};

use itertools::{EitherOrBoth, Itertools};
use thiserror::Error;
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::{error::CompareError, files::FileComparer};

#[derive(Error, Debug)]
pub enum DirError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("failed while walking directories: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Compare(#[from] CompareError),
}

impl DirError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DirError::Compare(e) if e.is_cancelled())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TreeDiff {
    /// Only present under the first directory.
    Left(PathBuf),
    /// Only present under the second directory.
    Right(PathBuf),
    Matches(PathBuf, PathBuf),
    Differs(PathBuf, PathBuf),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiffResult {
    Equal,
    NotEqual,
}

/// Pairs up the entries found exactly `depth` levels below `dir1` and `dir2` and
/// classifies each pair.
///
/// Paired directories are compared recursively with [`diff_dirs`], paired files by
/// content. Results come out sorted by relative path.
pub async fn diff_trees<P1: AsRef<Path>, P2: AsRef<Path>>(
    comparer: &mut FileComparer,
    dir1: P1,
    dir2: P2,
    depth: usize,
    cancel: &CancellationToken,
) -> Result<Vec<TreeDiff>, DirError> {
    let entries1 = walk(dir1.as_ref(), depth, depth)?;
    let entries2 = walk(dir2.as_ref(), depth, depth)?;

    let mut diffs = Vec::with_capacity(entries1.len().max(entries2.len()));
    for pair in entries1
        .iter()
        .merge_join_by(entries2.iter(), |a, b| a.0.cmp(&b.0))
    {
        let diff = match pair {
            EitherOrBoth::Left((_, de)) => TreeDiff::Left(de.path().to_path_buf()),
            EitherOrBoth::Right((_, de)) => TreeDiff::Right(de.path().to_path_buf()),
            EitherOrBoth::Both((_, de1), (_, de2)) => {
                let equal = if de1.file_type().is_dir() && de2.file_type().is_dir() {
                    diff_dirs(comparer, de1.path(), de2.path(), cancel).await? == DiffResult::Equal
                } else {
                    entries_equal(comparer, de1, de2, cancel).await?
                };
                let (p1, p2) = (de1.path().to_path_buf(), de2.path().to_path_buf());
                if equal {
                    TreeDiff::Matches(p1, p2)
                } else {
                    TreeDiff::Differs(p1, p2)
                }
            }
        };
        diffs.push(diff);
    }
    Ok(diffs)
}

/// Compares two directory trees: same relative paths, same entry types, same file
/// contents and same symlink targets.
pub async fn diff_dirs<P1: AsRef<Path>, P2: AsRef<Path>>(
    comparer: &mut FileComparer,
    dir1: P1,
    dir2: P2,
    cancel: &CancellationToken,
) -> Result<DiffResult, DirError> {
    let entries1 = walk(dir1.as_ref(), 0, usize::MAX)?;
    let entries2 = walk(dir2.as_ref(), 0, usize::MAX)?;

    for pair in entries1
        .iter()
        .merge_join_by(entries2.iter(), |a, b| a.0.cmp(&b.0))
    {
        if cancel.is_cancelled() {
            return Err(CompareError::Cancelled.into());
        }
        match pair {
            EitherOrBoth::Both((_, de1), (_, de2)) => {
                if !entries_equal(comparer, de1, de2, cancel).await? {
                    debug!(path = %de1.path().display(), "entries differ");
                    return Ok(DiffResult::NotEqual);
                }
            }
            EitherOrBoth::Left((rel, _)) | EitherOrBoth::Right((rel, _)) => {
                debug!(path = %rel.display(), "entry exists on one side only");
                return Ok(DiffResult::NotEqual);
            }
        }
    }
    Ok(DiffResult::Equal)
}

async fn entries_equal(
    comparer: &mut FileComparer,
    de1: &DirEntry,
    de2: &DirEntry,
    cancel: &CancellationToken,
) -> Result<bool, DirError> {
    let (ty1, ty2) = (de1.file_type(), de2.file_type());
    if ty1 != ty2 {
        return Ok(false);
    }
    if ty1.is_file() {
        return Ok(comparer
            .are_equal_with_cancel(de1.path(), de2.path(), cancel)
            .await?);
    }
    if ty1.is_symlink() {
        let (target1, target2) =
            tokio::try_join!(fs::read_link(de1.path()), fs::read_link(de2.path()))?;
        return Ok(target1 == target2);
    }
    Ok(true)
}

/// Walks `root` between the given depths, pairing every entry with its path relative
/// to `root`.
///
/// Siblings are visited in file name order, so the walk order is also the order of
/// the relative paths; the merges above rely on that.
fn walk(
    root: &Path,
    min_depth: usize,
    max_depth: usize,
) -> Result<Vec<(PathBuf, DirEntry)>, walkdir::Error> {
    WalkDir::new(root)
        .min_depth(min_depth)
        .max_depth(max_depth)
        .sort_by(file_name_cmp)
        .into_iter()
        .map(|entry| {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or_else(|_| entry.path())
                .to_path_buf();
            Ok((relative, entry))
        })
        .collect()
}

fn file_name_cmp(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_name().cmp(b.file_name())
}
