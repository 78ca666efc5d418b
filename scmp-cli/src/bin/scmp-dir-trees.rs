//! Diff directories of directories, finding shared entries at depth one.
//!
//! # Use Case
//! You have a backup directory containing a set of projects and you have a "live" directory
//! containing possibly-modified versions of the same projects. You want to know which projects
//! differ from the backup. Also, you want to know which projects are no longer present.
//!
//! ```text
//! backup/
//!   project-1/
//!     README.txt
//!   project-2/
//!     README.txt
//!   project-3/
//!     README.txt
//! live/
//!   project-1/
//!     README.txt
//!   project-2/
//!     SOMETHING-ELSE.txt
//!   project-4/
//!     README.txt
//! ```
//! ```text
//! $ scmp-dir-trees ./backup ./live
//! ./backup     -------    ./live
//! project-1    MATCHES    project-1
//! project-2    DIFFERS    project-2
//! project-3  < ONLY IN
//!              ONLY IN >  project-4
//! ```

use std::borrow::Cow;
use std::path::Path;
use std::process;

use clap::{App, Arg};

use scmp_cli::{
    buffer_size, buffer_size_arg, cancel_on_ctrl_c, get_matches_or_exit, logging, verbose_arg,
    EXIT_ERROR, EXIT_INTERRUPTED,
};
use scmp_core::directories::{self, TreeDiff};
use scmp_core::FileComparer;

#[tokio::main]
async fn main() {
    let args = get_matches_or_exit(
        App::new("scmp-dir-trees")
            .arg(verbose_arg())
            .arg(buffer_size_arg())
            .arg(Arg::with_name("dir1").required(true).takes_value(true))
            .arg(Arg::with_name("dir2").required(true).takes_value(true)),
    );

    if let Err(e) = logging::init_logging(args.occurrences_of("verbose")) {
        eprintln!("warning: could not set up logging: {}", e);
    }

    let (path1, path2) = (
        Path::new(args.value_of("dir1").unwrap()),
        Path::new(args.value_of("dir2").unwrap()),
    );
    let mut comparer = match FileComparer::with_buffer_size(buffer_size(&args)) {
        Ok(comparer) => comparer,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(EXIT_ERROR);
        }
    };
    let cancel = cancel_on_ctrl_c();

    let diffs = match directories::diff_trees(&mut comparer, path1, path2, 1, &cancel).await {
        Ok(diffs) => diffs,
        // Partial results are not reliable, so nothing is printed.
        Err(e) => {
            println!("ERROR: Encountered an error while scanning directories:");
            println!("  {}", e);
            println!("Aborting directory scan.");
            process::exit(if e.is_cancelled() { EXIT_INTERRUPTED } else { EXIT_ERROR });
        }
    };

    // For pretty table formatting, we need to know the length of the longest name.
    let col_width = diffs
        .iter()
        .flat_map(|td| match td {
            TreeDiff::Left(p) | TreeDiff::Right(p) => vec![p],
            TreeDiff::Matches(l, r) | TreeDiff::Differs(l, r) => vec![l, r],
        })
        .map(|p| name(p).chars().count())
        .chain([
            path1.display().to_string().chars().count(),
            path2.display().to_string().chars().count(),
        ])
        .max()
        .unwrap_or(0);

    println!(
        "{1:0$}    -------    {2:0$}",
        col_width,
        path1.display(),
        path2.display()
    );
    for td in &diffs {
        println!("{}", display_tree_diff(td, col_width));
    }
}

fn name(path: &Path) -> Cow<'_, str> {
    match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => path.to_string_lossy(),
    }
}

fn display_tree_diff(td: &TreeDiff, width: usize) -> String {
    let empty = Cow::Borrowed("");
    let (l, c, r) = match td {
        TreeDiff::Differs(l, r) => (name(l), "  DIFFERS  ", name(r)),
        TreeDiff::Matches(l, r) => (name(l), "  MATCHES  ", name(r)),
        TreeDiff::Left(l) => (name(l), "< ONLY IN  ", empty),
        TreeDiff::Right(r) => (empty, "  ONLY IN >", name(r)),
    };
    format!("{1:0$}  {2}  {3:0$}", width, l, c, r)
}
