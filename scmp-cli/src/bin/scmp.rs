//! Tell whether two files, or a file and stdin, have the same contents.
//!
//! ```text
//! $ scmp backup/disk.img live/disk.img
//! differ
//! $ gunzip -c disk.img.gz | scmp disk.img -
//! equal
//! ```
//!
//! Exit status is 0 when the contents are equal, 1 when they differ, 2 on error and
//! 130 when interrupted.

use std::process;

use scmp_cli::{
    buffer_size, cancel_on_ctrl_c, compare_operands, exit_code, get_matches_or_exit, logging,
    scmp_app,
};
use scmp_core::CompareError;

#[tokio::main]
async fn main() {
    let args = get_matches_or_exit(scmp_app());

    if let Err(e) = logging::init_logging(args.occurrences_of("verbose")) {
        eprintln!("warning: could not set up logging: {}", e);
    }

    let (path1, path2) = (
        args.value_of("path1").unwrap(),
        args.value_of("path2").unwrap(),
    );
    let cancel = cancel_on_ctrl_c();

    let outcome =
        compare_operands(path1, path2, buffer_size(&args), tokio::io::stdin(), &cancel).await;
    match &outcome {
        Ok(true) => println!("equal"),
        Ok(false) => println!("differ"),
        Err(CompareError::Cancelled) => eprintln!("interrupted"),
        Err(e) => eprintln!("error: {}", e),
    }
    // Exit without waiting on the runtime, which may still be blocked reading stdin.
    process::exit(exit_code(&outcome));
}
