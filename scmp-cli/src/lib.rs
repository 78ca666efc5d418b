//! Pieces shared by the `scmp` binaries.

use std::process;

use clap::{App, Arg, ArgMatches, ErrorKind};
use tokio::{fs::File, io::AsyncRead};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use scmp_core::{
    CompareError, FileComparer, LengthCompare, StreamComparer, Unseekable, DEFAULT_BUFFER_SIZE,
};

pub mod logging;

/// Operand that stands for standard input.
pub const STDIN: &str = "-";

pub const EXIT_EQUAL: i32 = 0;
pub const EXIT_DIFFER: i32 = 1;
pub const EXIT_ERROR: i32 = 2;
/// Exit status for a run interrupted with Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;

pub fn scmp_app<'a, 'b>() -> App<'a, 'b> {
    App::new("scmp")
        .about("Compares the contents of two files; use - to read one side from stdin")
        .arg(verbose_arg())
        .arg(buffer_size_arg())
        .arg(Arg::with_name("path1").required(true).takes_value(true))
        .arg(Arg::with_name("path2").required(true).takes_value(true))
}

/// Parses the command line, exiting with [`EXIT_ERROR`] on a usage error.
///
/// Help and version output keep clap's own exit.
pub fn get_matches_or_exit<'a>(app: App<'a, '_>) -> ArgMatches<'a> {
    match app.get_matches_safe() {
        Ok(args) => args,
        Err(e) => match usage_exit_code(e.kind) {
            None => e.exit(),
            Some(code) => {
                eprintln!("{}", e.message);
                process::exit(code);
            }
        },
    }
}

/// Exit status for a failed parse, or `None` when clap printed help or version.
pub fn usage_exit_code(kind: ErrorKind) -> Option<i32> {
    match kind {
        ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => None,
        _ => Some(EXIT_ERROR),
    }
}

/// Exit status for the outcome of a comparison.
pub fn exit_code(outcome: &Result<bool, CompareError>) -> i32 {
    match outcome {
        Ok(true) => EXIT_EQUAL,
        Ok(false) => EXIT_DIFFER,
        Err(CompareError::Cancelled) => EXIT_INTERRUPTED,
        Err(_) => EXIT_ERROR,
    }
}

/// Compares two operands, either of which may be [`STDIN`].
///
/// A stdin operand reads from `stdin`, which is never asked for its length. Two
/// stdin operands are equal without reading anything.
pub async fn compare_operands<R>(
    path1: &str,
    path2: &str,
    buffer_size: usize,
    stdin: R,
    cancel: &CancellationToken,
) -> Result<bool, CompareError>
where
    R: AsyncRead + Unpin + Send,
{
    match (path1 == STDIN, path2 == STDIN) {
        (false, false) => {
            FileComparer::with_buffer_size(buffer_size)?
                .are_equal_with_cancel(path1, path2, cancel)
                .await
        }
        (true, true) => {
            debug!("both operands are stdin");
            Ok(true)
        }
        (stdin_first, _) => {
            let path = if stdin_first { path2 } else { path1 };
            let mut comparer = StreamComparer::with_buffer_size(buffer_size)?;
            let mut file = File::open(path).await?;
            let mut stdin = Unseekable::new(stdin);

            if stdin_first {
                comparer
                    .are_equal_with_cancel(&mut stdin, &mut file, cancel, LengthCompare::Auto)
                    .await
            } else {
                comparer
                    .are_equal_with_cancel(&mut file, &mut stdin, cancel, LengthCompare::Auto)
                    .await
            }
        }
    }
}

pub fn verbose_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("verbose")
        .short("v")
        .multiple(true)
        .help("Log more (repeat for debug and trace output)")
}

pub fn buffer_size_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("buffer-size")
        .long("buffer-size")
        .short("b")
        .takes_value(true)
        .env("SCMP_BUFFER_SIZE")
        .validator(|value| match value.parse::<usize>() {
            Ok(0) => Err("buffer size must be greater than zero".to_string()),
            Ok(_) => Ok(()),
            Err(e) => Err(format!("invalid buffer size: {}", e)),
        })
        .help("Bytes read per source at a time")
}

/// The validated `--buffer-size`, or the library default.
pub fn buffer_size(args: &ArgMatches<'_>) -> usize {
    args.value_of("buffer-size")
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_BUFFER_SIZE)
}

/// A token that fires on Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            trigger.cancel();
        }
    });
    cancel
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io,
        pin::Pin,
        task::{Context, Poll},
    };
    use tokio::io::ReadBuf;

    /// Stdin stand-in that fails the test if it is ever read.
    struct Untouched;

    impl AsyncRead for Untouched {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            panic!("stdin was read");
        }
    }

    fn file_with(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        io::Write::write_all(&mut file, contents).unwrap();
        file
    }

    async fn run(path1: &str, path2: &str, buffer_size: usize, stdin: &[u8]) -> i32 {
        let cancel = CancellationToken::new();
        exit_code(&compare_operands(path1, path2, buffer_size, stdin, &cancel).await)
    }

    fn parse(argv: &[&str]) -> Result<usize, clap::Error> {
        App::new("test")
            .arg(buffer_size_arg())
            .get_matches_from_safe(argv)
            .map(|args| buffer_size(&args))
    }

    #[test]
    fn buffer_size_flag() {
        assert_eq!(parse(&["test", "--buffer-size", "512"]).unwrap(), 512);
        assert_eq!(parse(&["test", "-b", "7"]).unwrap(), 7);
        assert!(parse(&["test", "--buffer-size", "0"]).is_err());
        assert!(parse(&["test", "--buffer-size", "lots"]).is_err());
    }

    #[test]
    fn usage_errors_exit_with_error_status() {
        let bad_size = scmp_app()
            .get_matches_from_safe(&["scmp", "-b", "0", "a", "b"])
            .unwrap_err();
        assert_eq!(usage_exit_code(bad_size.kind), Some(EXIT_ERROR));

        let missing_operand = scmp_app().get_matches_from_safe(&["scmp", "a"]).unwrap_err();
        assert_eq!(usage_exit_code(missing_operand.kind), Some(EXIT_ERROR));

        let help = scmp_app().get_matches_from_safe(&["scmp", "--help"]).unwrap_err();
        assert_eq!(usage_exit_code(help.kind), None);
    }

    #[test]
    fn outcome_exit_codes() {
        assert_eq!(exit_code(&Ok(true)), 0);
        assert_eq!(exit_code(&Ok(false)), 1);
        assert_eq!(exit_code(&Err(CompareError::InvalidBufferSize)), 2);
        assert_eq!(exit_code(&Err(CompareError::Cancelled)), 130);
    }

    #[tokio::test]
    async fn two_files() {
        let (a, b, c) = (file_with(b"alpha"), file_with(b"alpha"), file_with(b"alphb"));
        let (a, b, c) = (
            a.path().to_str().unwrap(),
            b.path().to_str().unwrap(),
            c.path().to_str().unwrap(),
        );
        assert_eq!(run(a, b, 4, b"").await, EXIT_EQUAL);
        assert_eq!(run(a, c, 4, b"").await, EXIT_DIFFER);
    }

    #[tokio::test]
    async fn stdin_on_either_side() {
        let file = file_with(b"piped contents");
        let path = file.path().to_str().unwrap();

        assert_eq!(run(path, STDIN, 3, b"piped contents").await, EXIT_EQUAL);
        assert_eq!(run(STDIN, path, 3, b"piped contents").await, EXIT_EQUAL);
        assert_eq!(run(path, STDIN, 3, b"piped content").await, EXIT_DIFFER);
        assert_eq!(run(STDIN, path, 3, b"piped contentz").await, EXIT_DIFFER);
    }

    #[tokio::test]
    async fn stdin_against_itself_reads_nothing() {
        let cancel = CancellationToken::new();
        let equal = compare_operands(STDIN, STDIN, 4096, Untouched, &cancel).await.unwrap();
        assert!(equal);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let present = file_with(b"data");
        let (present, absent) = (
            present.path().to_str().unwrap().to_string(),
            dir.path().join("absent").to_str().unwrap().to_string(),
        );
        assert_eq!(run(&present, &absent, 4096, b"").await, EXIT_ERROR);
        assert_eq!(run(&absent, STDIN, 4096, b"data").await, EXIT_ERROR);
    }

    #[tokio::test]
    async fn zero_buffer_size_is_an_error() {
        let (a, b) = (file_with(b"x"), file_with(b"x"));
        let (a, b) = (a.path().to_str().unwrap(), b.path().to_str().unwrap());
        assert_eq!(run(a, b, 0, b"").await, EXIT_ERROR);
        assert_eq!(run(a, STDIN, 0, b"x").await, EXIT_ERROR);
    }
}
