mod cli;

use std::io::{self, Write};
use std::process::ExitCode;

use sline::terminal::is_tty;
use sline::{ByteSource, Error, LineBuffer, ReaderSource, Result, Session};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::CliArgs;

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("sline: {e}");
            eprintln!(
                "Usage: sline [-n] [-v] [-H<entries>] [-s<entry-size>] [-b<buffer-size>] [-p<prompt>] [-i<initial>]"
            );
            return ExitCode::FAILURE;
        }
    };

    if args.version {
        println!("sline version {}", sline::version());
        return ExitCode::SUCCESS;
    }

    init_logging();

    // Allocated before raw mode is entered.
    let line = match LineBuffer::try_new(args.buffer_size) {
        Ok(l) => l,
        Err(e) => {
            tracing::debug!(error = %e, size = args.buffer_size, "line buffer allocation failed");
            eprintln!("sline: {}", e.kind().message());
            return ExitCode::FAILURE;
        }
    };

    let config = args.config();
    if is_tty(libc::STDIN_FILENO) {
        run(Session::setup(config), line, &args)
    } else {
        // Piped input: no raw mode, plain blocking reads.
        let input = ReaderSource::new(io::stdin().lock());
        run(Session::with_io(config, input, io::stdout()), line, &args)
    }
}

/// Read lines until end of input, echoing each one back.
fn run<S: ByteSource, W: Write>(
    session: Result<Session<S, W>>,
    mut line: LineBuffer,
    args: &CliArgs,
) -> ExitCode {
    let mut session = match session {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(error = %e, "setup failed");
            eprintln!("sline: {}", e.kind().message());
            return ExitCode::FAILURE;
        }
    };

    let mut status = ExitCode::SUCCESS;
    for count in 0usize.. {
        match &args.prompt {
            Some(p) => session.set_prompt(p),
            None => session.set_prompt(format_args!("{count}> ")),
        }
        match session.read_line(&mut line, args.initial.as_deref()) {
            Ok(text) => println!("Input was: {text}"),
            Err(Error::EndOfInput) => break,
            Err(e) => {
                tracing::debug!(error = %e, "read failed");
                eprintln!("sline: {}", session.error_message());
                status = ExitCode::FAILURE;
                break;
            }
        }
    }

    if let Err(e) = session.end() {
        eprintln!("sline: {}", e.kind().message());
        status = ExitCode::FAILURE;
    }
    status
}

/// Log to stderr at `RUST_LOG` level (default `warn`), or to
/// `$SLINE_LOG/sline.log` when that directory is given so log lines do not
/// land in the middle of the edited line.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match std::env::var_os("SLINE_LOG") {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, "sline.log");
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(appender).with_ansi(false).with_target(true))
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    }
}
