use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use signal_hook::consts::TERM_SIGNALS;
use signal_hook::flag;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tailer::{
    DEFAULT_LINES, DEFAULT_READ_SIZE, DecodePolicy, Decoder, FollowOptions, follow_path, head, tail,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tailer", version, about = "Print the last or first lines of a file, and follow it as it grows")]
struct Cli {
    /// Output the last COUNT lines, instead of the last 10
    #[arg(short = 'n', long = "lines", value_name = "COUNT", default_value_t = DEFAULT_LINES)]
    lines: usize,

    /// Output lines from the top instead of the bottom; does not work with follow
    #[arg(short = 't', long = "top")]
    top: bool,

    /// Output appended data as the file grows
    #[arg(short = 'f', long = "follow")]
    follow: bool,

    /// With -f, sleep for approximately DELAY seconds between iterations
    #[arg(short = 's', long = "sleep-interval", value_name = "DELAY", default_value_t = 1.0)]
    sleep_interval: f64,

    /// Path to file
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let Some(path) = cli.file.as_deref() else {
        let _ = Cli::command().print_help();
        return ExitCode::from(1);
    };

    if cli.top && cli.follow {
        eprintln!("Cannot follow from top of file.");
        return ExitCode::from(1);
    }

    match run(&cli, path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tailer: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: &Cli, path: &Path) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.lines > 0 {
        let mut file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let lines = if cli.top {
            head(&mut file, cli.lines, DEFAULT_READ_SIZE)?
        } else {
            tail(&mut file, cli.lines, DEFAULT_READ_SIZE)?
        };

        let decoder = Decoder::new(encoding_rs::UTF_8, DecodePolicy::Replace);
        for line in lines {
            writeln!(out, "{}", decoder.decode(&line)?)?;
        }
        out.flush()?;
    }

    if cli.follow {
        let delay = Duration::try_from_secs_f64(cli.sleep_interval)
            .with_context(|| format!("invalid sleep interval: {}", cli.sleep_interval))?;
        let interrupted = setup_interrupt_flag()?;

        let options = FollowOptions::default()
            .delay(delay)
            .decode_policy(DecodePolicy::Replace);
        let follower = follow_path(path, options)?.on_delay(move || interrupted.load(Ordering::SeqCst));

        for line in follower {
            writeln!(out, "{}", line?)?;
            out.flush()?;
        }
    }

    Ok(())
}

/// An interrupt ends following quietly; a second one exits at once.
fn setup_interrupt_flag() -> Result<Arc<AtomicBool>> {
    let interrupted = Arc::new(AtomicBool::new(false));

    for sig in TERM_SIGNALS {
        flag::register_conditional_shutdown(*sig, 0, Arc::clone(&interrupted))?;
        flag::register(*sig, Arc::clone(&interrupted))?;
    }

    Ok(interrupted)
}
