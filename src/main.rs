//! Reverie binary.
//!
//! ```text
//! reverie [config.json] [--snapshot out.png [frames]]
//! ```
//!
//! Without `--snapshot` the scene runs in a window. With it, `frames`
//! simulated frames (default 120) are rendered on the CPU and saved.
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::process::ExitCode;

use reverie::app;
use reverie::config::ReverieConfig;
use reverie::error::AppError;
use tracing_subscriber::EnvFilter;

const DEFAULT_SNAPSHOT_FRAMES: u32 = 120;

struct Args {
    config: Option<PathBuf>,
    snapshot: Option<(PathBuf, u32)>,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Args, AppError> {
    let mut parsed = Args {
        config: None,
        snapshot: None,
    };
    let mut args = args.peekable();

    while let Some(arg) = args.next() {
        if arg == "--snapshot" {
            let path = args
                .next()
                .ok_or_else(|| AppError::Usage("--snapshot needs an output path".into()))?;
            let frames = match args.peek().and_then(|next| next.parse::<u32>().ok()) {
                Some(frames) => {
                    args.next();
                    frames
                }
                None => DEFAULT_SNAPSHOT_FRAMES,
            };
            parsed.snapshot = Some((PathBuf::from(path), frames));
        } else if parsed.config.is_none() {
            parsed.config = Some(PathBuf::from(arg));
        } else {
            return Err(AppError::Usage(format!("unexpected argument '{arg}'")));
        }
    }

    Ok(parsed)
}

fn try_main() -> Result<(), AppError> {
    let args = parse_args(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => ReverieConfig::from_file(path)?,
        None => ReverieConfig::default(),
    };

    match args.snapshot {
        Some((path, frames)) => app::run_snapshot(&config, &path, frames),
        None => app::run(config),
    }
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
