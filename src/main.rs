//! CLI front-end: a positional target, `--method`, `--no-verify`,
//! `--cert-out`, and a supplemental `list-drives` subcommand. SIGINT is
//! wired to the request's cancel token; exactly one engine call runs per
//! invocation.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use wipe_engine::progress::{NullSink, TerminalProgressBar};
use wipe_engine::report::WipeMethod;
use wipe_engine::{CancelToken, WipeError, WipeRequest};

#[derive(Parser)]
#[command(name = "wipe")]
#[command(about = "Secure data erasure engine for files, folders and block devices")]
#[command(version)]
struct Cli {
    /// File, directory or device path to wipe. Omit when using `--list-drives`.
    target: Option<PathBuf>,

    /// List mountable volumes detected on this system and exit
    #[arg(long)]
    list_drives: bool,

    /// Wipe method
    #[arg(long, value_enum, default_value = "quick")]
    method: MethodArg,

    /// Skip post-wipe verification
    #[arg(long)]
    no_verify: bool,

    /// Write the resulting report as JSON to this path
    #[arg(long)]
    cert_out: Option<PathBuf>,

    /// Operator identifier recorded on the report
    #[arg(long)]
    operator_id: Option<String>,

    /// Attempt raw device access on a mounted flash volume when privileges allow
    #[arg(long)]
    raw: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum MethodArg {
    Quick,
    Nist,
    Dod,
}

impl From<MethodArg> for WipeMethod {
    fn from(value: MethodArg) -> Self {
        match value {
            MethodArg::Quick => WipeMethod::Quick,
            MethodArg::Nist => WipeMethod::Nist,
            MethodArg::Dod => WipeMethod::Dod,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.debug {
        env_logger::init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if cli.list_drives {
        return run_list_drives();
    }

    let Some(target) = cli.target else {
        eprintln!("error: a target path is required (or pass --list-drives)");
        return ExitCode::from(3);
    };

    run_wipe(WipeArgs {
        target,
        method: cli.method,
        no_verify: cli.no_verify,
        cert_out: cli.cert_out,
        operator_id: cli.operator_id,
        raw: cli.raw,
    })
}

struct WipeArgs {
    target: PathBuf,
    method: MethodArg,
    no_verify: bool,
    cert_out: Option<PathBuf>,
    operator_id: Option<String>,
    raw: bool,
}

fn run_list_drives() -> ExitCode {
    match wipe_engine::enumerate_drives() {
        Ok(drives) => {
            if drives.is_empty() {
                println!("No mountable volumes detected.");
            }
            for drive in drives {
                println!(
                    "{:<30} {:<20} {:>10} total  {:>10} free",
                    drive.path,
                    drive.label,
                    human_bytes(drive.total),
                    human_bytes(drive.free)
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: could not enumerate drives: {e}");
            ExitCode::FAILURE
        }
    }
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1}{}", UNITS[unit])
}

fn run_wipe(args: WipeArgs) -> ExitCode {
    let cancel = CancelToken::new();
    setup_signal_handler(cancel.clone());

    let verify = !args.no_verify;
    let method: WipeMethod = args.method.into();

    let mut progress: Box<dyn wipe_engine::progress::ProgressSink> = if atty_stdout() {
        Box::new(TerminalProgressBar::default())
    } else {
        Box::new(NullSink)
    };

    let request = WipeRequest {
        target: args.target.clone(),
        method,
        verify,
        operator_id: args.operator_id,
        progress_sink: Some(progress.as_mut()),
        cancel,
        prefer_raw: args.raw,
    };

    match wipe_engine::wipe(request) {
        Ok(report) => {
            let json = serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");

            if let Some(cert_path) = args.cert_out {
                if let Err(e) = std::fs::write(&cert_path, &json) {
                    eprintln!("warning: could not write report to {}: {e}", cert_path.display());
                } else {
                    println!("Report written to {}", cert_path.display());
                }
            }

            if report.status_str() == "success" {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(WipeError::BlockedTarget(msg)) => {
            eprintln!("refused: {msg}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn atty_stdout() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(libc::STDOUT_FILENO) != 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// Wires SIGINT to the request's cancel token via a background thread
/// draining `Signals::forever`, targeting a per-call token instead of a
/// process-wide static.
fn setup_signal_handler(cancel: CancelToken) {
    use signal_hook::consts::SIGINT;
    use signal_hook::iterator::Signals;

    let mut signals = match Signals::new([SIGINT]) {
        Ok(s) => s,
        Err(_) => return,
    };

    std::thread::spawn(move || {
        for _ in signals.forever() {
            eprintln!("\ninterrupt received, finishing current chunk and stopping...");
            cancel.cancel();
        }
    });
}
