//! Progress reporting.
//!
//! The engine talks to callers through a `ProgressSink` trait, not a
//! concrete terminal widget — the operator UI and CLI front-ends each wire
//! up their own sink. `TerminalProgressBar` is the CLI's default sink: an
//! ANSI block-progress bar with an elapsed-time footer.

use std::io::{self, Write};
use std::time::Instant;

/// Observer for `(percent 0..100, message)` updates, per the engine's
/// `WipeRequest.progress_sink` contract.
pub trait ProgressSink: Send {
    fn on_progress(&mut self, percent: f64, message: &str);
}

/// A sink that discards every update; the default when the caller doesn't
/// care about progress.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_progress(&mut self, _percent: f64, _message: &str) {}
}

/// Adapts a plain closure into a `ProgressSink`.
pub struct CallbackSink<F: FnMut(f64, &str) + Send>(pub F);

impl<F: FnMut(f64, &str) + Send> ProgressSink for CallbackSink<F> {
    fn on_progress(&mut self, percent: f64, message: &str) {
        (self.0)(percent, message)
    }
}

/// Terminal bar used by the CLI front-end.
pub struct TerminalProgressBar {
    width: usize,
    start: Instant,
    last_line_len: usize,
}

impl TerminalProgressBar {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            start: Instant::now(),
            last_line_len: 0,
        }
    }
}

impl Default for TerminalProgressBar {
    fn default() -> Self {
        Self::new(40)
    }
}

impl ProgressSink for TerminalProgressBar {
    fn on_progress(&mut self, percent: f64, message: &str) {
        let pct = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        let filled = ((pct / 100.0) * self.width as f64).round() as usize;
        let empty = self.width.saturating_sub(filled);

        let green = "\x1b[38;5;82m";
        let gray = "\x1b[38;5;240m";
        let cyan = "\x1b[38;5;51m";
        let reset = "\x1b[0m";

        let elapsed = self.start.elapsed().as_secs_f64();

        let line = format!(
            "\r[{green}{}{reset}{gray}{}{reset}] {cyan}{:5.1}%{reset} {} ({:.0}s)",
            "█".repeat(filled),
            "░".repeat(empty),
            pct,
            message,
            elapsed,
        );

        // pad with spaces so a shorter line fully overwrites a longer one
        let visible_len = line.chars().count();
        let pad = self.last_line_len.saturating_sub(visible_len);
        print!("{line}{}", " ".repeat(pad));
        self.last_line_len = visible_len;
        let _ = io::stdout().flush();

        if pct >= 100.0 {
            println!();
        }
    }
}
