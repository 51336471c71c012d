//! Presentation-layer implementations of `ProgressReporter`.
//!
//! `TerminalReporter` prints plain progress lines; `SpinnerReporter` drives
//! an indicatif spinner instead, so long polling loops get a live status
//! line without garbling interleaved output. Both exist so application
//! services can emit progress events without depending on any presentation
//! type directly.

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"` (suppressed when `ctx.quiet`)
/// - `success()` prints `"  ✓ {message}"` (suppressed when `ctx.quiet`)
/// - `warn()` prints `"  ! {message}"` (suppressed when `ctx.quiet`)
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if !self.ctx.quiet {
            println!("  {} {message}", "→".cyan());
        }
    }

    fn success(&self, message: &str) {
        if !self.ctx.quiet {
            println!("  {} {message}", "✓".green());
        }
    }

    fn warn(&self, message: &str) {
        if !self.ctx.quiet {
            println!("  {} {message}", "!".yellow());
        }
    }
}

/// Progress reporter that feeds an active spinner.
///
/// Step messages become the spinner's status line; successes and warnings
/// print above it via `ProgressBar::println`.
pub struct SpinnerReporter<'a> {
    pb: &'a ProgressBar,
}

impl<'a> SpinnerReporter<'a> {
    /// Create a new `SpinnerReporter` driving the given spinner.
    #[must_use]
    pub fn new(pb: &'a ProgressBar) -> Self {
        Self { pb }
    }
}

impl ProgressReporter for SpinnerReporter<'_> {
    fn step(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    fn success(&self, message: &str) {
        self.pb.println(format!("  {} {message}", "✓".green()));
    }

    fn warn(&self, message: &str) {
        self.pb.println(format!("  {} {message}", "!".yellow()));
    }
}
