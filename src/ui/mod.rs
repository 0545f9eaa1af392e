//! # Terminal UI
//!
//! Everything the operator sees on stdout: the startup banner, connection
//! notices and the per-message entries written by [`TerminalSink`].
//! Diagnostic logging goes through `tracing` to stderr and never mixes with
//! this stream.

pub mod terminal;
pub mod theme;

pub use terminal::TerminalSink;

use crossterm::style::{style, Color, Stylize};

const BANNER_WIDTH: usize = 74;

/// Operator-facing notices, colored or plain
#[derive(Debug, Clone, Copy)]
pub struct Console {
    colored: bool,
}

impl Console {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn colored(&self) -> bool {
        self.colored
    }

    pub fn banner(&self, title: &str, subtitle: &str) {
        let border = "═".repeat(BANNER_WIDTH);
        let lines = [
            format!("╔{}╗", border),
            format!("║{:^width$}║", title, width = BANNER_WIDTH),
            format!("║{:^width$}║", subtitle, width = BANNER_WIDTH),
            format!("╚{}╝", border),
        ];
        for line in lines {
            self.line(theme::BANNER, &line);
        }
    }

    pub fn success(&self, message: &str) {
        self.line(theme::SUCCESS, &format!("✅ {}", message));
    }

    pub fn info(&self, message: &str) {
        self.line(theme::HIGHLIGHT, message);
    }

    pub fn warn(&self, message: &str) {
        self.line(theme::NOTICE, message);
    }

    pub fn failure(&self, message: &str) {
        self.line(theme::FAILURE, &format!("❌ {}", message));
    }

    pub fn rule(&self) {
        println!("{}", "=".repeat(80));
    }

    fn line(&self, color: Color, text: &str) {
        if self.colored {
            println!("{}", style(text).with(color));
        } else {
            println!("{}", text);
        }
    }
}
