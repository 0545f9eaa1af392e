//! Line-oriented entry output

use std::io::{self, Write};

use crossterm::style::{style, Stylize};

use super::theme;
use crate::monitor::{EntrySink, FormattedEntry};

const SEPARATOR_WIDTH: usize = 60;

/// Writes entries to a terminal (or any writer), optionally colored
pub struct TerminalSink<W: Write> {
    out: W,
    colored: bool,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout(colored: bool) -> Self {
        Self::new(io::stdout(), colored)
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, colored: bool) -> Self {
        Self { out, colored }
    }

    fn write_colored(&mut self, entry: &FormattedEntry, sequence: u64) -> io::Result<()> {
        let color = theme::severity_color(entry.descriptor.severity);
        writeln!(
            self.out,
            "{} {}",
            style(entry.title()).with(color),
            style(format!("({})", entry.topic)).bold()
        )?;
        for line in &entry.details {
            write!(self.out, "   ")?;
            for span in &line.spans {
                write!(self.out, "{}", theme::styled_span(span))?;
            }
            writeln!(self.out)?;
        }
        writeln!(
            self.out,
            "{}",
            style(separator(sequence)).with(theme::SEPARATOR)
        )
    }

    fn write_plain(&mut self, entry: &FormattedEntry, sequence: u64) -> io::Result<()> {
        for line in entry.plain_lines() {
            writeln!(self.out, "{}", line)?;
        }
        writeln!(self.out, "{}", separator(sequence))
    }
}

impl<W: Write> EntrySink for TerminalSink<W> {
    fn emit(&mut self, entry: &FormattedEntry, sequence: u64) -> io::Result<()> {
        if self.colored {
            self.write_colored(entry, sequence)?;
        } else {
            self.write_plain(entry, sequence)?;
        }
        self.out.flush()
    }
}

fn separator(sequence: u64) -> String {
    format!("{} Message #{} {}", "─".repeat(SEPARATOR_WIDTH), sequence, "─".repeat(20))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::SubscriptionFilter;
    use crate::monitor::MonitorSession;

    #[test]
    fn test_plain_output() {
        let mut session = MonitorSession::new(SubscriptionFilter::wildcard(), false);
        let entry = session
            .process("audio/notification/u", br#"{"message":"hola","type":"info"}"#)
            .unwrap();

        let mut out = Vec::new();
        TerminalSink::new(&mut out, false)
            .emit(&entry, session.accepted())
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("📢 NOTIFICATION ["));
        assert!(lines[0].ends_with("(audio/notification/u)"));
        assert_eq!(lines[1], "   📢 hola");
        assert_eq!(lines[2], "   🏷️  Type: info");
        assert!(lines[3].contains("Message #1"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_colored_output_has_escape_codes() {
        let mut session = MonitorSession::new(SubscriptionFilter::wildcard(), false);
        let entry = session.process("audio/system", br#"{"type":"boot"}"#).unwrap();

        let mut out = Vec::new();
        TerminalSink::new(&mut out, true).emit(&entry, 7).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains('\u{1b}'));
        assert!(text.contains("SYSTEM"));
        assert!(text.contains("Message #7"));
    }
}
