use std::io::{self, Write};

use anyhow::{Context, Result};

/// Anything that can display the animator's current text.
pub trait TextSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

impl<S: TextSink + ?Sized> TextSink for &mut S {
    fn set_text(&mut self, text: &str) -> Result<()> {
        (**self).set_text(text)
    }
}

impl<S: TextSink + ?Sized> TextSink for Box<S> {
    fn set_text(&mut self, text: &str) -> Result<()> {
        (**self).set_text(text)
    }
}

/// Keeps every write in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    writes: Vec<String>,
}

impl RecordingSink {
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    pub fn last(&self) -> Option<&str> {
        self.writes.last().map(String::as_str)
    }

    pub fn into_writes(self) -> Vec<String> {
        self.writes
    }
}

impl TextSink for RecordingSink {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.writes.push(text.to_string());
        Ok(())
    }
}

const RESET: &str = "\x1b[0m";
const CARET: &str = "\x1b[34m";
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Redraws a single terminal line on every update.
#[derive(Debug)]
pub struct TerminalSink<W: Write> {
    out: W,
    caret: bool,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout(caret: bool) -> Self {
        Self::new(io::stdout(), caret)
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, caret: bool) -> Self {
        Self { out, caret }
    }

    /// Moves past the animated line so later output starts on a fresh one.
    pub fn finish(&mut self) -> Result<()> {
        writeln!(self.out).context("failed to write to terminal")?;
        self.out.flush().context("failed to flush terminal")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TextSink for TerminalSink<W> {
    fn set_text(&mut self, text: &str) -> Result<()> {
        write!(self.out, "{CLEAR_LINE}{text}").context("failed to write to terminal")?;
        if self.caret {
            write!(self.out, "{CARET}|{RESET}").context("failed to write to terminal")?;
        }
        self.out.flush().context("failed to flush terminal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_sink_redraws_the_line() {
        let mut sink = TerminalSink::new(Vec::new(), false);
        sink.set_text("ab").unwrap();
        sink.set_text("a").unwrap();
        sink.finish().unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "\r\x1b[2Kab\r\x1b[2Ka\n");
    }

    #[test]
    fn terminal_sink_draws_caret_after_text() {
        let mut sink = TerminalSink::new(Vec::new(), true);
        sink.set_text("hi").unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "\r\x1b[2Khi\x1b[34m|\x1b[0m");
    }

    #[test]
    fn forwards_through_mutable_references() {
        fn write_once(mut sink: impl TextSink) {
            sink.set_text("x").unwrap();
        }

        let mut recording = RecordingSink::default();
        write_once(&mut recording);
        write_once(Box::new(&mut recording) as Box<dyn TextSink + '_>);
        assert_eq!(recording.writes(), &["x", "x"]);
    }
}
