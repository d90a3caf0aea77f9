// SPDX: CC0-1.0

use crate::{
    command::{parse_line, ParsedCommand},
    lex::SubStr,
};
use anyhow::Context;
use std::io::{self, BufRead, Write};

/// Reads commands line by line, skipping blank lines and `#` comments.
#[derive(Debug)]
pub struct CommandReader<R: BufRead> {
    src: R,
    line: String,
}

impl<R: BufRead> CommandReader<R> {
    pub fn new(src: R) -> Self {
        Self {
            src,
            line: String::new(),
        }
    }

    /// Next line worth parsing, trimmed. `None` once the source is exhausted.
    fn next_line<W: Write>(&mut self, mut out: W, prompt: Option<&str>) -> io::Result<Option<&str>> {
        loop {
            if let Some(prompt) = prompt {
                write!(out, "{prompt}")?;
                out.flush()?;
            }
            self.line.clear();
            if self.src.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let line = self.line.trim();
            if !line.is_empty() && !line.starts_with('#') {
                break;
            }
        }
        Ok(Some(self.line.trim()))
    }

    /// Blocks until a command line is read. An exhausted source gives the
    /// empty `NONE` command.
    pub fn next_command<W: Write>(
        &mut self,
        out: W,
        prompt: Option<&str>,
    ) -> anyhow::Result<ParsedCommand> {
        let line = self
            .next_line(out, prompt)
            .context("failed to read next command")?;
        Ok(line.map_or_else(ParsedCommand::none, parse_line))
    }

    /// Every remaining command, without a terminating `NONE`.
    pub fn stream(mut self) -> impl Iterator<Item = anyhow::Result<ParsedCommand>> {
        let mut done = false;
        core::iter::from_fn(move || {
            if done {
                return None;
            }
            match self.next_line(io::sink(), None) {
                Ok(Some(line)) => Some(Ok(parse_line(line))),
                Ok(None) => {
                    done = true;
                    None
                }
                Err(err) => {
                    done = true;
                    Some(Err(anyhow::Error::new(err).context("failed to read command stream")))
                }
            }
        })
    }
}

/// Prints the source of `span` with the span itself marked below it.
pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    writeln!(out, "{}", span.src())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.column() - 1),
        "^".repeat(span.get().chars().count().max(1))
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    const SCRIPT: &str = "\
# a parabola
equation parabola

  y= x^2
start -2
   # indented comment
yplot
";

    #[test]
    fn skips_blank_and_comment_lines() {
        let mut reader = CommandReader::new(SCRIPT.as_bytes());
        let mut out = Vec::new();
        let cmds: Vec<_> = (0..5)
            .map(|_| reader.next_command(&mut out, Some("> ")).unwrap())
            .collect();
        assert_eq!(
            cmds,
            [
                ParsedCommand::new(Command::Equation, "equation", "parabola"),
                ParsedCommand::new(Command::YEquals, "y=", "x^2"),
                ParsedCommand::new(Command::Start, "start", "-2"),
                ParsedCommand::new(Command::YPlot, "yplot", ""),
                ParsedCommand::none(),
            ]
        );
        // one prompt per line read, plus one for the end of input
        let prompts = String::from_utf8(out).unwrap();
        assert_eq!(prompts, "> ".repeat(SCRIPT.lines().count() + 1));
    }

    #[test]
    fn exhausted_source_keeps_giving_none() {
        let mut reader = CommandReader::new("".as_bytes());
        for _ in 0..3 {
            assert_eq!(
                reader.next_command(io::sink(), None).unwrap(),
                ParsedCommand::none()
            );
        }
    }

    #[test]
    fn stream_has_no_terminator() {
        let cmds: Vec<_> = CommandReader::new(SCRIPT.as_bytes())
            .stream()
            .collect::<anyhow::Result<_>>()
            .unwrap();
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds.last().map(|c| c.command), Some(Command::YPlot));
    }

    #[test]
    fn underlines_span() {
        let src = std::sync::Arc::new(String::from("a + bb"));
        let mut out = Vec::new();
        underline(&mut out, &SubStr::new(src, 4, 2)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a + bb\n    ^^\n");

        // columns count characters, not bytes
        let src = std::sync::Arc::new(String::from("é + ßß"));
        let mut out = Vec::new();
        underline(&mut out, &SubStr::new(src, 5, 4)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "é + ßß\n    ^^\n");
    }

    #[test]
    fn stream_reports_read_errors() {
        // invalid utf-8 fails read_line
        let bytes: &[u8] = &[b'x', b'=', 0xff, b'\n'];
        let mut stream = CommandReader::new(bytes).stream();
        assert!(stream.next().unwrap().is_err());
        assert!(stream.next().is_none());
    }
}
