// SPDX: CC0-1.0

//! Commands of the line language and their recognition.

use crate::equation::PlotKind;
use core::fmt::Write as _;
use strum::IntoEnumIterator;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Command {
    Equation,
    XEquals,
    YEquals,
    REquals,
    TEquals,
    Set,
    Start,
    End,
    Step,
    Param,
    Radius,
    Theta,
    YPlot,
    XYPlot,
    RPlot,
    TPlot,
    None,
    Invalid,
    Exit,
    Open,
    Save,
}

impl Command {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub const fn help(self) -> &'static str {
        match self {
            Self::Equation => "Creates a new equation",
            Self::XEquals => {
                "Describes any well-formed expression for the evaluation of \"x\" in the coordinate pair \"(x,y)\""
            }
            Self::YEquals => {
                "Describes any well-formed expression for the evaluation of \"y\" in the coordinate pair \"(x,y)\""
            }
            Self::REquals => {
                "Describes any well-formed expression for the evaluation of \"radius\" in the polar equation \"r=f(t)\""
            }
            Self::TEquals => {
                "Describes any well-formed expression for the evaluation of \"theta\" in the polar equation \"t=f(r)\""
            }
            Self::Set => {
                "Describes a comma-separated list of variables of the form name[=expression]"
            }
            Self::Start => "Expression that describes the start value of the iteration range",
            Self::End => "Expression that describes the end value in the iteration range",
            Self::Step => {
                "Expression that describes the increment value for traversing the iteration range"
            }
            Self::Param => "Describes the name of the parameter in a parametric equation",
            Self::Radius => "Describes the name of the radius variable in a polar equation",
            Self::Theta => "Describes the name of the angle variable in a polar equation",
            Self::YPlot => "Generates a plot of the form (x,y) = f(x)",
            Self::XYPlot => "Generates a plot of the form (x,y) = f(t)",
            Self::RPlot => "Generates a plot of the polar equation r = f(t)",
            Self::TPlot => "Generates a plot of the polar equation t = f(r)",
            Self::None => "Identifies an empty command string",
            Self::Invalid => "Designates an invalid command.",
            Self::Exit => "Application specific; probably \"Exit from the current operation\"",
            Self::Open => "Application specific; probably \"open equation file\"",
            Self::Save => "Application specific; probably \"save equation file\"",
        }
    }

    /// Maps a command token to its command, ignoring case. The empty token is
    /// [`Command::None`], anything unrecognized is [`Command::Invalid`].
    pub fn from_token(token: &str) -> Self {
        if token.is_empty() {
            return Self::None;
        }
        token.parse().unwrap_or(Self::Invalid)
    }

    pub const fn plot_kind(self) -> Option<PlotKind> {
        match self {
            Self::YPlot => Some(PlotKind::YPlot),
            Self::XYPlot => Some(PlotKind::XYPlot),
            Self::RPlot => Some(PlotKind::RPlot),
            Self::TPlot => Some(PlotKind::TPlot),
            _ => None,
        }
    }
}

/// A recognized line: the command, the token it was recognized from and
/// the trimmed argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParsedCommand {
    pub command: Command,
    pub raw_token: String,
    pub argument: String,
}

impl ParsedCommand {
    pub fn new(command: Command, raw_token: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            command,
            raw_token: raw_token.into(),
            argument: argument.into(),
        }
    }

    /// What an exhausted input yields.
    pub fn none() -> Self {
        Self::new(Command::None, "", "")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shortcut {
    pub prefix: &'static str,
    pub command: Command,
}

/// Prefixes recognized before a line is split into command and argument.
pub const SHORTCUTS: &[Shortcut] = &[
    Shortcut { prefix: "x=", command: Command::XEquals },
    Shortcut { prefix: "y=", command: Command::YEquals },
    Shortcut { prefix: "r=", command: Command::REquals },
    Shortcut { prefix: "t=", command: Command::TEquals },
    Shortcut { prefix: "X=", command: Command::XEquals },
    Shortcut { prefix: "Y=", command: Command::YEquals },
    Shortcut { prefix: "R=", command: Command::REquals },
    Shortcut { prefix: "T=", command: Command::TEquals },
];

/// Splits a trimmed line into a [`ParsedCommand`].
pub fn parse_line(line: &str) -> ParsedCommand {
    if let Some(Shortcut { prefix, command }) =
        SHORTCUTS.iter().find(|it| line.starts_with(it.prefix))
    {
        return ParsedCommand::new(*command, *prefix, line[prefix.len()..].trim());
    }

    let (token, argument) = line.split_once(' ').unwrap_or((line, ""));
    ParsedCommand::new(Command::from_token(token), token, argument.trim())
}

/// Listing of every command a user may type, sorted by name.
pub fn usage() -> String {
    let mut commands: Vec<_> = Command::iter()
        .filter(|c| !matches!(c, Command::None | Command::Invalid))
        .collect();
    commands.sort_by_key(|c| c.name());

    let mut ret = String::from("Valid commands:\n");
    for c in commands {
        // writing to a string does not fail
        let _ = writeln!(ret, "    {c}: {help}", help = c.help());
    }
    ret
}

/// Closest command name to an unrecognized token, if any is close enough.
pub fn similar_command(token: &str) -> Option<Command> {
    let token = token.to_ascii_uppercase();
    let (sim, command) = Command::iter()
        .filter(|c| !matches!(c, Command::None | Command::Invalid))
        .map(|c| (strsim::normalized_damerau_levenshtein(&token, c.name()), c))
        .reduce(|acc, elem| if elem.0 > acc.0 { elem } else { acc })?;
    (sim > 0.3).then_some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_round_trips() {
        for c in Command::iter() {
            let parsed = parse_line(&format!("{c}   some  argument "));
            assert_eq!(parsed, ParsedCommand::new(c, c.name(), "some  argument"));
        }
    }

    #[test]
    fn names_ignore_case() {
        assert_eq!(parse_line("xyplot").command, Command::XYPlot);
        assert_eq!(parse_line("Start 2").command, Command::Start);
        assert_eq!(parse_line("sTeP").raw_token, "sTeP");
        assert_eq!(Command::from_token("eXiT"), Command::Exit);
    }

    #[test]
    fn shortcuts_come_first() {
        assert_eq!(
            parse_line("y= x ^ 2"),
            ParsedCommand::new(Command::YEquals, "y=", "x ^ 2")
        );
        assert_eq!(
            parse_line("T=pi"),
            ParsedCommand::new(Command::TEquals, "T=", "pi")
        );
        // no shortcut for the spaced form
        assert_eq!(parse_line("y = 1").command, Command::Invalid);
    }

    #[test]
    fn unrecognized_keeps_raw_token() {
        assert_eq!(
            parse_line("frobnicate the thing"),
            ParsedCommand::new(Command::Invalid, "frobnicate", "the thing")
        );
        assert_eq!(Command::from_token(""), Command::None);
    }

    #[test]
    fn usage_is_sorted_and_complete() {
        let usage = usage();
        let lines: Vec<_> = usage.lines().skip(1).collect();
        assert_eq!(lines.len(), 19);
        assert!(lines[0].starts_with("    END: "));
        assert!(lines[18].starts_with("    YPLOT: "));
        assert!(!usage.contains("NONE"));
        assert!(!usage.contains("INVALID"));
    }

    #[test]
    fn suggests_commands() {
        assert_eq!(similar_command("stpe"), Some(Command::Step));
        assert_eq!(similar_command("xyplt"), Some(Command::XYPlot));
    }

    #[test]
    fn plot_commands() {
        assert_eq!(Command::RPlot.plot_kind(), Some(PlotKind::RPlot));
        assert_eq!(Command::Set.plot_kind(), None);
    }
}
