// SPDX: CC0-1.0

use crate::{range::RangeMode, Number};
use anyhow::{bail, Context};
use std::path::PathBuf;

/// Defaults a fresh equation starts from.
#[derive(Clone, Debug)]
pub struct Settings {
    pub name: String,
    pub variables: Vec<(String, Number)>,
    pub expression: String,
    pub range_start: String,
    pub range_end: String,
    pub range_step: String,
    pub param: String,
    pub radius: String,
    pub theta: String,
    pub precision: usize,
    pub range_mode: RangeMode,
    /// Longest range a plot may traverse.
    pub max_points: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: String::from("New Equation"),
            variables: ["x", "y", "a", "b", "c", "r", "t"]
                .into_iter()
                .map(|name| (name.to_string(), 0.0))
                .collect(),
            expression: String::from("1"),
            range_start: String::from("-1"),
            range_end: String::from("1"),
            range_step: String::from("0.05"),
            param: String::from("t"),
            radius: String::from("r"),
            theta: String::from("t"),
            precision: 3,
            range_mode: RangeMode::default(),
            max_points: 1_000_000,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EngineKind {
    #[default]
    Snapshot,
    Live,
}

/// Command line options of the shell binary.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub engine: EngineKind,
    pub settings: Settings,
    pub script: Option<PathBuf>,
}

pub const USAGE: &str = "usage: equation_shell [--engine snapshot|live] [--legacy-range] [--max-points N] [SCRIPT]";

impl Options {
    /// Parses arguments, not including the program name.
    pub fn from_args<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut ret = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--engine" => {
                    let val = args.next().context("--engine requires a value")?;
                    ret.engine = val
                        .parse()
                        .with_context(|| format!("unknown engine '{val}'"))?;
                }
                "--legacy-range" => ret.settings.range_mode = RangeMode::Accumulate,
                "--max-points" => {
                    let val = args.next().context("--max-points requires a value")?;
                    ret.settings.max_points = val
                        .parse()
                        .with_context(|| format!("invalid point limit '{val}'"))?;
                }
                flag if flag.starts_with("--") => bail!("unknown option '{flag}'\n{USAGE}"),
                path => {
                    if ret.script.is_some() {
                        bail!("only one script may be given\n{USAGE}");
                    }
                    ret.script = Some(PathBuf::from(path));
                }
            }
        }
        Ok(ret)
    }
}
