// SPDX: CC0-1.0

//! Expression engines: compile text against a variable table, evaluate the
//! compiled form against the table's current values.

pub mod live;
pub mod snapshot;

pub use live::LiveEngine;
pub use snapshot::SnapshotEngine;

use crate::{
    env::VarEnv,
    eval::{EvalErr, EvalErrTyp, Program},
    lex::{LexErrTyp, Lexer, TokTyp},
    parse::{self, ParseErr, ParseErrTyp},
    stdlib::{Builtin, Library},
    Number,
};
use core::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A pluggable expression backend.
///
/// `Compiled` is opaque to callers; an [`Equation`](crate::equation::Equation)
/// only stores it and hands it back.
pub trait Engine: Clone + fmt::Debug + Default {
    type Compiled: Clone + fmt::Debug;

    fn name(&self) -> &'static str;

    fn compile(&self, text: &str, env: &VarEnv) -> Result<Self::Compiled, CompileErr>;

    fn evaluate(
        &self,
        compiled: &Self::Compiled,
        env: &VarEnv,
        stack: &mut Vec<Number>,
    ) -> Result<Number, EvalErr>;

    /// Checks that every binding `compiled` needs can be resolved in `env`.
    fn check(&self, compiled: &Self::Compiled, env: &VarEnv) -> Result<(), EvalErr>;

    /// Whether `compiled` must be compiled again before it can be evaluated
    /// against `env`.
    fn is_stale(&self, compiled: &Self::Compiled, env: &VarEnv) -> bool {
        let _ = (compiled, env);
        false
    }
}

#[derive(Debug, Error)]
pub enum CompileErrKind {
    #[error("parse error: {0}")]
    Parse(#[from] ParseErr),
    #[error("invalid expression: {0}")]
    Invalid(#[from] EvalErr),
}

/// Compilation failure plus explanatory notes for the user.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct CompileErr {
    pub kind: CompileErrKind,
    pub notes: Vec<String>,
}

impl CompileErr {
    /// The error followed by its notes, one line each.
    pub fn messages(&self) -> Vec<String> {
        let mut ret = Vec::with_capacity(1 + self.notes.len());
        ret.push(self.to_string());
        ret.extend(self.notes.iter().cloned());
        ret
    }
}

impl From<CompileErrKind> for CompileErr {
    fn from(kind: CompileErrKind) -> Self {
        Self {
            kind,
            notes: Vec::new(),
        }
    }
}

pub(crate) fn default_library() -> Arc<Library> {
    Arc::new(crate::stdlib::standard_library())
}

/// Front end shared by every backend: lex, parse against the declared
/// names of `env` and validate the stack discipline.
pub fn compile_program(text: &str, lib: &Library, env: &VarEnv) -> Result<Program, CompileErr> {
    let src = Arc::new(text.to_string());
    let lexer = Lexer::new(&src);

    let prog = match parse::parse(lexer, lib, |name| env.contains(name)) {
        Ok(prog) => prog,
        Err(err) => {
            let notes = parse_notes(&err, lib, env);
            return Err(CompileErr {
                kind: err.into(),
                notes,
            });
        }
    };

    if let Err(err) = prog.validate() {
        let mut notes = Vec::new();
        if let EvalErrTyp::StackMismatch { .. } = err.typ {
            notes.push(String::from(
                "note: implicit multiplication is not supported, so for example '5x' would be '5*x'",
            ));
        }
        return Err(CompileErr {
            kind: err.into(),
            notes,
        });
    }

    log::debug!("compiled {text:?} to [{prog}]");
    Ok(prog)
}

fn parse_notes(err: &ParseErr, lib: &Library, env: &VarEnv) -> Vec<String> {
    let note = match &err.typ {
        ParseErrTyp::LexErr(LexErrTyp::InvalidChar) => Some(String::from(
            "note: available tokens are numbers, identifiers, and symbols +-*/%^,()",
        )),
        ParseErrTyp::LexErr(LexErrTyp::Unsupported(typ)) => match typ {
            TokTyp::XGreater | TokTyp::XLess => Some(String::from(
                "note: expected an expression but found an inequality",
            )),
            TokTyp::XEqual => Some(String::from(
                "note: expected an expression but found an equation",
            )),
            TokTyp::XPipe => Some(String::from(
                "note: use the 'abs' function to compute absolute value",
            )),
            _ => None,
        },
        ParseErrTyp::ParseNum(_) => Some(String::from("note: parsing as floating point number")),
        ParseErrTyp::ParenMismatch => None,
        ParseErrTyp::Undefined => similar_name(err.loc.get(), lib, env),
    };
    note.into_iter().collect()
}

fn similar_name(text: &str, lib: &Library, env: &VarEnv) -> Option<String> {
    // HACK: this is wasteful but that's not important
    let text = text.to_ascii_lowercase();
    let candidates = env.names().map(|name| (name, "variable")).chain(lib.iter().map(
        |(name, builtin)| {
            let typ = match builtin {
                Builtin::Const(_) => "constant",
                Builtin::Fun(_) => "function",
            };
            (*name, typ)
        },
    ));

    let (sim, key, typ) = candidates
        .map(|(key, typ)| {
            (
                strsim::normalized_damerau_levenshtein(&text, &key.to_ascii_lowercase()),
                key,
                typ,
            )
        })
        .reduce(|acc, elem| {
            // ties go to the alphabetically first name so notes are stable
            if elem.0 > acc.0 || (elem.0 == acc.0 && elem.1 < acc.1) {
                elem
            } else {
                acc
            }
        })?;
    (sim > 0.3).then(|| format!("note: {typ} '{key}' has a similar name"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> VarEnv {
        [("x", 0.0), ("theta", 0.0)].into_iter().collect()
    }

    fn messages(text: &str) -> Vec<String> {
        let lib = crate::stdlib::standard_library();
        compile_program(text, &lib, &env()).unwrap_err().messages()
    }

    #[test]
    fn suggests_similar_names() {
        assert_eq!(
            messages("thetta + 1"),
            [
                "parse error: undefined identifier 'thetta' at column 1",
                "note: variable 'theta' has a similar name",
            ]
        );
        assert_eq!(messages("cosx(x)")[1], "note: function 'cos' has a similar name");
    }

    #[test]
    fn explains_equations_and_pipes() {
        assert_eq!(
            messages("x = 1")[1],
            "note: expected an expression but found an equation"
        );
        assert_eq!(
            messages("|x|")[1],
            "note: use the 'abs' function to compute absolute value"
        );
    }

    #[test]
    fn explains_implicit_multiplication() {
        let msgs = messages("2 x");
        assert_eq!(
            msgs[0],
            "invalid expression: expected 1 value on the stack but found 2"
        );
        assert!(msgs[1].contains("implicit multiplication"));
    }

    #[test]
    fn names_match_engine_kinds() {
        use crate::config::EngineKind;
        assert_eq!(SnapshotEngine::default().name(), EngineKind::Snapshot.to_string());
        assert_eq!(LiveEngine::default().name(), EngineKind::Live.to_string());
    }

    #[test]
    fn empty_text_is_invalid() {
        assert_eq!(messages("  "), ["invalid expression: cannot evaluate empty expression"]);
    }
}
