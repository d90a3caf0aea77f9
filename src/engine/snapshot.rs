// SPDX: CC0-1.0

use super::{compile_program, default_library, CompileErr, CompileErrKind, Engine};
use crate::{
    env::VarEnv,
    eval::{self, EvalErr, EvalErrTyp, Program},
    stdlib::Library,
    Number,
};
use std::sync::Arc;

/// Compiled form of [`SnapshotEngine`]: variables are bound to environment
/// slots, valid for one generation of the name set.
#[derive(Clone, Debug)]
pub struct Snapshot {
    prog: Program,
    slots: Vec<usize>,
    generation: u64,
}

impl Snapshot {
    fn stale_err(&self) -> EvalErr {
        EvalErr {
            typ: EvalErrTyp::Stale {
                name: self.prog.vars().first().cloned().unwrap_or_default(),
            },
            op: None,
        }
    }
}

/// Binds every variable at compile time. Adding or removing a variable
/// invalidates the compiled form, which then has to be compiled again.
#[derive(Clone, Debug)]
pub struct SnapshotEngine {
    lib: Arc<Library>,
}

impl Default for SnapshotEngine {
    fn default() -> Self {
        Self {
            lib: default_library(),
        }
    }
}

impl Engine for SnapshotEngine {
    type Compiled = Snapshot;

    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn compile(&self, text: &str, env: &VarEnv) -> Result<Self::Compiled, CompileErr> {
        let prog = compile_program(text, &self.lib, env)?;
        let slots = prog
            .vars()
            .iter()
            .map(|name| {
                env.slot(name).ok_or_else(|| {
                    CompileErr::from(CompileErrKind::Invalid(EvalErr {
                        typ: EvalErrTyp::UndefinedIdent { name: name.clone() },
                        op: None,
                    }))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Snapshot {
            prog,
            slots,
            generation: env.generation(),
        })
    }

    fn evaluate(
        &self,
        compiled: &Self::Compiled,
        env: &VarEnv,
        stack: &mut Vec<Number>,
    ) -> Result<Number, EvalErr> {
        if self.is_stale(compiled, env) {
            return Err(compiled.stale_err());
        }
        eval::eval(
            &compiled.prog,
            |idx, op| {
                env.value_at(compiled.slots[idx]).ok_or_else(|| {
                    EvalErr::at(
                        EvalErrTyp::UndefinedIdent {
                            name: op.loc.get().to_string(),
                        },
                        op,
                    )
                })
            },
            stack,
        )
    }

    fn check(&self, compiled: &Self::Compiled, env: &VarEnv) -> Result<(), EvalErr> {
        if self.is_stale(compiled, env) {
            Err(compiled.stale_err())
        } else {
            Ok(())
        }
    }

    fn is_stale(&self, compiled: &Self::Compiled, env: &VarEnv) -> bool {
        // a program without variables binds nothing
        !compiled.slots.is_empty() && compiled.generation != env.generation()
    }
}
