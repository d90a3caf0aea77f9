// SPDX: CC0-1.0

use super::{compile_program, default_library, CompileErr, Engine};
use crate::{
    env::VarEnv,
    eval::{self, EvalErr, EvalErrTyp, Program},
    stdlib::Library,
    Number,
};
use std::sync::Arc;

/// Keeps variables by name and looks each one up in the table at every
/// evaluation, so the compiled form survives changes to the name set.
#[derive(Clone, Debug)]
pub struct LiveEngine {
    lib: Arc<Library>,
}

impl Default for LiveEngine {
    fn default() -> Self {
        Self {
            lib: default_library(),
        }
    }
}

impl Engine for LiveEngine {
    type Compiled = Program;

    fn name(&self) -> &'static str {
        "live"
    }

    fn compile(&self, text: &str, env: &VarEnv) -> Result<Self::Compiled, CompileErr> {
        compile_program(text, &self.lib, env)
    }

    fn evaluate(
        &self,
        compiled: &Self::Compiled,
        env: &VarEnv,
        stack: &mut Vec<Number>,
    ) -> Result<Number, EvalErr> {
        eval::eval(
            compiled,
            |idx, op| {
                let name = &compiled.vars()[idx];
                env.get(name).ok_or_else(|| {
                    EvalErr::at(EvalErrTyp::UndefinedIdent { name: name.clone() }, op)
                })
            },
            stack,
        )
    }

    fn check(&self, compiled: &Self::Compiled, env: &VarEnv) -> Result<(), EvalErr> {
        match compiled.vars().iter().find(|name| !env.contains(name)) {
            Some(name) => Err(EvalErr {
                typ: EvalErrTyp::UndefinedIdent { name: name.clone() },
                op: None,
            }),
            None => Ok(()),
        }
    }
}
