// SPDX: CC0-1.0

use crate::{lex::SubStr, stdlib, Number};
use core::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorTyp {
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

impl OperatorTyp {
    pub const fn precedence(&self) -> i8 {
        match self {
            Self::Add => 2,
            Self::Sub => 2,
            Self::Mul => 3,
            Self::Div => 3,
            Self::Rem => 3,
            Self::Neg => 4,
            Self::Pow => 5,
        }
    }

    pub const fn associativity(&self) -> Associativity {
        use Associativity::{Left, Right};
        match self {
            Self::Neg => Right,
            Self::Add => Left,
            Self::Sub => Left,
            Self::Mul => Left,
            Self::Div => Left,
            Self::Rem => Left,
            Self::Pow => Right,
        }
    }

    /// Prefix operators take their operand from the right, so they never
    /// pop anything off the operator stack when pushed.
    pub const fn is_prefix(&self) -> bool {
        matches!(self, Self::Neg)
    }

    pub const fn fun(&self) -> (&'static str, Fun) {
        match self {
            Self::Neg => ("neg", Fun::new(1, stdlib::neg)),
            Self::Add => ("add", Fun::new(2, stdlib::add)),
            Self::Sub => ("sub", Fun::new(2, stdlib::sub)),
            Self::Mul => ("mul", Fun::new(2, stdlib::mul)),
            Self::Div => ("div", Fun::new(2, stdlib::div)),
            Self::Rem => ("rem", Fun::new(2, stdlib::rem)),
            Self::Pow => ("pow", Fun::new(2, stdlib::pow)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Fun {
    pub arity: usize,
    pub fun: fn(&[Number]) -> Number,
}

impl Fun {
    pub const fn new(arity: usize, fun: fn(&[Number]) -> Number) -> Self {
        Self { arity, fun }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum OperationTyp {
    Operator(OperatorTyp),
    Val(Number),
    /// Index into [`Program::vars`].
    Var(usize),
    Fun(Fun),
}

#[derive(Clone, Debug)]
pub struct Operation {
    pub typ: OperationTyp,
    pub loc: SubStr,
}

impl Operation {
    /// Values consumed from and pushed onto the stack.
    const fn stack_effect(&self) -> (usize, usize) {
        match self.typ {
            OperationTyp::Val(_) | OperationTyp::Var(_) => (0, 1),
            OperationTyp::Operator(typ) => (typ.fun().1.arity, 1),
            OperationTyp::Fun(fun) => (fun.arity, 1),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.typ {
            OperationTyp::Val(val) => write!(f, "push {val}"),
            OperationTyp::Var(_) => write!(f, "load '{}'", self.loc.get()),
            OperationTyp::Operator(typ) => write!(f, "call '{}'", typ.fun().0),
            OperationTyp::Fun(_) => write!(f, "call '{}'", self.loc.get()),
        }
    }
}

fn plural(n: &usize) -> &'static str {
    if *n == 1 {
        ""
    } else {
        "s"
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrTyp {
    #[error("cannot evaluate empty expression")]
    Empty,

    #[error("function '{name}' requires {arity} argument{}, but found {found}", plural(.arity))]
    MissingArgs {
        name: String,
        arity: usize,
        found: usize,
    },

    #[error("expected {expected} value{} on the stack but found {found}", plural(.expected))]
    StackMismatch { expected: usize, found: usize },

    #[error("undefined variable '{name}'")]
    UndefinedIdent { name: String },

    #[error("variable '{name}' was bound to an older set of variables")]
    Stale { name: String },
}

#[derive(Clone, Debug, Error)]
#[error("{typ}")]
pub struct EvalErr {
    pub typ: EvalErrTyp,
    pub op: Option<Operation>, // if none, associated with end-of-program checking
}

impl EvalErr {
    pub fn at(typ: EvalErrTyp, op: &Operation) -> Self {
        Self {
            typ,
            op: Some(op.clone()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Program {
    pub(crate) ops: Vec<Operation>,
    /// Distinct variable names, in order of first use.
    pub(crate) vars: Vec<String>,
}

impl Program {
    #[inline]
    pub const fn new(ops: Vec<Operation>, vars: Vec<String>) -> Self {
        Self { ops, vars }
    }

    #[inline]
    pub fn ops(&self) -> core::slice::Iter<'_, Operation> {
        self.ops.iter()
    }

    #[inline]
    pub fn vars(&self) -> &[String] {
        &self.vars
    }

    /// Runs the program's stack effects without evaluating anything, so
    /// arity and leftover-value mistakes surface at compile time.
    pub fn validate(&self) -> Result<(), EvalErr> {
        if self.ops.is_empty() {
            return Err(EvalErr {
                typ: EvalErrTyp::Empty,
                op: None,
            });
        }

        let mut depth = 0usize;
        for op in self.ops() {
            let (takes, gives) = op.stack_effect();
            if depth < takes {
                let name = match op.typ {
                    OperationTyp::Operator(typ) => typ.fun().0.to_string(),
                    _ => op.loc.get().to_string(),
                };
                return Err(EvalErr::at(
                    EvalErrTyp::MissingArgs {
                        name,
                        arity: takes,
                        found: depth,
                    },
                    op,
                ));
            }
            depth = depth - takes + gives;
        }

        if depth == 1 {
            Ok(())
        } else {
            Err(EvalErr {
                typ: EvalErrTyp::StackMismatch {
                    expected: 1,
                    found: depth,
                },
                op: None,
            })
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for op in self.ops() {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

/// Evaluates `prog`, asking `var` for the value of each variable reference
/// (by index into [`Program::vars`]).
pub fn eval<F>(prog: &Program, mut var: F, stack: &mut Vec<Number>) -> Result<Number, EvalErr>
where
    F: FnMut(usize, &Operation) -> Result<Number, EvalErr>,
{
    fn eval_fun(
        stack: &mut Vec<Number>,
        op: &Operation,
        name: &str,
        fun: &Fun,
    ) -> Result<Number, EvalErr> {
        let len = stack.len();
        if len < fun.arity {
            return Err(EvalErr::at(
                EvalErrTyp::MissingArgs {
                    name: name.to_string(),
                    arity: fun.arity,
                    found: len,
                },
                op,
            ));
        }
        // stack: ...a, b, c, d
        //                 ^^^^ args if arity is 2
        let val = (fun.fun)(&stack[len - fun.arity..]);
        stack.truncate(len - fun.arity);
        Ok(val)
    }

    if prog.ops.is_empty() {
        return Err(EvalErr {
            typ: EvalErrTyp::Empty,
            op: None,
        });
    }

    stack.clear();

    for op in prog.ops() {
        let val = match op.typ {
            OperationTyp::Operator(typ) => {
                let (name, fun) = typ.fun();
                eval_fun(stack, op, name, &fun)?
            }
            OperationTyp::Val(num) => num,
            OperationTyp::Var(idx) => var(idx, op)?,
            OperationTyp::Fun(fun) => eval_fun(stack, op, op.loc.get(), &fun)?,
        };
        stack.push(val);
    }

    match stack.as_slice() {
        [val] => Ok(*val),
        _ => Err(EvalErr {
            typ: EvalErrTyp::StackMismatch {
                expected: 1,
                found: stack.len(),
            },
            op: None,
        }),
    }
}
