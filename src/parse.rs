// SPDX: CC0-1.0

// implementation of shunting yard algorithm by dijkstra (see https://en.wikipedia.org/wiki/Shunting_yard_algorithm)

use crate::{
    eval::{Associativity, Operation, OperationTyp, OperatorTyp, Program},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, TokTyp},
    stdlib::{Builtin, Library},
    Number,
};
use core::num::ParseFloatError;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseErrTyp {
    #[error("{0}")]
    LexErr(LexErrTyp),
    #[error("invalid number: {0}")]
    ParseNum(ParseFloatError),
    #[error("mismatched parentheses")]
    ParenMismatch,
    #[error("undefined identifier")]
    Undefined,
}

#[derive(Clone, Debug, Error)]
#[error("{typ} '{loc}' at column {}", .loc.column())]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: SubStr,
}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::LexErr(err.typ),
            loc: err.loc,
        }
    }
}

/// Entry of the operator stack.
#[derive(Clone, Debug)]
enum Pending {
    OpenParen(SubStr),
    Op(Operation),
}

impl Pending {
    /// Whether `self`, sitting on top of the operator stack, has to be moved
    /// to the output before `incoming` is pushed.
    fn yields_to(&self, incoming: OperatorTyp) -> bool {
        match self {
            Self::OpenParen(_) => false,
            Self::Op(op) => match op.typ {
                // see https://softwareengineering.stackexchange.com/questions/290043/precedence-of-function-in-shunting-yard-algorithm
                OperationTyp::Fun(_) => true,
                OperationTyp::Operator(top) => {
                    (top.precedence() > incoming.precedence())
                        || ((top.precedence() == incoming.precedence())
                            && (incoming.associativity() == Associativity::Left))
                }
                OperationTyp::Val(_) | OperationTyp::Var(_) => {
                    unreachable!("operands never enter the operator stack")
                }
            },
        }
    }
}

/// Moves operations to `out` until an open parenthesis (left on the stack)
/// or the bottom of the stack is reached.
fn drain_to_paren(ops: &mut Vec<Pending>, out: &mut Vec<Operation>) {
    while let Some(Pending::Op(_)) = ops.last() {
        if let Some(Pending::Op(op)) = ops.pop() {
            out.push(op);
        }
    }
}

/// Parses an expression into postfix form.
///
/// Identifiers resolve in this order: library function, declared variable
/// (according to `is_declared`), library constant. Anything else is an
/// error.
pub fn parse<D>(lex: Lexer<'_>, lib: &Library, is_declared: D) -> Result<Program, ParseErr>
where
    D: Fn(&str) -> bool,
{
    let mut out: Vec<Operation> = Vec::new(); // output
    let mut ops: Vec<Pending> = Vec::new(); // operator stack
    let mut vars: Vec<String> = Vec::new();

    for tok in lex {
        let tok = tok?;
        match tok.typ {
            TokTyp::Number => {
                let num: Number = match tok.loc.get().parse() {
                    Ok(val) => val,
                    Err(err) => {
                        return Err(ParseErr {
                            typ: ParseErrTyp::ParseNum(err),
                            loc: tok.loc,
                        })
                    }
                };
                out.push(Operation {
                    typ: OperationTyp::Val(num),
                    loc: tok.loc,
                });
            }

            TokTyp::Ident => {
                let name = tok.loc.get();
                let typ = match lib.get(name) {
                    Some(Builtin::Fun(fun)) => {
                        ops.push(Pending::Op(Operation {
                            typ: OperationTyp::Fun(*fun),
                            loc: tok.loc,
                        }));
                        continue;
                    }
                    _ if is_declared(name) => {
                        let idx = match vars.iter().position(|var| var == name) {
                            Some(idx) => idx,
                            None => {
                                vars.push(name.to_string());
                                vars.len() - 1
                            }
                        };
                        OperationTyp::Var(idx)
                    }
                    Some(Builtin::Const(val)) => OperationTyp::Val(*val),
                    None => {
                        return Err(ParseErr {
                            typ: ParseErrTyp::Undefined,
                            loc: tok.loc,
                        })
                    }
                };
                out.push(Operation { typ, loc: tok.loc });
            }

            TokTyp::Op(o1) => {
                if !o1.is_prefix() {
                    while ops.last().is_some_and(|o2| o2.yields_to(o1)) {
                        if let Some(Pending::Op(o2)) = ops.pop() {
                            out.push(o2);
                        }
                    }
                }
                ops.push(Pending::Op(Operation {
                    typ: OperationTyp::Operator(o1),
                    loc: tok.loc,
                }));
            }

            TokTyp::Comma => drain_to_paren(&mut ops, &mut out),

            TokTyp::OpenParen => ops.push(Pending::OpenParen(tok.loc)),

            TokTyp::CloseParen => {
                drain_to_paren(&mut ops, &mut out);

                if ops.pop().is_none() {
                    return Err(ParseErr {
                        typ: ParseErrTyp::ParenMismatch,
                        loc: tok.loc,
                    });
                }

                // handle functions
                if let Some(Pending::Op(Operation {
                    typ: OperationTyp::Fun(_),
                    ..
                })) = ops.last()
                {
                    if let Some(Pending::Op(op)) = ops.pop() {
                        out.push(op);
                    }
                }
            }

            TokTyp::XGreater
            | TokTyp::XLess
            | TokTyp::XEqual
            | TokTyp::XPipe
            | TokTyp::XOpenSquareBracket
            | TokTyp::XCloseSquareBracket
            | TokTyp::XOpenCurly
            | TokTyp::XCloseCurly => unreachable!("unsupported token survived until parsing"),
        }
    }

    while let Some(pending) = ops.pop() {
        match pending {
            Pending::OpenParen(loc) => {
                return Err(ParseErr {
                    typ: ParseErrTyp::ParenMismatch,
                    loc,
                })
            }
            Pending::Op(op) => out.push(op),
        }
    }

    Ok(Program::new(out, vars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::standard_library;
    use std::sync::Arc;

    fn parse_str(src: &str, declared: &[&str]) -> Result<Program, ParseErr> {
        let src = Arc::new(String::from(src));
        let lib = standard_library();
        parse(Lexer::new(&src), &lib, |name| declared.contains(&name))
    }

    fn postfix(src: &str) -> String {
        parse_str(src, &["x", "t"]).unwrap().to_string()
    }

    #[test]
    fn functions_bind_their_arguments() {
        assert_eq!(postfix("sin(x)^2"), "load 'x'; call 'sin'; push 2; call 'pow'");
        assert_eq!(
            postfix("max(x, 2 * t)"),
            "load 'x'; push 2; load 't'; call 'mul'; call 'max'"
        );
    }

    #[test]
    fn function_without_parens_binds_tightly() {
        assert_eq!(postfix("sin x + 1"), "load 'x'; call 'sin'; push 1; call 'add'");
    }

    #[test]
    fn variables_shadow_constants() {
        let prog = parse_str("e", &[]).unwrap();
        assert!(prog.vars().is_empty());

        let prog = parse_str("e", &["e"]).unwrap();
        assert_eq!(prog.vars(), ["e"]);
    }

    #[test]
    fn undefined_identifier() {
        let err = parse_str("x + q", &["x"]).unwrap_err();
        assert_eq!(err.typ, ParseErrTyp::Undefined);
        assert_eq!(err.to_string(), "undefined identifier 'q' at column 5");

        let err = parse_str("\u{a0}x + q", &["x"]).unwrap_err();
        assert_eq!(err.loc.column(), 6);
    }

    #[test]
    fn mismatched_parens() {
        let err = parse_str("(x + 1", &["x"]).unwrap_err();
        assert_eq!(err.typ, ParseErrTyp::ParenMismatch);
        assert_eq!(err.loc.column(), 1);

        let err = parse_str("x + 1)", &["x"]).unwrap_err();
        assert_eq!(err.typ, ParseErrTyp::ParenMismatch);
        assert_eq!(err.loc.column(), 6);
    }

    #[test]
    fn bad_number() {
        let err = parse_str("1.2.3", &[]).unwrap_err();
        assert!(matches!(err.typ, ParseErrTyp::ParseNum(_)));
    }
}
