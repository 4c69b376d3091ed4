// SPDX: CC0-1.0

// implementation of shunting yard algorithm by dijkstra (see https://en.wikipedia.org/wiki/Shunting_yard_algorithm)

use crate::{
    eval::{Associativity, Ident, Idents, Operation, OperationTyp, OperatorTyp, Program},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, TokTyp},
    Number,
};
use core::{fmt, num::ParseFloatError};

#[derive(Clone, Debug)]
pub enum ParseErrTyp {
    LexErr(LexErrTyp),
    ParseNum(ParseFloatError),
    ParenMismatch,
}

impl fmt::Display for ParseErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexErr(err) => write!(f, "{err}"),
            Self::ParseNum(err) => write!(f, "invalid number: {err}"),
            Self::ParenMismatch => write!(f, "mismatched parentheses"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: SubStr,
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at column {}", self.typ, self.loc.start() + 1)
    }
}

impl std::error::Error for ParseErr {}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::LexErr(err.typ),
            loc: err.loc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShuntOpTyp {
    Operator(OperatorTyp),
    Fun,
    OpenParen,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ShuntOp {
    typ: ShuntOpTyp,
    loc: SubStr,
}

impl ShuntOp {
    fn precedence(&self) -> i8 {
        match self.typ {
            ShuntOpTyp::Operator(op) => op.precedence(),
            // a pending function application binds tighter than any operator
            ShuntOpTyp::Fun => i8::MAX,
            // never compared, open parens stop every popping loop
            ShuntOpTyp::OpenParen => i8::MIN,
        }
    }

    /// Returns `None` for parentheses, which never reach the output.
    fn into_output(self) -> Option<Operation> {
        let typ = match self.typ {
            ShuntOpTyp::Operator(typ) => OperationTyp::Operator(typ),
            ShuntOpTyp::Fun => OperationTyp::Ident,
            ShuntOpTyp::OpenParen => return None,
        };
        Some(Operation { typ, loc: self.loc })
    }
}

/// Pop operators into the output until an open paren (left on the stack) or
/// the bottom of the stack is reached.
fn pop_until_paren(ops: &mut Vec<ShuntOp>, out: &mut Vec<Operation>) {
    while let Some(op) = ops.last() {
        if op.typ == ShuntOpTyp::OpenParen {
            break;
        }
        if let Some(op) = ops.pop().and_then(ShuntOp::into_output) {
            out.push(op);
        }
    }
}

pub fn parse(lex: Lexer<'_>, idents: &Idents) -> Result<Program, ParseErr> {
    let mut out: Vec<Operation> = Vec::new(); // output
    let mut ops: Vec<ShuntOp> = Vec::new(); // operator stack

    for tok in lex {
        let tok = tok?;
        match tok.typ {
            TokTyp::Number => {
                let num: Number = tok.loc.get().parse().map_err(|err| ParseErr {
                    typ: ParseErrTyp::ParseNum(err),
                    loc: tok.loc.clone(),
                })?;
                out.push(Operation {
                    typ: OperationTyp::Val(num),
                    loc: tok.loc,
                });
            }

            TokTyp::Ident => {
                if let Some(Ident::Fun(_)) = idents.get(&tok.loc.clone().into()) {
                    ops.push(ShuntOp {
                        typ: ShuntOpTyp::Fun,
                        loc: tok.loc,
                    });
                } else {
                    // unknown identifiers are loaded like variables so that the
                    // evaluator can report them with their location
                    out.push(Operation {
                        typ: OperationTyp::Ident,
                        loc: tok.loc,
                    });
                }
            }

            TokTyp::Op(o1) => {
                while let Some(o2) = ops.last() {
                    let pops = !o1.is_prefix()
                        && o2.typ != ShuntOpTyp::OpenParen
                        && ((o2.precedence() > o1.precedence())
                            || ((o1.precedence() == o2.precedence())
                                && (o1.associativity() == Associativity::Left)));
                    if !pops {
                        break;
                    }
                    if let Some(op) = ops.pop().and_then(ShuntOp::into_output) {
                        out.push(op);
                    }
                }
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::Operator(o1),
                    loc: tok.loc,
                });
            }

            TokTyp::Comma => pop_until_paren(&mut ops, &mut out),

            TokTyp::OpenParen => {
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::OpenParen,
                    loc: tok.loc,
                });
            }

            TokTyp::CloseParen => {
                pop_until_paren(&mut ops, &mut out);

                if ops.pop().is_none() {
                    return Err(ParseErr {
                        typ: ParseErrTyp::ParenMismatch,
                        loc: tok.loc,
                    });
                }

                // handle functions
                if let Some(ShuntOp {
                    typ: ShuntOpTyp::Fun,
                    ..
                }) = ops.last()
                {
                    if let Some(op) = ops.pop().and_then(ShuntOp::into_output) {
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
            | TokTyp::XCloseCurly => {
                return Err(ParseErr {
                    typ: ParseErrTyp::LexErr(LexErrTyp::Unsupported(tok.typ)),
                    loc: tok.loc,
                })
            }
        }
    }

    while let Some(op) = ops.pop() {
        let loc = op.loc.clone();
        match op.into_output() {
            Some(op) => out.push(op),
            None => {
                return Err(ParseErr {
                    typ: ParseErrTyp::ParenMismatch,
                    loc,
                })
            }
        }
    }

    Ok(Program::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        eval::{eval, Bindings},
        stdlib,
    };
    use std::sync::Arc;

    fn run(src: &str, x: Number) -> Number {
        let idents = stdlib::standard_idents();
        let src = Arc::new(src.to_string());
        let prog = parse(Lexer::new(&src), &idents).unwrap();
        eval(&prog, &idents, &Bindings::x(x), &mut Vec::new()).unwrap()
    }

    #[test]
    fn negation_binds_looser_than_power() {
        assert_eq!(run("-(x^2)", 3.0), -9.0);
        assert_eq!(run("-x^2", 3.0), -9.0);
        assert_eq!(run("x^-1", 4.0), 0.25);
        assert_eq!(run("2*-x", 4.0), -8.0);
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(run("2^3^2", 0.0), 512.0);
    }

    #[test]
    fn subtraction_is_left_associative() {
        assert_eq!(run("10-x-1", 4.0), 5.0);
        assert_eq!(run("2-x", 0.5), 1.5);
    }

    #[test]
    fn functions_with_several_arguments() {
        assert_eq!(run("max(x, 2) + min(1, x)", 5.0), 6.0);
        assert!((run("log(8, 2)", 0.0) - 3.0).abs() < 1e-12);
        assert_eq!(run("sqrt x + 1", 9.0), 4.0);
    }

    #[test]
    fn unbalanced_parentheses_are_reported() {
        let idents = stdlib::standard_idents();
        for bad in ["(x", "x)", "sin(x))"] {
            let src = Arc::new(bad.to_string());
            let err = parse(Lexer::new(&src), &idents).unwrap_err();
            assert!(matches!(err.typ, ParseErrTyp::ParenMismatch), "{bad}");
        }
    }
}
