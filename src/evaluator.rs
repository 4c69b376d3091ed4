// SPDX: CC0-1.0

//! Evaluating expressions as total functions of `x`.
//!
//! [`Evaluator`] is the seam to whatever actually understands expression text.
//! Everything else in the crate goes through [`evaluate`] or [`function`], which
//! turn every kind of failure into `None` ("undefined at this x").

use crate::{
    eval::{self, Bindings, EvalErr, Idents, Program},
    lex::Lexer,
    parse::{self, ParseErr},
    stdlib, Number,
};
use std::{
    cell::RefCell,
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};
use thiserror::Error;
use tracing::trace;

/// An expression evaluator.
///
/// `Ok(None)` means the expression produced something that is not a number.
pub trait Evaluator: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn evaluate(&self, expr: &str, bindings: &Bindings) -> Result<Option<Number>, Self::Error>;
}

impl<E: Evaluator + ?Sized> Evaluator for Arc<E> {
    type Error = E::Error;

    fn evaluate(&self, expr: &str, bindings: &Bindings) -> Result<Option<Number>, Self::Error> {
        (**self).evaluate(expr, bindings)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    type Error = E::Error;

    fn evaluate(&self, expr: &str, bindings: &Bindings) -> Result<Option<Number>, Self::Error> {
        (**self).evaluate(expr, bindings)
    }
}

/// Evaluate `expr` at `x`, mapping errors and non-finite results to `None`.
pub fn evaluate<E: Evaluator + ?Sized>(evaluator: &E, expr: &str, x: Number) -> Option<Number> {
    match evaluator.evaluate(expr, &Bindings::x(x)) {
        Ok(Some(y)) if y.is_finite() => Some(y),
        Ok(_) => None,
        Err(err) => {
            trace!(expr, x, %err, "evaluation failed");
            None
        }
    }
}

/// Bind `expr` into a closure `x -> Option<y>` for the numeric algorithms.
pub fn function<'a, E: Evaluator + ?Sized>(
    evaluator: &'a E,
    expr: &'a str,
) -> impl Fn(Number) -> Option<Number> + 'a {
    move |x| evaluate(evaluator, expr, x)
}

#[derive(Clone, Debug, Error)]
pub enum EvalFailure {
    #[error("parse error: {0}")]
    Parse(#[from] ParseErr),

    #[error("evaluation error: {0}")]
    Eval(String),
}

/// Why an expression can never be evaluated, independent of `x`.
#[derive(Debug)]
pub enum Diagnostic {
    Parse(ParseErr),
    Eval(EvalErr),
}

thread_local! {
    static STACK: RefCell<Vec<Number>> = const { RefCell::new(Vec::new()) };
}

/// The built-in shunting-yard/stack-machine evaluator.
///
/// Compiled programs are cached by expression text, failed compilations too,
/// so sampling an expression parses it once.
#[derive(Debug)]
pub struct StackEvaluator {
    idents: Idents,
    programs: RwLock<HashMap<String, Result<Arc<Program>, ParseErr>>>,
}

impl Default for StackEvaluator {
    fn default() -> Self {
        Self::new(stdlib::standard_idents())
    }
}

impl StackEvaluator {
    pub fn new(idents: Idents) -> Self {
        Self {
            idents,
            programs: RwLock::new(HashMap::new()),
        }
    }

    pub fn idents(&self) -> &Idents {
        &self.idents
    }

    pub fn compile(&self, expr: &str) -> Result<Arc<Program>, ParseErr> {
        if let Some(cached) = self
            .programs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(expr)
        {
            return cached.clone();
        }

        let src = Arc::new(expr.to_string());
        let compiled = parse::parse(Lexer::new(&src), &self.idents).map(Arc::new);
        self.programs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(expr.to_string(), compiled.clone());
        compiled
    }

    /// Report problems that make `expr` undefined everywhere.
    ///
    /// Identifier errors do not depend on the bound value, so a trial run at
    /// `x = 0` is enough to find them. Arithmetic results are ignored.
    pub fn diagnose(&self, expr: &str) -> Result<(), Diagnostic> {
        let prog = self.compile(expr).map_err(Diagnostic::Parse)?;
        eval::eval(&prog, &self.idents, &Bindings::x(0.0), &mut Vec::new())
            .map(|_| ())
            .map_err(Diagnostic::Eval)
    }

    pub fn clear_cache(&self) {
        self.programs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Evaluator for StackEvaluator {
    type Error = EvalFailure;

    fn evaluate(&self, expr: &str, bindings: &Bindings) -> Result<Option<Number>, Self::Error> {
        let prog = self.compile(expr)?;
        STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            eval::eval(&prog, &self.idents, bindings, &mut stack)
                .map(Some)
                .map_err(|err| EvalFailure::Eval(err.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::EvalErrTyp;

    #[test]
    fn finite_results_pass_through() {
        let ev = StackEvaluator::default();
        assert_eq!(evaluate(&ev, "x * 2 + 1", 3.0), Some(7.0));
        assert_eq!(evaluate(&ev, "2-x", 0.5), Some(1.5));
    }

    #[test]
    fn non_finite_results_are_undefined() {
        let ev = StackEvaluator::default();
        assert_eq!(evaluate(&ev, "1/x", 0.0), None);
        assert_eq!(evaluate(&ev, "sqrt(x)", -1.0), None);
        assert_eq!(evaluate(&ev, "ln(x)", 0.0), None);
    }

    #[test]
    fn errors_are_undefined() {
        let ev = StackEvaluator::default();
        assert_eq!(evaluate(&ev, "x +", 1.0), None);
        assert_eq!(evaluate(&ev, "(x", 1.0), None);
        assert_eq!(evaluate(&ev, "foo(x)", 1.0), None);
        assert_eq!(evaluate(&ev, "", 1.0), None);
        assert_eq!(evaluate(&ev, "y = x", 1.0), None);
    }

    #[test]
    fn non_numeric_results_are_undefined() {
        struct Opaque;
        impl Evaluator for Opaque {
            type Error = EvalFailure;
            fn evaluate(&self, _: &str, _: &Bindings) -> Result<Option<Number>, EvalFailure> {
                Ok(None)
            }
        }
        assert_eq!(evaluate(&Opaque, "x", 1.0), None);
    }

    #[test]
    fn compiled_programs_are_shared() {
        let ev = StackEvaluator::default();
        let a = ev.compile("sin(x)").unwrap();
        let b = ev.compile("sin(x)").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        ev.clear_cache();
        let c = ev.compile("sin(x)").unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn diagnose_finds_undefined_identifiers() {
        let ev = StackEvaluator::default();
        assert!(ev.diagnose("sin(x) / x").is_ok());
        match ev.diagnose("sine(x)") {
            Err(Diagnostic::Eval(err)) => {
                assert!(matches!(err.typ, EvalErrTyp::UndefinedIdent { .. }))
            }
            other => panic!("unexpected diagnosis: {other:?}"),
        }
        assert!(matches!(ev.diagnose("x)"), Err(Diagnostic::Parse(_))));
    }

    #[test]
    fn bound_function_closure() {
        let ev = StackEvaluator::default();
        let f = function(&ev, "x^2");
        assert_eq!(f(3.0), Some(9.0));
        assert_eq!(f(-2.0), Some(4.0));
    }
}
