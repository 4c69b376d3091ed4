// SPDX: CC0-1.0

use crate::{eval::*, Number};
use core::f64::consts;
use std::collections::HashMap; // assumes Number = f64

pub const X: &str = "x";

pub fn standard_idents() -> Idents {
    let mut ret = HashMap::new();

    ret.insert(X.into(), Ident::Var);

    // operators
    for op in [
        OperatorTyp::Neg,
        OperatorTyp::Add,
        OperatorTyp::Sub,
        OperatorTyp::Mul,
        OperatorTyp::Div,
        OperatorTyp::Pow,
    ] {
        let (name, fun) = op.fun();
        ret.insert(name.into(), Ident::Fun(fun));
    }

    ret.insert("abs".into(), Ident::Fun(Fun::new(1, abs)));
    ret.insert("sqrt".into(), Ident::Fun(Fun::new(1, sqrt)));
    ret.insert("cbrt".into(), Ident::Fun(Fun::new(1, cbrt)));
    ret.insert("exp".into(), Ident::Fun(Fun::new(1, exp)));
    ret.insert("ln".into(), Ident::Fun(Fun::new(1, ln)));
    ret.insert("log".into(), Ident::Fun(Fun::new(2, log)));
    ret.insert("log10".into(), Ident::Fun(Fun::new(1, log10)));
    ret.insert("log2".into(), Ident::Fun(Fun::new(1, log2)));
    ret.insert("floor".into(), Ident::Fun(Fun::new(1, floor)));
    ret.insert("ceil".into(), Ident::Fun(Fun::new(1, ceil)));
    ret.insert("round".into(), Ident::Fun(Fun::new(1, round)));
    ret.insert("sign".into(), Ident::Fun(Fun::new(1, sign)));
    ret.insert("min".into(), Ident::Fun(Fun::new(2, min)));
    ret.insert("max".into(), Ident::Fun(Fun::new(2, max)));

    // trig
    ret.insert("sin".into(), Ident::Fun(Fun::new(1, sin)));
    ret.insert("cos".into(), Ident::Fun(Fun::new(1, cos)));
    ret.insert("tan".into(), Ident::Fun(Fun::new(1, tan)));
    ret.insert("asin".into(), Ident::Fun(Fun::new(1, arcsin)));
    ret.insert("acos".into(), Ident::Fun(Fun::new(1, arccos)));
    ret.insert("atan".into(), Ident::Fun(Fun::new(1, arctan)));
    ret.insert("arcsin".into(), Ident::Fun(Fun::new(1, arcsin)));
    ret.insert("arccos".into(), Ident::Fun(Fun::new(1, arccos)));
    ret.insert("arctan".into(), Ident::Fun(Fun::new(1, arctan)));
    ret.insert("sinh".into(), Ident::Fun(Fun::new(1, sinh)));
    ret.insert("cosh".into(), Ident::Fun(Fun::new(1, cosh)));
    ret.insert("tanh".into(), Ident::Fun(Fun::new(1, tanh)));

    ret.insert("pi".into(), Ident::Const(consts::PI));
    ret.insert("tau".into(), Ident::Const(consts::TAU));
    ret.insert("e".into(), Ident::Const(consts::E));
    ret
}

// arity is checked by the evaluator before any of these are called

pub fn neg(args: &[Number]) -> Number {
    -args[0]
}

pub fn add(args: &[Number]) -> Number {
    args[0] + args[1]
}

pub fn sub(args: &[Number]) -> Number {
    args[0] - args[1]
}

pub fn mul(args: &[Number]) -> Number {
    args[0] * args[1]
}

pub fn div(args: &[Number]) -> Number {
    args[0] / args[1]
}

pub fn pow(args: &[Number]) -> Number {
    args[0].powf(args[1])
}

pub fn abs(args: &[Number]) -> Number {
    args[0].abs()
}

pub fn sqrt(args: &[Number]) -> Number {
    args[0].sqrt()
}

pub fn cbrt(args: &[Number]) -> Number {
    args[0].cbrt()
}

pub fn exp(args: &[Number]) -> Number {
    args[0].exp()
}

pub fn ln(args: &[Number]) -> Number {
    args[0].ln()
}

pub fn log(args: &[Number]) -> Number {
    let [x, base] = [args[0], args[1]];
    x.log(base)
}

pub fn log10(args: &[Number]) -> Number {
    args[0].log10()
}

pub fn log2(args: &[Number]) -> Number {
    args[0].log2()
}

pub fn floor(args: &[Number]) -> Number {
    args[0].floor()
}

pub fn ceil(args: &[Number]) -> Number {
    args[0].ceil()
}

pub fn round(args: &[Number]) -> Number {
    args[0].round()
}

pub fn sign(args: &[Number]) -> Number {
    let x = args[0];
    if x == 0.0 || x.is_nan() {
        x
    } else {
        x.signum()
    }
}

pub fn min(args: &[Number]) -> Number {
    args[0].min(args[1])
}

pub fn max(args: &[Number]) -> Number {
    args[0].max(args[1])
}

pub fn sin(args: &[Number]) -> Number {
    args[0].sin()
}

pub fn cos(args: &[Number]) -> Number {
    args[0].cos()
}

pub fn tan(args: &[Number]) -> Number {
    args[0].tan()
}

pub fn arcsin(args: &[Number]) -> Number {
    args[0].asin()
}

pub fn arccos(args: &[Number]) -> Number {
    args[0].acos()
}

pub fn arctan(args: &[Number]) -> Number {
    args[0].atan()
}

pub fn sinh(args: &[Number]) -> Number {
    args[0].sinh()
}

pub fn cosh(args: &[Number]) -> Number {
    args[0].cosh()
}

pub fn tanh(args: &[Number]) -> Number {
    args[0].tanh()
}
