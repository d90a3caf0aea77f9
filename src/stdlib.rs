// SPDX: CC0-1.0

use crate::{eval::Fun, Number};
use core::f64::consts;
use std::collections::HashMap; // assumes Number = f64

#[derive(Clone, Copy, Debug)]
pub enum Builtin {
    Const(Number),
    Fun(Fun),
}

pub type Library = HashMap<&'static str, Builtin>;

pub fn standard_library() -> Library {
    let mut ret = HashMap::new();

    let funs: [(&'static str, usize, fn(&[Number]) -> Number); 26] = [
        ("abs", 1, abs),
        ("ln", 1, ln),
        ("log", 2, log),
        ("sqrt", 1, sqrt),
        ("cbrt", 1, cbrt),
        ("exp", 1, exp),
        ("floor", 1, floor),
        ("ceil", 1, ceil),
        ("sign", 1, sign),
        ("min", 2, min),
        ("max", 2, max),
        // trig
        ("sin", 1, sin),
        ("cos", 1, cos),
        ("tan", 1, tan),
        ("sec", 1, sec),
        ("csc", 1, csc),
        ("cot", 1, cot),
        ("asin", 1, arcsin),
        ("acos", 1, arccos),
        ("atan", 1, arctan),
        ("arcsin", 1, arcsin),
        ("arccos", 1, arccos),
        ("arctan", 1, arctan),
        ("atan2", 2, atan2),
        // angles
        ("toDegrees", 1, to_degrees),
        ("toRadians", 1, to_radians),
    ];
    for (name, arity, fun) in funs {
        ret.insert(name, Builtin::Fun(Fun::new(arity, fun)));
    }

    ret.insert("pi", Builtin::Const(consts::PI));
    ret.insert("tau", Builtin::Const(consts::TAU));
    ret.insert("e", Builtin::Const(consts::E));
    ret
}

#[track_caller]
fn expect_n<const N: usize>(args: &[Number]) -> [Number; N] {
    assert_eq!(args.len(), N);
    let mut ret = [0.0; N];
    ret.copy_from_slice(args);
    ret
}

pub fn neg(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    -x
}

pub fn add(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x + y
}

pub fn sub(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x - y
}

pub fn mul(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x * y
}

pub fn div(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x / y
}

pub fn rem(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x % y
}

pub fn pow(args: &[Number]) -> Number {
    let [x, exp] = expect_n::<2>(args);
    x.powf(exp)
}

pub fn abs(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.abs()
}

pub fn ln(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.ln()
}

pub fn log(args: &[Number]) -> Number {
    let [x, base] = expect_n::<2>(args);
    x.log(base)
}

pub fn sqrt(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sqrt()
}

pub fn cbrt(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.cbrt()
}

pub fn exp(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.exp()
}

pub fn floor(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.floor()
}

pub fn ceil(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.ceil()
}

pub fn sign(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    if x == 0.0 {
        0.0
    } else {
        x.signum()
    }
}

pub fn min(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x.min(y)
}

pub fn max(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x.max(y)
}

pub fn sin(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sin()
}

pub fn cos(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.cos()
}

pub fn tan(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.tan()
}

pub fn sec(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.cos().recip()
}

pub fn csc(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sin().recip()
}

pub fn cot(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.tan().recip()
}

pub fn arcsin(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.asin()
}

pub fn arccos(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.acos()
}

pub fn arctan(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.atan()
}

pub fn atan2(args: &[Number]) -> Number {
    let [y, x] = expect_n::<2>(args);
    y.atan2(x)
}

pub fn to_degrees(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.to_degrees()
}

pub fn to_radians(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.to_radians()
}
