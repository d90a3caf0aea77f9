// SPDX: CC0-1.0

pub mod command;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod env;
pub mod equation;
pub mod eval;
pub mod lex;
pub mod outcome;
pub mod parse;
pub mod range;
pub mod shell;
pub mod stdlib;

use core::fmt;

pub type Number = f64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl Point<Number> {
    #[inline]
    pub const fn new(x: Number, y: Number) -> Self {
        Self { x, y }
    }

    /// Converts polar coordinates to cartesian ones.
    pub fn from_polar(radius: Number, theta: Number) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self {
            x: radius * cos,
            y: radius * sin,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Point<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    #[test]
    fn polar_quarter_turn() {
        let p = Point::from_polar(2.0, FRAC_PI_2);
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn display() {
        assert_eq!(Point::new(0.5, -1.0).to_string(), "(0.5, -1)");
    }
}
