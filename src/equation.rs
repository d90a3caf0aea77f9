// SPDX: CC0-1.0

//! The equation: expressions, variables, range and the plots built from them.

use crate::{
    config::Settings,
    engine::Engine,
    env::VarEnv,
    eval::EvalErr,
    outcome::Outcome,
    range::{Range, RangeErr, Steps},
    Number, Point,
};
use thiserror::Error;

/// Which expression a plot is drawn from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum PlotKind {
    /// `(x, y) = (x, f(x))`
    #[default]
    YPlot,
    /// `(x, y) = (f(t), g(t))`
    XYPlot,
    /// `r = f(theta)`
    RPlot,
    /// `theta = f(r)`
    TPlot,
}

/// One of the four expression slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Slot {
    X,
    Y,
    R,
    T,
}

#[derive(Clone, Debug)]
struct Expr<C> {
    text: String,
    compiled: Option<C>,
}

/// A range bound: its value and the text it was evaluated from.
#[derive(Clone, Debug)]
struct Bound {
    value: Number,
    text: String,
}

#[derive(Debug, Error)]
pub enum PlotErr {
    #[error("the {slot} expression \"{text}\" does not compile against the current variables")]
    Uncompiled { slot: Slot, text: String },
    #[error("the {slot} expression cannot be evaluated: {source}")]
    Unresolved {
        slot: Slot,
        #[source]
        source: EvalErr,
    },
    #[error("invalid range: {0}")]
    Range(#[from] RangeErr),
}

#[derive(Clone, Debug)]
pub struct Equation<E: Engine> {
    engine: E,
    settings: Settings,
    name: String,
    vars: VarEnv,
    x: Expr<E::Compiled>,
    y: Expr<E::Compiled>,
    r: Expr<E::Compiled>,
    t: Expr<E::Compiled>,
    start: Bound,
    end: Bound,
    step: Bound,
    param: String,
    radius: String,
    theta: String,
    precision: usize,
    plot_kind: PlotKind,
}

impl<E: Engine> Default for Equation<E> {
    fn default() -> Self {
        Self::new(E::default(), Settings::default())
    }
}

impl<E: Engine> Equation<E> {
    pub fn new(engine: E, settings: Settings) -> Self {
        let vars: VarEnv = settings
            .variables
            .iter()
            .map(|(name, val)| (name.as_str(), *val))
            .collect();

        let expr = |slot: Slot| {
            let text = settings.expression.clone();
            let compiled = match engine.compile(&text, &vars) {
                Ok(compiled) => Some(compiled),
                Err(err) => {
                    log::warn!("default {slot} expression {text:?} does not compile: {err}");
                    None
                }
            };
            Expr { text, compiled }
        };
        let (x, y, r, t) = (expr(Slot::X), expr(Slot::Y), expr(Slot::R), expr(Slot::T));

        let bound = |text: &str| {
            let value = evaluate_with(&engine, &vars, text).unwrap_or_else(|| {
                log::warn!("default range bound {text:?} does not evaluate");
                Number::NAN
            });
            Bound {
                value,
                text: text.trim().to_string(),
            }
        };
        let (start, end, step) = (
            bound(&settings.range_start),
            bound(&settings.range_end),
            bound(&settings.range_step),
        );

        Self {
            name: settings.name.clone(),
            param: settings.param.clone(),
            radius: settings.radius.clone(),
            theta: settings.theta.clone(),
            precision: settings.precision,
            plot_kind: PlotKind::default(),
            engine,
            settings,
            vars,
            x,
            y,
            r,
            t,
            start,
            end,
            step,
        }
    }

    /// A new equation with the same backend and defaults.
    pub fn fresh(&self) -> Self {
        Self::new(self.engine.clone(), self.settings.clone())
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn expr(&self, slot: Slot) -> &Expr<E::Compiled> {
        match slot {
            Slot::X => &self.x,
            Slot::Y => &self.y,
            Slot::R => &self.r,
            Slot::T => &self.t,
        }
    }

    fn expr_mut(&mut self, slot: Slot) -> &mut Expr<E::Compiled> {
        match slot {
            Slot::X => &mut self.x,
            Slot::Y => &mut self.y,
            Slot::R => &mut self.r,
            Slot::T => &mut self.t,
        }
    }

    pub fn expression(&self, slot: Slot) -> &str {
        &self.expr(slot).text
    }

    /// Compiles `text` into `slot`. On failure the slot keeps its previous
    /// text and compiled form.
    pub fn set_expression(&mut self, slot: Slot, text: &str) -> Outcome {
        match self.engine.compile(text, &self.vars) {
            Ok(compiled) => {
                *self.expr_mut(slot) = Expr {
                    text: text.to_string(),
                    compiled: Some(compiled),
                };
                Outcome::success()
            }
            Err(err) => {
                log::debug!("rejected {slot} expression {text:?}: {err}");
                Outcome::failure(err.messages())
            }
        }
    }

    pub fn x_expression(&self) -> &str {
        self.expression(Slot::X)
    }

    pub fn y_expression(&self) -> &str {
        self.expression(Slot::Y)
    }

    pub fn r_expression(&self) -> &str {
        self.expression(Slot::R)
    }

    pub fn t_expression(&self) -> &str {
        self.expression(Slot::T)
    }

    pub fn set_x_expression(&mut self, text: &str) -> Outcome {
        self.set_expression(Slot::X, text)
    }

    pub fn set_y_expression(&mut self, text: &str) -> Outcome {
        self.set_expression(Slot::Y, text)
    }

    pub fn set_r_expression(&mut self, text: &str) -> Outcome {
        self.set_expression(Slot::R, text)
    }

    pub fn set_t_expression(&mut self, text: &str) -> Outcome {
        self.set_expression(Slot::T, text)
    }

    pub fn vars(&self) -> &VarEnv {
        &self.vars
    }

    pub fn var(&self, name: &str) -> Option<Number> {
        self.vars.get(name)
    }

    pub fn set_var(&mut self, name: &str, val: Number) {
        let generation = self.vars.generation();
        self.vars.insert(name, val);
        if generation != self.vars.generation() {
            self.refresh();
        }
    }

    pub fn remove_var(&mut self, name: &str) -> Option<Number> {
        let old = self.vars.remove(name);
        if old.is_some() {
            self.refresh();
        }
        old
    }

    /// Recompiles every slot the backend can no longer evaluate as is.
    fn refresh(&mut self) {
        let Self {
            engine,
            vars,
            x,
            y,
            r,
            t,
            ..
        } = self;
        for (slot, expr) in [(Slot::X, x), (Slot::Y, y), (Slot::R, r), (Slot::T, t)] {
            let needed = match &expr.compiled {
                Some(compiled) => engine.is_stale(compiled, vars),
                None => true,
            };
            if !needed {
                continue;
            }
            expr.compiled = match engine.compile(&expr.text, vars) {
                Ok(compiled) => Some(compiled),
                Err(err) => {
                    if expr.compiled.is_some() {
                        log::warn!("{slot} expression {:?} no longer compiles: {err}", expr.text);
                    }
                    None
                }
            };
        }
    }

    pub fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn is_valid_expression(&self, text: &str) -> bool {
        self.engine.compile(text, &self.vars).is_ok()
    }

    pub fn is_valid_value(&self, text: &str) -> bool {
        self.evaluate(text).is_some()
    }

    /// Compiles and evaluates `text` once against the current variables.
    pub fn evaluate(&self, text: &str) -> Option<Number> {
        evaluate_with(&self.engine, &self.vars, text)
    }

    fn bound(&self, text: &str) -> Result<Bound, Outcome> {
        match self.evaluate(text) {
            Some(value) => Ok(Bound {
                value,
                text: text.trim().to_string(),
            }),
            None => Err(Outcome::failure(vec![format!(
                "Invalid expression: \"{}\"",
                text.trim()
            )])),
        }
    }

    pub fn set_range_start(&mut self, text: &str) -> Outcome {
        match self.bound(text) {
            Ok(bound) => {
                self.start = bound;
                Outcome::success()
            }
            Err(outcome) => outcome,
        }
    }

    pub fn set_range_end(&mut self, text: &str) -> Outcome {
        match self.bound(text) {
            Ok(bound) => {
                self.end = bound;
                Outcome::success()
            }
            Err(outcome) => outcome,
        }
    }

    pub fn set_range_step(&mut self, text: &str) -> Outcome {
        match self.bound(text) {
            Ok(bound) => {
                self.step = bound;
                Outcome::success()
            }
            Err(outcome) => outcome,
        }
    }

    pub fn range_start(&self) -> Number {
        self.start.value
    }

    pub fn range_start_expr(&self) -> &str {
        &self.start.text
    }

    pub fn range_end(&self) -> Number {
        self.end.value
    }

    pub fn range_end_expr(&self) -> &str {
        &self.end.text
    }

    pub fn range_step(&self) -> Number {
        self.step.value
    }

    pub fn range_step_expr(&self) -> &str {
        &self.step.text
    }

    pub fn range(&self) -> Range {
        Range {
            start: self.start.value,
            end: self.end.value,
            step: self.step.value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn param_name(&self) -> &str {
        &self.param
    }

    pub fn set_param_name(&mut self, name: impl Into<String>) {
        self.param = name.into();
    }

    pub fn radius_name(&self) -> &str {
        &self.radius
    }

    pub fn set_radius_name(&mut self, name: impl Into<String>) {
        self.radius = name.into();
    }

    pub fn theta_name(&self) -> &str {
        &self.theta
    }

    pub fn set_theta_name(&mut self, name: impl Into<String>) {
        self.theta = name.into();
    }

    pub const fn precision(&self) -> usize {
        self.precision
    }

    pub fn set_precision(&mut self, precision: usize) {
        self.precision = precision;
    }

    /// Formats `val` with the display precision.
    pub fn format_value(&self, val: Number) -> String {
        format!("{val:.prec$}", prec = self.precision)
    }

    pub const fn plot_kind(&self) -> PlotKind {
        self.plot_kind
    }

    pub fn set_plot_kind(&mut self, kind: PlotKind) {
        self.plot_kind = kind;
    }

    /// Runs the selected plot kind.
    pub fn plot(&self) -> Result<Plot<'_, E>, PlotErr> {
        self.plot_with(self.plot_kind)
    }

    /// `(x, y(x))` over the range, binding `x`.
    pub fn plot_y(&self) -> Result<Plot<'_, E>, PlotErr> {
        self.plot_with(PlotKind::YPlot)
    }

    /// `(x(t), y(t))` over the range, binding the parameter.
    pub fn plot_xy(&self) -> Result<Plot<'_, E>, PlotErr> {
        self.plot_with(PlotKind::XYPlot)
    }

    /// `r = r(theta)` over the range, binding the angle.
    pub fn plot_r(&self) -> Result<Plot<'_, E>, PlotErr> {
        self.plot_with(PlotKind::RPlot)
    }

    /// `theta = t(r)` over the range, binding the radius.
    pub fn plot_t(&self) -> Result<Plot<'_, E>, PlotErr> {
        self.plot_with(PlotKind::TPlot)
    }

    fn ready(&self, slot: Slot) -> Result<&E::Compiled, PlotErr> {
        let expr = self.expr(slot);
        let compiled = expr.compiled.as_ref().ok_or_else(|| PlotErr::Uncompiled {
            slot,
            text: expr.text.clone(),
        })?;
        self.engine
            .check(compiled, &self.vars)
            .map_err(|source| PlotErr::Unresolved { slot, source })?;
        Ok(compiled)
    }

    fn plot_with(&self, kind: PlotKind) -> Result<Plot<'_, E>, PlotErr> {
        let (var, first, second) = match kind {
            PlotKind::YPlot => ("x", self.ready(Slot::Y)?, None),
            PlotKind::XYPlot => (
                self.param.as_str(),
                self.ready(Slot::X)?,
                Some(self.ready(Slot::Y)?),
            ),
            PlotKind::RPlot => (self.theta.as_str(), self.ready(Slot::R)?, None),
            PlotKind::TPlot => (self.radius.as_str(), self.ready(Slot::T)?, None),
        };
        let steps = self
            .range()
            .steps(self.settings.range_mode, self.settings.max_points)?;
        log::debug!("plotting {kind} over {:?} binding '{var}'", self.range());

        Ok(Plot {
            engine: &self.engine,
            kind,
            first,
            second,
            slot: self.vars.slot(var),
            env: self.vars.clone(),
            steps,
            stack: Vec::new(),
        })
    }
}

fn evaluate_with<E: Engine>(engine: &E, vars: &VarEnv, text: &str) -> Option<Number> {
    let compiled = engine.compile(text, vars).ok()?;
    let mut stack = Vec::new();
    engine.evaluate(&compiled, vars, &mut stack).ok()
}

/// Lazy sequence of plotted points.
///
/// The iteration variable is bound in a private copy of the variables, so
/// the equation itself is never changed by plotting.
#[derive(Debug)]
pub struct Plot<'eq, E: Engine> {
    engine: &'eq E,
    kind: PlotKind,
    first: &'eq E::Compiled,
    second: Option<&'eq E::Compiled>,
    slot: Option<usize>,
    env: VarEnv,
    steps: Steps,
    stack: Vec<Number>,
}

impl<'eq, E: Engine> Plot<'eq, E> {
    pub const fn kind(&self) -> PlotKind {
        self.kind
    }

    fn point(&mut self, val: Number) -> Result<Point<Number>, EvalErr> {
        let first = self.engine.evaluate(self.first, &self.env, &mut self.stack)?;
        Ok(match (self.kind, self.second) {
            (PlotKind::XYPlot, Some(second)) => {
                let y = self.engine.evaluate(second, &self.env, &mut self.stack)?;
                Point::new(first, y)
            }
            (PlotKind::RPlot, _) => Point::from_polar(first, val),
            (PlotKind::TPlot, _) => Point::from_polar(val, first),
            (PlotKind::YPlot | PlotKind::XYPlot, _) => Point::new(val, first),
        })
    }
}

impl<'eq, E: Engine> Iterator for Plot<'eq, E> {
    type Item = Result<Point<Number>, EvalErr>;

    fn next(&mut self) -> Option<Self::Item> {
        let val = self.steps.next()?;
        if let Some(slot) = self.slot {
            self.env.set_at(slot, val);
        }
        Some(self.point(val))
    }
}
