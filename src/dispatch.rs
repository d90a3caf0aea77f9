// SPDX: CC0-1.0

//! Routes parsed commands to an [`Equation`].

use crate::{
    command::{Command, ParsedCommand},
    engine::Engine,
    equation::{Equation, Slot},
    outcome::Outcome,
};
use core::fmt;
use std::io::Write;

/// Which name a name-setting command changes.
#[derive(Clone, Copy)]
enum NameSlot {
    Param,
    Radius,
    Theta,
}

/// Which range bound a range command changes.
#[derive(Clone, Copy)]
enum BoundSlot {
    Start,
    End,
    Step,
}

/// Applies commands to an equation and collects diagnostics.
///
/// Queries (a settable command with an empty argument) write the current
/// value to `out`.
#[derive(Debug)]
pub struct Dispatcher<E: Engine, W: Write> {
    equation: Equation<E>,
    out: W,
    command: Command,
    errors: Vec<String>,
}

impl<E: Engine, W: Write> Dispatcher<E, W> {
    pub fn new(equation: Equation<E>, out: W) -> Self {
        Self {
            equation,
            out,
            command: Command::None,
            errors: Vec::new(),
        }
    }

    pub fn equation(&self) -> &Equation<E> {
        &self.equation
    }

    pub fn equation_mut(&mut self) -> &mut Equation<E> {
        &mut self.equation
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// The equation and the output sink at once.
    pub fn split(&mut self) -> (&Equation<E>, &mut W) {
        (&self.equation, &mut self.out)
    }

    pub fn into_inner(self) -> (Equation<E>, W) {
        (self.equation, self.out)
    }

    pub fn dispatch_parsed(&mut self, parsed: &ParsedCommand) -> Outcome {
        self.dispatch(parsed.command, &parsed.argument)
    }

    pub fn dispatch(&mut self, command: Command, argument: &str) -> Outcome {
        log::debug!("dispatching {command} {argument:?}");
        self.errors.clear();
        self.command = command;
        let argument = argument.trim();

        match command {
            Command::Equation => {
                self.equation = self.equation.fresh();
                self.equation.set_name(argument);
            }
            Command::XEquals => self.expression(Slot::X, argument),
            Command::YEquals => self.expression(Slot::Y, argument),
            Command::REquals => self.expression(Slot::R, argument),
            Command::TEquals => self.expression(Slot::T, argument),
            Command::Set => self.set_vars(argument),
            Command::Start => self.bound(BoundSlot::Start, argument),
            Command::End => self.bound(BoundSlot::End, argument),
            Command::Step => self.bound(BoundSlot::Step, argument),
            Command::Param => self.name(NameSlot::Param, argument),
            Command::Radius => self.name(NameSlot::Radius, argument),
            Command::Theta => self.name(NameSlot::Theta, argument),
            Command::Invalid => self.error("is not a valid command in this context"),
            Command::None
            | Command::Exit
            | Command::YPlot
            | Command::XYPlot
            | Command::RPlot
            | Command::TPlot
            | Command::Open
            | Command::Save => {}
        }

        Outcome::from_messages(core::mem::take(&mut self.errors))
    }

    fn print(&mut self, val: impl fmt::Display) {
        if let Err(err) = writeln!(self.out, "{val}") {
            log::warn!("failed to write {} query result: {err}", self.command);
        }
    }

    fn expression(&mut self, slot: Slot, argument: &str) {
        if argument.is_empty() {
            let text = self.equation.expression(slot).to_string();
            self.print(text);
        } else {
            let outcome = self.equation.set_expression(slot, argument);
            self.errors.extend(outcome.into_messages());
        }
    }

    fn bound(&mut self, which: BoundSlot, argument: &str) {
        if argument.is_empty() {
            let val = match which {
                BoundSlot::Start => self.equation.range_start(),
                BoundSlot::End => self.equation.range_end(),
                BoundSlot::Step => self.equation.range_step(),
            };
            self.print(val);
            return;
        }
        let outcome = match which {
            BoundSlot::Start => self.equation.set_range_start(argument),
            BoundSlot::End => self.equation.set_range_end(argument),
            BoundSlot::Step => self.equation.set_range_step(argument),
        };
        self.errors.extend(outcome.into_messages());
    }

    fn name(&mut self, which: NameSlot, argument: &str) {
        if argument.is_empty() {
            let name = match which {
                NameSlot::Param => self.equation.param_name(),
                NameSlot::Radius => self.equation.radius_name(),
                NameSlot::Theta => self.equation.theta_name(),
            }
            .to_string();
            self.print(name);
        } else if !Equation::<E>::is_valid_name(argument) {
            self.error_at(argument, "is not a valid variable name");
        } else {
            match which {
                NameSlot::Param => self.equation.set_param_name(argument),
                NameSlot::Radius => self.equation.set_radius_name(argument),
                NameSlot::Theta => self.equation.set_theta_name(argument),
            }
        }
    }

    fn set_vars(&mut self, argument: &str) {
        if argument.is_empty() {
            let lines: Vec<_> = self
                .equation
                .vars()
                .sorted()
                .into_iter()
                .map(|(name, val)| format!("{name}={}", self.equation.format_value(val)))
                .collect();
            for line in lines {
                self.print(line);
            }
            return;
        }

        // "a,,b" has no empty entry but "a, ,b" has a blank one
        for spec in argument.split(',').filter(|it| !it.is_empty()) {
            self.set_var(spec.trim());
        }
    }

    fn set_var(&mut self, spec: &str) {
        let mut parts: Vec<_> = spec.split('=').map(str::trim).collect();
        // "a=" declares a with value 0, like "a"
        while parts.len() > 1 && parts.last().is_some_and(|it| it.is_empty()) {
            parts.pop();
        }
        let (name, value) = match parts.as_slice() {
            [name] => (*name, None),
            [name, value] => (*name, Some(*value)),
            _ => {
                self.error_at(spec, "is not a valid variable specification");
                return;
            }
        };

        if !Equation::<E>::is_valid_name(name) {
            self.error_at(name, "is not a valid variable name");
            return;
        }
        let val = match value {
            None => 0.0,
            Some(text) => match self.equation.evaluate(text) {
                Some(val) => val,
                None => {
                    self.error_at(text, "is not a valid value");
                    return;
                }
            },
        };
        self.equation.set_var(name, val);
    }

    fn error(&mut self, message: &str) {
        self.errors.push(format!("\"{}\" {message}", self.command));
    }

    fn error_at(&mut self, arg: &str, message: &str) {
        self.errors.push(format!("{}: \"{arg}\" {message}", self.command));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        command::parse_line,
        engine::{LiveEngine, SnapshotEngine},
    };

    fn dispatcher<E: Engine>() -> Dispatcher<E, Vec<u8>> {
        Dispatcher::new(Equation::default(), Vec::new())
    }

    fn output<E: Engine>(d: &Dispatcher<E, Vec<u8>>) -> String {
        String::from_utf8(d.out.clone()).unwrap()
    }

    fn set_partial_success<E: Engine>() {
        let mut d = dispatcher::<E>();
        let outcome = d.dispatch(Command::Set, "p=5,bad^name=2,q");
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.messages(),
            ["SET: \"bad^name\" is not a valid variable name"]
        );
        assert_eq!(d.equation().var("p"), Some(5.0));
        assert_eq!(d.equation().var("q"), Some(0.0));
        assert_eq!(d.equation().var("bad^name"), None);
    }

    fn set_messages<E: Engine>() {
        let mut d = dispatcher::<E>();
        let outcome = d.dispatch(Command::Set, " a = 1 + 1 , b=c=2, , d=nope, e= ");
        assert_eq!(
            outcome.messages(),
            [
                "SET: \"b=c=2\" is not a valid variable specification",
                "SET: \"\" is not a valid variable name",
                "SET: \"nope\" is not a valid value",
            ]
        );
        assert_eq!(d.equation().var("a"), Some(2.0));
        assert_eq!(d.equation().var("e"), Some(0.0));

        let outcome = d.dispatch(Command::Set, "p,,q, ,s,");
        assert_eq!(outcome.messages(), ["SET: \"\" is not a valid variable name"]);
        assert_eq!(d.equation().var("q"), Some(0.0));
        assert_eq!(d.equation().var("s"), Some(0.0));

        // values may use variables declared earlier in the same list
        assert!(d.dispatch(Command::Set, "k=3, m=k*2").is_success());
        assert_eq!(d.equation().var("m"), Some(6.0));
    }

    fn query_leaves_state<E: Engine>() {
        let mut d = dispatcher::<E>();
        assert!(d.dispatch(Command::Start, "-2").is_success());
        let outcome = d.dispatch(Command::Start, "");
        assert!(outcome.is_success());
        assert!(outcome.messages().is_empty());
        assert_eq!(d.equation().range_start(), -2.0);
        assert_eq!(output(&d), "-2\n");

        assert!(d.dispatch(Command::YEquals, "").is_success());
        assert!(d.dispatch(Command::Radius, "").is_success());
        assert_eq!(output(&d), "-2\n1\nr\n");
    }

    fn set_listing<E: Engine>() {
        let mut d = dispatcher::<E>();
        d.dispatch(Command::Set, "a=0.5");
        assert!(d.dispatch(Command::Set, "").is_success());
        assert_eq!(
            output(&d),
            "a=0.500\nb=0.000\nc=0.000\nr=0.000\nt=0.000\nx=0.000\ny=0.000\n"
        );
    }

    fn invalid_command<E: Engine>() {
        let mut d = dispatcher::<E>();
        let parsed = parse_line("frobnicate now");
        let outcome = d.dispatch_parsed(&parsed);
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.messages(),
            ["\"INVALID\" is not a valid command in this context"]
        );
        assert!(!outcome.messages()[0].contains("frobnicate"));
    }

    fn bad_expression<E: Engine>() {
        let mut d = dispatcher::<E>();
        assert!(d.dispatch(Command::XEquals, "2 * t").is_success());
        let outcome = d.dispatch(Command::XEquals, "2 * (t");
        assert!(!outcome.is_success());
        assert_eq!(d.equation().x_expression(), "2 * t");

        let outcome = d.dispatch(Command::Step, "1 / ");
        assert_eq!(outcome.messages(), ["Invalid expression: \"1 /\""]);
    }

    fn names<E: Engine>() {
        let mut d = dispatcher::<E>();
        assert!(d.dispatch(Command::Theta, "phi").is_success());
        assert_eq!(d.equation().theta_name(), "phi");
        let outcome = d.dispatch(Command::Param, "1t");
        assert_eq!(outcome.messages(), ["PARAM: \"1t\" is not a valid variable name"]);
        assert_eq!(d.equation().param_name(), "t");
    }

    fn equation_resets<E: Engine>() {
        let mut d = dispatcher::<E>();
        d.dispatch(Command::Set, "q=4");
        d.dispatch(Command::YEquals, "q * x");
        assert!(d.dispatch(Command::Equation, "parabola").is_success());
        assert_eq!(d.equation().name(), "parabola");
        assert_eq!(d.equation().var("q"), None);
        assert_eq!(d.equation().y_expression(), "1");
    }

    fn no_ops<E: Engine>() {
        let mut d = dispatcher::<E>();
        for c in [
            Command::None,
            Command::Exit,
            Command::YPlot,
            Command::XYPlot,
            Command::RPlot,
            Command::TPlot,
            Command::Open,
            Command::Save,
        ] {
            assert!(d.dispatch(c, "whatever").is_success());
        }
        assert!(output(&d).is_empty());
    }

    macro_rules! for_each_engine {
        ($($test:ident),* $(,)?) => {
            mod snapshot {
                use super::*;
                $(#[test] fn $test() { super::$test::<SnapshotEngine>() })*
            }
            mod live {
                use super::*;
                $(#[test] fn $test() { super::$test::<LiveEngine>() })*
            }
        };
    }

    for_each_engine!(
        set_partial_success,
        set_messages,
        query_leaves_state,
        set_listing,
        invalid_command,
        bad_expression,
        names,
        equation_resets,
        no_ops,
    );

    #[test]
    fn sink_failures_are_not_errors() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let mut d = Dispatcher::new(Equation::<SnapshotEngine>::default(), Broken);
        assert!(d.dispatch(Command::End, "").is_success());
    }
}
