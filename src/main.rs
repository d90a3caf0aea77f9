// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use equation_shell::{
    command::{self, Command, ParsedCommand},
    config::{EngineKind, Options},
    dispatch::Dispatcher,
    engine::{Engine, LiveEngine, SnapshotEngine},
    equation::{Equation, PlotKind},
    shell::{self, CommandReader},
};
use std::{
    fs::{File, OpenOptions},
    io::{stdin, stdout, BufRead, BufReader, BufWriter, IsTerminal, Write},
    process::ExitCode,
};

fn output_data_filename(now: DateTime<Local>) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S%.3f"),
        "data"
    )
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> anyhow::Result<()> {
    env_logger::init();
    let options = Options::from_args(std::env::args().skip(1))?;
    log::debug!("starting with {options:?}");

    let (src, interactive): (Box<dyn BufRead>, bool) = match options.script {
        Some(ref path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            (Box::new(BufReader::new(file)), false)
        }
        None => {
            let stdin = stdin();
            let interactive = stdin.is_terminal();
            (Box::new(stdin.lock()), interactive)
        }
    };

    match options.engine {
        EngineKind::Snapshot => run::<SnapshotEngine>(&options, src, interactive),
        EngineKind::Live => run::<LiveEngine>(&options, src, interactive),
    }
}

fn run<E: Engine>(options: &Options, src: Box<dyn BufRead>, interactive: bool) -> anyhow::Result<()> {
    let equation = Equation::new(E::default(), options.settings.clone());
    log::info!("evaluating with the {} engine", equation.engine().name());
    let mut dispatcher = Dispatcher::new(equation, BufWriter::new(stdout()));
    let mut reader = CommandReader::new(src);
    let prompt = interactive.then_some("> ");

    if interactive {
        writeln!(dispatcher.out(), "{}", command::usage())?;
    }

    loop {
        let cmd = reader.next_command(dispatcher.out(), prompt)?;
        match cmd.command {
            Command::Exit | Command::None => break,

            Command::Open | Command::Save => {
                writeln!(
                    dispatcher.out(),
                    "{}: saving and loading equations is not supported",
                    cmd.command
                )?;
            }

            Command::YPlot | Command::XYPlot | Command::RPlot | Command::TPlot => {
                if let Some(kind) = cmd.command.plot_kind() {
                    dispatcher.equation_mut().set_plot_kind(kind);
                    plot(&mut dispatcher, kind)?;
                }
            }

            Command::Equation
            | Command::XEquals
            | Command::YEquals
            | Command::REquals
            | Command::TEquals
            | Command::Set
            | Command::Start
            | Command::End
            | Command::Step
            | Command::Param
            | Command::Radius
            | Command::Theta
            | Command::Invalid => apply(&mut dispatcher, &cmd)?,
        }
        dispatcher.out().flush()?;
    }

    dispatcher.out().flush()?;
    Ok(())
}

fn apply<E: Engine, W: Write>(
    dispatcher: &mut Dispatcher<E, W>,
    cmd: &ParsedCommand,
) -> anyhow::Result<()> {
    let outcome = dispatcher.dispatch_parsed(cmd);
    let out = dispatcher.out();
    for msg in outcome.messages() {
        writeln!(out, "{msg}")?;
    }
    if cmd.command == Command::Invalid {
        if let Some(similar) = command::similar_command(&cmd.raw_token) {
            writeln!(out, "note: command {similar} has a similar name")?;
        }
    }
    Ok(())
}

fn plot<E: Engine, W: Write>(dispatcher: &mut Dispatcher<E, W>, kind: PlotKind) -> anyhow::Result<()> {
    let (equation, out) = dispatcher.split();
    let points = match equation.plot() {
        Ok(points) => points,
        Err(err) => {
            writeln!(out, "{kind}: {err}")?;
            return Ok(());
        }
    };

    let data_path = output_data_filename(Local::now());
    let mut data = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&data_path)
            .context("failed to open output data file")?,
    );

    let mut count = 0usize;
    for point in points {
        match point {
            Ok(point) => {
                writeln!(data, "{} {}", point.x, point.y)
                    .context("failed to write to output data file")?;
                count += 1;
            }
            Err(err) => {
                if let Some(ref op) = err.op {
                    shell::underline(&mut *out, &op.loc)?;
                }
                writeln!(out, "evaluation error: {err}")?;
                break;
            }
        }
    }

    data.flush()?;
    data.get_mut().sync_data()?;
    writeln!(out, "{kind}: wrote {count} points to {data_path}")?;
    Ok(())
}
