// SPDX: CC0-1.0

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use grapher::{
    config::GraphConfig,
    equation::{Equation, EquationId, EquationList},
    evaluator::{Diagnostic, StackEvaluator},
    extrema::Extremum,
    gesture::GestureEvent,
    gnuplot::{self, PlotFiles},
    graph::Graph,
    shell::{self, Command},
    ticks::format_coord,
    viewport::{GraphBounds, Viewport},
    worker::{Payload, RequestKey, RequestKind, Worker, WorkerParams},
    Number, Point,
};
use std::{
    io::{stdout, BufWriter, Write},
    path::{Path, PathBuf},
    process::{Child, ExitCode},
    sync::Arc,
    time::Duration,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(60);

/// Interactive function grapher
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML file with graph settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas width in pixels, overriding the config file
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels, overriding the config file
    #[arg(long)]
    height: Option<u32>,

    /// Write plot files without launching gnuplot
    #[arg(long)]
    no_plot: bool,

    /// Expressions in x to start with
    expressions: Vec<String>,
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

struct State {
    equations: EquationList,
    graph: Graph<Arc<StackEvaluator>>,
    viewport: Viewport,
    worker: Worker,
    gnuplot: Option<Child>,
    spawn_gnuplot: bool,
    next_id: usize,
}

fn load_config(cli: &Cli) -> anyhow::Result<GraphConfig> {
    let mut config = match cli.config {
        Some(ref path) => GraphConfig::load(path)
            .with_context(|| format!("failed to load config from '{}'", path.display()))?,
        None => GraphConfig::default(),
    };
    if let Some(width) = cli.width {
        config.canvas.width = width;
    }
    if let Some(height) = cli.height {
        config.canvas.height = height;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let evaluator = Arc::new(StackEvaluator::default());
    let worker = Worker::spawn(Arc::clone(&evaluator), WorkerParams::from_config(&config));
    let viewport = config.viewport().context("invalid initial viewport")?;
    let graph = Graph::new(evaluator, config).context("failed to set up graph")?;
    info!(width = viewport.width(), height = viewport.height(), "starting");

    let mut state = State {
        equations: EquationList::new(),
        graph,
        viewport,
        worker,
        gnuplot: None,
        spawn_gnuplot: !cli.no_plot,
        next_id: 1,
    };

    let mut stdout = BufWriter::new(stdout());
    for expr in &cli.expressions {
        add_equation(&mut stdout, &mut state, expr)?;
    }

    loop {
        writeln!(stdout, "window = {}", describe_bounds(state.viewport.bounds()))?;
        let Some(line) = shell::read_line(&mut stdout, "> ")? else {
            break;
        };
        let (name, args) = shell::split_command(&line);
        if name.is_empty() {
            continue;
        }
        writeln!(stdout)?;

        if let Ok(cmd) = name.parse::<Command>() {
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::Add => {
                    let expr = if args.is_empty() {
                        shell::input(&mut stdout, "y = ")?
                    } else {
                        args.to_string()
                    };
                    if !expr.is_empty() {
                        add_equation(&mut stdout, &mut state, &expr)?;
                    }
                }

                Command::Remove => {
                    if let Some(id) = require_id(&mut stdout, &state, args)? {
                        state.equations.remove(&id)?;
                        state.graph.equations_changed(&state.equations);
                        writeln!(stdout, "removed {id}")?;
                    }
                }

                Command::Edit => edit_equation(&mut stdout, &mut state, args)?,

                Command::Show => set_visible(&mut stdout, &mut state, args, true)?,

                Command::Hide => set_visible(&mut stdout, &mut state, args, false)?,

                Command::List => list_equations(&mut stdout, &state)?,

                Command::SetWin => set_win(&mut stdout, &mut state)?,

                Command::Plot => plot(&mut stdout, &mut state)?,

                Command::Click => click(&mut stdout, &mut state, args)?,

                Command::Drag => drag(&mut stdout, &mut state, args)?,

                Command::Zoom => zoom(&mut stdout, &mut state, args)?,

                Command::Intersections => {
                    let show = !state.graph.show_intersections();
                    state.graph.set_show_intersections(show);
                    if show {
                        state.graph.refresh(&state.equations, &state.viewport)?;
                        let found = state.graph.intersections();
                        writeln!(stdout, "intersections shown, {} in view", found.len())?;
                        for p in found {
                            writeln!(stdout, "  ({}, {})", format_coord(p.x), format_coord(p.y))?;
                        }
                    } else {
                        writeln!(stdout, "intersections hidden")?;
                    }
                }

                Command::Extrema => extrema(&mut stdout, &mut state, args)?,

                Command::PrintProg => {
                    if let Some(id) = require_id(&mut stdout, &state, args)? {
                        let eq = state.equations.get(&id).context("equation vanished")?;
                        match state.graph.evaluator().compile(&eq.expression) {
                            Ok(prog) => shell::dump_program(&mut stdout, &prog, format_args!("program"))?,
                            Err(err) => {
                                shell::report_diagnostic(
                                    &mut stdout,
                                    &eq.expression,
                                    &Diagnostic::Parse(err),
                                    state.graph.evaluator().idents(),
                                )?;
                            }
                        }
                    }
                }
            }
        } else if let Some(similar) = Command::suggest(&name) {
            writeln!(stdout, r#"Unknown command, did you mean "{similar}"?"#)?;
        } else {
            writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
        }

        writeln!(stdout)?;
    }
    stdout.flush()?;

    if let Some(mut child) = state.gnuplot.take() {
        // gnuplot --persist keeps its window after we go
        child.wait().context("failed to wait for gnuplot")?;
    }
    Ok(())
}

fn describe_bounds(b: &GraphBounds) -> String {
    format!("x [{}, {}], y [{}, {}]", b.x_min, b.x_max, b.y_min, b.y_max)
}

/// Parse `args` as exactly `N` numbers, explaining what went wrong if not.
fn numbers<W: Write, const N: usize>(mut out: W, args: &str, usage: &str) -> anyhow::Result<Option<[Number; N]>> {
    let parsed: Result<Vec<Number>, _> = args.split_whitespace().map(str::parse).collect();
    match parsed.map(<[Number; N]>::try_from) {
        Ok(Ok(values)) => Ok(Some(values)),
        Ok(Err(_)) => {
            writeln!(out, "usage: {usage}")?;
            Ok(None)
        }
        Err(err) => {
            writeln!(out, "parse error: {err}")?;
            Ok(None)
        }
    }
}

fn require_id<W: Write>(mut out: W, state: &State, args: &str) -> anyhow::Result<Option<EquationId>> {
    let Some(word) = args.split_whitespace().next() else {
        writeln!(out, "error: expected an equation id, see \"list\"")?;
        return Ok(None);
    };
    let id = EquationId::from(word);
    if state.equations.get(&id).is_some() {
        return Ok(Some(id));
    }
    writeln!(out, "error: no equation with id '{id}'")?;
    let ids = state.equations.iter().map(|eq| eq.id.as_str());
    if let Some(similar) = shell::most_similar(word, ids) {
        writeln!(out, "note: equation '{similar}' has a similar id")?;
    }
    Ok(None)
}

/// Report expressions that are undefined for every x. They are kept anyway.
fn diagnose<W: Write>(mut out: W, state: &State, expr: &str) -> anyhow::Result<()> {
    let ev = state.graph.evaluator();
    if let Err(diagnostic) = ev.diagnose(expr) {
        writeln!(out)?;
        shell::report_diagnostic(&mut out, expr, &diagnostic, ev.idents())?;
        writeln!(out, "note: the equation is kept but draws nothing until fixed")?;
    }
    Ok(())
}

fn add_equation<W: Write>(mut out: W, state: &mut State, expr: &str) -> anyhow::Result<()> {
    let id = loop {
        let id = EquationId::new(format!("f{}", state.next_id));
        state.next_id += 1;
        if state.equations.get(&id).is_none() {
            break id;
        }
    };
    let mut eq = Equation::explicit(id.clone(), expr);
    eq.style.color = state.equations.next_color();
    state.equations.add(eq)?;
    state.graph.equations_changed(&state.equations);
    writeln!(out, "{id}: y = {expr}")?;
    diagnose(&mut out, state, expr)
}

fn edit_equation<W: Write>(mut out: W, state: &mut State, args: &str) -> anyhow::Result<()> {
    let Some(id) = require_id(&mut out, state, args)? else {
        return Ok(());
    };
    let rest = args
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .unwrap_or_default();
    let expr = if rest.is_empty() {
        shell::input(&mut out, format_args!("{id}: y = "))?
    } else {
        rest.to_string()
    };
    if expr.is_empty() {
        return Ok(());
    }

    let mut eq = state.equations.get(&id).cloned().context("equation vanished")?;
    eq.expression = expr.clone();
    state.equations.update(eq)?;
    state.graph.equations_changed(&state.equations);
    writeln!(out, "{id}: y = {expr}")?;
    diagnose(&mut out, state, &expr)
}

fn set_visible<W: Write>(mut out: W, state: &mut State, args: &str, visible: bool) -> anyhow::Result<()> {
    if let Some(id) = require_id(&mut out, state, args)? {
        let mut eq = state.equations.get(&id).cloned().context("equation vanished")?;
        eq.visible = visible;
        state.equations.update(eq)?;
        state.graph.equations_changed(&state.equations);
    }
    Ok(())
}

fn list_equations<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    if state.equations.is_empty() {
        writeln!(out, "no equations, add one with \"add\"")?;
    }
    for eq in &state.equations {
        let selected = state.graph.selected_equation() == Some(&eq.id);
        writeln!(
            out,
            "{marker}{id}: y = {expr}  ({color}{hidden})",
            marker = if selected { "* " } else { "  " },
            id = eq.id,
            expr = eq.expression,
            color = eq.style.color,
            hidden = if eq.visible { "" } else { ", hidden" },
        )?;
    }
    Ok(())
}

fn set_win<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let mut bounds = *state.viewport.bounds();
    writeln!(out, "note: leave blank to skip")?;

    for (name, dst) in [
        ("x min", &mut bounds.x_min),
        ("x max", &mut bounds.x_max),
        ("y min", &mut bounds.y_min),
        ("y max", &mut bounds.y_max),
    ] {
        let cur = *dst;
        match shell::read_fromstr::<_, Number>(&mut out, format_args!("?{name} (is {cur}) = "), true)? {
            Ok(Some(new)) => *dst = new,
            Ok(None) => {}
            Err(_) => return Ok(()),
        }
    }

    commit(&mut out, state, bounds)
}

/// Apply new bounds, or explain why they were refused.
fn commit<W: Write>(mut out: W, state: &mut State, bounds: GraphBounds) -> anyhow::Result<()> {
    match state.viewport.with_bounds(bounds) {
        Ok(viewport) => {
            state.viewport = viewport;
            state.graph.bounds_changed();
        }
        Err(err) => writeln!(out, "error: {err}, keeping the previous window")?,
    }
    Ok(())
}

fn plot<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let scene = state.graph.scene(&state.equations, &state.viewport)?;
    let files = PlotFiles::at(Path::new("."), Local::now());
    gnuplot::write_files(&scene, &files)?;
    debug!(?files, "wrote plot");
    writeln!(out, "wrote {}", files.data.display())?;
    writeln!(out, "wrote {}", files.script.display())?;

    if !state.spawn_gnuplot {
        return Ok(());
    }
    if let Some(mut old_child) = state.gnuplot.take() {
        old_child
            .kill()
            .context("failed to kill previous gnuplot child")?;
    }
    state.gnuplot = Some(gnuplot::spawn(&files.script)?);
    Ok(())
}

fn click<W: Write>(mut out: W, state: &mut State, args: &str) -> anyhow::Result<()> {
    let Some([x, y]) = numbers::<_, 2>(&mut out, args, "click <x> <y>")? else {
        return Ok(());
    };
    let pos = Point::new(x, y);
    for event in [GestureEvent::PointerDown { pos }, GestureEvent::PointerUp { pos }] {
        state.graph.handle(event, &state.equations, &state.viewport)?;
    }

    if let Some(p) = state.graph.selected_point() {
        writeln!(out, "selected point ({}, {})", format_coord(p.x), format_coord(p.y))?;
    } else if let Some(id) = state.graph.selected_equation() {
        writeln!(out, "selected {id}")?;
        print_extrema(&mut out, state.graph.extrema())?;
    } else {
        writeln!(out, "nothing there, selection cleared")?;
    }
    Ok(())
}

fn drag<W: Write>(mut out: W, state: &mut State, args: &str) -> anyhow::Result<()> {
    let Some([dx, dy]) = numbers::<_, 2>(&mut out, args, "drag <dx> <dy>")? else {
        return Ok(());
    };
    let from = Point::new(
        Number::from(state.viewport.width()) / 2.0,
        Number::from(state.viewport.height()) / 2.0,
    );
    let to = Point::new(from.x + dx, from.y + dy);
    let events = [
        GestureEvent::PointerDown { pos: from },
        GestureEvent::PointerMove { pos: to },
        GestureEvent::PointerUp { pos: to },
    ];
    for event in events {
        if let Some(bounds) = state.graph.handle(event, &state.equations, &state.viewport)? {
            commit(&mut out, state, bounds)?;
        }
    }
    Ok(())
}

fn zoom<W: Write>(mut out: W, state: &mut State, args: &str) -> anyhow::Result<()> {
    let (direction, rest) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
    let delta_y = match direction {
        "in" => -1.0,
        "out" => 1.0,
        _ => {
            writeln!(out, "usage: zoom <in|out> [x y]")?;
            return Ok(());
        }
    };
    let pos = if rest.trim().is_empty() {
        Point::new(
            Number::from(state.viewport.width()) / 2.0,
            Number::from(state.viewport.height()) / 2.0,
        )
    } else {
        let Some([x, y]) = numbers::<_, 2>(&mut out, rest, "zoom <in|out> [x y]")? else {
            return Ok(());
        };
        Point::new(x, y)
    };
    let event = GestureEvent::Wheel { pos, delta_y };
    if let Some(bounds) = state.graph.handle(event, &state.equations, &state.viewport)? {
        commit(&mut out, state, bounds)?;
    }
    Ok(())
}

fn print_extrema<W: Write>(mut out: W, extrema: &[Extremum]) -> anyhow::Result<()> {
    if extrema.is_empty() {
        writeln!(out, "no extrema")?;
    }
    for ext in extrema {
        writeln!(
            out,
            "  {kind} at ({x}, {y})",
            kind = ext.kind,
            x = format_coord(ext.x),
            y = format_coord(ext.y)
        )?;
    }
    Ok(())
}

fn extrema<W: Write>(mut out: W, state: &mut State, args: &str) -> anyhow::Result<()> {
    let Some(id) = require_id(&mut out, state, args)? else {
        return Ok(());
    };
    let eq = state.equations.get(&id).context("equation vanished")?;
    let config = state.graph.config();
    let key = RequestKey {
        kind: RequestKind::Analysis,
        ids: vec![id.clone()],
        expressions: vec![eq.expression.clone()],
        domain: config.analysis_domain()?,
        sample_count: config.analysis.extremum_samples,
    };
    writeln!(
        out,
        "analysing {id} over [{}, {}]",
        key.domain.min(),
        key.domain.max()
    )?;
    out.flush()?;
    state.worker.submit(key.clone())?;

    match state.worker.wait_for(&key, ANALYSIS_TIMEOUT).map(|r| r.payload) {
        Some(Payload::Analysis(analysis)) => {
            print_extrema(&mut out, &analysis.extrema)?;
            for x in &analysis.asymptotes {
                writeln!(out, "  likely vertical asymptote near x = {}", format_coord(*x))?;
            }
            let expression = key.expressions.into_iter().next().unwrap_or_default();
            state.graph.remember_extrema(id, expression, analysis.extrema.into());
        }
        Some(_) | None => writeln!(out, "analysis did not finish")?,
    }
    Ok(())
}
