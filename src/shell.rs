// SPDX: CC0-1.0

use crate::{
    eval::{EvalErrTyp, Ident, Idents, Program},
    evaluator::Diagnostic,
    lex::{LexErrTyp, SubStr, TokTyp},
    parse::ParseErrTyp,
};
use anyhow::Context;
use core::fmt;
use std::{
    io::{self, stdin, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Add,
    Remove,
    Edit,
    Show,
    Hide,
    List,
    SetWin,
    Plot,
    Click,
    Drag,
    Zoom,
    Intersections,
    Extrema,
    PrintProg,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::Add,
            Self::Remove,
            Self::Edit,
            Self::Show,
            Self::Hide,
            Self::List,
            Self::SetWin,
            Self::Plot,
            Self::Click,
            Self::Drag,
            Self::Zoom,
            Self::Intersections,
            Self::Extrema,
            Self::PrintProg,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::Add => "add an equation: add [expression]",
            Self::Remove => "remove an equation: remove <id>",
            Self::Edit => "change an equation's expression: edit <id> [expression]",
            Self::Show => "show a hidden equation: show <id>",
            Self::Hide => "hide an equation without removing it: hide <id>",
            Self::List => "list equations",
            Self::SetWin => "set window bounds",
            Self::Plot => "plot visible equations with gnuplot",
            Self::Click => "click at a pixel position: click <x> <y>",
            Self::Drag => "drag the view by a pixel offset: drag <dx> <dy>",
            Self::Zoom => "zoom around a pixel position: zoom <in|out> [x y]",
            Self::Intersections => "toggle intersection markers and list intersections",
            Self::Extrema => "list extrema and asymptotes: extrema <id>",
            Self::PrintProg => "print program compiled from an expression (for debugging): prog <id>",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Edit => "edit",
            Self::Show => "show",
            Self::Hide => "hide",
            Self::List => "list",
            Self::SetWin => "window",
            Self::Plot => "plot",
            Self::Click => "click",
            Self::Drag => "drag",
            Self::Zoom => "zoom",
            Self::Intersections => "intersections",
            Self::Extrema => "extrema",
            Self::PrintProg => "prog",
        }
    }

    /// Closest command name to an unknown one, if any is close enough.
    pub fn suggest(unknown: &str) -> Option<&'static str> {
        most_similar(unknown, Self::exhaustive().iter().map(Self::name))
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::exhaustive()
            .iter()
            .find(|c| c.name() == s)
            .copied()
            .ok_or(())
    }
}

/// Split a command line into its lowercased command word and the rest.
pub fn split_command(line: &str) -> (String, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd.to_ascii_lowercase(), rest.trim()),
        None => (line.to_ascii_lowercase(), ""),
    }
}

/// The candidate most similar to `text`, ignoring case, when the similarity
/// is above 0.3.
pub fn most_similar<'a, I>(text: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let text = text.to_ascii_lowercase();
    candidates
        .into_iter()
        .map(|c| {
            (
                strsim::normalized_damerau_levenshtein(&text, &c.to_ascii_lowercase()),
                c,
            )
        })
        .reduce(|acc, elem| if elem.0 > acc.0 { elem } else { acc })
        .filter(|(sim, _)| *sim > 0.3)
        .map(|(_, c)| c)
}

pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<String> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<String> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut stdin = stdin().lock();
        let mut s = String::new();
        stdin.read_line(&mut s)?;
        Ok(s.trim().to_string())
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

/// Like [`input`], but `None` once standard input is closed.
pub fn read_line<W: Write>(mut out: W, prompt: impl fmt::Display) -> anyhow::Result<Option<String>> {
    write!(out, "{prompt}")
        .and_then(|()| out.flush())
        .context("write to standard output failed")?;
    let mut s = String::new();
    let n = stdin()
        .lock()
        .read_line(&mut s)
        .context("read from standard input failed")?;
    Ok((n > 0).then(|| s.trim().to_string()))
}

pub fn read_fromstr<W: Write, T: core::str::FromStr>(
    mut out: W,
    prompt: impl fmt::Display,
    ignore_empty: bool,
) -> anyhow::Result<Result<Option<T>, <T as core::str::FromStr>::Err>>
where
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let input = Arc::new(input(&mut out, prompt)?);
    if ignore_empty && input.is_empty() {
        return Ok(Ok(None));
    }
    match input.parse::<T>() {
        Ok(new) => Ok(Ok(Some(new))),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &SubStr::all(input))?;
            writeln!(out, "parse error: {err}")?;
            Ok(Err(err))
        }
    }
}

pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    writeln!(out, "{}", span.src())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.start()),
        "^".repeat(span.len().max(1))
    )?;
    Ok(())
}

pub fn dump_program<W: Write>(
    mut out: W,
    prog: &Program,
    title: core::fmt::Arguments,
) -> io::Result<()> {
    writeln!(out, "{title}: ")?;
    if prog.ops().len() == 0 {
        writeln!(out, "  (empty)")?;
    }
    for op in prog.ops() {
        writeln!(out, "  {op}")?;
    }
    Ok(())
}

/// Explain why `expr` can never be evaluated, pointing at the culprit.
pub fn report_diagnostic<W: Write>(
    mut out: W,
    expr: &str,
    diagnostic: &Diagnostic,
    idents: &Idents,
) -> io::Result<()> {
    match diagnostic {
        Diagnostic::Parse(err) => {
            underline(&mut out, &err.loc)?;
            writeln!(out, "parse error: {}", err.typ)?;
            match &err.typ {
                ParseErrTyp::LexErr(LexErrTyp::InvalidChar) => writeln!(
                    out,
                    "note: available tokens are numbers, identifiers, and symbols +-*/^,()"
                )?,
                ParseErrTyp::LexErr(LexErrTyp::Unsupported(typ)) => match typ {
                    TokTyp::XGreater | TokTyp::XLess => {
                        writeln!(out, "note: expected an expression but found an inequality")?
                    }
                    TokTyp::XEqual => writeln!(
                        out,
                        "note: enter only the right-hand side, for example 'x^2' for y = x^2"
                    )?,
                    TokTyp::XPipe => writeln!(
                        out,
                        "note: use the 'abs' function to compute absolute value"
                    )?,
                    _ => {}
                },
                ParseErrTyp::ParseNum(_) => {
                    writeln!(out, "note: parsing as floating point number")?
                }
                ParseErrTyp::ParenMismatch => {}
            }
        }

        Diagnostic::Eval(err) => {
            let span = err
                .op
                .as_ref()
                .map(|op| op.loc.clone())
                .unwrap_or_else(|| {
                    let src = Arc::new(expr.to_string());
                    SubStr::new(Arc::clone(&src), src.len(), 1)
                });
            underline(&mut out, &span)?;
            writeln!(out, "evaluation error: {err}")?;
            match &err.typ {
                EvalErrTyp::StackMismatch { .. } => writeln!(
                    out,
                    "note: implicit multiplication is not supported, so for example '5x' would be '5*x'"
                )?,
                EvalErrTyp::UndefinedIdent { text } => {
                    let similar = most_similar(text.get(), idents.keys().map(|k| k.get()));
                    if let Some(key) = similar {
                        let kind = idents
                            .iter()
                            .find(|(k, _)| k.get() == key)
                            .map(|(_, ident)| match ident {
                                Ident::Var => "variable",
                                Ident::Const(_) => "constant",
                                Ident::Fun(_) => "function",
                            })
                            .unwrap_or("identifier");
                        writeln!(out, "note: {kind} '{key}' has a similar name")?;
                    }
                }
                EvalErrTyp::Empty
                | EvalErrTyp::MissingArgs { .. }
                | EvalErrTyp::UnboundVar { .. } => {}
            }
        }
    }
    Ok(())
}
