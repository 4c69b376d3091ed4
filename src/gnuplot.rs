// SPDX: CC0-1.0

//! A [`Scene`] as a gnuplot data file plus a script that draws it.

use crate::{
    equation::Color,
    scene::{MarkerKind, Scene, AXIS_COLOR, EXTREMUM_COLOR, GRID_COLOR, INTERSECTION_COLOR},
};
use anyhow::Context;
use chrono::{DateTime, Local};
#[cfg(not(debug_assertions))]
use std::process::Stdio;
use std::{
    fs::OpenOptions,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    process::{self, Child},
};

pub fn output_filename(now: DateTime<Local>, extension: &str) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        extension
    )
}

/// Files written for one plot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlotFiles {
    pub data: PathBuf,
    pub script: PathBuf,
    pub svg: PathBuf,
}

impl PlotFiles {
    pub fn at(dir: &Path, now: DateTime<Local>) -> Self {
        Self {
            data: dir.join(output_filename(now, "data")),
            script: dir.join(output_filename(now, "gnuplot")),
            svg: dir.join(output_filename(now, "svg")),
        }
    }
}

fn rgb(c: Color) -> String {
    format!("rgb '{c}'")
}

fn begin_dataset<W: Write>(out: &mut W, next: &mut usize) -> io::Result<usize> {
    if *next > 0 {
        writeln!(out)?;
        writeln!(out)?;
    }
    *next += 1;
    Ok(*next - 1)
}

/// One gnuplot dataset (separated by two blank lines) per curve, then one per
/// marker kind present. Segments of a curve are separated by a single blank
/// line so gnuplot never connects them.
///
/// Returns the dataset index of each curve and of the marker sets.
pub fn write_data<W: Write>(mut out: W, scene: &Scene) -> io::Result<DataIndex> {
    let mut index = DataIndex::default();
    let mut next = 0;

    for curve in &scene.curves {
        let i = begin_dataset(&mut out, &mut next)?;
        writeln!(out, "# {}", curve.id)?;
        for (n, segment) in curve.segments.iter().enumerate() {
            if n > 0 {
                writeln!(out)?;
            }
            for p in segment {
                writeln!(out, "{} {}", p.data.x, p.data.y)?;
            }
        }
        index.curves.push(i);
    }

    for (kind, slot) in [
        (MarkerSet::Intersections, &mut index.intersections),
        (MarkerSet::Extrema, &mut index.extrema),
    ] {
        let mut markers = scene.markers.iter().filter(|m| kind.matches(m.kind)).peekable();
        if markers.peek().is_none() {
            continue;
        }
        let i = begin_dataset(&mut out, &mut next)?;
        writeln!(out, "# {}", kind.title())?;
        for m in markers {
            writeln!(out, "{} {}", m.at.data.x, m.at.data.y)?;
        }
        *slot = Some(i);
    }
    Ok(index)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MarkerSet {
    Intersections,
    Extrema,
}

impl MarkerSet {
    fn matches(self, kind: MarkerKind) -> bool {
        matches!(
            (self, kind),
            (Self::Intersections, MarkerKind::Intersection) | (Self::Extrema, MarkerKind::Extremum(_))
        )
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Intersections => "intersections",
            Self::Extrema => "extrema",
        }
    }
}

/// Dataset indices in a data file written by [`write_data`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataIndex {
    pub curves: Vec<usize>,
    pub intersections: Option<usize>,
    pub extrema: Option<usize>,
}

pub fn write_script<W: Write>(
    mut out: W,
    scene: &Scene,
    index: &DataIndex,
    data_path: &Path,
    svg_path: &Path,
) -> io::Result<()> {
    let data = data_path.display();
    let b = &scene.bounds;

    writeln!(out, "reset")?;
    writeln!(out, "set term push")?;
    writeln!(
        out,
        "set terminal svg size {},{} enhanced",
        scene.width, scene.height
    )?;
    writeln!(out, "set output '{}'", svg_path.display())?;

    writeln!(out, "set xrange[{}:{}]", b.x_min, b.x_max)?;
    writeln!(out, "set yrange[{}:{}]", b.y_min, b.y_max)?;
    writeln!(out, "set xtics {}", scene.grid.x_step)?;
    writeln!(out, "set ytics {}", scene.grid.y_step)?;
    writeln!(out, "set grid xtics ytics lc {} lw 1", rgb(GRID_COLOR))?;
    writeln!(out, "set tics out nomirror")?;
    writeln!(out, "unset border")?;
    if scene.axes.y_axis.is_some() {
        writeln!(out, "set yzeroaxis lc {} lw 2", rgb(AXIS_COLOR))?;
    }
    if scene.axes.x_axis.is_some() {
        writeln!(out, "set xzeroaxis lc {} lw 2", rgb(AXIS_COLOR))?;
    }
    writeln!(out, "set key out vertical top right noenhanced")?;

    if let Some(ref readout) = scene.readout {
        // position in screen pixels, converted to the 0..1 screen system
        writeln!(
            out,
            "set label 1 '{}' at screen {},{} noenhanced",
            readout.text,
            readout.at.x / f64::from(scene.width),
            1.0 - readout.at.y / f64::from(scene.height),
        )?;
    }

    let mut plots = Vec::new();
    for (curve, i) in scene.curves.iter().zip(&index.curves) {
        plots.push(format!(
            "'{data}' index {i} with lines lc {} lw {} title '{}'",
            rgb(curve.style.color),
            curve.style.line_width,
            curve.id,
        ));
    }
    if let Some(i) = index.intersections {
        plots.push(format!(
            "'{data}' index {i} with points pt 7 ps 1.0 lc {} title 'intersections'",
            rgb(INTERSECTION_COLOR)
        ));
    }
    if let Some(i) = index.extrema {
        plots.push(format!(
            "'{data}' index {i} with points pt 7 ps 0.8 lc {} title 'extrema'",
            rgb(EXTREMUM_COLOR)
        ));
    }
    if plots.is_empty() {
        // keep the axes and grid visible with nothing to draw
        plots.push("NaN notitle".to_string());
    }
    writeln!(out, "plot {}", plots.join(", \\\n  "))?;

    writeln!(out, "set term pop")?;
    writeln!(out, "replot")?;
    Ok(())
}

fn create(path: &Path) -> anyhow::Result<BufWriter<std::fs::File>> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("failed to create '{}'", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Write the data file and script for `scene`.
pub fn write_files(scene: &Scene, files: &PlotFiles) -> anyhow::Result<()> {
    let mut data = create(&files.data)?;
    let index = write_data(&mut data, scene).context("failed to write to output data file")?;
    data.flush()?;
    data.get_mut().sync_data()?;
    drop(data);

    let mut script = create(&files.script)?;
    write_script(&mut script, scene, &index, &files.data, &files.svg)
        .context("failed to write to output gnuplot file")?;
    script.flush()?;
    script.get_mut().sync_data()?;
    Ok(())
}

/// Run gnuplot on a script, leaving its window open.
pub fn spawn(script: &Path) -> anyhow::Result<Child> {
    let mut cmd = process::Command::new("gnuplot");
    cmd.arg("--persist").arg(script);
    #[cfg(not(debug_assertions))]
    {
        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null());
    }
    cmd.spawn()
        .context("failed to spawn gnuplot (is it installed and in ${PATH}?)")
}
