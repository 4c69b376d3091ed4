// SPDX: CC0-1.0

use crate::error::EquationError;
use core::{fmt, str::FromStr};
use std::sync::Arc;

/// Palette handed out to equations that were not given a color.
pub const PALETTE: [Color; 8] = [
    Color::rgb(0x21, 0x96, 0xf3),
    Color::rgb(0xe9, 0x1e, 0x63),
    Color::rgb(0x4c, 0xaf, 0x50),
    Color::rgb(0xff, 0x98, 0x00),
    Color::rgb(0x9c, 0x27, 0xb0),
    Color::rgb(0x00, 0x96, 0x88),
    Color::rgb(0x79, 0x55, 0x48),
    Color::rgb(0x60, 0x7d, 0x8b),
];

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EquationId(Arc<str>);

impl EquationId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EquationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EquationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// How an equation's expression is meant to be read. Only explicit curves
/// (`y = f(x)`) are sampled; the others are carried as metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CurveKind {
    #[default]
    Explicit,
    Implicit,
    Polar,
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::Implicit => f.write_str("implicit"),
            Self::Polar => f.write_str("polar"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const GREY: Self = Self::rgb(0x88, 0x88, 0x88);
    pub const LIGHT_GREY: Self = Self::rgb(0xee, 0xee, 0xee);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = EquationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EquationError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub color: Color,
    pub line_width: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: PALETTE[0],
            line_width: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Equation {
    pub id: EquationId,
    pub expression: String,
    pub kind: CurveKind,
    pub style: Style,
    pub visible: bool,
}

impl Equation {
    pub fn explicit(id: impl Into<EquationId>, expression: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expression: expression.into(),
            kind: CurveKind::Explicit,
            style: Style::default(),
            visible: true,
        }
    }

    /// Whether the sampler, intersection scan and click resolution see it.
    pub fn is_plotted(&self) -> bool {
        self.visible && self.kind == CurveKind::Explicit
    }
}

/// Ordered equations with unique ids.
#[derive(Clone, Debug, Default)]
pub struct EquationList {
    equations: Vec<Equation>,
}

impl EquationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Equation> {
        self.equations.iter()
    }

    /// Equations that get drawn, in list order.
    pub fn visible(&self) -> impl Iterator<Item = &Equation> {
        self.equations.iter().filter(|eq| eq.is_plotted())
    }

    pub fn get(&self, id: &EquationId) -> Option<&Equation> {
        self.equations.iter().find(|eq| &eq.id == id)
    }

    pub fn add(&mut self, equation: Equation) -> Result<(), EquationError> {
        if self.get(&equation.id).is_some() {
            return Err(EquationError::DuplicateId(equation.id.to_string()));
        }
        self.equations.push(equation);
        Ok(())
    }

    pub fn remove(&mut self, id: &EquationId) -> Result<Equation, EquationError> {
        let idx = self.position(id)?;
        Ok(self.equations.remove(idx))
    }

    /// Replace the equation with the same id, returning the old one.
    pub fn update(&mut self, equation: Equation) -> Result<Equation, EquationError> {
        let idx = self.position(&equation.id)?;
        Ok(core::mem::replace(&mut self.equations[idx], equation))
    }

    /// Color for the next equation, cycling through [`PALETTE`].
    pub fn next_color(&self) -> Color {
        PALETTE[self.equations.len() % PALETTE.len()]
    }

    fn position(&self, id: &EquationId) -> Result<usize, EquationError> {
        self.equations
            .iter()
            .position(|eq| &eq.id == id)
            .ok_or_else(|| EquationError::UnknownId(id.to_string()))
    }
}

impl<'a> IntoIterator for &'a EquationList {
    type Item = &'a Equation;
    type IntoIter = core::slice::Iter<'a, Equation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_round_trip_through_hex() {
        let c: Color = "#2196F3".parse().unwrap();
        assert_eq!(c, Color::rgb(0x21, 0x96, 0xf3));
        assert_eq!(c.to_string(), "#2196f3");
        for bad in ["2196f3", "#2196f", "#zz96f3", "#2196f3a"] {
            assert!(bad.parse::<Color>().is_err(), "{bad}");
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut list = EquationList::new();
        list.add(Equation::explicit("a", "x")).unwrap();
        assert_eq!(
            list.add(Equation::explicit("a", "x^2")),
            Err(EquationError::DuplicateId("a".into()))
        );
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn update_and_remove_by_id() {
        let mut list = EquationList::new();
        list.add(Equation::explicit("a", "x")).unwrap();
        list.add(Equation::explicit("b", "2-x")).unwrap();

        let old = list.update(Equation::explicit("a", "sin(x)")).unwrap();
        assert_eq!(old.expression, "x");
        assert_eq!(list.get(&"a".into()).unwrap().expression, "sin(x)");

        let removed = list.remove(&"a".into()).unwrap();
        assert_eq!(removed.expression, "sin(x)");
        assert!(list.remove(&"a".into()).is_err());
        let ids: Vec<&str> = list.iter().map(|eq| eq.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn hidden_and_non_explicit_equations_are_not_plotted() {
        let mut list = EquationList::new();
        list.add(Equation::explicit("a", "x")).unwrap();
        let mut hidden = Equation::explicit("b", "x^2");
        hidden.visible = false;
        list.add(hidden).unwrap();
        let mut polar = Equation::explicit("c", "1");
        polar.kind = CurveKind::Polar;
        list.add(polar).unwrap();
        let plotted: Vec<&str> = list.visible().map(|eq| eq.id.as_str()).collect();
        assert_eq!(plotted, vec!["a"]);
    }
}
