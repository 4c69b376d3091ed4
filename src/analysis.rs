// SPDX: CC0-1.0

use crate::{
    equation::EquationId,
    error::GeometryError,
    extrema::{Extremum, ExtremumScan},
    viewport::Domain,
    Number,
};
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

pub const DEFAULT_ASYMPTOTE_SAMPLES: usize = 1000;
pub const DEFAULT_ASYMPTOTE_JUMP: Number = 1000.0;

/// Likely vertical asymptotes: midpoints between consecutive defined samples
/// whose values jump by more than `jump`. Undefined samples are skipped, not
/// treated as breaks.
pub fn find_asymptotes<F>(
    f: F,
    domain: Domain,
    sample_count: usize,
    jump: Number,
) -> Result<Vec<Number>, GeometryError>
where
    F: Fn(Number) -> Option<Number>,
{
    if sample_count == 0 {
        return Err(GeometryError::ZeroSamples);
    }
    let mut found = Vec::new();
    let mut prev: Option<(Number, Number)> = None;
    for x in domain.grid(sample_count) {
        let Some(y) = f(x).filter(|y| y.is_finite()) else {
            continue;
        };
        if let Some((prev_x, prev_y)) = prev {
            if (y - prev_y).abs() > jump {
                found.push((prev_x + x) / 2.0);
            }
        }
        prev = Some((x, y));
    }
    Ok(found)
}

/// Everything known about one curve over the fixed analysis domain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Analysis {
    pub extrema: Vec<Extremum>,
    pub asymptotes: Vec<Number>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalysisParams {
    pub domain: Domain,
    pub extrema: ExtremumScan,
    pub asymptote_samples: usize,
    pub asymptote_jump: Number,
}

pub fn analyze<F>(f: F, params: &AnalysisParams) -> Result<Analysis, GeometryError>
where
    F: Fn(Number) -> Option<Number>,
{
    Ok(Analysis {
        extrema: params.extrema.run(&f, params.domain)?,
        asymptotes: find_asymptotes(
            &f,
            params.domain,
            params.asymptote_samples,
            params.asymptote_jump,
        )?,
    })
}

/// Extrema memoized per `(equation id, expression text)`.
///
/// Storing a result for an id drops whatever was stored for that id under a
/// different expression, so an edited equation never serves stale markers.
#[derive(Debug, Default)]
pub struct ExtremaCache {
    entries: HashMap<(EquationId, String), Arc<[Extremum]>>,
}

impl ExtremaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &EquationId, expression: &str) -> Option<Arc<[Extremum]>> {
        self.entries
            .get(&(id.clone(), expression.to_string()))
            .map(Arc::clone)
    }

    pub fn insert(&mut self, id: EquationId, expression: String, extrema: Arc<[Extremum]>) {
        self.invalidate(&id);
        self.entries.insert((id, expression), extrema);
    }

    pub fn get_or_insert_with<F>(
        &mut self,
        id: &EquationId,
        expression: &str,
        compute: F,
    ) -> Arc<[Extremum]>
    where
        F: FnOnce() -> Vec<Extremum>,
    {
        if let Some(hit) = self.get(id, expression) {
            return hit;
        }
        let extrema: Arc<[Extremum]> = compute().into();
        debug!(%id, expression, count = extrema.len(), "computed extrema");
        self.insert(id.clone(), expression.to_string(), Arc::clone(&extrema));
        extrema
    }

    /// Forget everything cached for `id`.
    pub fn invalidate(&mut self, id: &EquationId) {
        self.entries.retain(|(k_id, _), _| k_id != id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
