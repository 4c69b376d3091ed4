// SPDX: CC0-1.0

//! Tunables for a graph session, loadable from TOML.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```toml
//! [canvas]
//! width = 1024
//!
//! [analysis]
//! domain = [-50.0, 50.0]
//! ```

use crate::{
    analysis::AnalysisParams,
    error::GeometryError,
    extrema::ExtremumScan,
    intersect::IntersectionScan,
    viewport::{Domain, GraphBounds, Viewport},
    Number,
};
use serde::Deserialize;
use std::{fs, io, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] io::Error),

    #[error("malformed config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for '{key}'")]
    Invalid {
        key: &'static str,
        #[source]
        source: GeometryError,
    },

    #[error("config value for '{key}' must be positive and finite, found {value}")]
    NotPositive { key: &'static str, value: Number },
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoomConfig {
    /// Range multiplier for a zoom-out wheel step.
    pub out_factor: Number,
    /// Range multiplier for a zoom-in wheel step.
    pub in_factor: Number,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            out_factor: 1.1,
            in_factor: 0.9,
        }
    }
}

/// Screen-space tolerances for click resolution, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HitConfig {
    pub extremum_radius: Number,
    pub intersection_radius: Number,
    /// Half-size of the box around the pointer that counts as touching a curve.
    pub curve_box: Number,
    /// Pixel columns skipped between curve probes.
    pub curve_scan_stride: u32,
}

impl Default for HitConfig {
    fn default() -> Self {
        Self {
            extremum_radius: 7.0,
            intersection_radius: 8.0,
            curve_box: 7.0,
            curve_scan_stride: 4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntersectionConfig {
    pub enabled: bool,
    pub samples: usize,
    pub bisection_steps: usize,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        let scan = IntersectionScan::default();
        Self {
            enabled: false,
            samples: scan.sample_count,
            bisection_steps: scan.bisection_steps,
        }
    }
}

/// Extremum and asymptote analysis, run over a fixed domain that does not
/// follow the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub domain: [Number; 2],
    pub extremum_samples: usize,
    pub refine_step: Number,
    pub asymptote_samples: usize,
    pub asymptote_jump: Number,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let scan = ExtremumScan::default();
        Self {
            domain: [-20.0, 20.0],
            extremum_samples: scan.sample_count,
            refine_step: scan.refine_step,
            asymptote_samples: crate::analysis::DEFAULT_ASYMPTOTE_SAMPLES,
            asymptote_jump: crate::analysis::DEFAULT_ASYMPTOTE_JUMP,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    pub canvas: CanvasConfig,
    pub bounds: GraphBounds,
    pub tick_target: TickTarget,
    pub zoom: ZoomConfig,
    pub hit: HitConfig,
    pub intersections: IntersectionConfig,
    pub analysis: AnalysisConfig,
}

/// Roughly how many grid intervals to fit across each axis.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TickTarget(pub Number);

impl Default for TickTarget {
    fn default() -> Self {
        Self(10.0)
    }
}

fn positive(key: &'static str, value: Number) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { key, value })
    }
}

fn nonzero(key: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Invalid {
            key,
            source: GeometryError::ZeroSamples,
        })
    } else {
        Ok(())
    }
}

impl GraphConfig {
    pub fn from_toml(src: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport().map_err(|source| ConfigError::Invalid {
            key: "canvas/bounds",
            source,
        })?;
        self.analysis_domain()
            .map_err(|source| ConfigError::Invalid {
                key: "analysis.domain",
                source,
            })?;
        positive("tick_target", self.tick_target.0)?;
        positive("zoom.out_factor", self.zoom.out_factor)?;
        positive("zoom.in_factor", self.zoom.in_factor)?;
        positive("hit.extremum_radius", self.hit.extremum_radius)?;
        positive("hit.intersection_radius", self.hit.intersection_radius)?;
        positive("hit.curve_box", self.hit.curve_box)?;
        positive("hit.curve_scan_stride", Number::from(self.hit.curve_scan_stride))?;
        positive("analysis.refine_step", self.analysis.refine_step)?;
        positive("analysis.asymptote_jump", self.analysis.asymptote_jump)?;
        nonzero("intersections.samples", self.intersections.samples)?;
        nonzero("analysis.extremum_samples", self.analysis.extremum_samples)?;
        nonzero("analysis.asymptote_samples", self.analysis.asymptote_samples)?;
        Ok(())
    }

    pub fn viewport(&self) -> Result<Viewport, GeometryError> {
        Viewport::new(self.bounds, self.canvas.width, self.canvas.height)
    }

    pub fn analysis_domain(&self) -> Result<Domain, GeometryError> {
        let [min, max] = self.analysis.domain;
        Domain::new(min, max)
    }

    pub fn intersection_scan(&self) -> IntersectionScan {
        IntersectionScan {
            sample_count: self.intersections.samples,
            bisection_steps: self.intersections.bisection_steps,
        }
    }

    pub fn analysis_params(&self) -> Result<AnalysisParams, GeometryError> {
        Ok(AnalysisParams {
            domain: self.analysis_domain()?,
            extrema: ExtremumScan {
                sample_count: self.analysis.extremum_samples,
                refine_step: self.analysis.refine_step,
            },
            asymptote_samples: self.analysis.asymptote_samples,
            asymptote_jump: self.analysis.asymptote_jump,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = GraphConfig::from_toml("").unwrap();
        assert_eq!(config, GraphConfig::default());
        assert_eq!(config.zoom.out_factor, 1.1);
        assert_eq!(config.hit.intersection_radius, 8.0);
        assert_eq!(config.analysis.domain, [-20.0, 20.0]);
        assert_eq!(config.intersections.samples, 200);
        assert!(!config.intersections.enabled);
    }

    #[test]
    fn partial_sections_override_only_given_keys() {
        let config = GraphConfig::from_toml(
            r#"
            tick_target = 8.0

            [canvas]
            width = 1024

            [bounds]
            x_min = -1.0
            x_max = 1.0
            y_min = -2.0
            y_max = 2.0

            [analysis]
            domain = [-5.0, 5.0]
            "#,
        )
        .unwrap();
        assert_eq!(config.canvas.width, 1024);
        assert_eq!(config.canvas.height, 600);
        assert_eq!(config.tick_target.0, 8.0);
        assert_eq!(config.bounds.x_max, 1.0);
        assert_eq!(config.analysis.domain, [-5.0, 5.0]);
        assert_eq!(config.analysis.extremum_samples, 1000);
    }

    #[test]
    fn degenerate_values_are_rejected() {
        assert!(matches!(
            GraphConfig::from_toml("[canvas]\nwidth = 0"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            GraphConfig::from_toml("[analysis]\ndomain = [3.0, 3.0]"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            GraphConfig::from_toml("[zoom]\nin_factor = 0.0"),
            Err(ConfigError::NotPositive { .. })
        ));
        assert!(matches!(
            GraphConfig::from_toml("[intersections]\nsamples = 0"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            GraphConfig::from_toml("[zoom]\nfactor = 2.0"),
            Err(ConfigError::Parse(_))
        ));
    }
}
