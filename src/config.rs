// THEORY:
// `SceneConfig` gathers every tunable of a scene in one plain struct.
// Construction never fails; `validate` is where preconditions are checked,
// and `Scene::new` refuses to build from an invalid config. Once a scene
// exists, none of its frame operations can fail.
//
// Defaults reproduce the stock widget: six sites kept 100px from the edges,
// a 10px render grid, anchors sampled at twice that stride, and the stock
// label table. Environment variables with the `VN_` prefix can override the
// numeric knobs.

use crate::core_modules::geometry::{Coordinate, Point};
use crate::core_modules::hold_timer::DEFAULT_HOLD_INTERVAL;
use crate::core_modules::navigation::{RegionLabel, default_labels};
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const DEFAULT_SITE_COUNT: usize = 6;
const DEFAULT_RESOLUTION: Coordinate = 10.0;
const DEFAULT_MARGIN: Coordinate = 100.0;
const DEFAULT_HUE_DRIFT: f64 = 2.0;

/// A precondition violated by a configuration. Reported once, at construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("a scene needs at least one site")]
    NoSites,
    #[error("site {index} has a non-finite coordinate")]
    NonFiniteSite { index: usize },
    #[error("grid resolution must be finite and positive, got {0}")]
    InvalidResolution(f64),
    #[error("centroid stride {stride} must be finite and at least the resolution {resolution}")]
    InvalidStride { stride: f64, resolution: f64 },
    #[error("label snap step must be finite and positive, got {0}")]
    InvalidSnap(f64),
    #[error("site margin must be finite and non-negative, got {0}")]
    InvalidMargin(f64),
    #[error("hue drift must be finite, got {0}")]
    InvalidHueDrift(f64),
    #[error("hold interval must be longer than zero")]
    ZeroHoldInterval,
    #[error("viewport dimensions must be finite")]
    NonFiniteViewport,
    #[error("viewport dimensions must not be negative")]
    NegativeViewport,
    #[error("a {width}x{height} viewport at resolution {resolution} needs more grid cells than a pass allows")]
    GridTooLarge { width: f64, height: f64, resolution: f64 },
    #[error("environment variable {key} has an unusable value {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Tunable behaviour of a `Scene`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SceneConfig {
    /// How many sites to place at random. Ignored when `sites` is set.
    pub site_count: usize,
    /// Explicit site positions, used instead of random placement.
    pub sites: Option<Vec<Point>>,
    /// Step of the render grid, in pixels.
    pub resolution: Coordinate,
    /// Step of the anchor-estimation grid. Must be at least `resolution`.
    pub centroid_stride: Coordinate,
    /// When set, label anchors are rounded to multiples of this step.
    pub label_snap: Option<Coordinate>,
    /// Minimum distance between a randomly placed site and the viewport edge.
    pub margin: Coordinate,
    /// Seed for site placement, colours and phase jumps. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Phase advance per hovered frame, in degrees.
    pub hue_drift: f64,
    pub hold_interval: Duration,
    /// Labels by region index. Regions past the end of the table are unlabelled.
    pub labels: Vec<RegionLabel>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            site_count: DEFAULT_SITE_COUNT,
            sites: None,
            resolution: DEFAULT_RESOLUTION,
            centroid_stride: DEFAULT_RESOLUTION * 2.0,
            label_snap: None,
            margin: DEFAULT_MARGIN,
            seed: None,
            hue_drift: DEFAULT_HUE_DRIFT,
            hold_interval: DEFAULT_HOLD_INTERVAL,
            labels: default_labels(),
        }
    }
}

impl SceneConfig {
    /// Defaults overlaid with `VN_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from an arbitrary key lookup.
    ///
    /// Recognised keys: `VN_RESOLUTION`, `VN_STRIDE`, `VN_SNAP`, `VN_SEED`, `VN_MARGIN`, `VN_SITES`.
    /// When `VN_RESOLUTION` is set without `VN_STRIDE`, the stride follows at twice the resolution.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(resolution) = parse_var::<f64, _>(&lookup, "VN_RESOLUTION")? {
            config.resolution = resolution;
            config.centroid_stride = resolution * 2.0;
        }
        if let Some(stride) = parse_var(&lookup, "VN_STRIDE")? {
            config.centroid_stride = stride;
        }
        if let Some(snap) = parse_var(&lookup, "VN_SNAP")? {
            config.label_snap = Some(snap);
        }
        if let Some(seed) = parse_var(&lookup, "VN_SEED")? {
            config.seed = Some(seed);
        }
        if let Some(margin) = parse_var(&lookup, "VN_MARGIN")? {
            config.margin = margin;
        }
        if let Some(count) = parse_var(&lookup, "VN_SITES")? {
            config.site_count = count;
        }

        Ok(config)
    }

    /// The number of regions a scene built from this config will have.
    pub fn region_count(&self) -> usize {
        match &self.sites {
            Some(sites) => sites.len(),
            None => self.site_count,
        }
    }

    /// Checks every precondition a scene relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region_count() == 0 {
            return Err(ConfigError::NoSites);
        }
        if let Some(sites) = &self.sites {
            if let Some(index) = sites.iter().position(|site| !site.is_finite()) {
                return Err(ConfigError::NonFiniteSite { index });
            }
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(ConfigError::InvalidResolution(self.resolution));
        }
        if !self.centroid_stride.is_finite() || self.centroid_stride < self.resolution {
            return Err(ConfigError::InvalidStride {
                stride: self.centroid_stride,
                resolution: self.resolution,
            });
        }
        if let Some(snap) = self.label_snap {
            if !snap.is_finite() || snap <= 0.0 {
                return Err(ConfigError::InvalidSnap(snap));
            }
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(ConfigError::InvalidMargin(self.margin));
        }
        if !self.hue_drift.is_finite() {
            return Err(ConfigError::InvalidHueDrift(self.hue_drift));
        }
        if self.hold_interval.is_zero() {
            return Err(ConfigError::ZeroHoldInterval);
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = SceneConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.region_count(), 6);
        assert_eq!(config.centroid_stride, 20.0);
    }

    #[test]
    fn zero_sites_is_a_configuration_error() {
        let config = SceneConfig {
            site_count: 0,
            ..SceneConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoSites));

        let config = SceneConfig {
            sites: Some(Vec::new()),
            ..SceneConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoSites));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let base = SceneConfig::default();
        let cases = [
            (SceneConfig { resolution: 0.0, ..base.clone() }, ConfigError::InvalidResolution(0.0)),
            (
                SceneConfig { centroid_stride: 5.0, ..base.clone() },
                ConfigError::InvalidStride { stride: 5.0, resolution: 10.0 },
            ),
            (SceneConfig { label_snap: Some(-1.0), ..base.clone() }, ConfigError::InvalidSnap(-1.0)),
            (SceneConfig { margin: -5.0, ..base.clone() }, ConfigError::InvalidMargin(-5.0)),
            (SceneConfig { hold_interval: Duration::ZERO, ..base.clone() }, ConfigError::ZeroHoldInterval),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }

        let config = SceneConfig {
            resolution: f64::NAN,
            ..base.clone()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidResolution(_))));

        let config = SceneConfig {
            sites: Some(vec![Point::new(1.0, 1.0), Point::new(2.0, f64::INFINITY)]),
            ..base
        };
        assert_eq!(config.validate(), Err(ConfigError::NonFiniteSite { index: 1 }));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = SceneConfig::from_lookup(lookup(&[
            ("VN_RESOLUTION", "5"),
            ("VN_SEED", "1234"),
            ("VN_SNAP", " 10 "),
            ("VN_SITES", "3"),
        ]))
        .unwrap();
        assert_eq!(config.resolution, 5.0);
        assert_eq!(config.centroid_stride, 10.0);
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.label_snap, Some(10.0));
        assert_eq!(config.site_count, 3);
        assert_eq!(config.margin, 100.0);
    }

    #[test]
    fn explicit_stride_wins_over_the_derived_one() {
        let config = SceneConfig::from_lookup(lookup(&[("VN_RESOLUTION", "5"), ("VN_STRIDE", "25")])).unwrap();
        assert_eq!(config.centroid_stride, 25.0);
    }

    #[test]
    fn unparsable_environment_value_is_reported() {
        let err = SceneConfig::from_lookup(lookup(&[("VN_SEED", "not-a-number")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnv {
                key: "VN_SEED",
                value: "not-a-number".to_string()
            }
        );
    }

    #[test]
    fn empty_environment_value_is_ignored() {
        let config = SceneConfig::from_lookup(lookup(&[("VN_MARGIN", "")])).unwrap();
        assert_eq!(config.margin, 100.0);
    }
}
