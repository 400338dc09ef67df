#![forbid(unsafe_code)]

//! Policy-as-data configuration for the navigator.
//!
//! Every tunable timing, gain, and layout constant lives in a single
//! [`NavigatorConfig`] that can be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # reelgrid.toml
//! [pan]
//! duration_ms = 1200
//!
//! [observer]
//! reattach_delay_ms = 220
//! ```
//!
//! ```rust,ignore
//! let config = NavigatorConfig::from_toml_file("reelgrid.toml")?;
//! let config = NavigatorConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! `NavigatorConfig::default()` reproduces the stock behavior: 1.5 s pan
//! glide, 70% focus fill, 800 ms zoom transitions, and a 180 ms input
//! re-attachment delay after one frame.

#[cfg(feature = "config-file")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};

use reelgrid_core::animation::Easing;
use reelgrid_core::grid::{DEFAULT_COLUMN_PREFERENCES, DEFAULT_DUPLICATES};
use reelgrid_core::media::VisibilityPolicy;

use crate::observer::ObserverPolicy;
use crate::zoom::ZoomPolicy;

// ---------------------------------------------------------------------------
// Top-level NavigatorConfig
// ---------------------------------------------------------------------------

/// Top-level navigator configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct NavigatorConfig {
    /// Pan smoothing.
    pub pan: PanConfig,
    /// Zoom-to-focus transitions.
    pub zoom: ZoomConfig,
    /// Input observer gains and re-attachment.
    pub observer: ObserverConfig,
    /// Geometry re-measurement.
    pub geometry: GeometryConfig,
    /// Grid construction.
    pub grid: GridConfig,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct PanConfig {
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1500,
            easing: Easing::Power4Out,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct ZoomConfig {
    pub fill_fraction: f64,
    pub zoomed_threshold: f64,
    pub zoom_in_ms: u64,
    pub zoom_out_ms: u64,
    pub easing: Easing,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            fill_fraction: 0.7,
            zoomed_threshold: 1.5,
            zoom_in_ms: 800,
            zoom_out_ms: 800,
            easing: Easing::EaseInOutCubic,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct ObserverConfig {
    pub drag_gain: f64,
    pub wheel_gain: f64,
    /// Frames to wait after a zoom-out before the delay starts.
    pub reattach_frames: u32,
    pub reattach_delay_ms: u64,
    pub ghost_event_budget: u32,
    pub ghost_window_ms: u64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            drag_gain: 2.0,
            wheel_gain: 1.0,
            reattach_frames: 1,
            reattach_delay_ms: 180,
            ghost_event_budget: 2,
            ghost_window_ms: 250,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct GeometryConfig {
    /// Extra measurements after mount, for late layout and video metadata.
    pub remeasure_delays_ms: Vec<u64>,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            remeasure_delays_ms: vec![100, 500],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct GridConfig {
    pub duplicates: usize,
    pub column_preferences: Vec<usize>,
    pub tap_threshold_px: f64,
    /// When a tile counts as in view for lazy loading.
    pub visibility: VisibilityPolicy,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            duplicates: DEFAULT_DUPLICATES,
            column_preferences: DEFAULT_COLUMN_PREFERENCES.to_vec(),
            tap_threshold_px: 6.0,
            visibility: VisibilityPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl NavigatorConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.pan.duration_ms == 0 {
            errors.push("pan.duration_ms must be > 0".into());
        }

        if !(self.zoom.fill_fraction > 0.0 && self.zoom.fill_fraction <= 1.0) {
            errors.push(format!(
                "zoom.fill_fraction must be in (0, 1], got {}",
                self.zoom.fill_fraction
            ));
        }

        if !(self.zoom.zoomed_threshold >= 1.0) {
            errors.push(format!(
                "zoom.zoomed_threshold must be >= 1, got {}",
                self.zoom.zoomed_threshold
            ));
        }

        for (name, gain) in [
            ("observer.drag_gain", self.observer.drag_gain),
            ("observer.wheel_gain", self.observer.wheel_gain),
        ] {
            if !gain.is_finite() {
                errors.push(format!("{name} must be finite, got {gain}"));
            }
        }

        if self.grid.column_preferences.iter().any(|&c| c == 0) {
            errors.push("grid.column_preferences must not contain 0".into());
        }

        if !(self.grid.tap_threshold_px >= 0.0) {
            errors.push(format!(
                "grid.tap_threshold_px must be >= 0, got {}",
                self.grid.tap_threshold_px
            ));
        }

        let visibility = self.grid.visibility;
        if !(0.0..=1.0).contains(&visibility.threshold) {
            errors.push(format!(
                "grid.visibility.threshold must be in [0, 1], got {}",
                visibility.threshold
            ));
        }
        if !visibility.root_margin_px.is_finite() {
            errors.push(format!(
                "grid.visibility.root_margin_px must be finite, got {}",
                visibility.root_margin_px
            ));
        }

        errors
    }

    /// Validate and return `self`, or the collected messages.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    // -- Conversions to component policies --------------------------------

    pub fn pan_duration(&self) -> Duration {
        Duration::from_millis(self.pan.duration_ms)
    }

    pub fn zoom_policy(&self) -> ZoomPolicy {
        ZoomPolicy {
            fill_fraction: self.zoom.fill_fraction,
            zoomed_threshold: self.zoom.zoomed_threshold,
            zoom_in: Duration::from_millis(self.zoom.zoom_in_ms),
            zoom_out: Duration::from_millis(self.zoom.zoom_out_ms),
            easing: self.zoom.easing,
        }
    }

    pub fn observer_policy(&self) -> ObserverPolicy {
        ObserverPolicy {
            drag_gain: self.observer.drag_gain,
            wheel_gain: self.observer.wheel_gain,
            ghost_event_budget: self.observer.ghost_event_budget,
            ghost_window: Duration::from_millis(self.observer.ghost_window_ms),
        }
    }

    pub fn reattach_delay(&self) -> Duration {
        Duration::from_millis(self.observer.reattach_delay_ms)
    }

    pub fn remeasure_delays(&self) -> impl Iterator<Item = Duration> + '_ {
        self.geometry
            .remeasure_delays_ms
            .iter()
            .map(|&ms| Duration::from_millis(ms))
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from loading or validating a [`NavigatorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    #[error("TOML parse error: {0}")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config-file")]
    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_stock_behavior() {
        let c = NavigatorConfig::default();
        assert_eq!(c.pan_duration(), Duration::from_millis(1500));
        assert_eq!(c.pan.easing, Easing::Power4Out);
        assert_eq!(c.zoom_policy(), ZoomPolicy::default());
        assert_eq!(c.observer_policy(), ObserverPolicy::default());
        assert_eq!(c.reattach_delay(), Duration::from_millis(180));
        assert_eq!(c.observer.reattach_frames, 1);
        assert_eq!(
            c.remeasure_delays().collect::<Vec<_>>(),
            vec![Duration::from_millis(100), Duration::from_millis(500)]
        );
        assert_eq!(c.grid.column_preferences, vec![4, 5, 3, 6, 2, 7, 8]);
        assert_eq!(c.grid.duplicates, 3);
    }

    #[test]
    fn default_is_valid() {
        assert!(NavigatorConfig::default().validate().is_empty());
    }

    #[test]
    fn validation_collects_every_problem() {
        let mut c = NavigatorConfig::default();
        c.pan.duration_ms = 0;
        c.zoom.fill_fraction = 1.5;
        c.zoom.zoomed_threshold = 0.5;
        c.observer.drag_gain = f64::NAN;
        c.grid.column_preferences = vec![4, 0];
        c.grid.tap_threshold_px = -1.0;
        let errors = c.validate();
        assert_eq!(errors.len(), 6, "{errors:?}");
        assert!(errors[0].contains("pan.duration_ms"));
    }

    #[test]
    fn visibility_policy_is_validated() {
        let mut c = NavigatorConfig::default();
        assert_eq!(c.grid.visibility, VisibilityPolicy::default());
        c.grid.visibility.threshold = 1.5;
        c.grid.visibility.root_margin_px = f64::INFINITY;
        let errors = c.validate();
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(errors[0].starts_with("grid.visibility.threshold"));
    }

    #[test]
    fn validated_wraps_errors() {
        let mut c = NavigatorConfig::default();
        c.zoom.fill_fraction = 0.0;
        let err = c.validated().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v.len() == 1));
        assert!(err.to_string().starts_with("validation errors: zoom.fill_fraction"));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn partial_toml_keeps_defaults() {
        let c = NavigatorConfig::from_toml_str(
            r#"
            [observer]
            reattach_delay_ms = 220

            [zoom]
            easing = "power4_out"
            "#,
        )
        .unwrap();
        assert_eq!(c.observer.reattach_delay_ms, 220);
        assert_eq!(c.observer.ghost_event_budget, 2);
        assert_eq!(c.zoom.easing, Easing::Power4Out);
        assert_eq!(c.pan, PanConfig::default());
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn visibility_margin_from_toml() {
        let c = NavigatorConfig::from_toml_str(
            r#"
            [grid.visibility]
            root_margin_px = 120.0
            "#,
        )
        .unwrap();
        assert_eq!(c.grid.visibility.root_margin_px, 120.0);
        assert_eq!(c.grid.visibility.threshold, 0.01);
        assert_eq!(c.grid.tap_threshold_px, 6.0);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn json_round_trip_of_defaults() {
        let json = serde_json::to_string(&NavigatorConfig::default()).unwrap();
        assert_eq!(
            NavigatorConfig::from_json_str(&json).unwrap(),
            NavigatorConfig::default()
        );
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn bad_toml_is_parse_error() {
        let err = NavigatorConfig::from_toml_str("pan = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn missing_file_is_io_error() {
        let err = NavigatorConfig::from_toml_file("/nonexistent/reelgrid.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reelgrid.json");
        std::fs::write(&path, r#"{"pan": {"duration_ms": 900}}"#).unwrap();
        let c = NavigatorConfig::from_json_file(&path).unwrap();
        assert_eq!(c.pan.duration_ms, 900);
        assert_eq!(c.zoom, ZoomConfig::default());
    }
}
