// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ScannerError};
use crate::types::ScanMode;

/// Area window for guidance mode, in px².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuidanceConfig {
    /// Smallest acceptable detected area (also sizes the inner guidance box).
    pub min_area: f64,
    /// Largest acceptable detected area (also sizes the outer guidance box).
    pub max_area: f64,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            min_area: 40_000.0,
            max_area: 90_000.0,
        }
    }
}

/// Tunables recognised by the scanner core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Which detection preset these values were derived from.
    pub mode: ScanMode,
    /// Contours enclosing less than this many px² are ignored.
    pub min_contour_area: f64,
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Margin in px between the output raster border and the rectified quad.
    pub rectification_padding: f32,
    /// Hit radius in px of each draggable corner handle.
    pub corner_handle_radius: f32,
    /// Capture loop rate in frames per second.
    pub target_frame_rate: u32,
    /// Guidance envelope. `None` disables guidance mode.
    pub guidance: Option<GuidanceConfig>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self::for_mode(ScanMode::Document)
    }
}

impl ScannerConfig {
    /// Defaults for a given mode. Card mode turns guidance on.
    pub fn for_mode(mode: ScanMode) -> Self {
        Self {
            mode,
            min_contour_area: mode.default_min_contour_area(),
            approx_epsilon_ratio: 0.02,
            rectification_padding: 50.0,
            corner_handle_radius: 10.0,
            target_frame_rate: 10,
            guidance: match mode {
                ScanMode::Document => None,
                ScanMode::Card => Some(GuidanceConfig::default()),
            },
        }
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_contour_area >= 0.0) {
            return Err(ScannerError::InvalidConfig(
                "min_contour_area must be non-negative".into(),
            ));
        }
        if !(self.approx_epsilon_ratio > 0.0 && self.approx_epsilon_ratio < 1.0) {
            return Err(ScannerError::InvalidConfig(format!(
                "approx_epsilon_ratio must be in (0, 1), got {}",
                self.approx_epsilon_ratio
            )));
        }
        if !(self.rectification_padding >= 0.0) {
            return Err(ScannerError::InvalidConfig(
                "rectification_padding must be non-negative".into(),
            ));
        }
        if !(self.corner_handle_radius > 0.0) {
            return Err(ScannerError::InvalidConfig(
                "corner_handle_radius must be positive".into(),
            ));
        }
        if self.target_frame_rate == 0 {
            return Err(ScannerError::InvalidConfig(
                "target_frame_rate must be at least 1".into(),
            ));
        }
        if let Some(g) = &self.guidance {
            if !(g.min_area > 0.0 && g.min_area <= g.max_area) {
                return Err(ScannerError::InvalidConfig(format!(
                    "guidance needs 0 < min_area <= max_area, got {} / {}",
                    g.min_area, g.max_area
                )));
            }
        }
        Ok(())
    }

    /// Load and validate a JSON config file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&bytes)?;
        config.validate()?;
        info!(path = %path.display(), mode = ?config.mode, "Scanner config loaded");
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        debug!(path = %path.as_ref().display(), "Scanner config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ScannerConfig::default();
        assert_eq!(config.min_contour_area, 5_000.0);
        assert_eq!(config.approx_epsilon_ratio, 0.02);
        assert_eq!(config.rectification_padding, 50.0);
        assert_eq!(config.corner_handle_radius, 10.0);
        assert_eq!(config.target_frame_rate, 10);
        assert!(config.guidance.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn card_mode_raises_area_and_enables_guidance() {
        let config = ScannerConfig::for_mode(ScanMode::Card);
        assert_eq!(config.min_contour_area, 10_000.0);
        assert!(config.guidance.is_some());
    }

    #[test]
    fn inverted_guidance_window_is_rejected() {
        let config = ScannerConfig {
            guidance: Some(GuidanceConfig {
                min_area: 10.0,
                max_area: 5.0,
            }),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ScannerError::InvalidConfig(_))));
    }

    #[test]
    fn zero_frame_rate_is_rejected() {
        let config = ScannerConfig {
            target_frame_rate: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanner.json");
        let config = ScannerConfig::for_mode(ScanMode::Card);
        config.save(&path).unwrap();
        assert_eq!(ScannerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn partial_json_takes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "corner_handle_radius": 14.0 }"#).unwrap();
        let config = ScannerConfig::load(&path).unwrap();
        assert_eq!(config.corner_handle_radius, 14.0);
        assert_eq!(config.min_contour_area, 5_000.0);
    }
}
