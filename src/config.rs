//! Visualizer configuration, loadable from TOML.
//!
//! Every section falls back to its defaults, so a file only needs the values it changes:
//!
//! ```toml
//! visual_type = "CIRCLE"
//!
//! [bars]
//! max_height = 250.0
//!
//! [sparks]
//! limit = 4
//! physics = { mode = "time_scaled", reference_fps = 60.0 }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::visualizers::{BarSettings, GlowSettings, Rgba, Screen, SparkProperties, VisualType};

/// Frequencies assigned to bars: `start`, `start + step`, ... below `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyRange {
    pub start: f32,
    pub end: f32,
    pub step: f32,
}

impl Default for FrequencyRange {
    fn default() -> Self {
        Self {
            start: 200.0,
            end: 8000.0,
            step: 50.0,
        }
    }
}

impl FrequencyRange {
    /// Most bars a range may produce.
    pub const MAX_BINS: usize = 4096;

    /// Number of steps between `start` and `end`, saturating for tiny steps.
    pub fn bin_count(&self) -> usize {
        if !(self.step > 0.0) || !(self.start < self.end) {
            return 0;
        }
        ((self.end - self.start) / self.step).ceil() as usize
    }

    /// Empty when the range is degenerate or would exceed [`Self::MAX_BINS`].
    pub fn bins(&self) -> Vec<f32> {
        let count = self.bin_count();
        if count > Self::MAX_BINS {
            return Vec::new();
        }
        (0..count)
            .map(|i| self.start + i as f32 * self.step)
            .filter(|f| *f < self.end)
            .collect()
    }
}

/// Cross-bar effects and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    pub rotation_enabled: bool,
    /// Frames between two rotation steps.
    pub rotation_speed: u32,
    pub smoothing_enabled: bool,
    pub smoothing_factor: f32,
    pub color: Rgba,
    pub color_cycle: bool,
    /// Hue turns per second.
    pub color_cycle_speed: f32,
    pub glow: GlowSettings,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            rotation_enabled: false,
            rotation_speed: 10,
            smoothing_enabled: false,
            smoothing_factor: 1.5,
            color: Rgba::WHITE,
            color_cycle: false,
            color_cycle_speed: 0.1,
            glow: GlowSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub file: PathBuf,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: PathBuf::from("sparkbars.log"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    pub screen: Screen,
    pub frequencies: FrequencyRange,
    pub visual_type: VisualType,
    pub bars: BarSettings,
    pub sparks: SparkProperties,
    pub effects: EffectSettings,
    pub log: LogSettings,
}

impl VisualizerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: VisualizerConfig = toml::from_str(text)?;
        config.validate()?;
        config.clamp_ranges();
        Ok(config)
    }

    /// Pulls tunables back into the ranges the runtime adjustments keep them in.
    pub fn clamp_ranges(&mut self) {
        self.bars.floor_speeds();
        self.sparks.clamp_ranges();
        self.effects.glow.clamp_ranges();
        self.effects.color_cycle_speed = self.effects.color_cycle_speed.max(0.0);
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.screen.width > 0.0 && self.screen.height > 0.0) {
            return Err(ConfigError::InvalidScreen {
                width: self.screen.width,
                height: self.screen.height,
            });
        }
        let count = self.frequencies.bin_count();
        if count > FrequencyRange::MAX_BINS {
            return Err(ConfigError::TooManyBins {
                count,
                max: FrequencyRange::MAX_BINS,
            });
        }
        if self.frequencies.bins().is_empty() {
            return Err(ConfigError::EmptyFrequencyRange {
                start: self.frequencies.start,
                end: self.frequencies.end,
                step: self.frequencies.step,
            });
        }
        self.bars.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizers::{Spark, SparkPhysics};
    use glam::Vec2;

    #[test]
    fn default_range_matches_bar_count() {
        let bins = FrequencyRange::default().bins();
        assert_eq!(bins.len(), 156);
        assert_eq!(bins[0], 200.0);
        assert_eq!(*bins.last().unwrap(), 7950.0);
    }

    #[test]
    fn empty_toml_is_default() {
        let config = VisualizerConfig::from_toml("").unwrap();
        assert_eq!(config, VisualizerConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = VisualizerConfig::from_toml(
            r#"
            visual_type = "CIRCLE_INNER"

            [bars]
            max_height = 250.0

            [sparks]
            limit = 4
            physics = { mode = "time_scaled", reference_fps = 60.0 }

            [effects]
            color = { r = 255, g = 128, b = 0 }
            "#,
        )
        .unwrap();
        assert_eq!(config.visual_type, VisualType::CircleInner);
        assert_eq!(config.bars.max_height, 250.0);
        assert_eq!(config.bars.min_height, 1.0);
        assert_eq!(config.sparks.limit, 4);
        assert_eq!(
            config.sparks.physics,
            SparkPhysics::TimeScaled { reference_fps: 60.0 }
        );
        assert_eq!(config.effects.color, Rgba::rgb(255, 128, 0));
        assert_eq!(config.effects.rotation_speed, 10);
    }

    #[test]
    fn degenerate_ranges_are_rejected() {
        let err = VisualizerConfig::from_toml("[bars]\nmin_decibel = 0.0\nmax_decibel = 0.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::DegenerateDecibelRange { .. }));

        let err = VisualizerConfig::from_toml("[frequencies]\nstart = 100.0\nend = 50.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyFrequencyRange { .. }));

        let err = VisualizerConfig::from_toml("[screen]\nwidth = 0.0\nheight = 10.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScreen { .. }));
    }

    #[test]
    fn tiny_frequency_step_is_rejected() {
        let err = VisualizerConfig::from_toml("[frequencies]\nstep = 1e-30\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooManyBins { max: FrequencyRange::MAX_BINS, .. }
        ));

        let range = FrequencyRange {
            step: 1e-30,
            ..FrequencyRange::default()
        };
        assert!(range.bins().is_empty());
    }

    #[test]
    fn out_of_range_tunables_are_clamped_on_load() {
        let config = VisualizerConfig::from_toml(
            r#"
            [bars]
            grow_speed = -3.0
            shrink_speed = -3.0

            [sparks]
            fade_rate = -5.0
            gravity = -1.0
            size = -2.0
            velocity = -4.0
            threshold = 3.0

            [effects]
            glow = { enabled = true, intensity = 9.0, length = -1.0 }
            "#,
        )
        .unwrap();
        assert_eq!(config.bars.grow_speed, BarSettings::MIN_SPEED);
        assert_eq!(config.bars.shrink_speed, BarSettings::MIN_SPEED);
        assert_eq!(config.sparks.fade_rate, 0.0);
        assert_eq!(config.sparks.gravity, 0.0);
        assert_eq!(config.sparks.size, 1.0);
        assert_eq!(config.sparks.velocity, 0.0);
        assert_eq!(config.sparks.threshold, 1.0);
        assert_eq!(config.effects.glow.intensity, GlowSettings::MAX);
        assert_eq!(config.effects.glow.length, GlowSettings::MIN);

        let grey = Rgba::rgb(100, 100, 100);
        let mut spark = Spark::new(Vec2::splat(300.0), Vec2::ZERO, grey, &config.sparks);
        for _ in 0..10 {
            spark.update(0.016, &config.screen);
        }
        assert_eq!(spark.color(), grey);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = VisualizerConfig::from_toml("bars = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = VisualizerConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
