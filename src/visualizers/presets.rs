use std::fmt;

use super::bar::BarSettings;
use super::color::{GlowSettings, Rgba};
use super::layout::VisualType;
use super::spark::{SparkProperties, SparkShape};
use crate::config::{EffectSettings, VisualizerConfig};

/// Built-in looks, each a full set of bar, spark and effect parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Default,
    BlackHole,
    Space,
    LightShow,
    Fire,
    Rain,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Default,
        Preset::BlackHole,
        Preset::Space,
        Preset::LightShow,
        Preset::Fire,
        Preset::Rain,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Default => "DEFAULT",
            Preset::BlackHole => "BLACK HOLE",
            Preset::Space => "SPACE",
            Preset::LightShow => "LIGHT SHOW",
            Preset::Fire => "FIRE",
            Preset::Rain => "RAIN",
        }
    }

    /// Menu labels match by substring, case-insensitive, so "PRESET: FIRE" finds `Fire`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_uppercase().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|preset| name.contains(preset.name()))
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// The configuration this preset produces on top of `base`. Screen, frequencies,
    /// decibel range and logging always come from `base`.
    pub fn config(self, base: &VisualizerConfig) -> VisualizerConfig {
        let bars = BarSettings {
            min_decibel: base.bars.min_decibel,
            max_decibel: base.bars.max_decibel,
            ..BarSettings::default()
        };
        let sparks = SparkProperties {
            physics: base.sparks.physics,
            ..SparkProperties::default()
        };
        let effects = EffectSettings::default();

        let (visual_type, bars, sparks, effects) = match self {
            Preset::Default => (
                base.visual_type,
                base.bars.clone(),
                base.sparks.clone(),
                base.effects.clone(),
            ),
            Preset::BlackHole => (
                VisualType::CircleInner,
                BarSettings {
                    max_height: 150.0,
                    grow_speed: 30.0,
                    shrink_speed: 10.0,
                    ..bars
                },
                SparkProperties {
                    limit: 6,
                    spawn_interval: 10.0,
                    velocity: 1.5,
                    gravity: 0.0,
                    size: 1.0,
                    fade_rate: 0.02,
                    threshold: 0.2,
                    ..sparks
                },
                EffectSettings {
                    rotation_enabled: true,
                    rotation_speed: 3,
                    color: Rgba::rgb(140, 60, 255),
                    glow: GlowSettings {
                        enabled: true,
                        intensity: 0.6,
                        length: 0.3,
                    },
                    ..effects
                },
            ),
            Preset::Space => (
                VisualType::CircleMiddle,
                BarSettings {
                    max_height: 120.0,
                    grow_speed: 15.0,
                    shrink_speed: 8.0,
                    ..bars
                },
                SparkProperties {
                    limit: 3,
                    spawn_interval: 120.0,
                    velocity: 0.4,
                    gravity: 0.0,
                    size: 1.0,
                    fade_rate: 0.01,
                    sway: true,
                    threshold: 0.1,
                    ..sparks
                },
                EffectSettings {
                    smoothing_enabled: true,
                    smoothing_factor: 1.0,
                    color: Rgba::rgb(180, 200, 255),
                    ..effects
                },
            ),
            Preset::LightShow => (
                VisualType::Middle,
                BarSettings {
                    max_height: 250.0,
                    grow_speed: 40.0,
                    shrink_speed: 25.0,
                    ..bars
                },
                SparkProperties {
                    limit: 8,
                    spawn_interval: 20.0,
                    velocity: 2.0,
                    size: 2.0,
                    fade_rate: 0.08,
                    shape: SparkShape::Rect,
                    ..sparks
                },
                EffectSettings {
                    rotation_enabled: true,
                    rotation_speed: 1,
                    color_cycle: true,
                    color_cycle_speed: 0.5,
                    glow: GlowSettings {
                        enabled: true,
                        intensity: 0.8,
                        length: 0.2,
                    },
                    ..effects
                },
            ),
            Preset::Fire => (
                VisualType::Bottom,
                BarSettings {
                    max_height: 300.0,
                    grow_speed: 35.0,
                    shrink_speed: 12.0,
                    ..bars
                },
                SparkProperties {
                    limit: 6,
                    spawn_interval: 15.0,
                    velocity: 1.8,
                    gravity: 0.0,
                    size: 2.5,
                    fade_rate: 0.06,
                    sway: true,
                    threshold: 0.2,
                    ..sparks
                },
                EffectSettings {
                    smoothing_enabled: true,
                    smoothing_factor: 0.5,
                    color: Rgba::rgb(255, 110, 20),
                    glow: GlowSettings {
                        enabled: true,
                        intensity: 0.5,
                        length: 0.4,
                    },
                    ..effects
                },
            ),
            Preset::Rain => (
                VisualType::Top,
                BarSettings {
                    max_height: 220.0,
                    grow_speed: 25.0,
                    shrink_speed: 15.0,
                    ..bars
                },
                SparkProperties {
                    limit: 5,
                    spawn_interval: 25.0,
                    velocity: 0.5,
                    gravity: 0.01,
                    size: 1.0,
                    fade_rate: 0.03,
                    shape: SparkShape::Rect,
                    threshold: 0.15,
                    ..sparks
                },
                EffectSettings {
                    color: Rgba::rgb(90, 150, 255),
                    ..effects
                },
            ),
        };

        VisualizerConfig {
            visual_type,
            bars,
            sparks,
            effects,
            ..base.clone()
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
