//! Per-frame animation core of a spectrum visualizer: bars that ease toward their band's
//! loudness and throw sparks while growing, plus the rotate and smooth effects that act on
//! the whole set. Audio analysis and drawing stay outside, behind [`DecibelSource`] and
//! [`RenderTarget`].

pub mod command;
pub mod config;
pub mod error;
pub mod visualizers;

pub use command::{BarCommand, ColorCommand, SparkCommand, SpecialCommand};
pub use config::{EffectSettings, FrequencyRange, LogSettings, VisualizerConfig};
pub use error::{ConfigError, Result};
pub use visualizers::{
    AudioBar, BarSettings, DecibelSource, Preset, RenderTarget, Rgba, Screen, SparkPhysics,
    SparkProperties, VisualType, Visualizer,
};
