use glam::Vec2;

pub mod bar;
pub mod color;
pub mod ensemble;
pub mod layout;
pub mod presets;
pub mod spark;

pub use bar::{AudioBar, BarSettings};
pub use color::{GlowSettings, HueCycle, Palette, Rgba};
pub use ensemble::Visualizer;
pub use layout::{BarPlacement, BarShape, Ring, Screen, VisualType};
pub use presets::Preset;
pub use spark::{
    RandomizedFields, Spark, SparkField, SparkManager, SparkPhysics, SparkProperties, SparkShape,
};

/// Drawing surface the visualizer renders into. Coordinates are screen pixels, y down.
pub trait RenderTarget {
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba);
    fn line(&mut self, start: Vec2, end: Vec2, width: f32, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
}

/// Loudness of a frequency (Hz) at the current playback position, in dB.
pub trait DecibelSource {
    fn decibel(&self, frequency: f32) -> f32;
}

impl<F> DecibelSource for F
where
    F: Fn(f32) -> f32,
{
    fn decibel(&self, frequency: f32) -> f32 {
        self(frequency)
    }
}
