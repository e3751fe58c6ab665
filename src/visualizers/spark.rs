use glam::Vec2;
use rand::{random_bool, random_range};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::RenderTarget;
use super::color::Rgba;
use super::layout::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SparkShape {
    #[default]
    Circle,
    Rect,
}

/// How spark motion relates to frame time.
///
/// `FrameLocked` adds gravity, velocity and fade once per update regardless of
/// `delta_time`, which ties the look to the frame rate the values were tuned at.
/// `TimeScaled` multiplies the same per-frame increments by `delta_time * reference_fps`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SparkPhysics {
    #[default]
    FrameLocked,
    TimeScaled { reference_fps: f32 },
}

impl SparkPhysics {
    /// Never negative, so no increment can run backwards.
    fn step(self, delta_time: f32) -> f32 {
        match self {
            SparkPhysics::FrameLocked => 1.0,
            SparkPhysics::TimeScaled { reference_fps } => (delta_time * reference_fps).max(0.0),
        }
    }
}

/// Lateral random walk added to both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sway {
    positive: bool,
    offset: f32,
}

impl Sway {
    const STEP: f32 = 0.01;
    const FLIP_CHANCE: f64 = 0.05;

    fn new() -> Self {
        Self {
            positive: random_bool(0.5),
            offset: 0.0,
        }
    }

    fn step(&mut self) -> f32 {
        let nudge = random_range(0.0..Self::STEP);
        self.offset += if self.positive { nudge } else { -nudge };
        if random_bool(Self::FLIP_CHANCE) {
            self.positive = !self.positive;
            self.offset = 0.0;
        }
        self.offset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spark {
    position: Vec2,
    velocity: Vec2,
    size: f32,
    color: Rgba,
    gravity: f32,
    fade_rate: f32,
    fade_sum: f32,
    sway: Option<Sway>,
    shape: SparkShape,
    physics: SparkPhysics,
    active: bool,
}

impl Spark {
    pub fn new(position: Vec2, velocity: Vec2, color: Rgba, properties: &SparkProperties) -> Self {
        Self {
            position,
            velocity,
            size: properties.size,
            color,
            gravity: properties.gravity,
            fade_rate: properties.fade_rate,
            fade_sum: 0.0,
            sway: properties.sway.then(Sway::new),
            shape: properties.shape,
            physics: properties.physics,
            active: true,
        }
    }

    /// Advances one frame: gravity, motion, sway, fade, then the bounds and color check.
    pub fn update(&mut self, delta_time: f32, screen: &Screen) {
        let step = self.physics.step(delta_time);

        self.velocity.y += self.gravity * step;
        self.position += self.velocity * step;

        if step > 0.0 {
            if let Some(sway) = self.sway.as_mut() {
                self.position += Vec2::splat(sway.step() * step);
            }
        }

        self.fade_sum += self.fade_rate * step;
        self.color = self.color.darken(self.fade_sum);

        if !screen.contains(self.position) || self.color.is_black() {
            self.active = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn shape(&self) -> SparkShape {
        self.shape
    }

    pub fn render(&self, target: &mut dyn RenderTarget) {
        match self.shape {
            SparkShape::Circle => target.fill_circle(self.position, self.size, self.color),
            SparkShape::Rect => target.fill_rect(self.position, Vec2::splat(self.size), self.color),
        }
    }
}

/// Spark properties that can be adjusted or drawn at random on the next spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SparkField {
    Limit,
    SpawnInterval,
    Velocity,
    Gravity,
    Size,
    Fade,
    Sway,
}

impl SparkField {
    pub const ALL: [SparkField; 7] = [
        SparkField::Limit,
        SparkField::SpawnInterval,
        SparkField::Velocity,
        SparkField::Gravity,
        SparkField::Size,
        SparkField::Fade,
        SparkField::Sway,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Spawn parameters shared by every spark a manager creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkProperties {
    /// Maximum concurrent sparks per bar.
    pub limit: usize,
    /// Frames that must pass between two spawns.
    pub spawn_interval: f32,
    pub velocity: f32,
    pub gravity: f32,
    pub size: f32,
    pub fade_rate: f32,
    pub sway: bool,
    /// Fraction of the bar's max height it has to exceed before it spawns sparks.
    pub threshold: f32,
    pub shape: SparkShape,
    pub physics: SparkPhysics,
    /// Fields re-drawn before every spawn. Runtime state, never persisted.
    #[serde(skip)]
    pub randomized: RandomizedFields,
}

/// Set of [`SparkField`]s flagged for randomization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RandomizedFields([bool; 7]);

impl RandomizedFields {
    pub fn contains(&self, field: SparkField) -> bool {
        self.0[field.index()]
    }

    pub fn insert(&mut self, field: SparkField) {
        self.0[field.index()] = true;
    }

    pub fn remove(&mut self, field: SparkField) {
        self.0[field.index()] = false;
    }
}

impl Default for SparkProperties {
    fn default() -> Self {
        Self {
            limit: 2,
            spawn_interval: 50.0,
            velocity: 1.0,
            gravity: 0.01,
            size: 1.5,
            fade_rate: 0.05,
            sway: false,
            threshold: 0.3,
            shape: SparkShape::Circle,
            physics: SparkPhysics::FrameLocked,
            randomized: RandomizedFields::default(),
        }
    }
}

impl SparkProperties {
    pub fn is_randomized(&self, field: SparkField) -> bool {
        self.randomized.contains(field)
    }

    /// Draw a fresh value for this field before every spawn until it is adjusted again.
    pub fn enable_randomize(&mut self, field: SparkField) {
        self.randomized.insert(field);
    }

    /// Adds `delta` to a numeric field and stops randomizing it.
    ///
    /// Sway has no magnitude: adjusting it flips it, and a randomized sway lands on off.
    pub fn adjust(&mut self, field: SparkField, delta: f32) {
        match field {
            SparkField::Limit => {
                self.limit = (self.limit as f32 + delta).max(0.0).round() as usize;
            }
            SparkField::SpawnInterval => {
                self.spawn_interval = (self.spawn_interval + delta).max(0.0);
            }
            SparkField::Velocity => self.velocity = (self.velocity + delta).max(0.0),
            SparkField::Gravity => self.gravity = (self.gravity + delta).max(0.0),
            SparkField::Size => self.size = (self.size + delta).max(1.0),
            SparkField::Fade => self.fade_rate = (self.fade_rate + delta).max(0.0),
            SparkField::Sway => {
                self.sway = if self.is_randomized(SparkField::Sway) {
                    false
                } else {
                    !self.sway
                };
            }
        }
        self.randomized.remove(field);
    }

    /// Pulls every field back into the range the adjustments keep it in.
    /// Applied to properties coming from config files and presets.
    pub fn clamp_ranges(&mut self) {
        self.spawn_interval = self.spawn_interval.max(0.0);
        self.velocity = self.velocity.max(0.0);
        self.gravity = self.gravity.max(0.0);
        self.size = self.size.max(1.0);
        self.fade_rate = self.fade_rate.max(0.0);
        self.threshold = self.threshold.clamp(0.0, 1.0);
        if let SparkPhysics::TimeScaled { reference_fps } = &mut self.physics {
            *reference_fps = reference_fps.max(0.0);
        }
    }

    pub fn adjust_threshold(&mut self, delta: f32) {
        self.threshold = (self.threshold + delta).clamp(0.0, 1.0);
    }

    /// Re-draws every field flagged for randomization.
    pub fn randomize_pending(&mut self) {
        for field in SparkField::ALL {
            if !self.is_randomized(field) {
                continue;
            }
            match field {
                SparkField::Limit => self.limit = random_range(1..=10),
                SparkField::SpawnInterval => self.spawn_interval = random_range(0.0..500.0),
                SparkField::Velocity => self.velocity = random_range(0.1..2.0),
                SparkField::Gravity => self.gravity = random_range(0.0..0.01),
                SparkField::Size => self.size = random_range(1.0..4.0),
                SparkField::Fade => self.fade_rate = random_range(0.0..0.1),
                SparkField::Sway => self.sway = random_bool(0.5),
            }
        }
    }
}

/// Owns the active sparks of one bar.
#[derive(Debug, Clone)]
pub struct SparkManager {
    properties: SparkProperties,
    defaults: SparkProperties,
    sparks: Vec<Spark>,
    /// Frames since the last spawn. Starts at the spawn interval, so the first spawn
    /// needs one tick.
    ticks: u32,
    enabled: bool,
}

impl SparkManager {
    pub fn new(mut properties: SparkProperties) -> Self {
        properties.clamp_ranges();
        Self {
            ticks: initial_ticks(&properties),
            defaults: properties.clone(),
            properties,
            sparks: Vec::new(),
            enabled: true,
        }
    }

    pub fn properties(&self) -> &SparkProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut SparkProperties {
        &mut self.properties
    }

    /// Replaces the live properties without touching active sparks.
    pub fn set_properties(&mut self, mut properties: SparkProperties) {
        properties.clamp_ranges();
        self.properties = properties;
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn has_capacity(&self) -> bool {
        self.sparks.len() < self.properties.limit
    }

    /// Frames since the last spawn exceed the spawn interval.
    pub fn interval_elapsed(&self) -> bool {
        self.ticks as f32 > self.properties.spawn_interval
    }

    pub fn tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn reset_ticks(&mut self) {
        self.ticks = 0;
    }

    /// Applies pending random draws, then appends a spark built from the result.
    pub fn create_spark(&mut self, position: Vec2, velocity: Vec2, color: Rgba) {
        self.properties.randomize_pending();
        trace!(?position, ?velocity, "spawning spark");
        self.sparks
            .push(Spark::new(position, velocity, color, &self.properties));
    }

    pub fn update_sparks(&mut self, delta_time: f32, screen: &Screen) {
        if !self.enabled {
            return;
        }
        self.sparks.retain_mut(|spark| {
            spark.update(delta_time, screen);
            spark.is_active()
        });
    }

    pub fn render_sparks(&self, target: &mut dyn RenderTarget) {
        if !self.enabled {
            return;
        }
        for spark in &self.sparks {
            spark.render(target);
        }
    }

    /// Restores the construction-time properties and drops every active spark.
    pub fn reset(&mut self) {
        self.properties = self.defaults.clone();
        self.sparks.clear();
        self.ticks = initial_ticks(&self.properties);
    }
}

fn initial_ticks(properties: &SparkProperties) -> u32 {
    properties.spawn_interval.ceil() as u32
}
