use std::f32::consts::TAU;

use tracing::{debug, info, trace};

use super::bar::AudioBar;
use super::color::{HueCycle, Palette, Rgba};
use super::layout::{BarPlacement, Ring, Screen, VisualType};
use super::presets::Preset;
use super::{DecibelSource, RenderTarget};
use crate::command::{BarCommand, ColorCommand, SparkCommand, SpecialCommand};
use crate::config::VisualizerConfig;
use crate::error::Result;
use crate::visualizers::spark::SparkField;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rotation {
    enabled: bool,
    /// Frames between two steps.
    speed: u32,
    ticks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Smoothing {
    enabled: bool,
    factor: f32,
}

impl Smoothing {
    const MIN_FACTOR: f32 = 0.1;
    const MAX_FACTOR: f32 = 2.0;
}

/// Blends every height with its circular neighbors.
///
/// Each result is `|max * (1 - factor) + average * factor|` over the bar and its two
/// neighbors, computed from the input snapshot only. `factor = 0` yields the neighborhood
/// maximum, `factor = 1` the average, and values above 1 push away from the maximum.
pub fn smooth_heights(heights: &[f32], factor: f32) -> Vec<f32> {
    let n = heights.len();
    (0..n)
        .map(|i| {
            let neighborhood = [heights[(i + n - 1) % n], heights[i], heights[(i + 1) % n]];
            let average = neighborhood.iter().sum::<f32>() / neighborhood.len() as f32;
            let max = neighborhood.iter().copied().fold(f32::MIN, f32::max);
            (max * (1.0 - factor) + average * factor).abs()
        })
        .collect()
}

/// The full set of bars, one per frequency slot, plus the effects that span them.
///
/// A frame is `begin_frame`, one `update` per slot, then `end_frame`. Slot `i` always
/// samples `frequencies()[i]`; rotation moves bars between slots, so a rotated bar
/// carries its height, color and sparks to a new frequency.
#[derive(Debug, Clone)]
pub struct Visualizer {
    screen: Screen,
    frequencies: Vec<f32>,
    bars: Vec<AudioBar>,
    visual_type: VisualType,
    rotation: Rotation,
    smoothing: Smoothing,
    ring: Ring,
    palette: Palette,
    frame_delta: f32,
    frame_color: Rgba,
    config: VisualizerConfig,
}

impl Visualizer {
    pub fn new(mut config: VisualizerConfig) -> Result<Self> {
        config.validate()?;
        config.clamp_ranges();

        let screen = config.screen;
        let frequencies = config.frequencies.bins();
        let count = frequencies.len();
        let radius = screen.width.min(screen.height) / 4.0;
        let bar_width = screen.width / count as f32;
        let angle_step = TAU / count as f32;

        let bars = frequencies
            .iter()
            .enumerate()
            .map(|(i, &frequency)| {
                let placement = BarPlacement {
                    x: i as f32 * bar_width,
                    angle: i as f32 * angle_step,
                    radius,
                    width: bar_width,
                };
                let mut bar = AudioBar::new(
                    frequency,
                    placement,
                    screen,
                    config.bars.clone(),
                    config.sparks.clone(),
                )?;
                bar.set_visual_type(config.visual_type);
                *bar.glow_mut() = config.effects.glow;
                Ok(bar)
            })
            .collect::<Result<Vec<_>>>()?;

        let effects = &config.effects;
        let palette = Palette::new(
            effects.color,
            HueCycle::new(effects.color_cycle, effects.color_cycle_speed),
        );
        info!(bars = count, visual_type = %config.visual_type, "visualizer ready");

        Ok(Self {
            screen,
            frequencies,
            bars,
            visual_type: config.visual_type,
            rotation: Rotation {
                enabled: effects.rotation_enabled,
                speed: effects.rotation_speed.max(1),
                ticks: 0,
            },
            smoothing: Smoothing {
                enabled: effects.smoothing_enabled,
                factor: effects
                    .smoothing_factor
                    .clamp(Smoothing::MIN_FACTOR, Smoothing::MAX_FACTOR),
            },
            ring: Ring::new(radius),
            frame_delta: 0.0,
            frame_color: palette.current(),
            palette,
            config,
        })
    }

    /// Starts a frame: advances the hue clock and fixes this frame's delta time and color.
    pub fn begin_frame(&mut self, delta_time: f32) {
        let delta_time = delta_time.max(0.0);
        self.palette.cycle.advance(delta_time);
        self.frame_delta = delta_time;
        self.frame_color = self.palette.current();
    }

    /// Feeds the decibel sample for slot `index` to the bar currently in that slot.
    pub fn update(&mut self, index: usize, decibel: f32) {
        match self.bars.get_mut(index) {
            Some(bar) => bar.update(self.frame_delta, decibel, self.frame_color),
            None => trace!(index, "decibel sample for unknown slot ignored"),
        }
    }

    /// Runs the cross-bar transforms once every bar has its new height.
    pub fn end_frame(&mut self) {
        if self.rotation.enabled {
            if self.rotation.ticks > self.rotation.speed {
                self.rotate_bars();
            }
            self.rotation.ticks += 1;
        }
        if self.smoothing.enabled {
            self.smooth_bars();
        }
    }

    /// One complete frame sampled from `source`.
    pub fn frame<S: DecibelSource + ?Sized>(&mut self, delta_time: f32, source: &S) {
        self.begin_frame(delta_time);
        for index in 0..self.frequencies.len() {
            let decibel = source.decibel(self.frequencies[index]);
            self.update(index, decibel);
        }
        self.end_frame();
    }

    /// Shifts every bar one slot forward, the last one wrapping to the front.
    pub fn rotate_bars(&mut self) {
        self.rotation.ticks = 0;
        self.bars.rotate_right(1);
        trace!("bars rotated");
    }

    pub fn smooth_bars(&mut self) {
        let heights: Vec<f32> = self.bars.iter().map(AudioBar::height).collect();
        let smoothed = smooth_heights(&heights, self.smoothing.factor);
        for (bar, height) in self.bars.iter_mut().zip(smoothed) {
            bar.set_height(height);
        }
    }

    pub fn change_visual_type(&mut self, visual_type: VisualType) {
        self.visual_type = visual_type;
        for bar in &mut self.bars {
            bar.set_visual_type(visual_type);
        }
        info!(%visual_type, "visual type changed");
    }

    /// Menu entry point for bar and ring options. Returns whether the option was recognized.
    pub fn change_bar_property(&mut self, option: &str, value: f32) -> bool {
        match BarCommand::parse(option, value) {
            Some(command) => {
                self.apply_bar_command(command);
                true
            }
            None => {
                trace!(option, "unrecognized bar option");
                false
            }
        }
    }

    pub fn apply_bar_command(&mut self, command: BarCommand) {
        debug!(?command, "bar command");
        match command {
            BarCommand::RingSize(delta) => self.ring.adjust_size(delta),
            BarCommand::RingRadius(delta) => self.ring.adjust_radius(delta),
            BarCommand::ResetCircle => {
                self.ring.reset();
                self.for_each_bar(|bar| bar.apply(&command));
            }
            _ => self.for_each_bar(|bar| bar.apply(&command)),
        }
    }

    pub fn change_spark_property(&mut self, option: &str, value: f32) -> bool {
        match SparkCommand::parse(option, value) {
            Some(command) => {
                self.apply_spark_command(command);
                true
            }
            None => {
                trace!(option, "unrecognized spark option");
                false
            }
        }
    }

    pub fn apply_spark_command(&mut self, command: SparkCommand) {
        debug!(?command, "spark command");
        self.for_each_bar(|bar| {
            let sparks = bar.spark_manager_mut();
            match command {
                SparkCommand::Adjust(field, delta) => sparks.properties_mut().adjust(field, delta),
                SparkCommand::Randomize(field) => sparks.properties_mut().enable_randomize(field),
                SparkCommand::ToggleSway => sparks.properties_mut().adjust(SparkField::Sway, 0.0),
                SparkCommand::Threshold(delta) => sparks.properties_mut().adjust_threshold(delta),
                SparkCommand::Reset => sparks.reset(),
                SparkCommand::ToggleEnabled => sparks.toggle(),
            }
        });
    }

    pub fn change_special_property(&mut self, option: &str, value: f32) -> bool {
        match SpecialCommand::parse(option, value) {
            Some(command) => {
                self.apply_special_command(command);
                true
            }
            None => {
                trace!(option, "unrecognized special option");
                false
            }
        }
    }

    pub fn apply_special_command(&mut self, command: SpecialCommand) {
        debug!(?command, "special command");
        match command {
            SpecialCommand::ToggleRotation => self.rotation.enabled = !self.rotation.enabled,
            SpecialCommand::RotationSpeed(delta) => {
                self.rotation.speed = (self.rotation.speed as f32 + delta).max(1.0).round() as u32;
            }
            SpecialCommand::ToggleSmoothing => self.smoothing.enabled = !self.smoothing.enabled,
            SpecialCommand::SmoothingFactor(delta) => {
                self.set_smoothing_factor(self.smoothing.factor + delta);
            }
            SpecialCommand::Reset => {
                let effects = &self.config.effects;
                self.rotation = Rotation {
                    enabled: false,
                    speed: effects.rotation_speed.max(1),
                    ticks: 0,
                };
                self.smoothing = Smoothing {
                    enabled: false,
                    factor: effects
                        .smoothing_factor
                        .clamp(Smoothing::MIN_FACTOR, Smoothing::MAX_FACTOR),
                };
                self.bars
                    .sort_by(|a, b| a.frequency().total_cmp(&b.frequency()));
            }
        }
    }

    pub fn change_color_property(&mut self, option: &str, value: f32) -> bool {
        match ColorCommand::parse(option, value) {
            Some(command) => {
                self.apply_color_command(command);
                true
            }
            None => {
                trace!(option, "unrecognized color option");
                false
            }
        }
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.apply_color_command(ColorCommand::SetColor(color));
    }

    pub fn apply_color_command(&mut self, command: ColorCommand) {
        debug!(?command, "color command");
        match command {
            ColorCommand::SetColor(color) => self.palette.base = color,
            ColorCommand::ToggleCycle => self.palette.cycle.toggle(),
            ColorCommand::CycleSpeed(delta) => self.palette.cycle.adjust_speed(delta),
            ColorCommand::ToggleGlow => self.for_each_bar(|bar| {
                let glow = bar.glow_mut();
                glow.enabled = !glow.enabled;
            }),
            ColorCommand::GlowIntensity(delta) => {
                self.for_each_bar(|bar| bar.glow_mut().adjust_intensity(delta));
            }
            ColorCommand::GlowLength(delta) => {
                self.for_each_bar(|bar| bar.glow_mut().adjust_length(delta));
            }
            ColorCommand::Reset => {
                let effects = self.config.effects.clone();
                self.palette = Palette::new(
                    effects.color,
                    HueCycle::new(effects.color_cycle, effects.color_cycle_speed),
                );
                self.for_each_bar(|bar| *bar.glow_mut() = effects.glow);
            }
        }
        self.frame_color = self.palette.current();
    }

    /// Looks a preset up by menu label and applies it. Returns whether the label was known.
    pub fn change_preset(&mut self, name: &str) -> Result<bool> {
        match Preset::from_name(name) {
            Some(preset) => {
                self.apply_preset(preset)?;
                Ok(true)
            }
            None => {
                trace!(name, "unrecognized preset");
                Ok(false)
            }
        }
    }

    /// Re-tunes every bar, spark manager and effect from the preset's configuration.
    /// Frequencies, placements and active sparks are kept.
    pub fn apply_preset(&mut self, preset: Preset) -> Result<()> {
        let mut config = preset.config(&self.config);
        config.clamp_ranges();
        for bar in &mut self.bars {
            bar.apply_settings(config.bars.clone())?;
            let sparks = bar.spark_manager_mut();
            sparks.set_properties(config.sparks.clone());
            sparks.set_enabled(true);
            *bar.glow_mut() = config.effects.glow;
        }

        let effects = &config.effects;
        self.rotation.enabled = effects.rotation_enabled;
        self.rotation.speed = effects.rotation_speed.max(1);
        self.smoothing = Smoothing {
            enabled: effects.smoothing_enabled,
            factor: effects
                .smoothing_factor
                .clamp(Smoothing::MIN_FACTOR, Smoothing::MAX_FACTOR),
        };
        self.palette.base = effects.color;
        self.palette.cycle.enabled = effects.color_cycle;
        self.palette.cycle.set_speed(effects.color_cycle_speed);
        self.frame_color = self.palette.current();

        self.change_visual_type(config.visual_type);
        info!(preset = preset.name(), "preset applied");
        Ok(())
    }

    /// Draws ring, bars, glow and sparks. Reads state only.
    pub fn render(&self, target: &mut dyn RenderTarget) {
        self.ring
            .draw(target, self.visual_type, &self.screen, self.frame_color);
        for bar in &self.bars {
            bar.render(target);
        }
    }

    fn for_each_bar(&mut self, f: impl FnMut(&mut AudioBar)) {
        self.bars.iter_mut().for_each(f);
    }

    pub fn bars(&self) -> &[AudioBar] {
        &self.bars
    }

    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn visual_type(&self) -> VisualType {
        self.visual_type
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn rotation_enabled(&self) -> bool {
        self.rotation.enabled
    }

    pub fn rotate_speed(&self) -> u32 {
        self.rotation.speed
    }

    pub fn smoothing_enabled(&self) -> bool {
        self.smoothing.enabled
    }

    pub fn smoothing_factor(&self) -> f32 {
        self.smoothing.factor
    }

    pub fn set_rotation(&mut self, enabled: bool) {
        self.rotation.enabled = enabled;
    }

    pub fn set_smoothing(&mut self, enabled: bool) {
        self.smoothing.enabled = enabled;
    }

    /// Clamped to `[0.1, 2]`.
    pub fn set_smoothing_factor(&mut self, factor: f32) {
        self.smoothing.factor = factor.clamp(Smoothing::MIN_FACTOR, Smoothing::MAX_FACTOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrequencyRange;

    fn small_config(bars: usize) -> VisualizerConfig {
        VisualizerConfig {
            frequencies: FrequencyRange {
                start: 100.0,
                end: 100.0 + 100.0 * bars as f32,
                step: 100.0,
            },
            ..VisualizerConfig::default()
        }
    }

    #[test]
    fn one_bar_per_frequency_with_even_layout() {
        let visualizer = Visualizer::new(small_config(4)).unwrap();
        assert_eq!(visualizer.bars().len(), 4);
        assert_eq!(visualizer.frequencies(), &[100.0, 200.0, 300.0, 400.0]);
        let placements: Vec<_> = visualizer.bars().iter().map(|b| *b.placement()).collect();
        assert_eq!(placements[1].x, 320.0);
        assert_eq!(placements[1].width, 320.0);
        assert!((placements[2].angle - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(placements[0].radius, 180.0);
    }

    #[test]
    fn smoothing_factor_extremes() {
        let heights = [10.0, 40.0, 10.0, 70.0];
        assert_eq!(smooth_heights(&heights, 0.0), vec![70.0, 40.0, 70.0, 70.0]);
        assert_eq!(smooth_heights(&heights, 1.0), vec![40.0, 20.0, 40.0, 30.0]);
        assert_eq!(smooth_heights(&[], 1.0), Vec::<f32>::new());
        assert_eq!(smooth_heights(&[5.0], 1.5), vec![5.0]);
    }

    #[test]
    fn rotation_fires_after_speed_frames() {
        let mut visualizer = Visualizer::new(small_config(3)).unwrap();
        visualizer.apply_special_command(SpecialCommand::ToggleRotation);
        visualizer.apply_special_command(SpecialCommand::RotationSpeed(-8.0));
        assert_eq!(visualizer.rotate_speed(), 2);

        let order = |v: &Visualizer| v.bars().iter().map(|b| b.frequency()).collect::<Vec<_>>();
        for _ in 0..3 {
            visualizer.frame(0.016, &|_: f32| -80.0);
            assert_eq!(order(&visualizer), vec![100.0, 200.0, 300.0]);
        }
        visualizer.frame(0.016, &|_: f32| -80.0);
        assert_eq!(order(&visualizer), vec![300.0, 100.0, 200.0]);

        visualizer.apply_special_command(SpecialCommand::Reset);
        assert!(!visualizer.rotation_enabled());
        assert_eq!(visualizer.rotate_speed(), 10);
        assert_eq!(order(&visualizer), vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn special_adjustments_clamp() {
        let mut visualizer = Visualizer::new(small_config(2)).unwrap();
        visualizer.change_special_property("ROTATION SPEED +", -50.0);
        assert_eq!(visualizer.rotate_speed(), 1);
        visualizer.change_special_property("SMOOTHING -", 5.0);
        assert_eq!(visualizer.smoothing_factor(), 2.0);
        visualizer.change_special_property("SMOOTHING +", -5.0);
        assert_eq!(visualizer.smoothing_factor(), 0.1);
        assert!(!visualizer.change_special_property("TEMPO", 1.0));
    }

    #[test]
    fn ring_options_go_to_the_shared_ring() {
        let mut visualizer = Visualizer::new(small_config(2)).unwrap();
        assert!(visualizer.change_bar_property("RING RADIUS +", 5.0));
        assert_eq!(visualizer.ring().radius, 185.0);
        assert!(visualizer.change_bar_property("RADIUS +", 5.0));
        assert!(visualizer.bars().iter().all(|b| b.placement().radius == 185.0));
        assert!(visualizer.change_bar_property("RESET CIRCLE", 1.0));
        assert_eq!(visualizer.ring().radius, 180.0);
        assert!(visualizer.bars().iter().all(|b| b.placement().radius == 180.0));
    }

    #[test]
    fn color_cycle_drives_every_bar() {
        let mut visualizer = Visualizer::new(small_config(3)).unwrap();
        visualizer.set_color(Rgba::rgb(0, 0, 255));
        visualizer.frame(0.016, &|_: f32| -40.0);
        assert!(visualizer.bars().iter().all(|b| b.color() == Rgba::rgb(0, 0, 255)));

        visualizer.change_color_property("COLOR CYCLE ON/OFF", 1.0);
        visualizer.frame(0.0, &|_: f32| -40.0);
        assert!(visualizer.bars().iter().all(|b| b.color() == Rgba::rgb(255, 0, 0)));

        visualizer.change_color_property("RESET COLORS", 0.0);
        assert_eq!(visualizer.palette().current(), Rgba::WHITE);
    }

    #[test]
    fn glow_options_reach_every_bar() {
        let mut visualizer = Visualizer::new(small_config(2)).unwrap();
        visualizer.change_color_property("GLOW ON/OFF", 1.0);
        visualizer.change_color_property("GLOW LENGTH +", 0.05);
        for bar in visualizer.bars() {
            assert!(bar.glow().enabled);
            assert!((bar.glow().length - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn presets_retune_everything_but_placement() {
        let mut visualizer = Visualizer::new(small_config(3)).unwrap();
        let placements: Vec<_> = visualizer.bars().iter().map(|b| *b.placement()).collect();

        assert!(visualizer.change_preset("BLACK HOLE").unwrap());
        assert_eq!(visualizer.visual_type(), VisualType::CircleInner);
        assert!(visualizer.rotation_enabled());
        for bar in visualizer.bars() {
            assert_eq!(bar.visual_type(), VisualType::CircleInner);
            assert_eq!(bar.settings().max_height, 150.0);
            assert_eq!(bar.spark_manager().properties().limit, 6);
            assert!(bar.glow().enabled);
        }

        assert!(visualizer.change_preset("DEFAULT").unwrap());
        assert_eq!(visualizer.visual_type(), VisualType::Bottom);
        assert!(!visualizer.rotation_enabled());
        let after: Vec<_> = visualizer.bars().iter().map(|b| *b.placement()).collect();
        assert_eq!(placements, after);
        assert!(!visualizer.change_preset("THUNDER").unwrap());
    }

    #[test]
    fn out_of_range_slot_is_ignored() {
        let mut visualizer = Visualizer::new(small_config(2)).unwrap();
        visualizer.begin_frame(0.1);
        visualizer.update(7, 0.0);
        visualizer.end_frame();
        assert!(visualizer.bars().iter().all(|b| b.height() == 1.0));
    }
}
