use rand::random_bool;
use serde::{Deserialize, Serialize};

use super::RenderTarget;
use super::color::{GlowSettings, Rgba};
use super::layout::{self, BarPlacement, BarShape, Screen, VisualType};
use super::spark::{SparkManager, SparkProperties};
use crate::command::BarCommand;
use crate::error::{ConfigError, Result};

/// Height range, decibel range and response rates of a bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarSettings {
    pub min_height: f32,
    pub max_height: f32,
    pub min_decibel: f32,
    pub max_decibel: f32,
    /// Gain applied while the bar moves up. Larger converges faster.
    pub grow_speed: f32,
    /// Gain applied while the bar moves down.
    pub shrink_speed: f32,
}

impl Default for BarSettings {
    fn default() -> Self {
        Self {
            min_height: 1.0,
            max_height: 200.0,
            min_decibel: -80.0,
            max_decibel: 0.0,
            grow_speed: 20.0,
            shrink_speed: 20.0,
        }
    }
}

impl BarSettings {
    pub const MIN_SPEED: f32 = 0.1;

    pub fn validate(&self) -> Result<()> {
        if !(self.min_decibel < self.max_decibel) {
            return Err(ConfigError::DegenerateDecibelRange {
                min: self.min_decibel,
                max: self.max_decibel,
            });
        }
        if !(self.min_height <= self.max_height) || self.min_height < 0.0 {
            return Err(ConfigError::InvertedHeightRange {
                min: self.min_height,
                max: self.max_height,
            });
        }
        Ok(())
    }

    pub fn floor_speeds(&mut self) {
        self.grow_speed = self.grow_speed.max(Self::MIN_SPEED);
        self.shrink_speed = self.shrink_speed.max(Self::MIN_SPEED);
    }

    fn decibel_to_height_ratio(&self) -> f32 {
        (self.max_height - self.min_height) / (self.max_decibel - self.min_decibel)
    }
}

/// One frequency band's animated bar and the sparks it throws.
#[derive(Debug, Clone)]
pub struct AudioBar {
    frequency: f32,
    visual_type: VisualType,
    screen: Screen,
    placement: BarPlacement,
    settings: BarSettings,
    height: f32,
    decibel_to_height_ratio: f32,
    color: Rgba,
    glow: GlowSettings,
    sparks: SparkManager,
    original_placement: BarPlacement,
    original_settings: BarSettings,
}

impl AudioBar {
    pub fn new(
        frequency: f32,
        placement: BarPlacement,
        screen: Screen,
        mut settings: BarSettings,
        sparks: SparkProperties,
    ) -> Result<Self> {
        settings.validate()?;
        settings.floor_speeds();
        Ok(Self {
            frequency,
            visual_type: VisualType::default(),
            screen,
            placement,
            height: settings.min_height,
            decibel_to_height_ratio: settings.decibel_to_height_ratio(),
            color: Rgba::WHITE,
            glow: GlowSettings::default(),
            sparks: SparkManager::new(sparks),
            original_placement: placement,
            original_settings: settings.clone(),
            settings,
        })
    }

    /// Moves the height toward the level `decibel` maps to, then runs the spark lifecycle.
    pub fn update(&mut self, delta_time: f32, decibel: f32, color: Rgba) {
        let decibel = if decibel.is_finite() {
            decibel
        } else {
            self.settings.min_decibel
        };

        let old_height = self.height;
        let desired_height = decibel * self.decibel_to_height_ratio + self.settings.max_height;
        let rate = if desired_height > self.height {
            self.settings.grow_speed
        } else {
            self.settings.shrink_speed
        };
        self.height += (desired_height - self.height) * rate * delta_time;
        self.limit();

        self.color = color;

        if self.sparks.is_enabled() {
            self.sparks.update_sparks(delta_time, &self.screen);

            let threshold = self.settings.max_height * self.sparks.properties().threshold;
            if self.sparks.has_capacity()
                && desired_height > old_height
                && self.height > threshold
                && delta_time > 0.0
                && self.sparks.interval_elapsed()
            {
                self.sparks.reset_ticks();
                let (position, velocity) = layout::spark_origin(
                    self.visual_type,
                    &self.placement,
                    self.height,
                    &self.screen,
                    self.sparks.properties().velocity,
                    random_bool(0.5),
                );
                self.sparks.create_spark(position, velocity, self.color);
            }
            self.sparks.tick();
        }
    }

    fn limit(&mut self) {
        self.height = self
            .height
            .clamp(self.settings.min_height, self.settings.max_height);
    }

    /// Overrides the height, e.g. after smoothing. Still clamped to the height range.
    pub fn set_height(&mut self, height: f32) {
        self.height = if height.is_finite() {
            height
        } else {
            self.settings.min_height
        };
        self.limit();
    }

    pub fn set_decibel_range(&mut self, min_decibel: f32, max_decibel: f32) -> Result<()> {
        let settings = BarSettings {
            min_decibel,
            max_decibel,
            ..self.settings.clone()
        };
        self.apply_settings(settings)
    }

    /// Replaces the height/decibel/speed settings. Construction-time values stay the reset target.
    pub fn apply_settings(&mut self, mut settings: BarSettings) -> Result<()> {
        settings.validate()?;
        settings.floor_speeds();
        self.settings = settings;
        self.refresh_ratio();
        Ok(())
    }

    fn refresh_ratio(&mut self) {
        self.decibel_to_height_ratio = self.settings.decibel_to_height_ratio();
        self.limit();
    }

    pub fn apply(&mut self, command: &BarCommand) {
        match *command {
            BarCommand::Width(delta) => {
                self.placement.width = (self.placement.width + delta).max(0.0);
            }
            BarCommand::MaxHeight(delta) => {
                let s = &mut self.settings;
                s.max_height = (s.max_height + delta).max(s.min_height);
                self.refresh_ratio();
            }
            BarCommand::MinHeight(delta) => {
                let s = &mut self.settings;
                s.min_height = (s.min_height + delta).max(0.0).min(s.max_height);
                self.refresh_ratio();
            }
            BarCommand::GrowSpeed(delta) => {
                self.settings.grow_speed =
                    (self.settings.grow_speed + delta).max(BarSettings::MIN_SPEED);
            }
            BarCommand::ShrinkSpeed(delta) => {
                self.settings.shrink_speed =
                    (self.settings.shrink_speed + delta).max(BarSettings::MIN_SPEED);
            }
            BarCommand::ResetBars => {
                self.placement.width = self.original_placement.width;
                self.settings = self.original_settings.clone();
                self.refresh_ratio();
            }
            BarCommand::Radius(delta) => {
                self.placement.radius = (self.placement.radius + delta).max(0.0);
            }
            BarCommand::ResetCircle => self.placement.radius = self.original_placement.radius,
            // The ring is shared and lives on the ensemble.
            BarCommand::RingSize(_) | BarCommand::RingRadius(_) => {}
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn settings(&self) -> &BarSettings {
        &self.settings
    }

    pub fn decibel_to_height_ratio(&self) -> f32 {
        self.decibel_to_height_ratio
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn placement(&self) -> &BarPlacement {
        &self.placement
    }

    pub fn visual_type(&self) -> VisualType {
        self.visual_type
    }

    pub fn set_visual_type(&mut self, visual_type: VisualType) {
        self.visual_type = visual_type;
    }

    pub fn glow(&self) -> &GlowSettings {
        &self.glow
    }

    pub fn glow_mut(&mut self) -> &mut GlowSettings {
        &mut self.glow
    }

    pub fn spark_manager(&self) -> &SparkManager {
        &self.sparks
    }

    pub fn spark_manager_mut(&mut self) -> &mut SparkManager {
        &mut self.sparks
    }

    pub fn shape(&self) -> BarShape {
        layout::bar_shape(self.visual_type, &self.placement, self.height, &self.screen)
    }

    pub fn render(&self, target: &mut dyn RenderTarget) {
        self.shape().draw(target, self.color);
        if self.glow.enabled {
            for (shape, color) in layout::glow_shapes(
                self.visual_type,
                &self.placement,
                self.height,
                &self.screen,
                self.color,
                &self.glow,
            ) {
                shape.draw(target, color);
            }
        }
        self.sparks.render_sparks(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_settings() -> BarSettings {
        BarSettings {
            min_height: 1.0,
            max_height: 100.0,
            min_decibel: -80.0,
            max_decibel: 0.0,
            grow_speed: 40.0,
            shrink_speed: 20.0,
        }
    }

    fn bar_with(settings: BarSettings, sparks: SparkProperties) -> AudioBar {
        let placement = BarPlacement {
            x: 100.0,
            angle: 0.0,
            radius: 50.0,
            width: 4.0,
        };
        AudioBar::new(440.0, placement, Screen::new(800.0, 600.0), settings, sparks)
            .expect("valid settings")
    }

    #[test]
    fn ratio_follows_ranges() {
        let bar = bar_with(scenario_settings(), SparkProperties::default());
        assert!((bar.decibel_to_height_ratio() - 99.0 / 80.0).abs() < 1e-6);
    }

    #[test]
    fn loud_step_overshoots_and_clamps_to_max() {
        let mut bar = bar_with(scenario_settings(), SparkProperties::default());
        assert_eq!(bar.height(), 1.0);
        bar.update(0.1, 0.0, Rgba::WHITE);
        assert_eq!(bar.height(), 100.0);
    }

    #[test]
    fn small_steps_ease_asymmetrically() {
        let mut bar = bar_with(scenario_settings(), SparkProperties::default());
        bar.update(0.01, 0.0, Rgba::WHITE);
        // 1 + 99 * 40 * 0.01
        assert!((bar.height() - 40.6).abs() < 1e-3);
        bar.update(0.01, -80.0, Rgba::WHITE);
        // 40.6 + (1 - 40.6) * 20 * 0.01
        assert!((bar.height() - 32.68).abs() < 1e-3);
    }

    #[test]
    fn zero_delta_time_holds_height() {
        let mut bar = bar_with(scenario_settings(), SparkProperties::default());
        bar.update(0.0, 0.0, Rgba::WHITE);
        assert_eq!(bar.height(), 1.0);
    }

    #[test]
    fn equal_decibel_bounds_are_rejected() {
        let settings = BarSettings {
            min_decibel: -10.0,
            max_decibel: -10.0,
            ..BarSettings::default()
        };
        let placement = BarPlacement {
            x: 0.0,
            angle: 0.0,
            radius: 0.0,
            width: 1.0,
        };
        let err = AudioBar::new(
            100.0,
            placement,
            Screen::default(),
            settings,
            SparkProperties::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DegenerateDecibelRange { .. }));

        let mut bar = bar_with(scenario_settings(), SparkProperties::default());
        assert!(bar.set_decibel_range(0.0, 0.0).is_err());
        assert!(bar.set_decibel_range(-60.0, 0.0).is_ok());
        assert!((bar.decibel_to_height_ratio() - 99.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn non_finite_decibel_reads_as_silence() {
        let mut bar = bar_with(scenario_settings(), SparkProperties::default());
        bar.update(0.1, f32::NAN, Rgba::WHITE);
        assert!((bar.height() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn height_commands_keep_range_ordered() {
        let mut bar = bar_with(scenario_settings(), SparkProperties::default());
        bar.apply(&BarCommand::MinHeight(500.0));
        assert_eq!(bar.settings().min_height, 100.0);
        bar.apply(&BarCommand::MaxHeight(-500.0));
        assert_eq!(bar.settings().max_height, 100.0);
        assert_eq!(bar.decibel_to_height_ratio(), 0.0);
        assert_eq!(bar.height(), 100.0);

        bar.apply(&BarCommand::ResetBars);
        assert_eq!(bar.settings(), &scenario_settings());
        assert!((bar.decibel_to_height_ratio() - 99.0 / 80.0).abs() < 1e-6);
    }

    #[test]
    fn speed_and_width_floors() {
        let mut bar = bar_with(scenario_settings(), SparkProperties::default());
        bar.apply(&BarCommand::GrowSpeed(-100.0));
        bar.apply(&BarCommand::ShrinkSpeed(-100.0));
        bar.apply(&BarCommand::Width(-100.0));
        bar.apply(&BarCommand::Radius(-100.0));
        assert_eq!(bar.settings().grow_speed, BarSettings::MIN_SPEED);
        assert_eq!(bar.settings().shrink_speed, BarSettings::MIN_SPEED);
        assert_eq!(bar.placement().width, 0.0);
        assert_eq!(bar.placement().radius, 0.0);

        bar.apply(&BarCommand::ResetCircle);
        assert_eq!(bar.placement().radius, 50.0);
    }

    #[test]
    fn growing_bar_spawns_one_spark_and_respects_interval() {
        let mut bar = bar_with(scenario_settings(), SparkProperties::default());
        // The first frame only starts the interval count.
        bar.update(0.01, 0.0, Rgba::WHITE);
        assert!(bar.spark_manager().sparks().is_empty());
        bar.update(0.01, 0.0, Rgba::WHITE);
        assert_eq!(bar.spark_manager().sparks().len(), 1);

        // Still growing, but the interval restarted.
        bar.update(0.01, 0.0, Rgba::WHITE);
        assert_eq!(bar.spark_manager().sparks().len(), 1);
    }

    #[test]
    fn negative_speeds_are_floored_at_construction() {
        let settings = BarSettings {
            grow_speed: -5.0,
            shrink_speed: -5.0,
            ..scenario_settings()
        };
        let mut bar = bar_with(settings, SparkProperties::default());
        assert_eq!(bar.settings().grow_speed, BarSettings::MIN_SPEED);
        assert_eq!(bar.settings().shrink_speed, BarSettings::MIN_SPEED);

        bar.update(0.1, 0.0, Rgba::WHITE);
        assert!(bar.height() > 1.0);
        bar.apply(&BarCommand::ResetBars);
        assert_eq!(bar.settings().grow_speed, BarSettings::MIN_SPEED);
    }

    #[test]
    fn paused_playback_never_spawns() {
        let mut bar = bar_with(scenario_settings(), SparkProperties::default());
        bar.set_height(90.0);
        bar.update(0.0, 0.0, Rgba::WHITE);
        assert!(bar.spark_manager().sparks().is_empty());
    }

    #[test]
    fn below_threshold_never_spawns() {
        let sparks = SparkProperties {
            threshold: 1.0,
            ..SparkProperties::default()
        };
        let mut bar = bar_with(scenario_settings(), sparks);
        bar.update(0.1, 0.0, Rgba::WHITE);
        assert!(bar.spark_manager().sparks().is_empty());
    }
}
