//! Typed property commands and the menu-string protocol that produces them.
//!
//! Menus send an option label plus a numeric value. Labels are matched by substring
//! against a small vocabulary, first match wins, and unknown labels parse to `None`.
//! For spark fields a value of exactly zero means "randomize on next spawn"; that
//! convention ends here and the rest of the crate only sees explicit variants.

use crate::visualizers::color::Rgba;
use crate::visualizers::spark::SparkField;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarCommand {
    Width(f32),
    MaxHeight(f32),
    MinHeight(f32),
    GrowSpeed(f32),
    ShrinkSpeed(f32),
    ResetBars,
    RingSize(f32),
    RingRadius(f32),
    Radius(f32),
    ResetCircle,
}

impl BarCommand {
    pub fn parse(option: &str, value: f32) -> Option<Self> {
        let option = option.to_ascii_uppercase();
        let has = |key: &str| option.contains(key);
        let command = if has("RING WIDTH") || has("RING SIZE") {
            BarCommand::RingSize(value)
        } else if has("RING RADIUS") {
            BarCommand::RingRadius(value)
        } else if has("WIDTH") {
            BarCommand::Width(value)
        } else if has("MAX") {
            BarCommand::MaxHeight(value)
        } else if has("MIN") {
            BarCommand::MinHeight(value)
        } else if has("GROW") {
            BarCommand::GrowSpeed(value)
        } else if has("SHRINK") {
            BarCommand::ShrinkSpeed(value)
        } else if has("RESET BARS") {
            BarCommand::ResetBars
        } else if has("RESET CIRCLE") {
            BarCommand::ResetCircle
        } else if has("RADIUS") {
            BarCommand::Radius(value)
        } else {
            return None;
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SparkCommand {
    Adjust(SparkField, f32),
    Randomize(SparkField),
    ToggleSway,
    Threshold(f32),
    Reset,
    ToggleEnabled,
}

impl SparkCommand {
    pub fn parse(option: &str, value: f32) -> Option<Self> {
        let option = option.to_ascii_uppercase();
        let has = |key: &str| option.contains(key);
        let field = if has("LIMIT") {
            Some(SparkField::Limit)
        } else if has("SPAWN") {
            Some(SparkField::SpawnInterval)
        } else if has("VELOCITY") {
            Some(SparkField::Velocity)
        } else if has("GRAVITY") {
            Some(SparkField::Gravity)
        } else if has("SIZE") {
            Some(SparkField::Size)
        } else if has("FADE") {
            Some(SparkField::Fade)
        } else {
            None
        };

        if let Some(field) = field {
            return Some(if value == 0.0 {
                SparkCommand::Randomize(field)
            } else {
                SparkCommand::Adjust(field, value)
            });
        }

        // Sway is a switch: a non-zero value asks for randomization, zero flips it.
        let command = if has("SWADE") || has("SWAY") {
            if value != 0.0 {
                SparkCommand::Randomize(SparkField::Sway)
            } else {
                SparkCommand::ToggleSway
            }
        } else if has("THRESHOLD") {
            SparkCommand::Threshold(value)
        } else if has("RESET") {
            SparkCommand::Reset
        } else if has("SPARK") {
            SparkCommand::ToggleEnabled
        } else {
            return None;
        };
        Some(command)
    }
}

/// Commands that need several bars to cooperate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecialCommand {
    ToggleRotation,
    RotationSpeed(f32),
    ToggleSmoothing,
    SmoothingFactor(f32),
    Reset,
}

impl SpecialCommand {
    pub fn parse(option: &str, value: f32) -> Option<Self> {
        let option = option.to_ascii_uppercase();
        let toggle = value == 0.0;
        if option.contains("ROTATION") {
            Some(if toggle {
                SpecialCommand::ToggleRotation
            } else {
                SpecialCommand::RotationSpeed(value)
            })
        } else if option.contains("SMOOTH") {
            Some(if toggle {
                SpecialCommand::ToggleSmoothing
            } else {
                SpecialCommand::SmoothingFactor(value)
            })
        } else if option.contains("RESET") {
            Some(SpecialCommand::Reset)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorCommand {
    SetColor(Rgba),
    ToggleCycle,
    CycleSpeed(f32),
    ToggleGlow,
    GlowIntensity(f32),
    GlowLength(f32),
    Reset,
}

impl ColorCommand {
    /// Numeric color options. `SetColor` carries a color and has no label form.
    pub fn parse(option: &str, value: f32) -> Option<Self> {
        let option = option.to_ascii_uppercase();
        let has = |key: &str| option.contains(key);
        let command = if has("CYCLE SPEED") {
            ColorCommand::CycleSpeed(value)
        } else if has("CYCLE") {
            ColorCommand::ToggleCycle
        } else if has("GLOW INTENSITY") {
            ColorCommand::GlowIntensity(value)
        } else if has("GLOW LENGTH") {
            ColorCommand::GlowLength(value)
        } else if has("GLOW") {
            ColorCommand::ToggleGlow
        } else if has("RESET") {
            ColorCommand::Reset
        } else {
            return None;
        };
        Some(command)
    }
}
