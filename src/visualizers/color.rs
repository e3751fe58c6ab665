use serde::{Deserialize, Serialize};

/// 8-bit RGBA color used for bars, glow and sparks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// True when every color channel is zero. Alpha is not considered.
    pub fn is_black(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    /// Subtracts `amount` from each color channel, flooring at zero and rounding up.
    pub fn darken(self, amount: f32) -> Self {
        let channel = |c: u8| (c as f32 - amount).max(0.0).ceil().min(255.0) as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            a: self.a,
        }
    }

    /// Multiplies each color channel by `rate`, rounding up.
    pub fn scale(self, rate: f32) -> Self {
        let channel = |c: u8| (c as f32 * rate).ceil().clamp(0.0, 255.0) as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            a: self.a,
        }
    }

    /// Fully saturated, full value color for a hue given in turns (`0.0..1.0`).
    pub fn from_hue(hue: f32) -> Self {
        let h = hue.rem_euclid(1.0) * 6.0;
        let x = 1.0 - ((h % 2.0) - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        let to_u8 = |v: f32| (v * 255.0).round() as u8;
        Rgba::rgb(to_u8(r), to_u8(g), to_u8(b))
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// Ensemble-wide hue clock. Advances with playback time, so it stops while paused.
#[derive(Debug, Clone, PartialEq)]
pub struct HueCycle {
    pub enabled: bool,
    speed: f32,
    hue: f32,
}

impl HueCycle {
    pub fn new(enabled: bool, speed: f32) -> Self {
        Self {
            enabled,
            speed: speed.max(0.0),
            hue: 0.0,
        }
    }

    /// Turns per second.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn advance(&mut self, delta_time: f32) {
        if self.enabled {
            self.hue = (self.hue + self.speed * delta_time).rem_euclid(1.0);
        }
    }

    pub fn adjust_speed(&mut self, delta: f32) {
        self.set_speed(self.speed + delta);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    pub fn color(&self) -> Rgba {
        Rgba::from_hue(self.hue)
    }
}

/// Base color plus the hue clock that overrides it while cycling.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub base: Rgba,
    pub cycle: HueCycle,
}

impl Palette {
    pub fn new(base: Rgba, cycle: HueCycle) -> Self {
        Self { base, cycle }
    }

    /// Color every bar receives for the current frame.
    pub fn current(&self) -> Rgba {
        if self.cycle.enabled {
            self.cycle.color()
        } else {
            self.base
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowSettings {
    pub enabled: bool,
    pub intensity: f32,
    pub length: f32,
}

impl GlowSettings {
    pub const MIN: f32 = 0.05;
    pub const MAX: f32 = 1.0;

    pub fn adjust_intensity(&mut self, delta: f32) {
        self.intensity = (self.intensity + delta).clamp(Self::MIN, Self::MAX);
    }

    pub fn adjust_length(&mut self, delta: f32) {
        self.length = (self.length + delta).clamp(Self::MIN, Self::MAX);
    }

    pub fn clamp_ranges(&mut self) {
        self.adjust_intensity(0.0);
        self.adjust_length(0.0);
    }
}

impl Default for GlowSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            intensity: 0.5,
            length: 0.2,
        }
    }
}
