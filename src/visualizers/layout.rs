//! Geometry of every visual type.
//!
//! Height dynamics never look at the visual type. Everything variant-specific about
//! where a bar, its glow, its ring and its sparks end up on screen is answered here,
//! from one [`Anchor`] per variant.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RenderTarget;
use super::color::{GlowSettings, Rgba};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisualType {
    /// Bars rise from the bottom edge.
    #[default]
    Bottom,
    /// Bars hang from the top edge.
    Top,
    /// Bars grow both ways from the horizontal center line.
    Middle,
    /// Spokes pointing outward from a ring.
    Circle,
    /// Spokes pointing inward from a wider ring.
    CircleInner,
    /// Spokes centered on a wider ring.
    CircleMiddle,
}

impl VisualType {
    pub const ALL: [VisualType; 6] = [
        VisualType::Bottom,
        VisualType::Top,
        VisualType::Middle,
        VisualType::Circle,
        VisualType::CircleInner,
        VisualType::CircleMiddle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VisualType::Bottom => "BOTTOM",
            VisualType::Top => "TOP",
            VisualType::Middle => "MIDDLE",
            VisualType::Circle => "CIRCLE",
            VisualType::CircleInner => "CIRCLE_INNER",
            VisualType::CircleMiddle => "CIRCLE_MIDDLE",
        }
    }

    /// Accepts `CIRCLE_INNER`, `circle-inner` and menu spellings like `INNER CIRCLE`.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .to_ascii_uppercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "BOTTOM" => Some(VisualType::Bottom),
            "TOP" => Some(VisualType::Top),
            "MIDDLE" => Some(VisualType::Middle),
            "CIRCLE" => Some(VisualType::Circle),
            "CIRCLE_INNER" | "INNER_CIRCLE" => Some(VisualType::CircleInner),
            "CIRCLE_MIDDLE" | "MIDDLE_CIRCLE" => Some(VisualType::CircleMiddle),
            _ => None,
        }
    }

    pub fn is_radial(self) -> bool {
        matches!(
            self,
            VisualType::Circle | VisualType::CircleInner | VisualType::CircleMiddle
        )
    }

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Radius multiplier for variants drawn on the wider ring.
    fn radius_scale(self) -> f32 {
        match self {
            VisualType::CircleInner | VisualType::CircleMiddle => 1.5,
            _ => 1.0,
        }
    }
}

impl fmt::Display for VisualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Drawing area in screen coordinates, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Screen {
    pub width: f32,
    pub height: f32,
}

impl Screen {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Inclusive bounds check.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Per-bar geometry inputs. `x` drives linear layouts, `angle` and `radius` radial ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarPlacement {
    pub x: f32,
    pub angle: f32,
    pub radius: f32,
    pub width: f32,
}

/// How a bar of a given height extends from its base point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub base: Vec2,
    /// Unit vector pointing the way the bar grows.
    pub direction: Vec2,
    /// Bar is centered on `base` instead of starting there.
    pub centered: bool,
    /// Both ends are growing ends (glow and sparks may leave either one).
    pub mirrored: bool,
}

impl Anchor {
    /// Start and end points of a bar with the given length.
    pub fn span(&self, length: f32) -> (Vec2, Vec2) {
        if self.centered {
            let half = self.direction * (length / 2.0);
            (self.base - half, self.base + half)
        } else {
            (self.base, self.base + self.direction * length)
        }
    }
}

pub fn anchor(visual_type: VisualType, placement: &BarPlacement, screen: &Screen) -> Anchor {
    let column = placement.x + placement.width / 2.0;
    let spoke = Vec2::from_angle(placement.angle);
    let ring = screen.center() + spoke * placement.radius * visual_type.radius_scale();
    let (base, direction) = match visual_type {
        VisualType::Bottom => (Vec2::new(column, screen.height), Vec2::NEG_Y),
        VisualType::Top => (Vec2::new(column, 0.0), Vec2::Y),
        VisualType::Middle => (Vec2::new(column, screen.height / 2.0), Vec2::NEG_Y),
        VisualType::Circle | VisualType::CircleMiddle => (ring, spoke),
        VisualType::CircleInner => (ring, -spoke),
    };
    Anchor {
        base,
        direction,
        centered: matches!(visual_type, VisualType::Middle | VisualType::CircleMiddle),
        mirrored: visual_type == VisualType::Middle,
    }
}

/// Drawable form of a bar or one of its glow pieces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarShape {
    Rect { origin: Vec2, size: Vec2 },
    Segment { start: Vec2, end: Vec2, width: f32 },
}

impl BarShape {
    pub fn draw(&self, target: &mut dyn RenderTarget, color: Rgba) {
        match *self {
            BarShape::Rect { origin, size } => target.fill_rect(origin, size, color),
            BarShape::Segment { start, end, width } => target.line(start, end, width, color),
        }
    }
}

fn linear_rect(from: Vec2, to: Vec2, width: f32) -> BarShape {
    BarShape::Rect {
        origin: Vec2::new(from.x.min(to.x) - width / 2.0, from.y.min(to.y)),
        size: Vec2::new(width, (to.y - from.y).abs()),
    }
}

pub fn bar_shape(
    visual_type: VisualType,
    placement: &BarPlacement,
    height: f32,
    screen: &Screen,
) -> BarShape {
    let (start, end) = anchor(visual_type, placement, screen).span(height);
    match visual_type {
        VisualType::CircleInner => BarShape::Segment {
            start,
            end,
            width: placement.width * 0.85,
        },
        v if v.is_radial() => BarShape::Segment {
            start,
            end,
            width: placement.width,
        },
        _ => linear_rect(start, end, placement.width),
    }
}

/// Four glow pieces stacked beyond every growing end of the bar.
///
/// Linear bars keep their color and lose alpha (starting at 32) by `intensity` per piece;
/// radial bars stay opaque and lose brightness by `intensity` per piece.
pub fn glow_shapes(
    visual_type: VisualType,
    placement: &BarPlacement,
    height: f32,
    screen: &Screen,
    color: Rgba,
    glow: &GlowSettings,
) -> Vec<(BarShape, Rgba)> {
    const PIECES: usize = 4;
    let anchor = anchor(visual_type, placement, screen);
    let (start, end) = anchor.span(height);
    let piece = height * glow.length;
    let width = match bar_shape(visual_type, placement, height, screen) {
        BarShape::Segment { width, .. } => width,
        BarShape::Rect { size, .. } => size.x,
    };

    let mut ends = vec![(end, anchor.direction)];
    if anchor.mirrored {
        ends.push((start, -anchor.direction));
    }

    let mut shapes = Vec::with_capacity(PIECES * ends.len());
    for (tip, direction) in ends {
        let mut alpha = 32.0_f32;
        let mut shade = color;
        for i in 0..PIECES {
            let from = tip + direction * piece * i as f32;
            let to = from + direction * piece;
            if visual_type.is_radial() {
                shade = shade.scale(glow.intensity);
                shapes.push((BarShape::Segment { start: from, end: to, width }, shade));
            } else {
                shapes.push((
                    linear_rect(from, to, width),
                    color.with_alpha(alpha.ceil() as u8),
                ));
                alpha *= glow.intensity;
            }
        }
    }
    shapes
}

/// Spawn point and velocity for a spark leaving the bar's growing end.
///
/// `flip` picks the opposite end for mirrored layouts and is ignored otherwise.
pub fn spark_origin(
    visual_type: VisualType,
    placement: &BarPlacement,
    height: f32,
    screen: &Screen,
    speed: f32,
    flip: bool,
) -> (Vec2, Vec2) {
    let anchor = anchor(visual_type, placement, screen);
    let (start, end) = anchor.span(height);
    if anchor.mirrored && flip {
        (start, -anchor.direction * speed)
    } else {
        (end, anchor.direction * speed)
    }
}

/// Ring drawn behind radial layouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub radius: f32,
    /// Inner hole as a fraction of the radius.
    pub size: f32,
    original_radius: f32,
}

impl Ring {
    pub const DEFAULT_SIZE: f32 = 0.99;

    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            size: Self::DEFAULT_SIZE,
            original_radius: radius,
        }
    }

    pub fn adjust_radius(&mut self, delta: f32) {
        self.radius = (self.radius + delta).max(0.0);
    }

    pub fn adjust_size(&mut self, delta: f32) {
        self.size = (self.size + delta).clamp(0.0, 1.0);
    }

    pub fn reset(&mut self) {
        self.radius = self.original_radius;
        self.size = Self::DEFAULT_SIZE;
    }

    pub fn draw(
        &self,
        target: &mut dyn RenderTarget,
        visual_type: VisualType,
        screen: &Screen,
        color: Rgba,
    ) {
        if !visual_type.is_radial() {
            return;
        }
        let radius = self.radius * visual_type.radius_scale();
        target.fill_circle(screen.center(), radius, color);
        target.fill_circle(screen.center(), radius * self.size, Rgba::BLACK);
    }
}
