//! Terminal rendering through the ratatui canvas.
//!
//! The canvas only draws outlines, so filled shapes are rasterized into line strokes
//! spaced one braille dot apart. Canvas y grows upward and is flipped here.

use glam::Vec2;
use ratatui::{
    layout::Rect,
    style::Color,
    widgets::canvas::{Context, Line},
};

use sparkbars::{RenderTarget, Rgba, Screen};

/// Upper bound on strokes per shape so a degenerate dot size cannot stall a frame.
const MAX_STROKES: usize = 512;

/// Collects one frame's strokes, then paints them into a canvas context.
pub struct CanvasFrame {
    screen: Screen,
    /// Screen units covered by one braille dot.
    dot: Vec2,
    lines: Vec<Line>,
}

impl CanvasFrame {
    /// `area` is the terminal region the canvas occupies (each cell holds 2x4 dots).
    pub fn new(screen: Screen, area: Rect) -> Self {
        let dots = Vec2::new(
            f32::from(area.width.max(1)) * 2.0,
            f32::from(area.height.max(1)) * 4.0,
        );
        Self {
            screen,
            dot: Vec2::new(screen.width, screen.height) / dots,
            lines: Vec::new(),
        }
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        [0.0, f64::from(self.screen.width)]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        [0.0, f64::from(self.screen.height)]
    }

    pub fn paint(&self, ctx: &mut Context) {
        for line in &self.lines {
            ctx.draw(line);
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    fn stroke(&mut self, start: Vec2, end: Vec2, color: Color) {
        let flip = |y: f32| f64::from(self.screen.height - y);
        self.lines.push(Line {
            x1: f64::from(start.x),
            y1: flip(start.y),
            x2: f64::from(end.x),
            y2: flip(end.y),
            color,
        });
    }
}

fn strokes(extent: f32, spacing: f32) -> usize {
    if !(extent > 0.0) || !(spacing > 0.0) {
        return 1;
    }
    ((extent / spacing).ceil() as usize).clamp(1, MAX_STROKES)
}

/// Terminal color with alpha folded in against the black background. `None` if invisible.
pub fn terminal_color(color: Rgba) -> Option<Color> {
    if color.a == 0 {
        return None;
    }
    let alpha = u16::from(color.a);
    let mix = |c: u8| ((u16::from(c) * alpha + 127) / 255) as u8;
    Some(Color::Rgb(mix(color.r), mix(color.g), mix(color.b)))
}

impl RenderTarget for CanvasFrame {
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) {
        let Some(color) = terminal_color(color) else {
            return;
        };
        let min = origin.min(origin + size);
        let size = size.abs();
        let n = strokes(size.x, self.dot.x);
        for i in 0..n {
            let x = min.x + size.x * (i as f32 + 0.5) / n as f32;
            self.stroke(Vec2::new(x, min.y), Vec2::new(x, min.y + size.y), color);
        }
    }

    fn line(&mut self, start: Vec2, end: Vec2, width: f32, color: Rgba) {
        let Some(color) = terminal_color(color) else {
            return;
        };
        let normal = (end - start).perp().normalize_or_zero();
        let spacing = self.dot.min_element();
        let n = strokes(width, spacing);
        for i in 0..n {
            let offset = if n == 1 {
                0.0
            } else {
                width * (i as f32 / (n - 1) as f32 - 0.5)
            };
            self.stroke(start + normal * offset, end + normal * offset, color);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let Some(color) = terminal_color(color) else {
            return;
        };
        if !(radius > 0.0) {
            return;
        }
        let n = strokes(radius * 2.0, self.dot.y);
        for i in 0..n {
            let dy = radius * (2.0 * (i as f32 + 0.5) / n as f32 - 1.0);
            let half = (radius * radius - dy * dy).max(0.0).sqrt();
            self.stroke(
                Vec2::new(center.x - half, center.y + dy),
                Vec2::new(center.x + half, center.y + dy),
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> CanvasFrame {
        // 100x100 screen on 50x25 cells: one dot is 1x1 screen unit.
        CanvasFrame::new(Screen::new(100.0, 100.0), Rect::new(0, 0, 50, 25))
    }

    #[test]
    fn alpha_is_premultiplied() {
        assert_eq!(terminal_color(Rgba::WHITE), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(
            terminal_color(Rgba::rgb(200, 100, 0).with_alpha(128)),
            Some(Color::Rgb(100, 50, 0))
        );
        assert_eq!(terminal_color(Rgba::WHITE.with_alpha(0)), None);
    }

    #[test]
    fn rect_becomes_vertical_strokes_with_flipped_y() {
        let mut frame = frame();
        frame.fill_rect(Vec2::new(10.0, 80.0), Vec2::new(4.0, 20.0), Rgba::WHITE);
        assert_eq!(frame.lines().len(), 4);
        let first = &frame.lines()[0];
        assert_eq!(first.x1, 10.5);
        assert_eq!(first.y1, 20.0);
        assert_eq!(first.y2, 0.0);
    }

    #[test]
    fn transparent_shapes_are_skipped() {
        let mut frame = frame();
        frame.fill_circle(Vec2::splat(50.0), 10.0, Rgba::BLACK.with_alpha(0));
        frame.line(Vec2::ZERO, Vec2::ONE, 1.0, Rgba::WHITE.with_alpha(0));
        assert!(frame.lines().is_empty());
    }

    #[test]
    fn circle_rows_stay_inside_radius() {
        let mut frame = frame();
        frame.fill_circle(Vec2::splat(50.0), 5.0, Rgba::WHITE);
        assert_eq!(frame.lines().len(), 10);
        for line in frame.lines() {
            assert!(line.x1 >= 45.0 && line.x2 <= 55.0);
        }
    }

    #[test]
    fn wide_segments_get_parallel_strokes() {
        let mut frame = frame();
        frame.line(Vec2::new(0.0, 50.0), Vec2::new(10.0, 50.0), 3.0, Rgba::WHITE);
        let ys: Vec<f64> = frame.lines().iter().map(|l| l.y1).collect();
        assert_eq!(ys, vec![51.5, 50.0, 48.5]);
    }
}
