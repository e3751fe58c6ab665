use glam::Vec2;
use sparkbars::visualizers::{RenderTarget, Rgba, VisualType, Visualizer};
use sparkbars::{FrequencyRange, VisualizerConfig};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Rect(Vec2, Vec2, Rgba),
    Line(Vec2, Vec2, f32, Rgba),
    Circle(Vec2, f32, Rgba),
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl RenderTarget for Recorder {
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgba) {
        self.calls.push(Call::Rect(origin, size, color));
    }

    fn line(&mut self, start: Vec2, end: Vec2, width: f32, color: Rgba) {
        self.calls.push(Call::Line(start, end, width, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.calls.push(Call::Circle(center, radius, color));
    }
}

fn visualizer(visual_type: VisualType) -> Visualizer {
    let config = VisualizerConfig {
        frequencies: FrequencyRange {
            start: 100.0,
            end: 900.0,
            step: 100.0,
        },
        visual_type,
        ..VisualizerConfig::default()
    };
    Visualizer::new(config).unwrap()
}

fn record(visualizer: &Visualizer) -> Vec<Call> {
    let mut recorder = Recorder::default();
    visualizer.render(&mut recorder);
    recorder.calls
}

#[test]
fn rendering_twice_draws_the_same_frame() {
    for visual_type in VisualType::ALL {
        let mut visualizer = visualizer(visual_type);
        visualizer.apply_color_command(sparkbars::ColorCommand::ToggleGlow);
        for _ in 0..3 {
            visualizer.frame(0.02, &|f: f32| -f / 20.0);
        }
        let heights: Vec<f32> = visualizer.bars().iter().map(|b| b.height()).collect();

        let first = record(&visualizer);
        let second = record(&visualizer);
        assert!(!first.is_empty());
        assert_eq!(first, second, "{visual_type}");
        let after: Vec<f32> = visualizer.bars().iter().map(|b| b.height()).collect();
        assert_eq!(heights, after);
    }
}

#[test]
fn radial_layouts_draw_the_ring_first() {
    let visualizer = visualizer(VisualType::Circle);
    let calls = record(&visualizer);
    let center = visualizer.screen().center();
    let radius = visualizer.ring().radius;
    assert_eq!(calls[0], Call::Circle(center, radius, Rgba::WHITE));
    assert_eq!(
        calls[1],
        Call::Circle(center, radius * visualizer.ring().size, Rgba::BLACK)
    );
    assert!(matches!(calls[2], Call::Line(..)));
}

#[test]
fn bottom_bars_are_rects_resting_on_the_floor() {
    let visualizer = visualizer(VisualType::Bottom);
    let calls = record(&visualizer);
    assert_eq!(calls.len(), visualizer.bars().len());
    let screen = visualizer.screen();
    for call in calls {
        let Call::Rect(origin, size, _) = call else {
            panic!("expected a rect, got {call:?}");
        };
        assert!((origin.y + size.y - screen.height).abs() < 1e-3);
        assert!((size.y - 1.0).abs() < 1e-3);
    }
}
