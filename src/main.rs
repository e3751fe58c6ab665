use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    style::{Color, Style},
    widgets::{Block, Borders, canvas::Canvas},
};
use std::{
    io,
    time::{Duration, Instant},
};
use tracing::info;

use sparkbars::{
    BarCommand, ColorCommand, Preset, SparkCommand, SpecialCommand, VisualizerConfig, Visualizer,
};

mod audio;
mod cli;
mod logging;
mod render;

use audio::AudioCapture;
use cli::Args;
use render::CanvasFrame;

/// Key bindings beyond quit, pause and cycling.
fn command_for(visualizer: &mut Visualizer, code: KeyCode) {
    use SpecialCommand::{RotationSpeed, SmoothingFactor};
    match code {
        KeyCode::Char('r') => visualizer.apply_special_command(SpecialCommand::ToggleRotation),
        KeyCode::Char('s') => visualizer.apply_special_command(SpecialCommand::ToggleSmoothing),
        KeyCode::Char('[') => visualizer.apply_special_command(SmoothingFactor(-0.1)),
        KeyCode::Char(']') => visualizer.apply_special_command(SmoothingFactor(0.1)),
        KeyCode::Char(',') => visualizer.apply_special_command(RotationSpeed(1.0)),
        KeyCode::Char('.') => visualizer.apply_special_command(RotationSpeed(-1.0)),
        KeyCode::Char('c') => visualizer.apply_color_command(ColorCommand::ToggleCycle),
        KeyCode::Char('g') => visualizer.apply_color_command(ColorCommand::ToggleGlow),
        KeyCode::Char('k') => visualizer.apply_spark_command(SparkCommand::ToggleEnabled),
        KeyCode::Char('w') => visualizer.apply_spark_command(SparkCommand::ToggleSway),
        KeyCode::Up => visualizer.apply_bar_command(BarCommand::MaxHeight(10.0)),
        KeyCode::Down => visualizer.apply_bar_command(BarCommand::MaxHeight(-10.0)),
        KeyCode::Right => visualizer.apply_bar_command(BarCommand::GrowSpeed(1.0)),
        KeyCode::Left => visualizer.apply_bar_command(BarCommand::GrowSpeed(-1.0)),
        KeyCode::Char('x') => {
            visualizer.apply_bar_command(BarCommand::ResetBars);
            visualizer.apply_bar_command(BarCommand::ResetCircle);
            visualizer.apply_special_command(SpecialCommand::Reset);
            visualizer.apply_color_command(ColorCommand::Reset);
            visualizer.apply_spark_command(SparkCommand::Reset);
        }
        _ => {}
    }
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    visualizer: &mut Visualizer,
    capture: &AudioCapture,
    mut preset: Preset,
) -> Result<()> {
    let mut paused = false;
    let mut last = Instant::now();

    loop {
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Tab | KeyCode::Char('n') => {
                            visualizer.change_visual_type(visualizer.visual_type().next());
                        }
                        KeyCode::Char('p') => {
                            preset = preset.next();
                            visualizer.apply_preset(preset)?;
                        }
                        KeyCode::Char(' ') => {
                            paused = !paused;
                            info!(paused, "playback toggled");
                        }
                        code => command_for(visualizer, code),
                    }
                }
            }
        }

        let now = Instant::now();
        let delta_time = if paused {
            0.0
        } else {
            now.duration_since(last).as_secs_f32()
        };
        last = now;

        let spectrum = capture.spectrum().unwrap_or_default();
        visualizer.frame(delta_time, &spectrum);

        terminal.draw(|f| {
            let area = f.area();
            let mut frame = CanvasFrame::new(visualizer.screen(), area);
            visualizer.render(&mut frame);

            let title = format!(
                " {} | {}{} ",
                visualizer.visual_type(),
                preset,
                if paused { " | PAUSED" } else { "" }
            );
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray)),
                )
                .background_color(Color::Black)
                .x_bounds(frame.x_bounds())
                .y_bounds(frame.y_bounds())
                .paint(|ctx| frame.paint(ctx));
            f.render_widget(canvas, area);
        })?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => VisualizerConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => VisualizerConfig::default(),
    };
    let _log_guard = logging::init(&config.log, args.log_file.as_deref())?;

    if let Some(visual_type) = args.visual_type() {
        config.visual_type = visual_type;
    }
    let mut visualizer = Visualizer::new(config).context("Invalid visualizer config")?;
    let preset = args.preset().unwrap_or(Preset::Default);
    visualizer.apply_preset(preset)?;

    // 1. Setup Audio Capture
    let capture = AudioCapture::start()?;

    // 2. Setup Terminal UI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 3. Main Render Loop
    let result = run(&mut terminal, &mut visualizer, &capture, preset);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    info!("shutting down");
    result
}
