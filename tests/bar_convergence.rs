use sparkbars::visualizers::{AudioBar, BarPlacement, BarSettings, Rgba, Screen, SparkProperties};

fn bar(settings: BarSettings) -> AudioBar {
    let placement = BarPlacement {
        x: 10.0,
        angle: 0.0,
        radius: 100.0,
        width: 8.0,
    };
    AudioBar::new(
        1000.0,
        placement,
        Screen::default(),
        settings,
        SparkProperties::default(),
    )
    .unwrap()
}

#[test]
fn sustained_max_decibel_reaches_max_height() {
    let mut bar = bar(BarSettings::default());
    for _ in 0..200 {
        bar.update(0.016, 0.0, Rgba::WHITE);
    }
    assert!((bar.height() - 200.0).abs() < 1e-3);
}

#[test]
fn sustained_min_decibel_returns_to_min_height() {
    let mut bar = bar(BarSettings::default());
    bar.set_height(200.0);
    for _ in 0..200 {
        bar.update(0.016, -80.0, Rgba::WHITE);
    }
    assert!((bar.height() - 1.0).abs() < 1e-3);
}

#[test]
fn attack_and_release_use_their_own_gain() {
    let settings = BarSettings {
        grow_speed: 10.0,
        shrink_speed: 1.0,
        ..BarSettings::default()
    };
    let mut bar = bar(settings);
    bar.update(0.01, 0.0, Rgba::WHITE);
    let rise = bar.height() - 1.0;
    bar.set_height(200.0);
    bar.update(0.01, -80.0, Rgba::WHITE);
    let fall = 200.0 - bar.height();
    assert!((rise / fall - 10.0).abs() < 1e-2);
}

#[test]
fn decibels_outside_range_stay_clamped() {
    let mut bar = bar(BarSettings::default());
    bar.update(0.5, 40.0, Rgba::WHITE);
    assert_eq!(bar.height(), 200.0);
    bar.update(0.5, -400.0, Rgba::WHITE);
    assert_eq!(bar.height(), 1.0);
}

#[test]
fn color_is_injected_each_frame() {
    let mut bar = bar(BarSettings::default());
    bar.update(0.016, -40.0, Rgba::rgb(0, 255, 0));
    assert_eq!(bar.color(), Rgba::rgb(0, 255, 0));
    bar.update(0.0, -40.0, Rgba::rgb(255, 0, 0));
    assert_eq!(bar.color(), Rgba::rgb(255, 0, 0));
}
