//! Unit tests for panel layout and the clock

use super::*;
use crate::config::HaloConfig;
use crate::toolkit::Toolkit;

fn config_with_launchers(count: usize) -> HaloConfig {
    let mut config = HaloConfig::default();
    for i in 0..count {
        config.launchers.push(crate::config::LauncherEntry {
            icon: Some(format!("/nonexistent/icon-{}.png", i)),
            path: Some(format!("/usr/bin/app-{}", i)),
        });
    }
    config
}

#[test]
fn test_default_launcher_substitution() {
    let mut toolkit = Toolkit::new();
    let panel = Panel::new(
        &mut toolkit,
        &HaloConfig::default(),
        PanelPosition::Top,
        ClockFormat::None,
    );

    assert_eq!(panel.launchers().len(), 1);
    assert_eq!(panel.launchers()[0].command(), DEFAULT_LAUNCHER_COMMAND);
}

#[test]
fn test_configured_launchers_keep_order() {
    let mut toolkit = Toolkit::new();
    let panel = Panel::new(
        &mut toolkit,
        &config_with_launchers(3),
        PanelPosition::Top,
        ClockFormat::None,
    );

    let commands: Vec<&str> = panel.launchers().iter().map(|l| l.command()).collect();
    assert_eq!(commands, vec!["/usr/bin/app-0", "/usr/bin/app-1", "/usr/bin/app-2"]);
}

#[test]
fn test_horizontal_layout_packs_left_to_right() {
    let mut toolkit = Toolkit::new();
    let mut panel = Panel::new(
        &mut toolkit,
        &config_with_launchers(3),
        PanelPosition::Top,
        ClockFormat::Minutes,
    );

    panel.layout(1920, 32);
    let allocs: Vec<Allocation> = panel.launchers().iter().map(|l| l.allocation()).collect();

    // Icon side is the bar thickness; half-spacing pad before the first only
    assert_eq!(allocs[0].x, 0);
    assert_eq!(allocs[0].width, 32 + 5 + 1);
    assert_eq!(allocs[1].x, 37);
    assert_eq!(allocs[1].width, 33);
    assert_eq!(allocs[2].x, 37 + 32);
    assert!(allocs.iter().all(|a| a.y == 0));

    // Minute clock reserves 150 at the right edge
    let clock = panel.clock_allocation().unwrap();
    assert_eq!(clock.x, 1920 - 150);
    assert_eq!(clock.width, 151);
    assert_eq!(clock.height, 33);
}

#[test]
fn test_vertical_layout_packs_top_to_bottom() {
    let mut toolkit = Toolkit::new();
    let mut panel = Panel::new(
        &mut toolkit,
        &config_with_launchers(2),
        PanelPosition::Left,
        ClockFormat::Seconds,
    );

    panel.layout(170, 1080);
    let allocs: Vec<Allocation> = panel.launchers().iter().map(|l| l.allocation()).collect();

    assert_eq!(allocs[0].y, 0);
    assert_eq!(allocs[0].height, 170 + 5 + 1);
    assert_eq!(allocs[1].y, 175);
    assert!(allocs.iter().all(|a| a.x == 0));

    // Vertical clock strip sits at the bottom, three spacing units tall
    let clock = panel.clock_allocation().unwrap();
    assert_eq!(clock.y, 1080 - 30);
    assert_eq!(clock.height, 31);
    assert_eq!(clock.width, 171);
}

#[test]
fn test_no_clock_allocation_without_clock() {
    let mut toolkit = Toolkit::new();
    let mut panel = Panel::new(
        &mut toolkit,
        &config_with_launchers(1),
        PanelPosition::Top,
        ClockFormat::None,
    );
    panel.layout(1280, 32);
    assert!(panel.clock().is_none());
    assert!(panel.clock_allocation().is_none());
}

#[test]
fn test_clock_format_strings_and_refresh() {
    let cases = [
        (ClockFormat::Iso, "%Y-%m-%dT%H:%M:%S", 1),
        (ClockFormat::Minutes, "%a %b %d, %I:%M %p", 60),
        (ClockFormat::Seconds, "%a %b %d, %I:%M:%S %p", 1),
        (ClockFormat::Minutes24h, "%a %b %d, %H:%M", 60),
        (ClockFormat::Seconds24h, "%a %b %d, %H:%M:%S", 1),
    ];
    for (format, expected_string, expected_secs) in cases {
        let clock = PanelClock::new(format).unwrap();
        assert_eq!(clock.format_string(), expected_string);
        assert_eq!(clock.refresh_interval().as_secs(), expected_secs);
    }

    assert!(PanelClock::new(ClockFormat::None).is_none());
}

#[test]
fn test_clock_deadline_is_within_one_interval() {
    let clock = PanelClock::new(ClockFormat::Seconds).unwrap();
    let delay = clock.deadline().saturating_duration_since(std::time::Instant::now());
    // Next tick is at most one second plus the 10 ms grace away
    assert!(delay <= Duration::from_millis(1020));
}

#[test]
fn test_pointer_focus_tracking() {
    let mut toolkit = Toolkit::new();
    let mut panel = Panel::new(
        &mut toolkit,
        &config_with_launchers(2),
        PanelPosition::Top,
        ClockFormat::None,
    );
    panel.layout(1920, 32);

    assert!(panel.pointer_motion(10.0, 10.0));
    assert!(panel.launchers()[0].is_focused());
    assert!(!panel.launchers()[1].is_focused());

    // Moving within the same launcher changes nothing
    assert!(!panel.pointer_motion(12.0, 10.0));

    assert!(panel.pointer_motion(40.0, 10.0));
    assert!(!panel.launchers()[0].is_focused());
    assert!(panel.launchers()[1].is_focused());

    assert!(panel.pointer_leave());
    assert!(!panel.launchers()[1].is_focused());
}

#[test]
fn test_button_release_activates_launcher() {
    let mut toolkit = Toolkit::new();
    let mut panel = Panel::new(
        &mut toolkit,
        &config_with_launchers(1),
        PanelPosition::Top,
        ClockFormat::None,
    );
    panel.layout(1920, 32);

    assert!(panel
        .pointer_button(10.0, 10.0, PointerButton::Left, ButtonState::Pressed)
        .is_none());
    let spec = panel
        .pointer_button(10.0, 10.0, PointerButton::Left, ButtonState::Released)
        .unwrap();
    assert_eq!(spec.argv, vec!["/usr/bin/app-0"]);

    // Off-panel release does nothing
    assert!(panel
        .pointer_button(1000.0, 10.0, PointerButton::Left, ButtonState::Released)
        .is_none());
}

#[test]
fn test_touch_up_activates_launcher() {
    let mut toolkit = Toolkit::new();
    let mut panel = Panel::new(
        &mut toolkit,
        &config_with_launchers(1),
        PanelPosition::Top,
        ClockFormat::None,
    );
    panel.layout(1920, 32);

    panel.touch_down(10.0, 10.0);
    assert!(panel.launchers()[0].is_focused());

    let spec = panel.touch_up(10.0, 10.0).unwrap();
    assert_eq!(spec.argv, vec!["/usr/bin/app-0"]);
    assert!(!panel.launchers()[0].is_focused());
}
