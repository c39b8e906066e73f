//! Panel surface: launcher row and optional clock
//!
//! Each initialized output owns at most one panel. The panel captures the
//! global panel-position and clock-format policy at creation time; policy
//! changes never retroactively affect an existing panel. Sizing is driven
//! by compositor configure events (handled in [`crate::desktop`]); this
//! module owns the widget layout inside the negotiated size.

use std::time::{Duration, Instant};

use log::debug;
use tiny_skia::Pixmap;

use crate::config::{ClockFormat, HaloConfig};
use crate::launcher::{self, ExecSpec};
use crate::render::{self, IconDraw};
use crate::shell::PanelPosition;
use crate::toolkit::{Allocation, ButtonState, PointerButton, SurfaceId, Toolkit};

/// Spacing unit for widget layout
pub const DEFAULT_SPACING: u32 = 10;

/// Bar thickness forced for top/bottom panels
pub const PANEL_HEIGHT: u32 = 32;

/// Fallback launcher when the configuration defines none
pub const DEFAULT_LAUNCHER_ICON: &str = "/usr/share/halo-shell/terminal.png";
pub const DEFAULT_LAUNCHER_COMMAND: &str = "/usr/bin/foot";

/// A launcher icon on the panel
pub struct Launcher {
    icon: Pixmap,
    command: String,
    exec: ExecSpec,
    focused: bool,
    pressed: bool,
    alloc: Allocation,
}

impl Launcher {
    fn new(icon_path: &str, command: &str) -> Self {
        Self {
            icon: render::load_icon_or_fallback(icon_path),
            command: command.to_string(),
            exec: launcher::build_exec(command, &launcher::inherited_env()),
            focused: false,
            pressed: false,
            alloc: Allocation::default(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn exec(&self) -> &ExecSpec {
        &self.exec
    }

    pub fn allocation(&self) -> Allocation {
        self.alloc
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }
}

/// The panel clock; refresh cadence is derived once from the format
pub struct PanelClock {
    format_string: &'static str,
    refresh: Duration,
    deadline: Instant,
}

impl PanelClock {
    /// Returns `None` for [`ClockFormat::None`]
    pub fn new(format: ClockFormat) -> Option<Self> {
        let (format_string, refresh_secs) = match format {
            ClockFormat::Iso => ("%Y-%m-%dT%H:%M:%S", 1),
            ClockFormat::Minutes => ("%a %b %d, %I:%M %p", 60),
            ClockFormat::Seconds => ("%a %b %d, %I:%M:%S %p", 1),
            ClockFormat::Minutes24h => ("%a %b %d, %H:%M", 60),
            ClockFormat::Seconds24h => ("%a %b %d, %H:%M:%S", 1),
            ClockFormat::None => return None,
        };
        let mut clock = Self {
            format_string,
            refresh: Duration::from_secs(refresh_secs),
            deadline: Instant::now(),
        };
        clock.reset();
        Some(clock)
    }

    /// Arm the timer for the next interval boundary, 10 ms late so the
    /// displayed digit has actually changed when the redraw runs
    pub fn reset(&mut self) {
        let now = chrono::Local::now();
        let refresh_ns = self.refresh.as_nanos() as u64;
        let into_ns = (now.timestamp().rem_euclid(self.refresh.as_secs() as i64) as u64)
            * 1_000_000_000
            + now.timestamp_subsec_nanos() as u64;
        let delay = Duration::from_nanos(refresh_ns.saturating_sub(into_ns))
            + Duration::from_millis(10);
        self.deadline = Instant::now() + delay;
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn format_string(&self) -> &'static str {
        self.format_string
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh
    }

    /// Current clock text
    pub fn format_now(&self) -> String {
        chrono::Local::now().format(self.format_string).to_string()
    }
}

/// A taskbar strip owned by one output
pub struct Panel {
    surface: SurfaceId,
    launchers: Vec<Launcher>,
    clock: Option<PanelClock>,
    clock_alloc: Option<Allocation>,
    painted: bool,
    color: u32,
    position: PanelPosition,
    clock_format: ClockFormat,
}

impl Panel {
    /// Create the panel surface and populate launchers from configuration;
    /// a single default terminal launcher substitutes when none are defined
    pub fn new(
        toolkit: &mut Toolkit,
        config: &HaloConfig,
        position: PanelPosition,
        clock_format: ClockFormat,
    ) -> Self {
        let surface = toolkit.create_surface("panel");

        let mut launchers: Vec<Launcher> = config
            .valid_launchers()
            .iter()
            .map(|(icon, path)| Launcher::new(icon, path))
            .collect();
        if launchers.is_empty() {
            // Add default launcher
            launchers.push(Launcher::new(
                DEFAULT_LAUNCHER_ICON,
                DEFAULT_LAUNCHER_COMMAND,
            ));
        }

        Self {
            surface,
            launchers,
            clock: PanelClock::new(clock_format),
            clock_alloc: None,
            painted: false,
            color: config.panel_color(),
            position,
            clock_format,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn painted(&self) -> bool {
        self.painted
    }

    pub fn set_painted(&mut self) {
        self.painted = true;
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn position(&self) -> PanelPosition {
        self.position
    }

    pub fn clock_format(&self) -> ClockFormat {
        self.clock_format
    }

    pub fn clock(&self) -> Option<&PanelClock> {
        self.clock.as_ref()
    }

    pub fn clock_mut(&mut self) -> Option<&mut PanelClock> {
        self.clock.as_mut()
    }

    pub fn launchers(&self) -> &[Launcher] {
        &self.launchers
    }

    pub fn clock_allocation(&self) -> Option<Allocation> {
        self.clock_alloc
    }

    /// Lay widgets out inside the applied size: square icons packed along
    /// the long axis with a half-spacing pad before the first one, and the
    /// clock region reserved at the far end.
    pub fn layout(&mut self, width: u32, height: u32) {
        let side = width.min(height);
        let horizontal = self.position.is_horizontal();
        let mut first_pad_w = if horizontal { DEFAULT_SPACING / 2 } else { 0 };
        let mut first_pad_h = if horizontal { 0 } else { DEFAULT_SPACING / 2 };
        let mut x: i32 = 0;
        let mut y: i32 = 0;

        for launcher in &mut self.launchers {
            launcher.alloc =
                Allocation::new(x, y, side + first_pad_w + 1, side + first_pad_h + 1);
            if horizontal {
                x += (side + first_pad_w) as i32;
            } else {
                y += (side + first_pad_h) as i32;
            }
            first_pad_w = 0;
            first_pad_h = 0;
        }

        let clock_w = if self.clock_format == ClockFormat::Seconds {
            170
        } else {
            // Minute formats and the 24h variants
            150
        };
        let mut clock_h = side;
        if horizontal {
            x = width as i32 - clock_w as i32;
        } else {
            clock_h = DEFAULT_SPACING * 3;
            y = height as i32 - clock_h as i32;
        }

        if self.clock.is_some() {
            self.clock_alloc = Some(Allocation::new(x, y, clock_w + 1, clock_h + 1));
        }

        debug!(
            "panel {} laid out {}x{} with {} launcher(s)",
            self.surface,
            width,
            height,
            self.launchers.len()
        );
    }

    /// Launcher under the pointer, if any
    pub fn launcher_at(&self, x: f64, y: f64) -> Option<usize> {
        self.launchers
            .iter()
            .position(|l| l.alloc.contains(x, y))
    }

    /// Pointer motion/enter over the panel; true when focus changed
    pub fn pointer_motion(&mut self, x: f64, y: f64) -> bool {
        let hovered = self.launcher_at(x, y);
        let mut changed = false;
        for (i, launcher) in self.launchers.iter_mut().enumerate() {
            let focus = hovered == Some(i);
            if launcher.focused != focus {
                launcher.focused = focus;
                changed = true;
            }
        }
        changed
    }

    /// Pointer left the panel; true when focus changed
    pub fn pointer_leave(&mut self) -> bool {
        let mut changed = false;
        for launcher in &mut self.launchers {
            if launcher.focused || launcher.pressed {
                launcher.focused = false;
                launcher.pressed = false;
                changed = true;
            }
        }
        changed
    }

    /// Pointer button over the panel; returns the exec spec to activate
    /// on a left-button release over a launcher
    pub fn pointer_button(
        &mut self,
        x: f64,
        y: f64,
        button: PointerButton,
        state: ButtonState,
    ) -> Option<ExecSpec> {
        let index = self.launcher_at(x, y)?;
        let launcher = &mut self.launchers[index];
        match state {
            ButtonState::Pressed => {
                launcher.pressed = true;
                None
            }
            ButtonState::Released => {
                launcher.pressed = false;
                if button == PointerButton::Left {
                    Some(launcher.exec.clone())
                } else {
                    None
                }
            }
        }
    }

    /// Touch down on the panel; focuses the touched launcher
    pub fn touch_down(&mut self, x: f64, y: f64) {
        if let Some(index) = self.launcher_at(x, y) {
            self.launchers[index].focused = true;
        }
    }

    /// Touch up on the panel; returns the exec spec to activate
    pub fn touch_up(&mut self, x: f64, y: f64) -> Option<ExecSpec> {
        let index = self.launcher_at(x, y)?;
        let launcher = &mut self.launchers[index];
        launcher.focused = false;
        Some(launcher.exec.clone())
    }

    /// Paint the panel into a pixmap of the applied size
    pub fn draw(&self, width: u32, height: u32) -> Option<Pixmap> {
        if let Some(clock) = &self.clock {
            log::trace!("clock text: {}", clock.format_now());
        }
        let icons: Vec<IconDraw> = self
            .launchers
            .iter()
            .map(|l| IconDraw {
                icon: &l.icon,
                alloc: l.alloc,
                focused: l.focused,
                pressed: l.pressed,
            })
            .collect();
        render::paint_panel(width, height, self.color, &icons)
    }

    /// Release the panel's toolkit resources
    pub fn destroy(self, toolkit: &mut Toolkit) {
        toolkit.destroy_surface(self.surface);
    }
}

#[cfg(test)]
mod tests;
