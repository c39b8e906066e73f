//! Compositor shell protocol interface
//!
//! The wire transport is an external collaborator; the engine talks to the
//! compositor exclusively through the [`CompositorShell`] trait (outgoing
//! requests) and the [`ShellEvent`] enum (incoming events). A live session
//! plugs its protocol pump into these two seams; the simulated compositor
//! in [`crate::sim`] implements the same pair for the demo mode and tests.

use crate::toolkit::SurfaceId;

/// Panel anchoring edge, declared to the compositor at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPosition {
    Top,
    Bottom,
    Left,
    Right,
}

impl PanelPosition {
    /// Top/bottom panels lay launchers out along the x axis
    pub fn is_horizontal(self) -> bool {
        matches!(self, PanelPosition::Top | PanelPosition::Bottom)
    }

    /// Parse a configuration value; `None` means "no panel"
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top" => Some(PanelPosition::Top),
            "bottom" => Some(PanelPosition::Bottom),
            "left" => Some(PanelPosition::Left),
            "right" => Some(PanelPosition::Right),
            _ => None,
        }
    }
}

/// Cursor shapes the compositor can demand for the grab surface
///
/// The numeric codes are the shell protocol's cursor enum; anything
/// unrecognized maps to the default pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabCursor {
    Blank,
    Watch,
    Dragging,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    LeftPtr,
}

impl GrabCursor {
    pub fn from_protocol(cursor: u32) -> Self {
        match cursor {
            0 => GrabCursor::Blank,
            1 => GrabCursor::Top,
            2 => GrabCursor::Bottom,
            4 => GrabCursor::Left,
            5 => GrabCursor::TopLeft,
            6 => GrabCursor::BottomLeft,
            7 => GrabCursor::Dragging,
            8 => GrabCursor::Right,
            9 => GrabCursor::TopRight,
            10 => GrabCursor::BottomRight,
            11 => GrabCursor::Watch,
            _ => GrabCursor::LeftPtr,
        }
    }
}

/// Outgoing requests to the compositor's shell interface
pub trait CompositorShell {
    /// Declare `surface` as the panel for `output`
    fn set_panel(&mut self, output: u32, surface: SurfaceId);

    /// Declare `surface` as the wallpaper for `output`
    fn set_background(&mut self, output: u32, surface: SurfaceId);

    /// Declare `surface` as the lock screen
    fn set_lock_surface(&mut self, surface: SurfaceId);

    /// Declare `surface` as the pointer-grab surface
    fn set_grab_surface(&mut self, surface: SurfaceId);

    /// Declare the configured panel edge
    fn set_panel_position(&mut self, position: PanelPosition);

    /// Every shell surface has painted at least once
    fn desktop_ready(&mut self);

    /// Release the session lock
    fn unlock(&mut self);
}

/// A request as recorded by test doubles and the simulated compositor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellRequest {
    SetPanel { output: u32, surface: SurfaceId },
    SetBackground { output: u32, surface: SurfaceId },
    SetLockSurface { surface: SurfaceId },
    SetGrabSurface { surface: SurfaceId },
    SetPanelPosition { position: PanelPosition },
    DesktopReady,
    Unlock,
}

/// Incoming compositor events
///
/// Global announce/remove events carry the compositor-assigned numeric
/// name; configure events address a shell surface directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    /// The shell protocol global became available
    ShellBound,
    /// A display output was announced
    OutputAdded { id: u32 },
    /// A display output went away
    OutputRemoved { id: u32 },
    /// Logical position and transform for an output
    OutputGeometry {
        id: u32,
        x: i32,
        y: i32,
        transform: i32,
    },
    /// Scale factor for an output
    OutputScale { id: u32, scale: i32 },
    /// Size proposal for a shell surface; zero size marks it redundant
    Configure {
        surface: SurfaceId,
        edges: u32,
        width: i32,
        height: i32,
    },
    /// The compositor wants a lock surface
    PrepareLockSurface,
    /// Cursor demanded while the compositor holds a grab
    GrabCursor { cursor: u32 },
}
