//! Per-display output record
//!
//! One record per compositor-announced output. An output exclusively owns
//! at most one panel and one background; the decoration surfaces move
//! between records only through the desktop's clone reconciliation.

use crate::background::Background;
use crate::panel::Panel;
use crate::toolkit::Toolkit;

/// One physical or logical display
pub struct Output {
    id: u32,
    x: i32,
    y: i32,
    panel: Option<Panel>,
    background: Option<Background>,
}

impl Output {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            x: 0,
            y: 0,
            panel: None,
            background: None,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn panel(&self) -> Option<&Panel> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut Panel> {
        self.panel.as_mut()
    }

    pub fn set_panel(&mut self, panel: Panel) {
        debug_assert!(self.panel.is_none(), "output already owns a panel");
        self.panel = Some(panel);
    }

    pub fn take_panel(&mut self) -> Option<Panel> {
        self.panel.take()
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub fn background_mut(&mut self) -> Option<&mut Background> {
        self.background.as_mut()
    }

    pub fn set_background(&mut self, background: Background) {
        debug_assert!(self.background.is_none(), "output already owns a background");
        self.background = Some(background);
    }

    pub fn take_background(&mut self) -> Option<Background> {
        self.background.take()
    }

    /// An output is initialized once it carries its background
    pub fn is_initialized(&self) -> bool {
        self.background.is_some()
    }

    /// Destroy any decoration surfaces still owned by this output
    pub fn destroy(mut self, toolkit: &mut Toolkit) {
        if let Some(background) = self.background.take() {
            background.destroy(toolkit);
        }
        if let Some(panel) = self.panel.take() {
            panel.destroy(toolkit);
        }
    }
}
