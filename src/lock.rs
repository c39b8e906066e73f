//! Unlock dialog state
//!
//! At most one dialog exists at a time, owned by the desktop. Dismissal
//! must not destroy the dialog from inside its own input handler, so a
//! trigger only latches the `closing` flag and queues the one-shot
//! finalize task; the latch guarantees the task is queued at most once no
//! matter how many dismissal events race in before it runs.

use tiny_skia::Pixmap;

use crate::render;
use crate::toolkit::{Allocation, DeferredTask, SurfaceId, Toolkit};

/// Initial dialog size requested at creation
pub const INITIAL_WIDTH: u32 = 260;
pub const INITIAL_HEIGHT: u32 = 230;

/// The modal lock-screen confirmation dialog
pub struct UnlockDialog {
    surface: SurfaceId,
    closing: bool,
    button_focused: bool,
}

impl UnlockDialog {
    pub fn new(toolkit: &mut Toolkit) -> Self {
        let surface = toolkit.create_surface("unlock dialog");
        toolkit.schedule_resize(surface, INITIAL_WIDTH, INITIAL_HEIGHT);
        Self {
            surface,
            closing: false,
            button_focused: false,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn closing(&self) -> bool {
        self.closing
    }

    pub fn button_focused(&self) -> bool {
        self.button_focused
    }

    pub fn focus_button(&mut self) {
        self.button_focused = true;
    }

    pub fn unfocus_button(&mut self) {
        self.button_focused = false;
    }

    /// Latch the dialog closed and queue the finalize task exactly once.
    /// Returns true when this call queued the task.
    pub fn request_dismissal(&mut self, toolkit: &mut Toolkit) -> bool {
        if self.closing {
            return false;
        }
        self.closing = true;
        toolkit.defer(DeferredTask::FinishUnlock);
        true
    }

    /// The confirmation button region for the dialog's current size
    pub fn button_allocation(width: u32, height: u32) -> Allocation {
        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0;
        let r = cx.min(cy) * 0.4;
        Allocation::new(
            (cx - r) as i32,
            (cy - r) as i32,
            (2.0 * r) as u32,
            (2.0 * r) as u32,
        )
    }

    /// Paint the dialog into a pixmap of the applied size
    pub fn draw(&self, width: u32, height: u32) -> Option<Pixmap> {
        render::paint_unlock_dialog(width, height, self.button_focused)
    }

    /// Release the dialog's toolkit resources
    pub fn destroy(self, toolkit: &mut Toolkit) {
        toolkit.destroy_surface(self.surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismissal_latch_queues_once() {
        let mut toolkit = Toolkit::new();
        let mut dialog = UnlockDialog::new(&mut toolkit);

        assert!(!dialog.closing());
        assert!(dialog.request_dismissal(&mut toolkit));
        assert!(dialog.closing());

        // Second and third triggers are no-ops
        assert!(!dialog.request_dismissal(&mut toolkit));
        assert!(!dialog.request_dismissal(&mut toolkit));
        assert_eq!(toolkit.deferred_len(), 1);
    }

    #[test]
    fn initial_resize_is_scheduled() {
        let mut toolkit = Toolkit::new();
        let dialog = UnlockDialog::new(&mut toolkit);
        let applied = toolkit.apply_resizes();
        assert_eq!(applied, vec![(dialog.surface(), INITIAL_WIDTH, INITIAL_HEIGHT)]);
    }

    #[test]
    fn button_focus_toggles_freely() {
        let mut toolkit = Toolkit::new();
        let mut dialog = UnlockDialog::new(&mut toolkit);
        assert!(!dialog.button_focused());
        dialog.focus_button();
        assert!(dialog.button_focused());
        dialog.unfocus_button();
        assert!(!dialog.button_focused());
    }

    #[test]
    fn button_region_is_centered() {
        let alloc = UnlockDialog::button_allocation(260, 230);
        // r = min(130, 115) * 0.4 = 46
        assert_eq!(alloc.x, 130 - 46);
        assert_eq!(alloc.y, 115 - 46);
        assert_eq!(alloc.width, 92);
        assert_eq!(alloc.height, 92);
    }
}
