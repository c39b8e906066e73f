//! Window-toolkit shim
//!
//! A minimal stand-in for the windowing layer the shell surfaces live in:
//! surface records with scheduled (not synchronous) resizes, redraw
//! flagging, viewport destinations for scaled-up solid fills, and the
//! same-thread deferred-task queue. Resizes and redraws requested from an
//! event handler take effect on the next loop turn, which is what lets a
//! handler request its own surface's teardown without destroying the
//! ground it stands on.

use std::collections::{BTreeMap, VecDeque};

use tiny_skia::Pixmap;

/// Handle to a toolkit surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Pointer buttons the shell cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// Pointer button phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// A widget allocation inside a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Allocation {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Allocation {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64
            && y >= self.y as f64
            && x < (self.x + self.width as i32) as f64
            && y < (self.y + self.height as i32) as f64
    }
}

/// One-shot work queued for the next loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Release the session lock and drop the unlock dialog
    FinishUnlock,
}

/// Per-surface toolkit state
#[derive(Default)]
struct SurfaceState {
    title: String,
    /// Applied size; zero until the first resize lands
    width: u32,
    height: u32,
    pending_resize: Option<(u32, u32)>,
    /// Output-side scaling destination for undersized buffers
    viewport_destination: Option<(u32, u32)>,
    buffer_transform: i32,
    buffer_scale: i32,
    needs_redraw: bool,
    contents: Option<Pixmap>,
}

/// The toolkit connection shared by every shell surface
#[derive(Default)]
pub struct Toolkit {
    next_surface: u32,
    surfaces: BTreeMap<SurfaceId, SurfaceState>,
    deferred: VecDeque<DeferredTask>,
}

impl Toolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a surface record; the returned id is stable until destroy
    pub fn create_surface(&mut self, title: &str) -> SurfaceId {
        self.next_surface += 1;
        let id = SurfaceId(self.next_surface);
        self.surfaces.insert(
            id,
            SurfaceState {
                title: title.to_string(),
                buffer_scale: 1,
                ..SurfaceState::default()
            },
        );
        log::debug!("created {} ({})", id, title);
        id
    }

    pub fn destroy_surface(&mut self, surface: SurfaceId) {
        if let Some(state) = self.surfaces.remove(&surface) {
            log::debug!("destroyed {} ({})", surface, state.title);
        }
    }

    pub fn has_surface(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains_key(&surface)
    }

    /// Applied size of a surface, if it exists
    pub fn surface_size(&self, surface: SurfaceId) -> Option<(u32, u32)> {
        self.surfaces.get(&surface).map(|s| (s.width, s.height))
    }

    pub fn viewport_destination(&self, surface: SurfaceId) -> Option<(u32, u32)> {
        self.surfaces.get(&surface).and_then(|s| s.viewport_destination)
    }

    pub fn buffer_transform(&self, surface: SurfaceId) -> Option<i32> {
        self.surfaces.get(&surface).map(|s| s.buffer_transform)
    }

    pub fn buffer_scale(&self, surface: SurfaceId) -> Option<i32> {
        self.surfaces.get(&surface).map(|s| s.buffer_scale)
    }

    /// Request a resize; applied on the next loop turn
    pub fn schedule_resize(&mut self, surface: SurfaceId, width: u32, height: u32) {
        if let Some(state) = self.surfaces.get_mut(&surface) {
            state.pending_resize = Some((width, height));
        }
    }

    /// Flag a surface for repaint on the next loop turn
    pub fn schedule_redraw(&mut self, surface: SurfaceId) {
        if let Some(state) = self.surfaces.get_mut(&surface) {
            state.needs_redraw = true;
        }
    }

    /// Ask the output to scale the surface's buffer up to `width`×`height`
    pub fn set_viewport_destination(&mut self, surface: SurfaceId, width: u32, height: u32) {
        if let Some(state) = self.surfaces.get_mut(&surface) {
            state.viewport_destination = Some((width, height));
        }
    }

    pub fn set_buffer_transform(&mut self, surface: SurfaceId, transform: i32) {
        if let Some(state) = self.surfaces.get_mut(&surface) {
            state.buffer_transform = transform;
        }
    }

    pub fn set_buffer_scale(&mut self, surface: SurfaceId, scale: i32) {
        if let Some(state) = self.surfaces.get_mut(&surface) {
            state.buffer_scale = scale;
        }
    }

    /// Store painted contents for a surface
    pub fn commit_contents(&mut self, surface: SurfaceId, contents: Pixmap) {
        if let Some(state) = self.surfaces.get_mut(&surface) {
            state.contents = Some(contents);
        }
    }

    /// Painted contents, if the surface has been drawn at least once
    pub fn contents(&self, surface: SurfaceId) -> Option<&Pixmap> {
        self.surfaces.get(&surface).and_then(|s| s.contents.as_ref())
    }

    /// Queue a one-shot task for the next loop iteration
    pub fn defer(&mut self, task: DeferredTask) {
        self.deferred.push_back(task);
    }

    /// Pop the next queued deferred task
    pub fn pop_deferred(&mut self) -> Option<DeferredTask> {
        self.deferred.pop_front()
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Apply pending resizes, flag repaints, and report what changed
    pub fn apply_resizes(&mut self) -> Vec<(SurfaceId, u32, u32)> {
        let mut applied = Vec::new();
        for (id, state) in self.surfaces.iter_mut() {
            if let Some((width, height)) = state.pending_resize.take() {
                state.width = width;
                state.height = height;
                state.needs_redraw = true;
                applied.push((*id, width, height));
            }
        }
        applied
    }

    /// Take the set of surfaces flagged for repaint
    pub fn take_redraws(&mut self) -> Vec<SurfaceId> {
        let mut out = Vec::new();
        for (id, state) in self.surfaces.iter_mut() {
            if state.needs_redraw {
                state.needs_redraw = false;
                out.push(*id);
            }
        }
        out
    }

    /// True while resizes, redraws or deferred tasks are outstanding
    pub fn has_pending_work(&self) -> bool {
        !self.deferred.is_empty()
            || self
                .surfaces
                .values()
                .any(|s| s.pending_resize.is_some() || s.needs_redraw)
    }
}
