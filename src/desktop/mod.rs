//! Desktop root state and event dispatch
//!
//! The `Desktop` is the explicit context every compositor event lands in:
//! it owns the output set, the global panel/clock/locking policy, the
//! one-way readiness gate, the unlock dialog and the grab surface. All
//! mutation happens on the event-loop thread through `handle_event` and
//! the input entry points; collaborators are reached through [`ShellCtx`].

use std::time::Instant;

use log::{debug, info, warn};

use crate::background::Background;
use crate::config::{ClockFormat, HaloConfig};
use crate::launcher;
use crate::lock::UnlockDialog;
use crate::output::Output;
use crate::panel::{Panel, PANEL_HEIGHT};
use crate::shell::{CompositorShell, GrabCursor, PanelPosition, ShellEvent};
use crate::toolkit::{ButtonState, DeferredTask, PointerButton, SurfaceId, Toolkit};

/// Collaborator handles threaded into every handler
pub struct ShellCtx<'a> {
    pub toolkit: &'a mut Toolkit,
    pub shell: &'a mut dyn CompositorShell,
}

/// Which shell surface a toolkit surface currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRole {
    Panel(usize),
    Background(usize),
    LockDialog,
    Grab,
}

/// Root shell state
pub struct Desktop {
    config: HaloConfig,
    outputs: Vec<Output>,
    shell_bound: bool,
    want_panel: bool,
    panel_position: PanelPosition,
    clock_format: ClockFormat,
    locking: bool,
    /// One-way readiness gate; never resets once fired
    painted: bool,
    unlock_dialog: Option<UnlockDialog>,
    grab_surface: Option<SurfaceId>,
    grab_cursor: GrabCursor,
}

impl Desktop {
    pub fn new(config: HaloConfig) -> Self {
        let panel_position = config.panel_position();
        let desktop = Self {
            want_panel: panel_position.is_some(),
            panel_position: panel_position.unwrap_or(PanelPosition::Top),
            clock_format: config.clock_format(),
            locking: config.locking(),
            config,
            outputs: Vec::new(),
            shell_bound: false,
            painted: false,
            unlock_dialog: None,
            grab_surface: None,
            grab_cursor: GrabCursor::Blank,
        };
        info!(
            "🖼️ Desktop policy: panel {}, clock {:?}, locking {}",
            if desktop.want_panel { "enabled" } else { "disabled" },
            desktop.clock_format,
            desktop.locking
        );
        desktop
    }

    /// Dispatch one compositor event
    pub fn handle_event(&mut self, ctx: &mut ShellCtx, event: ShellEvent) {
        match event {
            ShellEvent::ShellBound => self.shell_announced(ctx),
            ShellEvent::OutputAdded { id } => self.output_added(ctx, id),
            ShellEvent::OutputRemoved { id } => self.output_removed(ctx, id),
            ShellEvent::OutputGeometry { id, x, y, transform } => {
                self.output_geometry(ctx, id, x, y, transform)
            }
            ShellEvent::OutputScale { id, scale } => self.output_scale(ctx, id, scale),
            ShellEvent::Configure {
                surface,
                edges,
                width,
                height,
            } => self.configure(ctx, surface, edges, width, height),
            ShellEvent::PrepareLockSurface => self.prepare_lock_surface(ctx),
            ShellEvent::GrabCursor { cursor } => {
                self.grab_cursor = GrabCursor::from_protocol(cursor);
            }
        }
    }

    // ---- output lifecycle -------------------------------------------------

    fn output_added(&mut self, ctx: &mut ShellCtx, id: u32) {
        info!("🖥️ Output {} announced", id);
        self.outputs.push(Output::new(id));

        /* On start up we may process an output global before the shell
         * global, in which case we can't create the panel and background
         * just yet */
        if self.shell_bound {
            let index = self.outputs.len() - 1;
            self.init_output(ctx, index);
        }
    }

    fn shell_announced(&mut self, ctx: &mut ShellCtx) {
        if self.shell_bound {
            warn!("shell global announced twice");
            return;
        }
        self.shell_bound = true;
        debug!("shell protocol bound");

        if self.want_panel {
            ctx.shell.set_panel_position(self.panel_position);
        }

        // Create panel and background for outputs processed before the
        // shell global
        for index in 0..self.outputs.len() {
            if !self.outputs[index].is_initialized() {
                self.init_output(ctx, index);
            }
        }

        self.create_grab_surface(ctx);
    }

    fn init_output(&mut self, ctx: &mut ShellCtx, index: usize) {
        let id = self.outputs[index].id();

        if self.want_panel {
            let panel = Panel::new(
                ctx.toolkit,
                &self.config,
                self.panel_position,
                self.clock_format,
            );
            ctx.shell.set_panel(id, panel.surface());
            self.outputs[index].set_panel(panel);
        }

        let background = Background::new(ctx.toolkit, &self.config);
        ctx.shell.set_background(id, background.surface());
        self.outputs[index].set_background(background);

        debug!("output {} initialized", id);
    }

    fn output_removed(&mut self, ctx: &mut ShellCtx, id: u32) {
        let Some(index) = self.outputs.iter().position(|o| o.id() == id) else {
            return;
        };
        info!("🖥️ Output {} removed", id);
        let mut removed = self.outputs.remove(index);

        if removed.background().is_none() {
            // Never fully initialized, nothing to hand over
            removed.destroy(ctx.toolkit);
            return;
        }

        // Find an output that is a clone of the removed one. We don't want
        // to leave the clone without a background or panel.
        //
        // XXX: Assumes size matches.
        let clone = self
            .outputs
            .iter_mut()
            .find(|o| o.x() == removed.x() && o.y() == removed.y());

        if let Some(clone) = clone {
            /* If found and it does not already have a background or panel,
             * hand over the background and panel so they don't get
             * destroyed.
             *
             * We never create multiple backgrounds or panels for clones,
             * but if the compositor moves outputs, a pair of outputs might
             * become "clones". This may happen temporarily when an output
             * is about to be removed and the rest are reflowed. In this
             * case it is correct to let the background/panel be destroyed.
             */
            if clone.background().is_none() {
                if let Some(background) = removed.take_background() {
                    debug!("handing background over to output {}", clone.id());
                    clone.set_background(background);
                }
            }
            if clone.panel().is_none() {
                if let Some(panel) = removed.take_panel() {
                    debug!("handing panel over to output {}", clone.id());
                    clone.set_panel(panel);
                }
            }
        }

        removed.destroy(ctx.toolkit);
    }

    fn output_geometry(&mut self, ctx: &mut ShellCtx, id: u32, x: i32, y: i32, transform: i32) {
        let Some(output) = self.outputs.iter_mut().find(|o| o.id() == id) else {
            return;
        };
        output.set_position(x, y);

        if let Some(panel) = output.panel() {
            ctx.toolkit.set_buffer_transform(panel.surface(), transform);
        }
        if let Some(background) = output.background() {
            ctx.toolkit
                .set_buffer_transform(background.surface(), transform);
        }
    }

    fn output_scale(&mut self, ctx: &mut ShellCtx, id: u32, scale: i32) {
        let Some(output) = self.outputs.iter().find(|o| o.id() == id) else {
            return;
        };
        if let Some(panel) = output.panel() {
            ctx.toolkit.set_buffer_scale(panel.surface(), scale);
        }
        if let Some(background) = output.background() {
            ctx.toolkit.set_buffer_scale(background.surface(), scale);
        }
    }

    // ---- configure handling -----------------------------------------------

    fn classify(&self, surface: SurfaceId) -> Option<SurfaceRole> {
        if let Some(dialog) = &self.unlock_dialog {
            if dialog.surface() == surface {
                return Some(SurfaceRole::LockDialog);
            }
        }
        if self.grab_surface == Some(surface) {
            return Some(SurfaceRole::Grab);
        }
        for (index, output) in self.outputs.iter().enumerate() {
            if output.panel().map(|p| p.surface()) == Some(surface) {
                return Some(SurfaceRole::Panel(index));
            }
            if output.background().map(|b| b.surface()) == Some(surface) {
                return Some(SurfaceRole::Background(index));
            }
        }
        None
    }

    fn configure(
        &mut self,
        ctx: &mut ShellCtx,
        surface: SurfaceId,
        _edges: u32,
        width: i32,
        height: i32,
    ) {
        match self.classify(surface) {
            Some(SurfaceRole::Panel(index)) => {
                if width < 1 || height < 1 {
                    /* Shell plugin configures 0x0 for a redundant panel. */
                    debug!("{} is a redundant panel, destroying", surface);
                    if let Some(panel) = self.outputs[index].take_panel() {
                        panel.destroy(ctx.toolkit);
                    }
                    return;
                }
                let (width, height) = self.panel_negotiated_size(width as u32, height as u32);
                ctx.toolkit.schedule_resize(surface, width, height);
            }
            Some(SurfaceRole::Background(index)) => {
                if width < 1 || height < 1 {
                    /* Shell plugin configures 0x0 for a redundant background. */
                    debug!("{} is a redundant background, destroying", surface);
                    if let Some(background) = self.outputs[index].take_background() {
                        background.destroy(ctx.toolkit);
                    }
                    return;
                }
                let mut width = width as u32;
                let mut height = height as u32;
                let solid = self.outputs[index]
                    .background()
                    .map(|b| b.is_solid())
                    .unwrap_or(false);
                if solid {
                    // A solid fill renders at 1x1 and is scaled on the
                    // output side
                    ctx.toolkit.set_viewport_destination(surface, width, height);
                    width = 1;
                    height = 1;
                }
                ctx.toolkit.schedule_resize(surface, width, height);
            }
            Some(SurfaceRole::LockDialog) => {
                if width < 1 || height < 1 {
                    debug!("{} is a redundant lock surface, destroying", surface);
                    if let Some(dialog) = self.unlock_dialog.take() {
                        dialog.destroy(ctx.toolkit);
                    }
                    return;
                }
                ctx.toolkit
                    .schedule_resize(surface, width as u32, height as u32);
            }
            Some(SurfaceRole::Grab) | None => {}
        }
    }

    /// Override the compositor's proposal according to panel policy
    fn panel_negotiated_size(&self, width: u32, height: u32) -> (u32, u32) {
        match self.panel_position {
            PanelPosition::Top | PanelPosition::Bottom => (width, PANEL_HEIGHT),
            PanelPosition::Left | PanelPosition::Right => {
                let width = match self.clock_format {
                    ClockFormat::Iso | ClockFormat::None => 32,
                    ClockFormat::Minutes | ClockFormat::Minutes24h | ClockFormat::Seconds24h => 150,
                    ClockFormat::Seconds => 170,
                };
                (width, height)
            }
        }
    }

    /// A scheduled resize has been applied by the toolkit
    pub fn surface_resized(&mut self, _ctx: &mut ShellCtx, surface: SurfaceId, width: u32, height: u32) {
        if let Some(SurfaceRole::Panel(index)) = self.classify(surface) {
            if let Some(panel) = self.outputs[index].panel_mut() {
                panel.layout(width, height);
            }
        }
    }

    // ---- painting and readiness -------------------------------------------

    /// Paint a surface at its applied size and report completion to the
    /// readiness barrier
    pub fn paint_surface(&mut self, ctx: &mut ShellCtx, surface: SurfaceId) {
        let Some((width, height)) = ctx.toolkit.surface_size(surface) else {
            return;
        };
        if width == 0 || height == 0 {
            return;
        }

        match self.classify(surface) {
            Some(SurfaceRole::Panel(index)) => {
                let Some(pixmap) = self.outputs[index]
                    .panel()
                    .and_then(|p| p.draw(width, height))
                else {
                    return;
                };
                ctx.toolkit.commit_contents(surface, pixmap);
                if let Some(panel) = self.outputs[index].panel_mut() {
                    panel.set_painted();
                }
                self.check_ready(ctx);
            }
            Some(SurfaceRole::Background(index)) => {
                let Some(pixmap) = self.outputs[index]
                    .background()
                    .and_then(|b| b.draw(width, height))
                else {
                    return;
                };
                ctx.toolkit.commit_contents(surface, pixmap);
                if let Some(background) = self.outputs[index].background_mut() {
                    background.set_painted();
                }
                self.check_ready(ctx);
            }
            Some(SurfaceRole::LockDialog) => {
                let Some(dialog) = &self.unlock_dialog else {
                    return;
                };
                if let Some(pixmap) = dialog.draw(width, height) {
                    ctx.toolkit.commit_contents(surface, pixmap);
                }
            }
            Some(SurfaceRole::Grab) | None => {}
        }
    }

    /// True iff every owned panel and background has painted at least once
    pub fn is_ready(&self) -> bool {
        for output in &self.outputs {
            if let Some(panel) = output.panel() {
                if !panel.painted() {
                    return false;
                }
            }
            if let Some(background) = output.background() {
                if !background.painted() {
                    return false;
                }
            }
        }
        true
    }

    /// Fire the one-time "desktop ready" notification when the last
    /// pending paint has completed; a no-op forever after
    pub fn check_ready(&mut self, ctx: &mut ShellCtx) {
        if self.painted {
            return;
        }
        if self.is_ready() {
            self.painted = true;
            info!("✅ All shell surfaces painted, desktop is ready");
            ctx.shell.desktop_ready();
        }
    }

    /// Whether the readiness notification has fired
    pub fn ready_sent(&self) -> bool {
        self.painted
    }

    // ---- lock dialog ------------------------------------------------------

    fn prepare_lock_surface(&mut self, ctx: &mut ShellCtx) {
        if !self.locking {
            // Locking is opt-in; hand the lock straight back
            ctx.shell.unlock();
            return;
        }
        if self.unlock_dialog.is_none() {
            info!("🔒 Creating unlock dialog");
            let dialog = UnlockDialog::new(ctx.toolkit);
            ctx.shell.set_lock_surface(dialog.surface());
            self.unlock_dialog = Some(dialog);
        }
    }

    /// Run a task queued for this loop iteration
    pub fn run_deferred(&mut self, ctx: &mut ShellCtx, task: DeferredTask) {
        match task {
            DeferredTask::FinishUnlock => {
                info!("🔓 Unlocking desktop");
                ctx.shell.unlock();
                if let Some(dialog) = self.unlock_dialog.take() {
                    dialog.destroy(ctx.toolkit);
                }
            }
        }
    }

    // ---- grab surface -----------------------------------------------------

    fn create_grab_surface(&mut self, ctx: &mut ShellCtx) {
        let surface = ctx.toolkit.create_surface("grab");
        /* A 1x1 allocation at 0,0 so the fake enter event at 0,0 lands on
         * this surface. */
        ctx.toolkit.schedule_resize(surface, 1, 1);
        ctx.shell.set_grab_surface(surface);
        self.grab_surface = Some(surface);
    }

    /// Cursor answered to pointer enters on the grab surface
    pub fn grab_cursor(&self) -> GrabCursor {
        self.grab_cursor
    }

    pub fn grab_surface(&self) -> Option<SurfaceId> {
        self.grab_surface
    }

    // ---- input entry points -----------------------------------------------

    /// Pointer button on a shell surface
    pub fn pointer_button(
        &mut self,
        ctx: &mut ShellCtx,
        surface: SurfaceId,
        x: f64,
        y: f64,
        button: PointerButton,
        state: ButtonState,
    ) {
        if let Some(dialog) = &mut self.unlock_dialog {
            if dialog.surface() == surface {
                if button == PointerButton::Left && state == ButtonState::Released {
                    if dialog.request_dismissal(ctx.toolkit) {
                        debug!("unlock dialog dismissal queued");
                    }
                }
                return;
            }
        }
        if let Some(SurfaceRole::Panel(index)) = self.classify(surface) {
            if let Some(panel) = self.outputs[index].panel_mut() {
                let activation = panel.pointer_button(x, y, button, state);
                ctx.toolkit.schedule_redraw(surface);
                if let Some(spec) = activation {
                    launcher::activate(&spec);
                }
            }
        }
    }

    /// Pointer moved over (or entered) a shell surface
    pub fn pointer_motion(&mut self, ctx: &mut ShellCtx, surface: SurfaceId, x: f64, y: f64) {
        if let Some(dialog) = &mut self.unlock_dialog {
            if dialog.surface() == surface {
                let Some((width, height)) = ctx.toolkit.surface_size(surface) else {
                    return;
                };
                let over = UnlockDialog::button_allocation(width, height).contains(x, y);
                if over != dialog.button_focused() {
                    if over {
                        dialog.focus_button();
                    } else {
                        dialog.unfocus_button();
                    }
                    ctx.toolkit.schedule_redraw(surface);
                }
                return;
            }
        }
        if let Some(SurfaceRole::Panel(index)) = self.classify(surface) {
            if let Some(panel) = self.outputs[index].panel_mut() {
                if panel.pointer_motion(x, y) {
                    ctx.toolkit.schedule_redraw(surface);
                }
            }
        }
    }

    /// Pointer left a shell surface
    pub fn pointer_leave(&mut self, ctx: &mut ShellCtx, surface: SurfaceId) {
        if let Some(dialog) = &mut self.unlock_dialog {
            if dialog.surface() == surface {
                dialog.unfocus_button();
                ctx.toolkit.schedule_redraw(surface);
                return;
            }
        }
        if let Some(SurfaceRole::Panel(index)) = self.classify(surface) {
            if let Some(panel) = self.outputs[index].panel_mut() {
                if panel.pointer_leave() {
                    ctx.toolkit.schedule_redraw(surface);
                }
            }
        }
    }

    /// Touch down on a shell surface
    pub fn touch_down(&mut self, ctx: &mut ShellCtx, surface: SurfaceId, x: f64, y: f64) {
        if let Some(dialog) = &mut self.unlock_dialog {
            if dialog.surface() == surface {
                dialog.focus_button();
                ctx.toolkit.schedule_redraw(surface);
                return;
            }
        }
        if let Some(SurfaceRole::Panel(index)) = self.classify(surface) {
            if let Some(panel) = self.outputs[index].panel_mut() {
                panel.touch_down(x, y);
                ctx.toolkit.schedule_redraw(surface);
            }
        }
    }

    /// Touch up on a shell surface
    pub fn touch_up(&mut self, ctx: &mut ShellCtx, surface: SurfaceId, x: f64, y: f64) {
        if let Some(dialog) = &mut self.unlock_dialog {
            if dialog.surface() == surface {
                dialog.unfocus_button();
                ctx.toolkit.schedule_redraw(surface);
                if dialog.request_dismissal(ctx.toolkit) {
                    debug!("unlock dialog dismissal queued");
                }
                return;
            }
        }
        if let Some(SurfaceRole::Panel(index)) = self.classify(surface) {
            if let Some(panel) = self.outputs[index].panel_mut() {
                let activation = panel.touch_up(x, y);
                ctx.toolkit.schedule_redraw(surface);
                if let Some(spec) = activation {
                    launcher::activate(&spec);
                }
            }
        }
    }

    // ---- clocks -----------------------------------------------------------

    /// Fire due clock timers: schedule the panel repaint and re-arm
    pub fn tick_clocks(&mut self, ctx: &mut ShellCtx, now: Instant) {
        for output in &mut self.outputs {
            if let Some(panel) = output.panel_mut() {
                let surface = panel.surface();
                if let Some(clock) = panel.clock_mut() {
                    if clock.deadline() <= now {
                        clock.reset();
                        ctx.toolkit.schedule_redraw(surface);
                    }
                }
            }
        }
    }

    /// Earliest clock deadline, used as the event-loop timeout
    pub fn next_clock_deadline(&self) -> Option<Instant> {
        self.outputs
            .iter()
            .filter_map(|o| o.panel())
            .filter_map(|p| p.clock())
            .map(|c| c.deadline())
            .min()
    }

    // ---- accessors --------------------------------------------------------

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn output(&self, id: u32) -> Option<&Output> {
        self.outputs.iter().find(|o| o.id() == id)
    }

    pub fn unlock_dialog(&self) -> Option<&UnlockDialog> {
        self.unlock_dialog.as_ref()
    }

    pub fn shell_bound(&self) -> bool {
        self.shell_bound
    }

    pub fn wants_panel(&self) -> bool {
        self.want_panel
    }
}
