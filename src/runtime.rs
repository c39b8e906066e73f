//! Event-loop runtime
//!
//! Single-threaded, cooperative: one calloop loop dispatches compositor
//! events, clock deadlines and SIGCHLD, and between dispatches runs the
//! toolkit turn (deferred tasks first, then scheduled resizes, then
//! repaints). Nothing here blocks except `fork`, whose parent side returns
//! immediately.

use std::os::unix::io::FromRawFd;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use calloop::signals::{Signal, Signals};
use calloop::EventLoop;
use log::{debug, info};

use crate::config::HaloConfig;
use crate::desktop::{Desktop, ShellCtx};
use crate::error::ShellError;
use crate::launcher;
use crate::shell::{CompositorShell, ShellEvent};
use crate::sim::SimCompositor;
use crate::toolkit::{ButtonState, PointerButton, SurfaceId, Toolkit};

/// The engine plus its collaborators, ready to be driven by events
pub struct ShellRuntime {
    pub desktop: Desktop,
    pub toolkit: Toolkit,
    pub shell: Box<dyn CompositorShell>,
}

impl ShellRuntime {
    pub fn new(config: HaloConfig, shell: Box<dyn CompositorShell>) -> Self {
        Self {
            desktop: Desktop::new(config),
            toolkit: Toolkit::new(),
            shell,
        }
    }

    /// Feed one compositor event into the engine
    pub fn dispatch(&mut self, event: ShellEvent) {
        let mut ctx = ShellCtx {
            toolkit: &mut self.toolkit,
            shell: self.shell.as_mut(),
        };
        self.desktop.handle_event(&mut ctx, event);
    }

    /// One loop turn: deferred tasks, clock ticks, resize flush, repaints
    pub fn turn(&mut self) {
        while let Some(task) = self.toolkit.pop_deferred() {
            let mut ctx = ShellCtx {
                toolkit: &mut self.toolkit,
                shell: self.shell.as_mut(),
            };
            self.desktop.run_deferred(&mut ctx, task);
        }

        {
            let mut ctx = ShellCtx {
                toolkit: &mut self.toolkit,
                shell: self.shell.as_mut(),
            };
            self.desktop.tick_clocks(&mut ctx, Instant::now());
        }

        for (surface, width, height) in self.toolkit.apply_resizes() {
            let mut ctx = ShellCtx {
                toolkit: &mut self.toolkit,
                shell: self.shell.as_mut(),
            };
            self.desktop.surface_resized(&mut ctx, surface, width, height);
        }

        for surface in self.toolkit.take_redraws() {
            let mut ctx = ShellCtx {
                toolkit: &mut self.toolkit,
                shell: self.shell.as_mut(),
            };
            self.desktop.paint_surface(&mut ctx, surface);
        }
    }

    /// Run turns until the toolkit queues drain (bounded)
    pub fn settle(&mut self) {
        for _ in 0..64 {
            if !self.toolkit.has_pending_work() {
                return;
            }
            self.turn();
        }
        debug!("toolkit queues did not settle after 64 turns");
    }

    pub fn has_pending_work(&self) -> bool {
        self.toolkit.has_pending_work()
    }

    // Input entry points, routed through the desktop

    pub fn pointer_button(
        &mut self,
        surface: SurfaceId,
        x: f64,
        y: f64,
        button: PointerButton,
        state: ButtonState,
    ) {
        let mut ctx = ShellCtx {
            toolkit: &mut self.toolkit,
            shell: self.shell.as_mut(),
        };
        self.desktop
            .pointer_button(&mut ctx, surface, x, y, button, state);
    }

    pub fn pointer_motion(&mut self, surface: SurfaceId, x: f64, y: f64) {
        let mut ctx = ShellCtx {
            toolkit: &mut self.toolkit,
            shell: self.shell.as_mut(),
        };
        self.desktop.pointer_motion(&mut ctx, surface, x, y);
    }

    pub fn pointer_leave(&mut self, surface: SurfaceId) {
        let mut ctx = ShellCtx {
            toolkit: &mut self.toolkit,
            shell: self.shell.as_mut(),
        };
        self.desktop.pointer_leave(&mut ctx, surface);
    }

    pub fn touch_down(&mut self, surface: SurfaceId, x: f64, y: f64) {
        let mut ctx = ShellCtx {
            toolkit: &mut self.toolkit,
            shell: self.shell.as_mut(),
        };
        self.desktop.touch_down(&mut ctx, surface, x, y);
    }

    pub fn touch_up(&mut self, surface: SurfaceId, x: f64, y: f64) {
        let mut ctx = ShellCtx {
            toolkit: &mut self.toolkit,
            shell: self.shell.as_mut(),
        };
        self.desktop.touch_up(&mut ctx, surface, x, y);
    }
}

/// Create the display connection from the session environment.
///
/// Missing environment or an unreachable socket is fatal at startup:
/// nothing can function without the display.
pub fn connect() -> Result<UnixStream, ShellError> {
    if let Ok(fd) = std::env::var("WAYLAND_SOCKET") {
        let fd: i32 = fd
            .parse()
            .map_err(|_| ShellError::Connect(format!("invalid WAYLAND_SOCKET '{}'", fd)))?;
        // The compositor handed us an already-connected socket
        return Ok(unsafe { UnixStream::from_raw_fd(fd) });
    }

    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| ShellError::Connect("XDG_RUNTIME_DIR is not set".to_string()))?;
    let display = std::env::var("WAYLAND_DISPLAY")
        .map_err(|_| ShellError::Connect("WAYLAND_DISPLAY is not set".to_string()))?;
    let path = Path::new(&runtime_dir).join(&display);

    UnixStream::connect(&path).map_err(|e| {
        ShellError::Connect(format!("cannot connect to {}: {}", path.display(), e))
    })
}

/// Run under a live session.
///
/// The connection preflight is real; the shell-protocol pump itself is the
/// embedding session's collaborator and is not part of this build.
pub fn run_session(_config: HaloConfig) -> Result<()> {
    let stream = connect()?;
    info!("🔌 Connected to the display socket");
    drop(stream);
    Err(ShellError::Transport(
        "the shell wire transport is provided by the session integration; \
         use --demo for the standalone driver"
            .to_string(),
    )
    .into())
}

/// Drive a full scripted session against the simulated compositor:
/// startup with a pre-shell output, hot-plug, readiness, a lock round,
/// and a clone reflow.
pub fn run_demo(config: HaloConfig) -> Result<()> {
    info!("🎬 Running simulated desktop session");

    let (sim, requests, replies) = SimCompositor::driving((1920, 1080));
    let mut runtime = ShellRuntime::new(config, Box::new(sim));

    let mut event_loop: EventLoop<ShellRuntime> =
        EventLoop::try_new().context("Failed to create event loop")?;
    let handle = event_loop.handle();

    let (sender, channel) = calloop::channel::channel::<ShellEvent>();
    handle
        .insert_source(channel, |event, _, state: &mut ShellRuntime| {
            if let calloop::channel::Event::Msg(ev) = event {
                state.dispatch(ev);
            }
        })
        .map_err(|e| anyhow!("Failed to insert event channel: {}", e))?;

    handle
        .insert_source(
            Signals::new(&[Signal::SIGCHLD]).context("Failed to create signal source")?,
            |_, _, _| launcher::reap_children(),
        )
        .map_err(|e| anyhow!("Failed to insert signal source: {}", e))?;

    let signal = event_loop.get_signal();
    let request_log = std::rc::Rc::clone(&requests);
    let mut phase = 0usize;

    event_loop
        .run(Duration::from_millis(20), &mut runtime, |state| {
            // Deliver the simulated compositor's configure replies, then
            // run the toolkit turn
            loop {
                let next = replies.borrow_mut().pop_front();
                match next {
                    Some(event) => state.dispatch(event),
                    None => break,
                }
            }
            state.turn();
            if state.has_pending_work() || !replies.borrow().is_empty() {
                return;
            }

            match phase {
                0 => {
                    // One output races ahead of the shell global, one
                    // arrives after it
                    for event in [
                        ShellEvent::OutputAdded { id: 1 },
                        ShellEvent::OutputGeometry {
                            id: 1,
                            x: 0,
                            y: 0,
                            transform: 0,
                        },
                        ShellEvent::ShellBound,
                        ShellEvent::OutputAdded { id: 2 },
                        ShellEvent::OutputGeometry {
                            id: 2,
                            x: 1920,
                            y: 0,
                            transform: 0,
                        },
                    ] {
                        let _ = sender.send(event);
                    }
                    phase = 1;
                }
                1 if state.desktop.ready_sent() => {
                    info!("🎉 Desktop reported ready, locking the session");
                    let _ = sender.send(ShellEvent::PrepareLockSurface);
                    phase = 2;
                }
                2 => {
                    // Dismiss the dialog once it has a size; with locking
                    // disabled the engine has already unlocked and there is
                    // no dialog to dismiss
                    let dialog = state.desktop.unlock_dialog().map(|d| d.surface());
                    if let Some(surface) = dialog {
                        if state.toolkit.surface_size(surface).map_or(false, |(w, _)| w > 0) {
                            state.pointer_button(
                                surface,
                                130.0,
                                115.0,
                                PointerButton::Left,
                                ButtonState::Released,
                            );
                            phase = 3;
                        }
                    } else if request_log
                        .borrow()
                        .iter()
                        .any(|r| matches!(r, crate::shell::ShellRequest::Unlock))
                    {
                        phase = 3;
                    }
                }
                3 if state.desktop.unlock_dialog().is_none() => {
                    info!("🔀 Reflowing outputs into a clone pair");
                    // The compositor marks the second output's decorations
                    // redundant, moves it onto the first, then retires the
                    // first; its decorations must transfer to the clone
                    let second = state.desktop.output(2);
                    let doomed: Vec<SurfaceId> = second
                        .map(|o| {
                            o.panel()
                                .map(|p| p.surface())
                                .into_iter()
                                .chain(o.background().map(|b| b.surface()))
                                .collect()
                        })
                        .unwrap_or_default();
                    for surface in doomed {
                        let _ = sender.send(ShellEvent::Configure {
                            surface,
                            edges: 0,
                            width: 0,
                            height: 0,
                        });
                    }
                    for event in [
                        ShellEvent::OutputGeometry {
                            id: 2,
                            x: 0,
                            y: 0,
                            transform: 0,
                        },
                        ShellEvent::OutputRemoved { id: 1 },
                    ] {
                        let _ = sender.send(event);
                    }
                    phase = 4;
                }
                4 if state.desktop.outputs().len() == 1 => {
                    phase = 5;
                    signal.stop();
                }
                _ => {}
            }
        })
        .map_err(|e| anyhow!("Event loop error: {}", e))?;

    let log = requests.borrow();
    info!(
        "📜 Session finished: {} compositor requests, {} outputs remaining",
        log.len(),
        runtime.desktop.outputs().len()
    );
    let survivor = runtime.desktop.outputs().first();
    info!(
        "   surviving output carries panel: {}, background: {}",
        survivor.map_or(false, |o| o.panel().is_some()),
        survivor.map_or(false, |o| o.background().is_some()),
    );

    Ok(())
}
