//! Simulated compositor
//!
//! Implements the shell's outgoing interface by recording every request
//! and, in driving mode, answering surface declarations with configure
//! events the way a compositor would. The demo mode and the test suite
//! run the full engine against this double; a live session substitutes
//! its wire transport behind the same trait.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::info;

use crate::shell::{CompositorShell, PanelPosition, ShellEvent, ShellRequest};
use crate::toolkit::SurfaceId;

/// Shared log of requests the engine has made
pub type RequestLog = Rc<RefCell<Vec<ShellRequest>>>;

/// Events queued for the engine by the simulated compositor
pub type ReplyQueue = Rc<RefCell<VecDeque<ShellEvent>>>;

/// A scripted compositor double
pub struct SimCompositor {
    requests: RequestLog,
    replies: ReplyQueue,
    /// Size proposed in configure replies to panel/background declarations
    proposal: (i32, i32),
    auto_configure: bool,
}

impl SimCompositor {
    /// Record requests only; the test drives every configure by hand
    pub fn recording() -> (Self, RequestLog) {
        let requests: RequestLog = Rc::default();
        let sim = Self {
            requests: Rc::clone(&requests),
            replies: Rc::default(),
            proposal: (0, 0),
            auto_configure: false,
        };
        (sim, requests)
    }

    /// Record requests and answer surface declarations with configure
    /// events proposing `proposal`
    pub fn driving(proposal: (i32, i32)) -> (Self, RequestLog, ReplyQueue) {
        let requests: RequestLog = Rc::default();
        let replies: ReplyQueue = Rc::default();
        let sim = Self {
            requests: Rc::clone(&requests),
            replies: Rc::clone(&replies),
            proposal,
            auto_configure: true,
        };
        (sim, requests, replies)
    }

    fn record(&mut self, request: ShellRequest) {
        self.requests.borrow_mut().push(request);
    }

    fn reply(&mut self, event: ShellEvent) {
        if self.auto_configure {
            self.replies.borrow_mut().push_back(event);
        }
    }
}

impl CompositorShell for SimCompositor {
    fn set_panel(&mut self, output: u32, surface: SurfaceId) {
        self.record(ShellRequest::SetPanel { output, surface });
        let (width, height) = self.proposal;
        self.reply(ShellEvent::Configure {
            surface,
            edges: 0,
            width,
            height,
        });
    }

    fn set_background(&mut self, output: u32, surface: SurfaceId) {
        self.record(ShellRequest::SetBackground { output, surface });
        let (width, height) = self.proposal;
        self.reply(ShellEvent::Configure {
            surface,
            edges: 0,
            width,
            height,
        });
    }

    fn set_lock_surface(&mut self, surface: SurfaceId) {
        self.record(ShellRequest::SetLockSurface { surface });
        self.reply(ShellEvent::Configure {
            surface,
            edges: 0,
            width: crate::lock::INITIAL_WIDTH as i32,
            height: crate::lock::INITIAL_HEIGHT as i32,
        });
    }

    fn set_grab_surface(&mut self, surface: SurfaceId) {
        self.record(ShellRequest::SetGrabSurface { surface });
    }

    fn set_panel_position(&mut self, position: PanelPosition) {
        self.record(ShellRequest::SetPanelPosition { position });
    }

    fn desktop_ready(&mut self) {
        info!("🖥️ compositor: desktop is ready");
        self.record(ShellRequest::DesktopReady);
    }

    fn unlock(&mut self) {
        info!("🖥️ compositor: unlocked");
        self.record(ShellRequest::Unlock);
    }
}

/// Count occurrences of a request kind in a log
pub fn count_requests(log: &RequestLog, matches: impl Fn(&ShellRequest) -> bool) -> usize {
    log.borrow().iter().filter(|r| matches(r)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_mode_never_replies() {
        let (mut sim, requests) = SimCompositor::recording();
        sim.set_panel(1, SurfaceId(1));
        sim.desktop_ready();
        assert_eq!(requests.borrow().len(), 2);
        assert!(sim.replies.borrow().is_empty());
    }

    #[test]
    fn driving_mode_answers_declarations() {
        let (mut sim, requests, replies) = SimCompositor::driving((1920, 1080));
        sim.set_background(7, SurfaceId(3));
        assert_eq!(
            requests.borrow()[0],
            ShellRequest::SetBackground {
                output: 7,
                surface: SurfaceId(3)
            }
        );
        assert_eq!(
            replies.borrow_mut().pop_front(),
            Some(ShellEvent::Configure {
                surface: SurfaceId(3),
                edges: 0,
                width: 1920,
                height: 1080,
            })
        );
    }
}
