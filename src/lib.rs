//! # Halo Shell Library
//!
//! The client-side shell of a compositing window system: every display
//! output gets a status panel and a wallpaper surface, the session lock
//! gets a modal unlock dialog, and panel launchers spawn detached
//! processes.
//!
//! ## Architecture
//!
//! The shell is built on a modular architecture:
//! - `desktop`: root state, output lifecycle and the readiness barrier
//! - `output`: per-display record owning panel and background
//! - `panel`: launcher row and clock, configure-driven sizing
//! - `background`: wallpaper surface and layout modes
//! - `lock`: unlock dialog state machine
//! - `launcher`: command parsing and detached process spawning
//! - `shell`: the compositor protocol seam (trait + events)
//! - `toolkit`: window-toolkit shim (surfaces, deferred tasks)
//! - `render`: software painting of the shell surfaces
//! - `runtime`: calloop event-loop wiring
//! - `sim`: simulated compositor for the demo mode and tests
//! - `config`: configuration parsing and fallback policy
//!
//! ## Usage
//!
//! ```rust,no_run
//! use halo_shell::{runtime, HaloConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = HaloConfig::default();
//!     runtime::run_demo(config)
//! }
//! ```

pub mod background;
pub mod config;
pub mod desktop;
pub mod error;
pub mod launcher;
pub mod lock;
pub mod output;
pub mod panel;
pub mod render;
pub mod runtime;
pub mod shell;
pub mod sim;
pub mod toolkit;

// Re-export main types for easy access
pub use config::{ClockFormat, HaloConfig};
pub use desktop::{Desktop, ShellCtx};
pub use error::ShellError;
pub use runtime::ShellRuntime;
pub use shell::{CompositorShell, PanelPosition, ShellEvent, ShellRequest};
pub use toolkit::{SurfaceId, Toolkit};

/// Version information for the shell
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
