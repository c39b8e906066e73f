//! Wallpaper surface for an output
//!
//! A background paints a configured image (in one of four layout modes)
//! over a solid fill. Solid-only backgrounds are rendered as a 1×1 buffer
//! scaled up on the output side, so a plain color does not cost a
//! screen-sized buffer.

use std::path::PathBuf;

use log::warn;
use tiny_skia::Pixmap;

use crate::config::HaloConfig;
use crate::render;
use crate::toolkit::{SurfaceId, Toolkit};

/// Wallpaper layout mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundMode {
    Scale,
    ScaleCrop,
    Tile,
    Centered,
    Invalid,
}

impl BackgroundMode {
    /// Parse a configuration value; unknown names are logged and mapped to
    /// `Invalid`, which suppresses the image but keeps the solid fill.
    pub fn from_name(name: &str) -> Self {
        match name {
            "scale" => BackgroundMode::Scale,
            "scale-crop" => BackgroundMode::ScaleCrop,
            "tile" => BackgroundMode::Tile,
            "centered" => BackgroundMode::Centered,
            _ => {
                warn!("invalid background-type: {}", name);
                BackgroundMode::Invalid
            }
        }
    }
}

/// The wallpaper surface owned by one output
pub struct Background {
    surface: SurfaceId,
    image: Option<PathBuf>,
    color: u32,
    mode: BackgroundMode,
    painted: bool,
}

impl Background {
    pub fn new(toolkit: &mut Toolkit, config: &HaloConfig) -> Self {
        let surface = toolkit.create_surface("background");
        Self {
            surface,
            image: config.shell.background_image.as_ref().map(PathBuf::from),
            color: config.background_color(),
            mode: config.background_mode(),
            painted: false,
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

    pub fn mode(&self) -> BackgroundMode {
        self.mode
    }

    pub fn image(&self) -> Option<&PathBuf> {
        self.image.as_ref()
    }

    /// Whether this background is a solid fill that can be rendered at
    /// 1×1 and scaled up by the output
    pub fn is_solid(&self) -> bool {
        self.image.is_none() && self.color != 0
    }

    /// Paint the wallpaper into a pixmap of the applied buffer size
    pub fn draw(&self, width: u32, height: u32) -> Option<Pixmap> {
        render::paint_background(
            width,
            height,
            self.color,
            self.image.as_deref(),
            self.mode,
        )
    }

    /// Release the background's toolkit resources
    pub fn destroy(self, toolkit: &mut Toolkit) {
        toolkit.destroy_surface(self.surface);
    }
}
