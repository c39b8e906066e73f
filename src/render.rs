//! Software painting for the shell surfaces
//!
//! Panels, wallpapers and the unlock dialog are drawn into plain pixmaps;
//! the toolkit shim owns the committed contents. Glyph rasterization for
//! the clock text is left to the toolkit's text machinery and is not
//! reproduced here.

use std::path::Path;

use log::{debug, error};
use tiny_skia::{
    Color, FilterQuality, GradientStop, Paint, PathBuilder, Pattern, Pixmap, PixmapPaint, Point,
    RadialGradient, Rect, Shader, SpreadMode, Stroke, Transform,
};

use crate::background::BackgroundMode;
use crate::error::ShellError;
use crate::toolkit::Allocation;

/// Stock wallpaper pattern used when neither image nor color is configured
pub const STOCK_PATTERN: &str = "/usr/share/halo-shell/pattern.png";

/// Fallback icon side length
const FALLBACK_ICON_SIZE: u32 = 20;

/// Decode a `0xAARRGGBB` color
pub fn color_from_argb(color: u32) -> Color {
    Color::from_rgba8(
        ((color >> 16) & 0xff) as u8,
        ((color >> 8) & 0xff) as u8,
        (color & 0xff) as u8,
        ((color >> 24) & 0xff) as u8,
    )
}

/// An icon placement inside a panel
pub struct IconDraw<'a> {
    pub icon: &'a Pixmap,
    pub alloc: Allocation,
    pub focused: bool,
    pub pressed: bool,
}

/// Load a PNG icon, or synthesize the placeholder glyph when it cannot be
/// read. Icon problems are resource errors: logged, never fatal.
pub fn load_icon_or_fallback(path: &str) -> Pixmap {
    match load_png(Path::new(path)) {
        Ok(pixmap) => pixmap,
        Err(e) => {
            error!("ERROR loading icon from file '{}': {}", path, e);
            fallback_icon()
        }
    }
}

/// Decode a PNG file into a premultiplied pixmap
pub fn load_png(path: &Path) -> Result<Pixmap, ShellError> {
    let icon_error = |reason: String| ShellError::Icon {
        path: path.display().to_string(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|e| icon_error(e.to_string()))?;
    let mut decoder = png::Decoder::new(file);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(|e| icon_error(e.to_string()))?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| icon_error(e.to_string()))?;
    let bytes = &buf[..info.buffer_size()];

    let mut pixmap = Pixmap::new(info.width, info.height)
        .ok_or_else(|| icon_error("zero-sized image".to_string()))?;

    let pixels = pixmap.pixels_mut();
    match info.color_type {
        png::ColorType::Rgba => {
            for (i, px) in bytes.chunks_exact(4).enumerate() {
                pixels[i] = tiny_skia::ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            }
        }
        png::ColorType::Rgb => {
            for (i, px) in bytes.chunks_exact(3).enumerate() {
                pixels[i] = tiny_skia::ColorU8::from_rgba(px[0], px[1], px[2], 255).premultiply();
            }
        }
        png::ColorType::GrayscaleAlpha => {
            for (i, px) in bytes.chunks_exact(2).enumerate() {
                pixels[i] = tiny_skia::ColorU8::from_rgba(px[0], px[0], px[0], px[1]).premultiply();
            }
        }
        png::ColorType::Grayscale => {
            for (i, &px) in bytes.iter().enumerate() {
                pixels[i] = tiny_skia::ColorU8::from_rgba(px, px, px, 255).premultiply();
            }
        }
        other => return Err(icon_error(format!("unsupported color type {:?}", other))),
    }

    Ok(pixmap)
}

/// Light-gray square with a black X, drawn when an icon cannot be loaded
pub fn fallback_icon() -> Pixmap {
    let size = FALLBACK_ICON_SIZE;
    let mut pixmap = Pixmap::new(size, size).expect("fallback icon size is nonzero");
    pixmap.fill(Color::from_rgba8(204, 204, 204, 255));

    let mut pb = PathBuilder::new();
    pb.move_to(4.0, 4.0);
    pb.line_to(size as f32 - 4.0, size as f32 - 4.0);
    pb.move_to(4.0, size as f32 - 4.0);
    pb.line_to(size as f32 - 4.0, 4.0);
    let path = pb.finish().expect("fallback icon path is valid");

    let paint = Paint {
        shader: Shader::SolidColor(Color::from_rgba8(0, 0, 0, 255)),
        anti_alias: true,
        ..Default::default()
    };
    let stroke = Stroke {
        width: 2.0,
        line_cap: tiny_skia::LineCap::Round,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);

    pixmap
}

/// Paint a panel: opaque fill plus the launcher icons
pub fn paint_panel(width: u32, height: u32, color: u32, icons: &[IconDraw]) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)?;
    pixmap.fill(color_from_argb(color));

    for draw in icons {
        let icon_w = draw.icon.width();
        let icon_h = draw.icon.height();
        let mut x = draw.alloc.x + (draw.alloc.width as i32 - icon_w as i32) / 2;
        let mut y = draw.alloc.y + (draw.alloc.height as i32 - icon_h as i32) / 2;
        if draw.pressed {
            x += 1;
            y += 1;
        }
        pixmap.draw_pixmap(
            x,
            y,
            draw.icon.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        if draw.focused {
            // Highlight the hovered launcher
            if let Some(rect) =
                Rect::from_xywh(x as f32, y as f32, icon_w as f32, icon_h as f32)
            {
                let paint = Paint {
                    shader: Shader::SolidColor(Color::from_rgba8(255, 255, 255, 102)),
                    ..Default::default()
                };
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }
    }

    Some(pixmap)
}

/// Paint a wallpaper buffer of `width`×`height`
pub fn paint_background(
    width: u32,
    height: u32,
    color: u32,
    image: Option<&Path>,
    mode: BackgroundMode,
) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)?;
    if color == 0 {
        pixmap.fill(Color::from_rgba(0.0, 0.0, 0.2, 1.0).expect("valid color"));
    } else {
        pixmap.fill(color_from_argb(color));
    }

    let source = match image {
        Some(path) => Some(path.to_path_buf()),
        None if color == 0 => Some(Path::new(STOCK_PATTERN).to_path_buf()),
        None => None,
    };

    let image = match source {
        Some(path) => match load_png(&path) {
            Ok(image) => Some(image),
            Err(e) => {
                debug!("background image unavailable: {}", e);
                None
            }
        },
        None => None,
    };

    if let Some(image) = image {
        if mode != BackgroundMode::Invalid {
            let im_w = image.width() as f32;
            let im_h = image.height() as f32;
            let sx = im_w / width as f32;
            let sy = im_h / height as f32;

            // The pattern transform maps image space onto the buffer
            let (spread, transform) = match mode {
                BackgroundMode::Invalid => unreachable!(),
                BackgroundMode::Scale => (
                    SpreadMode::Pad,
                    Transform::from_scale(1.0 / sx, 1.0 / sy),
                ),
                BackgroundMode::ScaleCrop => {
                    let s = sx.min(sy);
                    // Align center
                    let tx = (im_w - s * width as f32) * 0.5;
                    let ty = (im_h - s * height as f32) * 0.5;
                    (
                        SpreadMode::Pad,
                        Transform::from_translate(-tx, -ty).post_scale(1.0 / s, 1.0 / s),
                    )
                }
                BackgroundMode::Tile => (SpreadMode::Repeat, Transform::identity()),
                BackgroundMode::Centered => {
                    let s = sx.min(sy).max(1.0);
                    // Align center
                    let tx = (im_w - s * width as f32) * 0.5;
                    let ty = (im_h - s * height as f32) * 0.5;
                    (
                        SpreadMode::Pad,
                        Transform::from_translate(-tx, -ty).post_scale(1.0 / s, 1.0 / s),
                    )
                }
            };

            let paint = Paint {
                shader: Pattern::new(
                    image.as_ref(),
                    spread,
                    FilterQuality::Bilinear,
                    1.0,
                    transform,
                ),
                ..Default::default()
            };
            if let Some(rect) = Rect::from_xywh(0.0, 0.0, width as f32, height as f32) {
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }
    }

    Some(pixmap)
}

/// Paint the unlock dialog: dimmed backdrop and the confirmation button
pub fn paint_unlock_dialog(width: u32, height: u32, button_focused: bool) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)?;
    pixmap.fill(Color::from_rgba(0.0, 0.0, 0.0, 0.6).expect("valid color"));

    let f = if button_focused { 1.0 } else { 0.7 };
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let r = cx.min(cy) * 0.4;

    let stops = vec![
        GradientStop::new(0.0, Color::from_rgba(0.0, 0.86 * f, 0.0, 1.0)?),
        GradientStop::new(0.7, Color::from_rgba(0.0, 0.86 * f, 0.0, 1.0)?),
        GradientStop::new(0.95, Color::from_rgba(0.2 * f, f, 0.2 * f, 1.0)?),
        GradientStop::new(1.0, Color::from_rgba(0.0, 0.86 * f, 0.0, 1.0)?),
    ];
    let shader = RadialGradient::new(
        Point::from_xy(cx, cy),
        Point::from_xy(cx, cy),
        r,
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    )?;

    let mut pb = PathBuilder::new();
    pb.push_circle(cx, cy, r);
    let circle = pb.finish()?;

    let paint = Paint {
        shader,
        anti_alias: true,
        ..Default::default()
    };
    pixmap.fill_path(
        &circle,
        &paint,
        tiny_skia::FillRule::Winding,
        Transform::identity(),
        None,
    );

    Some(pixmap)
}
