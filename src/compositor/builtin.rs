//! In-process compositing with the `image` crate.
//!
//! Mirrors the ImageMagick contract closely enough that sidecars produced
//! either way are interchangeable. Failures are reported as a failed
//! [`ToolOutput`] with the error text in `stderr`, like a real tool.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::Result;

use super::{CompositeTool, MontageRequest, ToolOutput};

/// Composites spritesheets without any external program.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTool;

impl CompositeTool for BuiltinTool {
    fn name(&self) -> &str {
        "builtin"
    }

    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }

    fn montage(&self, request: &MontageRequest<'_>) -> ToolOutput {
        into_output(montage(request))
    }

    fn extend(&self, image: &Path, size: (u32, u32)) -> ToolOutput {
        into_output(extend(image, size))
    }

    fn squarify(&self, image: &Path, side: u32) -> ToolOutput {
        into_output(squarify(image, side))
    }
}

fn into_output(result: std::result::Result<(), String>) -> ToolOutput {
    match result {
        Ok(()) => ToolOutput::ok(),
        Err(message) => ToolOutput::failed(1, message),
    }
}

fn montage(request: &MontageRequest<'_>) -> std::result::Result<(), String> {
    let (cell_w, cell_h) = request.cell;
    let columns = request.grid.columns.max(1);
    let mut sheet = RgbaImage::from_pixel(
        request.grid.columns * cell_w,
        request.grid.rows * cell_h,
        Rgba([0, 0, 0, 0]),
    );

    for (i, input) in request.inputs.iter().enumerate() {
        let mut frame = open_rgba(input)?;
        if frame.dimensions() != (cell_w, cell_h) {
            frame = imageops::resize(&frame, cell_w, cell_h, FilterType::Triangle);
        }
        let i = i as u32;
        let x = (i % columns) * cell_w;
        let y = (i / columns) * cell_h;
        imageops::replace(&mut sheet, &frame, i64::from(x), i64::from(y));
    }

    save(&sheet, request.output)
}

fn extend(path: &Path, (width, height): (u32, u32)) -> std::result::Result<(), String> {
    let source = open_rgba(path)?;
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    imageops::replace(&mut canvas, &source, 0, 0);
    save(&canvas, path)
}

fn squarify(path: &Path, side: u32) -> std::result::Result<(), String> {
    let source = open_rgba(path)?;
    let trimmed = match opaque_bounds(&source) {
        Some((x, y, w, h)) => imageops::crop_imm(&source, x, y, w, h).to_image(),
        None => source,
    };
    let squared = imageops::resize(&trimmed, side, side, FilterType::Triangle);
    save(&squared, path)
}

/// Bounding box `(x, y, w, h)` of pixels with non-zero alpha.
fn opaque_bounds(img: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

fn open_rgba(path: &Path) -> std::result::Result<RgbaImage, String> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| format!("unable to open image '{}': {}", path.display(), e))
}

fn save(img: &RgbaImage, path: &Path) -> std::result::Result<(), String> {
    img.save(path)
        .map_err(|e| format!("unable to write image '{}': {}", path.display(), e))
}
