//! Placeholder frames drawn in-process.
//!
//! Each frame is the material set's swatch colour inset from a transparent
//! border, with a white pointer for the rotation angle and a tick along the
//! bottom edge for the frame index. Enough to check layout and ordering of a
//! job without a real renderer.

use image::{Rgba, RgbaImage};

use crate::error::{Result, RigError};
use crate::types::Colour;

use super::{FrameRenderer, FrameRequest, SceneState};

/// Renders flat swatch frames with the `image` crate.
#[derive(Debug, Default)]
pub struct SwatchRenderer {
    scene: SceneState,
}

impl SwatchRenderer {
    /// A swatch renderer with a default scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// The scene as last rendered.
    pub fn scene(&self) -> &SceneState {
        &self.scene
    }
}

impl FrameRenderer for SwatchRenderer {
    type Snapshot = SceneState;

    fn snapshot(&mut self) -> SceneState {
        self.scene.clone()
    }

    fn restore(&mut self, snapshot: SceneState) {
        self.scene = snapshot;
    }

    fn render_frame(&mut self, request: &FrameRequest<'_>) -> Result<()> {
        self.scene = SceneState::from_request(request);

        let img = draw_swatch(request);
        img.save(request.output_path).map_err(|e| RigError::Render {
            message: format!(
                "Failed to write frame {}: {}",
                request.output_path.display(),
                e
            ),
        })
    }
}

fn draw_swatch(request: &FrameRequest<'_>) -> RgbaImage {
    let (width, height) = request.sprite_size;
    let colour = request
        .material_set
        .map_or(Colour::WHITE, |set| set.swatch_colour());

    let mut img = RgbaImage::from_pixel(width, height, Rgba(Colour::TRANSPARENT.to_rgba()));
    let inset_x = width / 8;
    let inset_y = height / 8;
    for y in inset_y..height - inset_y {
        for x in inset_x..width - inset_x {
            img.put_pixel(x, y, Rgba(colour.to_rgba()));
        }
    }

    let marker = Rgba(Colour::WHITE.to_rgba());

    if let Some(angle) = request.rotation_angle {
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        let radius = cx.min(cy) * 0.75;
        let (sin, cos) = (angle as f64).to_radians().sin_cos();
        let steps = radius.ceil() as u32;
        for step in 0..=steps {
            let t = step as f64;
            let x = (cx + cos * t).floor();
            let y = (cy - sin * t).floor();
            if x >= 0.0 && y >= 0.0 && (x as u32) < width && (y as u32) < height {
                img.put_pixel(x as u32, y as u32, marker);
            }
        }
    }

    if width > 0 && height > 0 {
        let x = request.frame_index.rem_euclid(i64::from(width)) as u32;
        img.put_pixel(x, height - 1, marker);
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MaterialSet;
    use std::path::Path;

    fn request<'a>(set: Option<&'a MaterialSet>, path: &'a Path) -> FrameRequest<'a> {
        FrameRequest {
            material_set: set,
            targets: &[],
            rotation_angle: Some(90),
            animation: None,
            frame_index: 3,
            sprite_size: (16, 16),
            output_path: path,
        }
    }

    #[test]
    fn test_render_writes_sprite_sized_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still_rot090_0.png");
        let mut set = MaterialSet::shared("steel", "steel");
        set.swatch = Some(Colour::rgb(10, 20, 30));

        let mut renderer = SwatchRenderer::new();
        renderer.render_frame(&request(Some(&set), &path)).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (16, 16));
        // Border stays transparent, body takes the swatch colour
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(3, 12).0, [10, 20, 30, 255]);
        // Frame tick
        assert_eq!(img.get_pixel(3, 15).0, [255, 255, 255, 255]);
        // Pointer straight up from the centre for 90 degrees
        assert_eq!(img.get_pixel(8, 4).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_snapshot_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let set = MaterialSet::shared("steel", "steel");

        let mut renderer = SwatchRenderer::new();
        let before = renderer.snapshot();
        renderer.render_frame(&request(Some(&set), &path)).unwrap();
        assert_eq!(renderer.scene().material_set.as_deref(), Some("steel"));

        renderer.restore(before);
        assert_eq!(renderer.scene(), &SceneState::default());
    }
}
