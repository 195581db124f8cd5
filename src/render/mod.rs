//! Frame rendering.
//!
//! Producing a frame's pixels is outside the orchestrator: it hands a
//! [`FrameRequest`] to a [`FrameRenderer`] and expects a PNG at the
//! requested path. Renderers also expose their scene state so the
//! orchestrator can put things back the way it found them when a job ends.

mod command;
mod swatch;

use std::path::Path;

use crate::config::{RenderJobConfig, RendererConfig};
use crate::error::Result;
use crate::types::{AnimationSet, MaterialSet};

pub use command::CommandRenderer;
pub use swatch::SwatchRenderer;

/// Everything needed to render one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameRequest<'a> {
    pub material_set: Option<&'a MaterialSet>,
    /// Render targets, in the order material assignments index them.
    pub targets: &'a [String],
    pub rotation_angle: Option<u32>,
    pub animation: Option<&'a AnimationSet>,
    pub frame_index: i64,
    pub sprite_size: (u32, u32),
    pub output_path: &'a Path,
}

/// Scene configuration last applied by a renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneState {
    pub material_set: Option<String>,
    pub rotation_angle: Option<u32>,
    pub animation: Option<String>,
    pub frame_index: i64,
}

impl SceneState {
    pub fn from_request(request: &FrameRequest<'_>) -> Self {
        Self {
            material_set: request.material_set.map(|m| m.name.clone()),
            rotation_angle: request.rotation_angle,
            animation: request.animation.map(|a| a.name.clone()),
            frame_index: request.frame_index,
        }
    }
}

/// Renders single frames to files.
pub trait FrameRenderer {
    type Snapshot;

    /// Capture the scene before a job touches it.
    fn snapshot(&mut self) -> Self::Snapshot;

    /// Put the scene back after a job, on every exit path.
    fn restore(&mut self, snapshot: Self::Snapshot);

    /// Render one frame to `request.output_path`.
    fn render_frame(&mut self, request: &FrameRequest<'_>) -> Result<()>;
}

/// The renderer a job file asks for.
#[derive(Debug)]
pub enum ConfiguredRenderer {
    Swatch(SwatchRenderer),
    Command(CommandRenderer),
}

impl ConfiguredRenderer {
    /// Build the renderer named by the job configuration.
    pub fn from_config(config: &RenderJobConfig) -> Self {
        match &config.renderer {
            RendererConfig::Swatch => ConfiguredRenderer::Swatch(SwatchRenderer::new()),
            RendererConfig::Command { program, args } => {
                ConfiguredRenderer::Command(CommandRenderer::new(program, args.clone()))
            }
        }
    }
}

impl FrameRenderer for ConfiguredRenderer {
    type Snapshot = SceneState;

    fn snapshot(&mut self) -> SceneState {
        match self {
            ConfiguredRenderer::Swatch(r) => r.snapshot(),
            ConfiguredRenderer::Command(r) => r.snapshot(),
        }
    }

    fn restore(&mut self, snapshot: SceneState) {
        match self {
            ConfiguredRenderer::Swatch(r) => r.restore(snapshot),
            ConfiguredRenderer::Command(r) => r.restore(snapshot),
        }
    }

    fn render_frame(&mut self, request: &FrameRequest<'_>) -> Result<()> {
        match self {
            ConfiguredRenderer::Swatch(r) => r.render_frame(request),
            ConfiguredRenderer::Command(r) => r.render_frame(request),
        }
    }
}
