//! Job file (spriterig.yaml) parsing.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, RigError};
use crate::types::{AnimationSet, MaterialSet};

/// Which frame renderer drives the job.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RendererConfig {
    /// Flat placeholder frames generated in-process.
    #[default]
    Swatch,
    /// An external program run once per frame.
    ///
    /// Arguments may contain `{output}`, `{frame}`, `{rotation}`,
    /// `{material}` and `{animation}` placeholders.
    Command {
        program: PathBuf,
        #[serde(default)]
        args: Vec<String>,
    },
}

/// Which image-assembly tool composites the frames.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompositorConfig {
    /// ImageMagick, found via `program`, `SPRITERIG_MAGICK` or `PATH`.
    Magick {
        #[serde(default)]
        program: Option<PathBuf>,
    },
    /// In-process compositing with the same layout contract.
    Builtin,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        CompositorConfig::Magick { program: None }
    }
}

/// Everything one render job needs. Immutable for the duration of the job.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderJobConfig {
    /// Name written to sidecars and used as the output file stem.
    pub base_object_name: String,

    /// Directory spritesheets and sidecars are written to.
    pub output_dir: PathBuf,

    pub sprite_width: u32,
    pub sprite_height: u32,

    /// Playback rate written to animation records.
    pub frame_rate: u32,

    /// Render targets, in the order `Individual` material lists refer to them.
    pub targets: Vec<String>,

    pub control_materials: bool,
    pub material_sets: Vec<MaterialSet>,

    pub control_rotation: bool,
    pub rotation_count: u32,

    pub control_animations: bool,
    pub animation_sets: Vec<AnimationSet>,

    pub pad_to_power_of_two: bool,
    pub force_square: bool,
    pub separate_per_animation: bool,
    pub separate_per_rotation: bool,

    pub renderer: RendererConfig,
    pub compositor: CompositorConfig,
}

impl Default for RenderJobConfig {
    fn default() -> Self {
        Self {
            base_object_name: "sprite".to_string(),
            output_dir: PathBuf::from("dist"),
            sprite_width: 64,
            sprite_height: 64,
            frame_rate: 24,
            targets: vec![],
            control_materials: false,
            material_sets: vec![],
            control_rotation: false,
            rotation_count: 8,
            control_animations: false,
            animation_sets: vec![],
            pad_to_power_of_two: false,
            force_square: false,
            separate_per_animation: false,
            separate_per_rotation: false,
            renderer: RendererConfig::default(),
            compositor: CompositorConfig::default(),
        }
    }
}

impl RenderJobConfig {
    /// Load a job file, resolving `output_dir` against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RigError::io(path, format!("Failed to read job file: {}", e)))?;

        let mut config = Self::parse(&content)?;
        if config.output_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.output_dir = parent.join(&config.output_dir);
            }
        }
        Ok(config)
    }

    /// Parse a job from YAML.
    pub fn parse(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content).map_err(|e| RigError::Parse {
            message: format!("Invalid job file: {}", e),
            help: Some("Check spriterig.yaml syntax".to_string()),
        })
    }

    /// Sprite cell size as `(width, height)`.
    pub fn sprite_size(&self) -> (u32, u32) {
        (self.sprite_width, self.sprite_height)
    }

    /// Number of render targets, counting the implicit single target.
    pub fn target_count(&self) -> usize {
        self.targets.len().max(1)
    }
}
