//! Per-frame external render command.
//!
//! Runs a program once per frame, typically a 3D package in background
//! mode with a small driver script, substituting the frame's settings into
//! its arguments.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Result, RigError};

use super::{FrameRenderer, FrameRequest, SceneState};

/// Renders frames by running an external program.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: PathBuf,
    args: Vec<String>,
    scene: SceneState,
}

impl CommandRenderer {
    /// Run `program` with templated `args` once per frame.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            scene: SceneState::default(),
        }
    }

    /// Executable run for each frame.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments with placeholders filled in for one frame.
    pub fn expand_args(&self, request: &FrameRequest<'_>) -> Vec<String> {
        let material = request.material_set.map_or("", |m| m.name.as_str());
        let animation = request.animation.map_or("", |a| a.name.as_str());
        let rotation = request
            .rotation_angle
            .map_or_else(String::new, |a| a.to_string());
        let materials = request
            .material_set
            .map(|set| {
                (0..request.targets.len().max(1))
                    .map(|i| set.material_at(i).unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();

        self.args
            .iter()
            .map(|arg| {
                arg.replace("{output}", &request.output_path.display().to_string())
                    .replace("{frame}", &request.frame_index.to_string())
                    .replace("{rotation}", &rotation)
                    .replace("{materials}", &materials)
                    .replace("{material}", material)
                    .replace("{animation}", animation)
                    .replace("{width}", &request.sprite_size.0.to_string())
                    .replace("{height}", &request.sprite_size.1.to_string())
            })
            .collect()
    }
}

impl FrameRenderer for CommandRenderer {
    type Snapshot = SceneState;

    fn snapshot(&mut self) -> SceneState {
        self.scene.clone()
    }

    fn restore(&mut self, snapshot: SceneState) {
        self.scene = snapshot;
    }

    fn render_frame(&mut self, request: &FrameRequest<'_>) -> Result<()> {
        let args = self.expand_args(request);
        tracing::debug!(program = %self.program.display(), ?args, "rendering frame");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| RigError::Render {
                message: format!("Failed to spawn {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            return Err(RigError::Render {
                message: format!(
                    "{} exited with status {}: {}",
                    self.program.display(),
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        if !request.output_path.is_file() {
            return Err(RigError::Render {
                message: format!(
                    "{} did not produce {}",
                    self.program.display(),
                    request.output_path.display()
                ),
            });
        }

        self.scene = SceneState::from_request(request);
        Ok(())
    }
}
