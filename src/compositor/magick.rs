//! ImageMagick command-line compositor.
//!
//! ImageMagick 7 exposes everything through one `magick` binary
//! (`magick montage ...`); older installs ship separate `montage` and
//! `convert` programs. Both layouts are supported.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Result, RigError};

use super::{CompositeTool, MontageRequest, ToolOutput};

/// Environment variable naming the `magick` executable.
pub const MAGICK_ENV: &str = "SPRITERIG_MAGICK";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Install {
    /// ImageMagick 7: subcommands of one `magick` program.
    Unified(PathBuf),
    /// ImageMagick 6: separate programs.
    Split { montage: PathBuf, convert: PathBuf },
}

/// Composites spritesheets by running ImageMagick.
#[derive(Debug, Clone)]
pub struct MagickTool {
    install: Install,
}

impl MagickTool {
    /// Use a specific `magick` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            install: Install::Unified(program.into()),
        }
    }

    /// Find ImageMagick: explicit program, then `SPRITERIG_MAGICK`, then
    /// `magick` on `PATH`, then `montage` and `convert` on `PATH`.
    pub fn locate(program: Option<&Path>) -> Result<Self> {
        if let Some(program) = program {
            return Ok(Self::with_program(program));
        }

        if let Ok(path) = std::env::var(MAGICK_ENV) {
            return Ok(Self::with_program(path));
        }

        if let Ok(path) = which::which("magick") {
            return Ok(Self::with_program(path));
        }

        match (which::which("montage"), which::which("convert")) {
            (Ok(montage), Ok(convert)) => Ok(Self {
                install: Install::Split { montage, convert },
            }),
            _ => Err(RigError::preflight(
                "ImageMagick not found",
                format!(
                    "Install ImageMagick, set {} to the magick executable, or use `compositor: {{ kind: builtin }}`",
                    MAGICK_ENV
                ),
            )),
        }
    }

    /// Command running the montage tool, with leading subcommand if any.
    fn montage_command(&self) -> Command {
        match &self.install {
            Install::Unified(magick) => {
                let mut cmd = Command::new(magick);
                cmd.arg("montage");
                cmd
            }
            Install::Split { montage, .. } => Command::new(montage),
        }
    }

    /// Command running the single-image converter.
    fn convert_command(&self) -> Command {
        match &self.install {
            Install::Unified(magick) => Command::new(magick),
            Install::Split { convert, .. } => Command::new(convert),
        }
    }
}

impl CompositeTool for MagickTool {
    fn name(&self) -> &str {
        match self.install {
            Install::Unified(_) => "magick",
            Install::Split { .. } => "montage",
        }
    }

    fn ensure_available(&self) -> Result<()> {
        let mut cmd = match &self.install {
            Install::Unified(magick) => Command::new(magick),
            Install::Split { montage, .. } => Command::new(montage),
        };
        cmd.arg("-version");

        let output = run(cmd);
        if output.success {
            Ok(())
        } else {
            Err(RigError::preflight(
                format!("ImageMagick is not runnable: {}", output.stderr.trim()),
                format!("Check the compositor program in the job file or {}", MAGICK_ENV),
            ))
        }
    }

    fn montage(&self, request: &MontageRequest<'_>) -> ToolOutput {
        let list = match write_file_list(request.inputs) {
            Ok(list) => list,
            Err(e) => return ToolOutput::failed(-1, e),
        };

        let mut cmd = self.montage_command();
        cmd.arg(format!("@{}", list.path().display()))
            .args(montage_args(request))
            .arg(request.output);

        run(cmd)
    }

    fn extend(&self, image: &Path, (width, height): (u32, u32)) -> ToolOutput {
        let mut cmd = self.convert_command();
        cmd.arg(image)
            .args(["-background", "none", "-gravity", "NorthWest", "-extent"])
            .arg(format!("{}x{}", width, height))
            .arg(image);
        run(cmd)
    }

    fn squarify(&self, image: &Path, side: u32) -> ToolOutput {
        let mut cmd = self.convert_command();
        cmd.arg(image)
            .args(["-background", "none", "-trim", "+repage", "-resize"])
            .arg(format!("{}x{}!", side, side))
            .arg(image);
        run(cmd)
    }
}

/// Arguments between the file list and the output path.
fn montage_args(request: &MontageRequest<'_>) -> Vec<String> {
    let (w, h) = request.cell;
    vec![
        "-geometry".to_string(),
        format!("{}x{}+0+0", w, h),
        "-tile".to_string(),
        format!("{}x{}", request.grid.columns, request.grid.rows),
        "-background".to_string(),
        "none".to_string(),
    ]
}

/// Write input paths to a list file for `@file` expansion, one quoted path
/// per line.
///
/// The list sits beside the scratch directory holding the inputs so it never
/// shows up as a frame. ImageMagick has no escape for a quote inside a quoted
/// token, so such paths are refused.
fn write_file_list(inputs: &[PathBuf]) -> std::result::Result<tempfile::NamedTempFile, String> {
    if let Some(bad) = inputs.iter().find(|p| p.to_string_lossy().contains('"')) {
        return Err(format!(
            "Frame path {} contains a double quote and cannot be listed",
            bad.display()
        ));
    }

    let dir = inputs
        .first()
        .and_then(|p| p.parent())
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(std::env::temp_dir, Path::to_path_buf);

    let mut list = tempfile::Builder::new()
        .prefix("spriterig-frames-")
        .suffix(".txt")
        .tempfile_in(&dir)
        .map_err(|e| format!("Failed to create frame list in {}: {}", dir.display(), e))?;

    for input in inputs {
        writeln!(list, "\"{}\"", input.display())
            .map_err(|e| format!("Failed to write frame list: {}", e))?;
    }
    list.flush()
        .map_err(|e| format!("Failed to write frame list: {}", e))?;
    Ok(list)
}

/// Run a command to completion, capturing stderr. No timeout is applied.
fn run(mut cmd: Command) -> ToolOutput {
    tracing::debug!(command = ?cmd, "running compositor");

    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output();

    match output {
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if output.status.success() {
                ToolOutput {
                    success: true,
                    exit_code: 0,
                    stderr,
                }
            } else {
                ToolOutput::failed(output.status.code().unwrap_or(-1), stderr)
            }
        }
        Err(e) => ToolOutput::failed(-1, format!("failed to spawn {:?}: {}", cmd.get_program(), e)),
    }
}
