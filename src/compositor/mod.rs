//! Spritesheet compositing.
//!
//! The adapter lists a unit's frame files, works out the grid, and hands the
//! actual pixel work to a [`CompositeTool`]: ImageMagick on the command line
//! ([`MagickTool`]) or the in-process [`BuiltinTool`]. Both follow the same
//! contract: inputs are tiled left-to-right, top-to-bottom in the order
//! given, with no spacing and a transparent background.

mod builtin;
mod magick;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::CompositorConfig;
use crate::error::{Result, RigError};

pub use builtin::BuiltinTool;
pub use magick::MagickTool;

/// Rows and columns of a spritesheet grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
}

impl GridLayout {
    /// Grid for `frames` images: `rows = floor(sqrt(n))`,
    /// `columns = ceil(n / rows)`.
    ///
    /// Sheets lean wide when `n` isn't a perfect square and may end with
    /// empty trailing cells (15 frames give 5x3, 10 give 4x3 with two unused
    /// cells). Sidecar consumers rely on this exact formula.
    pub fn for_frames(frames: u32) -> Self {
        if frames == 0 {
            return Self { columns: 0, rows: 0 };
        }
        let rows = integer_sqrt(frames);
        Self {
            columns: frames.div_ceil(rows),
            rows,
        }
    }

    /// Total cells in the grid.
    pub fn cells(&self) -> u32 {
        self.columns * self.rows
    }
}

fn integer_sqrt(n: u32) -> u32 {
    let mut root = (n as f64).sqrt() as u32;
    // Correct float rounding at the edges
    while u64::from(root) * u64::from(root) > u64::from(n) {
        root -= 1;
    }
    while u64::from(root + 1) * u64::from(root + 1) <= u64::from(n) {
        root += 1;
    }
    root
}

/// Smallest power of two >= `n`, with `next_power_of_two(0) == 1`.
pub fn next_power_of_two(n: u32) -> u32 {
    if n == 0 {
        return 1;
    }
    n.next_power_of_two()
}

/// Result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    pub exit_code: i32,
    pub stderr: String,
}

impl ToolOutput {
    /// A successful run with empty stderr.
    pub fn ok() -> Self {
        Self {
            success: true,
            exit_code: 0,
            stderr: String::new(),
        }
    }

    /// A failed run with its exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code,
            stderr: stderr.into(),
        }
    }
}

/// A montage request: tile `inputs` into `output`.
#[derive(Debug, Clone)]
pub struct MontageRequest<'a> {
    pub inputs: &'a [PathBuf],
    pub cell: (u32, u32),
    pub grid: GridLayout,
    pub output: &'a Path,
}

/// An image-assembly tool.
pub trait CompositeTool {
    /// Short name used in messages.
    fn name(&self) -> &str;

    /// Check the tool can run at all. Called before a job mutates anything.
    fn ensure_available(&self) -> Result<()>;

    /// Tile the inputs into one image.
    fn montage(&self, request: &MontageRequest<'_>) -> ToolOutput;

    /// Extend the canvas to `size`, anchored top-left, transparent fill.
    fn extend(&self, image: &Path, size: (u32, u32)) -> ToolOutput;

    /// Trim transparent margins, then resize to `side`x`side` ignoring
    /// aspect ratio.
    fn squarify(&self, image: &Path, side: u32) -> ToolOutput;
}

/// Build the tool a job file asks for.
pub fn tool_from_config(config: &CompositorConfig) -> Result<Box<dyn CompositeTool>> {
    match config {
        CompositorConfig::Magick { program } => {
            Ok(Box::new(MagickTool::locate(program.as_deref())?))
        }
        CompositorConfig::Builtin => Ok(Box::new(BuiltinTool)),
    }
}

/// Outcome of one compositing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositorResult {
    /// Frame files in the order they were tiled.
    pub ordered_input_files: Vec<PathBuf>,
    pub num_columns: u32,
    pub num_rows: u32,
    pub output_file_path: PathBuf,
    pub output_image_size: (u32, u32),
    /// Transparent pixels added right and bottom by power-of-two padding.
    pub padding: (u32, u32),
    pub succeeded: bool,
    pub exit_code: i32,
    pub stderr: String,
}

impl CompositorResult {
    /// Position of a frame file in the tiled order, matched by file name.
    pub fn position_of(&self, file_name: &str) -> Option<usize> {
        self.ordered_input_files
            .iter()
            .position(|p| p.file_name().and_then(|n| n.to_str()) == Some(file_name))
    }
}

/// What power-of-two padding did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadOutcome {
    /// Both dimensions were already powers of two.
    Skipped,
    Padded { from: (u32, u32), to: (u32, u32) },
}

/// Drives a [`CompositeTool`] for one job.
pub struct Compositor {
    tool: Box<dyn CompositeTool>,
}

impl Compositor {
    /// Wrap a tool backend.
    pub fn new(tool: Box<dyn CompositeTool>) -> Self {
        Self { tool }
    }

    /// Name of the backing tool.
    pub fn tool_name(&self) -> &str {
        self.tool.name()
    }

    /// Fail with a preflight error when the tool cannot run.
    pub fn ensure_available(&self) -> Result<()> {
        self.tool.ensure_available()
    }

    /// Tile every frame image in `scratch_dir` into `output_path`.
    ///
    /// Frames are ordered by file name; that order is reported back as
    /// `ordered_input_files` and is the ground truth for sidecar indices.
    /// A failing tool yields `succeeded == false` rather than an error.
    pub fn assemble(
        &self,
        sprite_size: (u32, u32),
        total_frames: usize,
        scratch_dir: &Path,
        output_path: &Path,
    ) -> Result<CompositorResult> {
        let inputs = list_frame_images(scratch_dir)?;
        if inputs.len() != total_frames {
            return Err(RigError::consistency(format!(
                "Expected {} frame images in {}, found {}",
                total_frames,
                scratch_dir.display(),
                inputs.len()
            )));
        }

        let grid = GridLayout::for_frames(total_frames as u32);
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RigError::io(parent, format!("Failed to create output directory: {}", e))
            })?;
        }

        tracing::debug!(
            tool = self.tool.name(),
            frames = total_frames,
            columns = grid.columns,
            rows = grid.rows,
            output = %output_path.display(),
            "assembling spritesheet"
        );

        let output = self.tool.montage(&MontageRequest {
            inputs: &inputs,
            cell: sprite_size,
            grid,
            output: output_path,
        });

        let output_image_size = if output.success {
            image_size(output_path)?
        } else {
            (0, 0)
        };

        Ok(CompositorResult {
            ordered_input_files: inputs,
            num_columns: grid.columns,
            num_rows: grid.rows,
            output_file_path: output_path.to_path_buf(),
            output_image_size,
            padding: (0, 0),
            succeeded: output.success,
            exit_code: output.exit_code,
            stderr: output.stderr,
        })
    }

    /// Turn a failed montage into an error carrying the tool's stderr.
    pub fn ensure_succeeded(&self, result: &CompositorResult) -> Result<()> {
        self.check(ToolOutput {
            success: result.succeeded,
            exit_code: result.exit_code,
            stderr: result.stderr.clone(),
        })
    }

    /// Pad each dimension up to the next power of two.
    ///
    /// Updates `result.output_image_size` and `result.padding`.
    pub fn pad_to_power_of_two(&self, result: &mut CompositorResult) -> Result<PadOutcome> {
        let (w, h) = result.output_image_size;
        let target = (next_power_of_two(w), next_power_of_two(h));
        if target == (w, h) {
            return Ok(PadOutcome::Skipped);
        }

        let output = self.tool.extend(&result.output_file_path, target);
        self.check(output)?;

        result.padding = (target.0 - w, target.1 - h);
        result.output_image_size = target;
        Ok(PadOutcome::Padded {
            from: (w, h),
            to: target,
        })
    }

    /// Force a square canvas of side `max(w, h)`.
    pub fn force_square(&self, result: &mut CompositorResult) -> Result<(u32, u32)> {
        let (w, h) = result.output_image_size;
        let side = w.max(h);

        let output = self.tool.squarify(&result.output_file_path, side);
        self.check(output)?;

        result.output_image_size = image_size(&result.output_file_path)?;
        Ok(result.output_image_size)
    }

    fn check(&self, output: ToolOutput) -> Result<()> {
        if output.success {
            Ok(())
        } else {
            Err(RigError::ExternalTool {
                tool: self.tool.name().to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            })
        }
    }
}

/// PNG files directly inside `dir`, sorted by file name.
pub fn list_frame_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| RigError::io(dir, e.to_string()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "png") {
            files.push(path.to_path_buf());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn image_size(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path)
        .map_err(|e| RigError::io(path, format!("Failed to read image size: {}", e)))
}
