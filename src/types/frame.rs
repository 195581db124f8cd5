//! Rendered frames and the output unit that accumulates them.

use std::path::{Path, PathBuf};

use crate::error::{Result, RigError};

/// One rendered frame on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDescriptor {
    pub file_path: PathBuf,
    pub frame_index: i64,
    pub rotation_angle: Option<u32>,
    /// Index into the job's animation sets; `None` for stills.
    pub animation_set: Option<usize>,
}

impl FrameDescriptor {
    /// File name of the rendered frame, if it is valid UTF-8.
    pub fn file_name(&self) -> Option<&str> {
        self.file_path.file_name().and_then(|n| n.to_str())
    }
}

/// Frames destined for one spritesheet plus the scratch directory they live in.
///
/// Dropping the unit removes the scratch directory (best effort).
#[derive(Debug)]
pub struct OutputUnit {
    scratch: tempfile::TempDir,
    frames: Vec<FrameDescriptor>,
    pub frames_since_last_flush: usize,
}

impl OutputUnit {
    /// Create an empty unit with a fresh scratch directory.
    pub fn new() -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix("spriterig-unit-")
            .tempdir()
            .map_err(|e| {
                RigError::io(
                    std::env::temp_dir(),
                    format!("Failed to create scratch directory: {}", e),
                )
            })?;

        Ok(Self {
            scratch,
            frames: Vec::new(),
            frames_since_last_flush: 0,
        })
    }

    /// Directory the unit renders frames into.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Record a rendered frame.
    pub fn push(&mut self, frame: FrameDescriptor) {
        self.frames.push(frame);
        self.frames_since_last_flush += 1;
    }

    /// Frames rendered into this unit so far, in render order.
    pub fn frames(&self) -> &[FrameDescriptor] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}
