//! End-of-job consistency checks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, RigError};
use crate::sidecar::SidecarDocument;

use super::JobProgressState;

/// Verify a finished job: every frame rendered, one sidecar per expected
/// output, and every image a sidecar references present on disk.
pub fn check_job(
    progress: &JobProgressState,
    documents: &BTreeMap<PathBuf, SidecarDocument>,
    expected_sidecars: usize,
    output_dir: &Path,
) -> Result<()> {
    if progress.current_frame_num != progress.total_num_frames {
        return Err(RigError::consistency(format!(
            "rendered {} frames, expected {}",
            progress.current_frame_num, progress.total_num_frames
        )));
    }

    if documents.len() != expected_sidecars {
        return Err(RigError::consistency(format!(
            "wrote {} sidecar files, expected {}",
            documents.len(),
            expected_sidecars
        )));
    }

    for (sidecar, document) in documents {
        for file in document.referenced_images() {
            let path = output_dir.join(file);
            if !path.is_file() {
                return Err(RigError::consistency(format!(
                    "{} references missing image {}",
                    sidecar.display(),
                    path.display()
                )));
            }
        }
    }

    Ok(())
}
