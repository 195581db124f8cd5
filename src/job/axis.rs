//! Axis resolution.
//!
//! Turns the job toggles into the three enumeration axes. Enumeration order
//! is material set (outermost), then rotation, then animation set; that
//! order decides how frames group into output files.

use crate::config::RenderJobConfig;

/// The resolved enumeration space for one job.
///
/// A disabled axis holds exactly one `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    /// Indices into `material_sets`.
    pub materials: Vec<Option<usize>>,
    /// Rotation angles in whole degrees.
    pub rotations: Vec<Option<u32>>,
    /// Indices into `animation_sets`.
    pub animations: Vec<Option<usize>>,
    pub separate_files_per_animation: bool,
    pub separate_files_per_rotation: bool,
}

impl Axes {
    /// Resolve the axes of a job. Disabled axes hold a single `None`.
    pub fn resolve(config: &RenderJobConfig) -> Self {
        let materials = if config.control_materials {
            (0..config.material_sets.len()).map(Some).collect()
        } else {
            vec![None]
        };

        let rotations = if config.control_rotation {
            rotation_angles(config.rotation_count)
                .into_iter()
                .map(Some)
                .collect()
        } else {
            vec![None]
        };

        let animations = if config.control_animations {
            (0..config.animation_sets.len()).map(Some).collect()
        } else {
            vec![None]
        };

        Self {
            materials,
            rotations,
            animations,
            // Separation only means something when the axis varies
            separate_files_per_animation: config.control_animations
                && config.separate_per_animation,
            separate_files_per_rotation: config.control_rotation && config.separate_per_rotation,
        }
    }

    pub fn materials_enabled(&self) -> bool {
        self.materials.first().is_some_and(Option::is_some)
    }

    pub fn rotations_enabled(&self) -> bool {
        self.rotations.first().is_some_and(Option::is_some)
    }

    pub fn animations_enabled(&self) -> bool {
        self.animations.first().is_some_and(Option::is_some)
    }

    /// Number of distinct sidecar files the job should produce.
    ///
    /// Material sets never split sidecars; they share one document.
    pub fn expected_sidecar_count(&self) -> usize {
        let rotations = if self.separate_files_per_rotation {
            self.rotations.len()
        } else {
            1
        };
        let animations = if self.separate_files_per_animation {
            self.animations.len()
        } else {
            1
        };
        rotations * animations
    }
}

/// Angles for `count` evenly spaced rotations, rounded to the nearest degree.
///
/// When 360 isn't divisible by `count` the steps are uneven (7 rotations
/// give 0, 51, 103, 154, 206, 257, 309). Consumers read the angle from the
/// sidecar rather than assuming a fixed step.
pub fn rotation_angles(count: u32) -> Vec<u32> {
    if count == 0 {
        return vec![];
    }
    let count = u64::from(count);
    (0..count)
        .map(|n| ((2 * n * 360 + count) / (2 * count)) as u32)
        .collect()
}
