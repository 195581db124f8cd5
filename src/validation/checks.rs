//! Individual validation checks over a job configuration.

use std::collections::HashSet;

use super::{Diagnostic, ValidationResult};
use crate::config::RenderJobConfig;
use crate::job::JobPlan;
use crate::output::display_path;
use crate::types::MaterialAssignment;

/// Highest rotation count whose rounded angles stay distinct.
const MAX_ROTATION_COUNT: u32 = 360;

/// Names end up in file names, so they must be non-empty single path segments.
fn path_safe(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control)
}

/// Whether frames of `longer` sort inside a run of frames of `shorter`.
///
/// Frame files are `<anim>_[rot<NNN>_]<frame>`. A name that continues
/// `shorter` with `_`, then the rotation token when rotations are in the
/// names, then a digit, reads like one of `shorter`'s frame indices.
fn extends_frame_name(longer: &str, shorter: &str, rotations: bool) -> bool {
    let Some(mut rest) = longer
        .strip_prefix(shorter)
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };

    if rotations {
        match strip_rotation_token(rest) {
            Some(after) => rest = after,
            None => return false,
        }
    }
    rest.starts_with(|c: char| c.is_ascii_digit())
}

/// `rot<NNN>_` prefix as written into frame names.
fn strip_rotation_token(name: &str) -> Option<&str> {
    let digits = name.strip_prefix("rot")?;
    let (angle, rest) = (digits.get(..3)?, digits.get(3..)?);
    if !angle.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.strip_prefix('_')
}

/// Check sprite size, frame rate and base object name.
pub fn check_output_settings(config: &RenderJobConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    if config.sprite_width == 0 || config.sprite_height == 0 {
        result.push(
            Diagnostic::error(
                "spriterig::validate::sprite-size",
                format!(
                    "Sprite size {}x{} has a zero dimension",
                    config.sprite_width, config.sprite_height
                ),
            )
            .with_help("Set sprite_width and sprite_height to at least 1"),
        );
    }

    if !path_safe(&config.base_object_name) {
        result.push(
            Diagnostic::error(
                "spriterig::validate::base-name",
                format!(
                    "Base object name '{}' cannot be used as a file name",
                    config.base_object_name
                ),
            )
            .with_help("Use a non-empty name without path separators"),
        );
    }

    if config.control_animations && config.frame_rate == 0 {
        result.push(Diagnostic::warning(
            "spriterig::validate::frame-rate",
            "Frame rate is 0; animation records will not play back",
        ));
    }

    result
}

/// Check the material axis: sets exist, names are unique and usable, and
/// per-target lists match the target count.
pub fn check_materials(config: &RenderJobConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !config.control_materials {
        return result;
    }

    if config.material_sets.is_empty() {
        result.push(
            Diagnostic::error(
                "spriterig::validate::no-material-sets",
                "Material control is enabled but no material sets are defined",
            )
            .with_help("Add entries to material_sets or set control_materials: false"),
        );
        return result;
    }

    let mut seen = HashSet::new();
    for set in &config.material_sets {
        if !path_safe(&set.name) {
            result.push(Diagnostic::error(
                "spriterig::validate::material-name",
                format!("Material set name '{}' cannot be used as a file name", set.name),
            ));
        } else if !seen.insert(set.name.as_str()) {
            result.push(
                Diagnostic::error(
                    "spriterig::validate::duplicate-material-set",
                    format!("Material set '{}' is defined more than once", set.name),
                )
                .with_help("Each material set writes its own spritesheet; names must be unique"),
            );
        }

        if let MaterialAssignment::Individual(materials) = &set.materials {
            let targets = config.target_count();
            if materials.len() != targets {
                result.push(Diagnostic::warning(
                    "spriterig::validate::material-count",
                    format!(
                        "Material set '{}' lists {} materials for {}",
                        set.name,
                        materials.len(),
                        crate::output::plural(targets, "target", "targets")
                    ),
                ));
            }
        }
    }

    result
}

/// Check the rotation axis.
pub fn check_rotations(config: &RenderJobConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !config.control_rotation {
        if config.separate_per_rotation {
            result.push(Diagnostic::warning(
                "spriterig::validate::unused-separation",
                "separate_per_rotation has no effect while control_rotation is disabled",
            ));
        }
        return result;
    }

    if config.rotation_count == 0 {
        result.push(
            Diagnostic::error(
                "spriterig::validate::rotation-count",
                "Rotation control is enabled with a rotation count of 0",
            )
            .with_help("Set rotation_count to at least 1"),
        );
    } else if config.rotation_count > MAX_ROTATION_COUNT {
        result.push(Diagnostic::error(
            "spriterig::validate::rotation-count",
            format!(
                "Rotation count {} exceeds {}; rounded angles would collide",
                config.rotation_count, MAX_ROTATION_COUNT
            ),
        ));
    } else if 360 % config.rotation_count != 0 {
        result.push(Diagnostic::warning(
            "spriterig::validate::uneven-rotation",
            format!(
                "360 is not divisible by {}; angles are rounded to whole degrees",
                config.rotation_count
            ),
        ));
    }

    result
}

/// Check the animation axis: sets exist, names are unique and usable, and
/// frame ranges are non-negative and non-empty.
pub fn check_animations(config: &RenderJobConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !config.control_animations {
        if config.separate_per_animation {
            result.push(Diagnostic::warning(
                "spriterig::validate::unused-separation",
                "separate_per_animation has no effect while control_animations is disabled",
            ));
        }
        return result;
    }

    if config.animation_sets.is_empty() {
        result.push(
            Diagnostic::error(
                "spriterig::validate::no-animation-sets",
                "Animation control is enabled but no animation sets are defined",
            )
            .with_help("Add entries to animation_sets or set control_animations: false"),
        );
        return result;
    }

    let mut seen = HashSet::new();
    for anim in &config.animation_sets {
        if !path_safe(&anim.name) {
            result.push(Diagnostic::error(
                "spriterig::validate::animation-name",
                format!("Animation name '{}' cannot be used as a file name", anim.name),
            ));
        } else if !seen.insert(anim.name.as_str()) {
            result.push(Diagnostic::error(
                "spriterig::validate::duplicate-animation",
                format!("Animation '{}' is defined more than once", anim.name),
            ));
        }

        let (min, max) = anim.frame_range;
        if !min.is_finite() || !max.is_finite() {
            result.push(Diagnostic::error(
                "spriterig::validate::frame-range",
                format!("Animation '{}' has a non-finite frame range", anim.name),
            ));
        } else if min < 0.0 {
            result.push(
                Diagnostic::error(
                    "spriterig::validate::frame-range",
                    format!(
                        "Animation '{}' starts at negative frame {}",
                        anim.name, min
                    ),
                )
                .with_help("Frame file names only sort correctly for non-negative frames"),
            );
        } else if max < min {
            result.push(Diagnostic::error(
                "spriterig::validate::frame-range",
                format!(
                    "Animation '{}' has an inverted frame range ({}, {})",
                    anim.name, min, max
                ),
            ));
        }
    }

    for anim in &config.animation_sets {
        let shadowed = config.animation_sets.iter().find(|other| {
            extends_frame_name(&anim.name, &other.name, config.control_rotation)
        });
        if let Some(other) = shadowed {
            result.push(
                Diagnostic::error(
                    "spriterig::validate::name-prefix",
                    format!(
                        "Animation '{}' frame files would sort among the frames of '{}'",
                        anim.name, other.name
                    ),
                )
                .with_help(format!(
                    "Rename '{}' so it doesn't continue '{}_' with a frame or rotation token",
                    anim.name, other.name
                )),
            );
        }
    }

    result
}

/// Check that no two output units write the same spritesheet.
///
/// Image names join material and animation names with `_`, so distinct
/// combinations can still produce the same file name.
pub fn check_output_paths(config: &RenderJobConfig) -> ValidationResult {
    let mut result = ValidationResult::new();
    let plan = JobPlan::new(config);

    let mut seen = HashSet::new();
    for unit in plan.units() {
        let path = plan.names.image_path(&unit.key);
        if !seen.insert(path.clone()) {
            result.push(
                Diagnostic::error(
                    "spriterig::validate::output-collision",
                    format!(
                        "Two output units write the same spritesheet {}",
                        display_path(&path)
                    ),
                )
                .with_help("Rename material or animation sets so their joined names differ"),
            );
        }
    }

    result
}
