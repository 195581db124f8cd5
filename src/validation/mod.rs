//! Preflight validation for render jobs.
//!
//! Runs a suite of checks against a job configuration and reports errors
//! and warnings. Used by both `spriterig check` and the job orchestrator
//! before any scene state is touched. The first error is the reason the
//! job cannot start.

mod checks;
mod diagnostic;

pub use diagnostic::{Diagnostic, Severity, ValidationResult};

use crate::config::RenderJobConfig;
use crate::output::{plural, Printer};

/// Run all validation checks against the job configuration.
pub fn validate_job(config: &RenderJobConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_output_settings(config));
    result.merge(checks::check_materials(config));
    result.merge(checks::check_rotations(config));
    result.merge(checks::check_animations(config));

    // Planning assumes the axes above are usable
    if !result.has_errors() {
        result.merge(checks::check_output_paths(config));
    }

    result
}

/// Print diagnostics to stderr.
pub fn print_diagnostics(printer: &Printer, result: &ValidationResult) {
    for d in result.iter() {
        let label = printer.severity(
            &d.severity.to_string(),
            d.severity == Severity::Error,
        );
        eprintln!("{}[{}]: {}", label, d.code, d.message);
        if let Some(help) = &d.help {
            eprintln!("  {} {}", printer.dim("help:"), help);
        }
    }

    let errors = result.error_count();
    let warnings = result.warning_count();

    if errors > 0 {
        printer.error(
            "Failed",
            &format!(
                "validation: {}, {}",
                plural(errors, "error", "errors"),
                plural(warnings, "warning", "warnings")
            ),
        );
    } else if warnings > 0 {
        printer.warning(
            "Checked",
            &format!("job ({})", plural(warnings, "warning", "warnings")),
        );
    } else {
        printer.success("Checked", "job");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnimationSet, MaterialSet};

    #[test]
    fn test_validate_default_job() {
        let result = validate_job(&RenderJobConfig::default());
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_full_job() {
        let config = RenderJobConfig {
            control_materials: true,
            material_sets: vec![MaterialSet::shared("red", "red_mat")],
            control_rotation: true,
            rotation_count: 4,
            control_animations: true,
            animation_sets: vec![AnimationSet::new("walk", 1.0, 10.0)],
            ..Default::default()
        };
        assert!(!validate_job(&config).has_errors());
    }

    #[test]
    fn test_output_collision_checked_once_axes_are_valid() {
        let mut config = RenderJobConfig {
            control_materials: true,
            material_sets: vec![MaterialSet::shared("a", "m"), MaterialSet::shared("a_b", "n")],
            control_animations: true,
            animation_sets: vec![
                AnimationSet::new("c", 0.0, 1.0),
                AnimationSet::new("b_c", 0.0, 1.0),
            ],
            separate_per_animation: true,
            ..Default::default()
        };
        assert_eq!(
            validate_job(&config).disabled_reason().unwrap().code,
            "spriterig::validate::output-collision"
        );

        config.sprite_width = 0;
        let result = validate_job(&config);
        assert_eq!(result.error_count(), 1);
        assert_eq!(
            result.disabled_reason().unwrap().code,
            "spriterig::validate::sprite-size"
        );
    }

    #[test]
    fn test_disabled_reason_comes_from_first_failing_check() {
        let config = RenderJobConfig {
            sprite_height: 0,
            control_animations: true,
            ..Default::default()
        };
        let result = validate_job(&config);
        assert_eq!(result.error_count(), 2);
        assert_eq!(
            result.disabled_reason().unwrap().code,
            "spriterig::validate::sprite-size"
        );
    }
}
