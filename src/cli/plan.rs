//! Plan command implementation.
//!
//! Prints what a job would render without touching the renderer or the
//! compositor. Output goes to stdout.

use clap::Args;

use crate::compositor::GridLayout;
use crate::error::Result;
use crate::job::{rotation_token, JobPlan};
use crate::output::{display_path, plural, Printer};
use crate::validation::validate_job;

use super::JobArgs;

/// Show the frames and files a job would produce
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub job: JobArgs,
}

pub fn run(args: PlanArgs, printer: &Printer) -> Result<()> {
    let config = args.job.load()?;
    validate_job(&config).into_result()?;

    let plan = JobPlan::new(&config);
    let units = plan.units();

    println!("object:     {}", config.base_object_name);
    println!("sprite:     {}x{}", config.sprite_width, config.sprite_height);
    println!(
        "materials:  {}",
        axis_summary(plan.axes.materials.len(), plan.axes.materials_enabled())
    );
    println!(
        "rotations:  {}",
        if plan.axes.rotations_enabled() {
            plan.axes
                .rotations
                .iter()
                .flatten()
                .map(|&angle| rotation_token(angle))
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            "off".to_string()
        }
    );
    println!(
        "animations: {}",
        axis_summary(plan.axes.animations.len(), plan.axes.animations_enabled())
    );
    println!("frames:     {}", plan.total_frames());
    println!();

    for unit in &units {
        let grid = GridLayout::for_frames(unit.frames as u32);
        println!(
            "{}  {:>4} frames  {}x{}  -> {}",
            display_path(&plan.names.image_path(&unit.key)),
            unit.frames,
            grid.columns,
            grid.rows,
            display_path(&plan.names.sidecar_path(&unit.key))
        );
    }

    printer.info(
        "Planned",
        &format!(
            "{} and {}",
            plural(units.len(), "spritesheet", "spritesheets"),
            plural(plan.axes.expected_sidecar_count(), "sidecar", "sidecars")
        ),
    );
    Ok(())
}

fn axis_summary(len: usize, enabled: bool) -> String {
    if enabled {
        len.to_string()
    } else {
        "off".to_string()
    }
}

