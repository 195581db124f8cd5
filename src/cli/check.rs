//! Check command implementation.

use clap::Args;

use crate::compositor::{tool_from_config, Compositor};
use crate::error::Result;
use crate::output::{display_path, Printer};
use crate::validation::{print_diagnostics, validate_job};

use super::JobArgs;

/// Validate a job file and check the compositor is available
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub job: JobArgs,
}

pub fn run(args: CheckArgs, printer: &Printer) -> Result<()> {
    let config = args.job.load()?;
    printer.info("Checking", &display_path(&args.job.job));

    let result = validate_job(&config);
    print_diagnostics(printer, &result);
    result.into_result()?;

    let compositor = Compositor::new(tool_from_config(&config.compositor)?);
    compositor.ensure_available()?;
    printer.success(
        "Found",
        &format!("compositor {}", printer.bold(compositor.tool_name())),
    );
    Ok(())
}
