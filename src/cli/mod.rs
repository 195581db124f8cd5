pub mod check;
pub mod completions;
pub mod plan;
pub mod render;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{CompositorConfig, RenderJobConfig, JOB_FILENAME};
use crate::error::Result;

/// spriterig - Batch spritesheet renderer
#[derive(Parser, Debug)]
#[command(name = "spriterig")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render every combination in a job file into spritesheets
    Render(render::RenderArgs),

    /// Validate a job file and check the compositor is available
    Check(check::CheckArgs),

    /// Show the frames and files a job would produce
    Plan(plan::PlanArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Job file selection shared by the job commands.
#[derive(Args, Debug)]
pub struct JobArgs {
    /// Job file
    #[arg(default_value = JOB_FILENAME)]
    pub job: PathBuf,

    /// Output directory (overrides output_dir in the job file)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Composite in-process instead of with ImageMagick
    #[arg(long)]
    pub builtin: bool,
}

impl JobArgs {
    /// Load the job file and apply command-line overrides.
    pub fn load(&self) -> Result<RenderJobConfig> {
        let mut config = RenderJobConfig::load(&self.job)?;
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if self.builtin {
            config.compositor = CompositorConfig::Builtin;
        }
        Ok(config)
    }
}
