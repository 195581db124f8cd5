use clap::Parser;
use miette::Result;
use spriterig::cli::{Cli, Commands};
use spriterig::output::Printer;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let printer = Printer::new();
    match cli.command {
        Commands::Render(args) => spriterig::cli::render::run(args, &printer)?,
        Commands::Check(args) => spriterig::cli::check::run(args, &printer)?,
        Commands::Plan(args) => spriterig::cli::plan::run(args, &printer)?,
        Commands::Completions(args) => spriterig::cli::completions::run(args)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "spriterig=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
