//! Render command implementation.

use std::future::Future;
use std::thread::JoinHandle;

use clap::Args;

use crate::error::Result;
use crate::job::{CancelToken, RenderJob};
use crate::output::{display_path, plural, Printer, TerminalProgress};

use super::JobArgs;

/// Render every combination in a job file into spritesheets
#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub job: JobArgs,
}

pub fn run(args: RenderArgs, printer: &Printer) -> Result<()> {
    let config = args.job.load()?;
    printer.status(
        "Rendering",
        &format!(
            "{} from {}",
            config.base_object_name,
            display_path(&args.job.job)
        ),
    );

    let token = CancelToken::new();
    cancel_when(token.clone(), tokio::signal::ctrl_c);

    let output_dir = config.output_dir.clone();
    let mut job = RenderJob::from_config(config, Box::new(TerminalProgress::new(*printer)))?
        .with_cancel_token(token);
    if let Err(err) = job.run_to_end() {
        if err.is_cancellation() {
            printer.warning("Cancelled", "render job; scene restored, partial unit discarded");
        }
        return Err(err);
    }

    printer.success(
        "Finished",
        &format!(
            "{} and {} in {}",
            plural(job.spritesheets().len(), "spritesheet", "spritesheets"),
            plural(job.sidecars().len(), "sidecar", "sidecars"),
            printer.cyan(&display_path(&output_dir))
        ),
    );
    Ok(())
}

/// Cancel `token` once `signal` resolves, waiting on a background thread.
///
/// The job loop stays synchronous; the signal future gets its own
/// single-threaded runtime.
fn cancel_when<F, Fut>(token: CancelToken, signal: F) -> Option<JoinHandle<()>>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = std::io::Result<()>>,
{
    let spawned = std::thread::Builder::new()
        .name("spriterig-interrupt".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::warn!("interrupt handling unavailable: {}", e);
                    return;
                }
            };

            match runtime.block_on(signal()) {
                Ok(()) => {
                    tracing::info!("interrupt received, stopping after the current frame");
                    token.cancel();
                }
                Err(e) => tracing::warn!("interrupt handling unavailable: {}", e),
            }
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!("interrupt handling unavailable: {}", e);
            None
        }
    }
}
