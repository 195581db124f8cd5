//! Render job orchestration.
//!
//! Resolves a configuration into axes and a frame plan, steps through it one
//! frame at a time, and reports progress along the way.

mod axis;
mod orchestrator;
mod plan;
mod progress;
mod sanity;
mod sequence;

pub use axis::{rotation_angles, Axes};
pub use orchestrator::{CancelToken, JobState, RenderJob, Step};
pub use plan::{JobPlan, UnitSummary, WorkItem};
pub use progress::{
    format_duration, progress_bar, JobProgressState, JobReporter, JobStatus, NullSink,
    ProgressSink, ReportBlock,
};
pub use sanity::check_job;
pub use sequence::{rotation_token, FrameSequencer, STILL_NAME};
