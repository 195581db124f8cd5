//! Job progress state and report formatting.
//!
//! The orchestrator reports after every discrete step. Each report is one
//! status line (kept in the transcript unless the status is `Active`) plus a
//! transient progress block that a sink redraws in place.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Width of the `#`/`-` progress bar.
const BAR_WIDTH: usize = 30;

/// Status tag of one report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Active,
    Complete,
    Error,
    Skipped,
}

impl JobStatus {
    pub fn tag(self) -> &'static str {
        match self {
            JobStatus::Active => "ACTIVE",
            JobStatus::Complete => "DONE",
            JobStatus::Error => "ERROR",
            JobStatus::Skipped => "SKIPPED",
        }
    }

    /// Active lines are redrawn on the next report instead of kept.
    pub fn is_persisted(self) -> bool {
        self != JobStatus::Active
    }
}

/// Progress of the running job, readable by any progress display.
#[derive(Debug, Clone, Default)]
pub struct JobProgressState {
    pub current_frame_num: usize,
    pub total_num_frames: usize,
    pub elapsed_time: Duration,
    pub last_job_id: Option<u32>,
    pub last_job_start_time: Option<Instant>,
    pub next_job_id: u32,
}

impl JobProgressState {
    /// Counters for a job of `total_num_frames` frames.
    pub fn new(total_num_frames: usize) -> Self {
        Self {
            total_num_frames,
            ..Default::default()
        }
    }

    /// Hand out the next sub-job id. Ids only increase.
    pub fn allocate_job_id(&mut self) -> u32 {
        let id = self.next_job_id;
        self.next_job_id += 1;
        id
    }

    /// Time left at the average pace so far, once a frame has rendered.
    pub fn estimated_remaining(&self) -> Option<Duration> {
        estimate_remaining(self.elapsed_time, self.current_frame_num, self.total_num_frames)
    }
}

/// One rendered report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBlock {
    pub status: JobStatus,
    /// The status line, possibly spanning several indented lines.
    pub line: String,
    /// Progress bar and timing, never persisted.
    pub progress: String,
}

/// Receives every report as it is produced.
pub trait ProgressSink {
    fn update(&mut self, block: &ReportBlock, state: &JobProgressState);
}

/// Discards reports; the transcript is still kept by the reporter.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn update(&mut self, _block: &ReportBlock, _state: &JobProgressState) {}
}

/// Formats reports and keeps the persisted transcript.
pub struct JobReporter {
    sink: Box<dyn ProgressSink>,
    transcript: Vec<String>,
    current: Option<ReportBlock>,
}

impl JobReporter {
    /// A reporter writing to `sink`.
    pub fn new(sink: Box<dyn ProgressSink>) -> Self {
        Self {
            sink,
            transcript: Vec::new(),
            current: None,
        }
    }

    /// Persisted lines, oldest first.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// The most recent report, including its transient progress block.
    pub fn current(&self) -> Option<&ReportBlock> {
        self.current.as_ref()
    }

    /// Forget all blocks and start a new transcript.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.current = None;
    }

    pub fn report(
        &mut self,
        title: &str,
        text: &str,
        job_id: u32,
        state: &mut JobProgressState,
        status: JobStatus,
    ) {
        self.report_at(Instant::now(), title, text, job_id, state, status);
    }

    /// `report` with an explicit clock reading.
    pub fn report_at(
        &mut self,
        now: Instant,
        title: &str,
        text: &str,
        job_id: u32,
        state: &mut JobProgressState,
        status: JobStatus,
    ) {
        if state.last_job_id != Some(job_id) {
            if let Some(last) = state.last_job_id.filter(|&last| job_id < last) {
                // Ids are allocated monotonically; going back means a caller
                // reused a stale id. Keep going, but make it visible.
                tracing::warn!(job_id, last_job_id = last, "job id went backwards");
                self.transcript.push(format!(
                    "[WARNING] coding error: job {} reported after job {}",
                    job_id, last
                ));
            }
            state.last_job_id = Some(job_id);
            state.last_job_start_time = Some(now);
        }

        let job_elapsed = state
            .last_job_start_time
            .map_or(Duration::ZERO, |start| now.saturating_duration_since(start));

        let line = format_line(job_elapsed, status, title, text);
        if status.is_persisted() {
            self.transcript.push(line.clone());
        }

        let block = ReportBlock {
            status,
            line,
            progress: format_progress(state),
        };
        self.sink.update(&block, state);
        self.current = Some(block);
    }
}

/// `[   1.2s] [DONE    ] title: text`, with continuation lines of `text`
/// indented to line up under its first line.
pub fn format_line(job_elapsed: Duration, status: JobStatus, title: &str, text: &str) -> String {
    let prefix = format!(
        "[{:>8}] [{:<8}] {}: ",
        format_duration(job_elapsed),
        status.tag(),
        title
    );
    let indent = " ".repeat(prefix.chars().count());

    let mut line = prefix;
    for (i, part) in text.lines().enumerate() {
        if i > 0 {
            line.push('\n');
            line.push_str(&indent);
        }
        line.push_str(part);
    }
    line
}

/// Progress bar plus elapsed and remaining time.
pub fn format_progress(state: &JobProgressState) -> String {
    let mut out = progress_bar(state.current_frame_num, state.total_num_frames);
    let remaining = state
        .estimated_remaining()
        .map_or_else(|| "calculating".to_string(), format_duration);
    let _ = write!(
        out,
        "\nElapsed: {} | Remaining: {}",
        format_duration(state.elapsed_time),
        remaining
    );
    out
}

/// `[######----] 7/15 frames (46%)`
pub fn progress_bar(current: usize, total: usize) -> String {
    let (filled, percent) = if total == 0 {
        (0, 0)
    } else {
        let current = current.min(total);
        (current * BAR_WIDTH / total, current * 100 / total)
    };
    format!(
        "[{}{}] {}/{} frames ({}%)",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        current,
        total,
        percent
    )
}

/// `elapsed / current * (total - current)`; `None` until a frame is done.
pub fn estimate_remaining(elapsed: Duration, current: usize, total: usize) -> Option<Duration> {
    if current == 0 {
        return None;
    }
    let left = total.saturating_sub(current);
    Some(elapsed.mul_f64(left as f64 / current as f64))
}

/// `4.2s`, `3m 07s`, `1h 02m 03s`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        return format!("{}.{}s", secs, d.subsec_millis() / 100);
    }
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {:02}m {:02}s", h, m, s)
    } else {
        format!("{}m {:02}s", m, s)
    }
}
