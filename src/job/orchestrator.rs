//! The render job state machine.
//!
//! A [`RenderJob`] is stepped by its host: the first step validates and
//! enumerates, every later step renders exactly one frame and flushes the
//! current output unit when it is complete. The host decides how often to
//! step (a timer, a UI idle callback, or a plain loop via
//! [`RenderJob::run_to_end`]) and can cancel between steps through a
//! [`CancelToken`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::compositor::{tool_from_config, Compositor, PadOutcome};
use crate::config::RenderJobConfig;
use crate::error::{Result, RigError};
use crate::output::{display_path, plural};
use crate::render::{ConfiguredRenderer, FrameRenderer, FrameRequest};
use crate::sidecar::{EmitOutcome, SidecarDocument, SidecarEmitter, UnitKey};
use crate::types::{FrameDescriptor, OutputUnit};
use crate::validation;

use super::progress::format_duration;
use super::{
    rotation_token, sanity, JobPlan, JobProgressState, JobReporter, JobStatus, ProgressSink,
};

/// Shared cancellation flag. Cloning hands out another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the job to stop before its next frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether `cancel` was called on any handle.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Validating,
    Enumerating,
    RenderingUnit,
    Flushing,
    SanityChecking,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }
}

/// Result of one [`RenderJob::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// More work remains; step again.
    Continue,
    Done,
    /// The job ended early. Cancellation is reported as [`RigError::Cancelled`].
    Failed(RigError),
}

/// One render job: every material, rotation and animation combination of a
/// configuration rendered, composited and described.
pub struct RenderJob<R: FrameRenderer> {
    config: RenderJobConfig,
    renderer: R,
    compositor: Compositor,
    reporter: JobReporter,
    emitter: SidecarEmitter,
    progress: JobProgressState,
    cancel: CancelToken,
    state: JobState,
    plan: Option<JobPlan>,
    cursor: usize,
    unit: Option<OutputUnit>,
    unit_job_id: u32,
    snapshot: Option<R::Snapshot>,
    fatal: Option<RigError>,
    started: Option<Instant>,
    spritesheets: Vec<PathBuf>,
}

impl RenderJob<ConfiguredRenderer> {
    /// Build a job with the renderer and compositor its configuration names.
    pub fn from_config(config: RenderJobConfig, sink: Box<dyn ProgressSink>) -> Result<Self> {
        let compositor = Compositor::new(tool_from_config(&config.compositor)?);
        let renderer = ConfiguredRenderer::from_config(&config);
        Ok(Self::new(config, renderer, compositor, sink))
    }
}

impl<R: FrameRenderer> RenderJob<R> {
    /// Create an idle job over an explicit renderer and compositor.
    pub fn new(
        config: RenderJobConfig,
        renderer: R,
        compositor: Compositor,
        sink: Box<dyn ProgressSink>,
    ) -> Self {
        Self {
            config,
            renderer,
            compositor,
            reporter: JobReporter::new(sink),
            emitter: SidecarEmitter::new(),
            progress: JobProgressState::default(),
            cancel: CancelToken::new(),
            state: JobState::Idle,
            plan: None,
            cursor: 0,
            unit: None,
            unit_job_id: 0,
            snapshot: None,
            fatal: None,
            started: None,
            spritesheets: Vec::new(),
        }
    }

    /// Use an existing cancellation flag instead of a fresh one.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Another handle to the job's cancel flag.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The configuration the job was created with.
    pub fn config(&self) -> &RenderJobConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> JobState {
        self.state
    }

    /// Frame counters and timing.
    pub fn progress(&self) -> &JobProgressState {
        &self.progress
    }

    /// The error that ended the job, if it ended early.
    pub fn fatal_error(&self) -> Option<&RigError> {
        self.fatal.as_ref()
    }

    /// Sidecars written so far, by path.
    pub fn sidecars(&self) -> &BTreeMap<PathBuf, SidecarDocument> {
        self.emitter.documents()
    }

    /// Spritesheets written so far, in flush order.
    pub fn spritesheets(&self) -> &[PathBuf] {
        &self.spritesheets
    }

    /// Persisted report lines.
    pub fn transcript(&self) -> &[String] {
        self.reporter.transcript()
    }

    /// The enumerated plan, once the job has started.
    pub fn plan(&self) -> Option<&JobPlan> {
        self.plan.as_ref()
    }

    /// The renderer driving the job.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Advance the job by one unit of work.
    ///
    /// Once the job has ended, further calls repeat the final outcome.
    pub fn step(&mut self) -> Step {
        match self.state {
            JobState::Completed => return Step::Done,
            JobState::Failed | JobState::Cancelled => {
                return Step::Failed(self.fatal.clone().unwrap_or(RigError::Cancelled));
            }
            _ => {}
        }

        if self.cancel.is_cancelled() {
            return self.fail(RigError::Cancelled);
        }

        let outcome = match self.state {
            JobState::Idle => self.start(),
            _ => self.render_next(),
        };
        match outcome {
            Ok(step) => step,
            Err(err) => self.fail(err),
        }
    }

    /// Step until the job ends.
    pub fn run_to_end(&mut self) -> Result<()> {
        loop {
            match self.step() {
                Step::Continue => {}
                Step::Done => return Ok(()),
                Step::Failed(err) => return Err(err),
            }
        }
    }

    #[tracing::instrument(skip_all, fields(object = %self.config.base_object_name))]
    fn start(&mut self) -> Result<Step> {
        self.state = JobState::Validating;
        self.reporter.reset();

        let diagnostics = validation::validate_job(&self.config).into_result()?;
        for d in diagnostics.iter() {
            tracing::warn!(code = %d.code, "{}", d.message);
        }
        self.compositor.ensure_available()?;

        self.state = JobState::Enumerating;
        let plan = JobPlan::new(&self.config);
        let summary = format!(
            "{} in {} using {}",
            plural(plan.total_frames(), "frame", "frames"),
            plural(plan.units().len(), "spritesheet", "spritesheets"),
            self.compositor.tool_name()
        );
        tracing::debug!(frames = plan.total_frames(), "enumerated job");

        // Sanity check (a) compares against the axis product, not the work list
        self.progress = JobProgressState::new(plan.sequencer.total_frames(&plan.axes));
        self.plan = Some(plan);
        self.cursor = 0;
        self.started = Some(Instant::now());
        self.snapshot = Some(self.renderer.snapshot());
        self.unit = Some(OutputUnit::new()?);
        self.unit_job_id = self.progress.allocate_job_id();

        self.reporter.report(
            "Starting",
            &summary,
            self.unit_job_id,
            &mut self.progress,
            JobStatus::Active,
        );
        self.state = JobState::RenderingUnit;
        Ok(Step::Continue)
    }

    fn render_next(&mut self) -> Result<Step> {
        let plan = self
            .plan
            .as_ref()
            .ok_or_else(|| RigError::consistency("render step before enumeration"))?;
        let total = plan.total_frames();
        let Some(&item) = plan.items().get(self.cursor) else {
            return self.finish();
        };
        let ends_unit = plan.ends_unit(self.cursor);

        let unit = self
            .unit
            .as_mut()
            .ok_or_else(|| RigError::consistency("no output unit to render into"))?;
        let path = unit.scratch_dir().join(plan.sequencer.frame_file_name(
            item.animation,
            item.rotation,
            item.frame,
        ));
        let material_set = item.material.and_then(|i| self.config.material_sets.get(i));

        self.renderer.render_frame(&FrameRequest {
            material_set,
            targets: &self.config.targets,
            rotation_angle: item.rotation,
            animation: plan.sequencer.animation(item.animation),
            frame_index: item.frame,
            sprite_size: self.config.sprite_size(),
            output_path: &path,
        })?;
        unit.push(FrameDescriptor {
            file_path: path,
            frame_index: item.frame,
            rotation_angle: item.rotation,
            animation_set: item.animation,
        });

        let mut text = format!(
            "{} frame {}",
            plan.sequencer.animation_name(item.animation),
            item.frame
        );
        if let Some(angle) = item.rotation {
            text.push(' ');
            text.push_str(&rotation_token(angle));
        }
        if let Some(set) = material_set {
            text.push_str(&format!(" [{}]", set.name));
        }

        self.cursor += 1;
        self.progress.current_frame_num += 1;
        if let Some(started) = self.started {
            self.progress.elapsed_time = started.elapsed();
        }
        self.reporter.report(
            "Rendering",
            &text,
            self.unit_job_id,
            &mut self.progress,
            JobStatus::Active,
        );

        if ends_unit {
            self.flush(item.unit)?;
        }
        if self.cursor == total {
            return self.finish();
        }
        Ok(Step::Continue)
    }

    #[tracing::instrument(skip_all, fields(material = ?key.material, rotation = ?key.rotation, animation = ?key.animation))]
    fn flush(&mut self, key: UnitKey) -> Result<()> {
        self.state = JobState::Flushing;
        let plan = self
            .plan
            .as_ref()
            .ok_or_else(|| RigError::consistency("flush before enumeration"))?;
        let unit = self
            .unit
            .take()
            .ok_or_else(|| RigError::consistency("no output unit to flush"))?;
        let job_id = self.unit_job_id;
        let output_path = plan.names.image_path(&key);
        let shown = display_path(&output_path);

        let mut result = self.compositor.assemble(
            self.config.sprite_size(),
            unit.len(),
            unit.scratch_dir(),
            &output_path,
        )?;
        self.compositor.ensure_succeeded(&result)?;
        self.reporter.report(
            "Compositing",
            &format!(
                "{} ({}x{} grid, {}x{})",
                shown,
                result.num_columns,
                result.num_rows,
                result.output_image_size.0,
                result.output_image_size.1
            ),
            job_id,
            &mut self.progress,
            JobStatus::Complete,
        );

        if self.config.pad_to_power_of_two {
            match self.compositor.pad_to_power_of_two(&mut result)? {
                PadOutcome::Skipped => self.reporter.report(
                    "Padding",
                    &format!("{} is already power-of-two sized", shown),
                    job_id,
                    &mut self.progress,
                    JobStatus::Skipped,
                ),
                PadOutcome::Padded { from, to } => self.reporter.report(
                    "Padding",
                    &format!("{} {}x{} to {}x{}", shown, from.0, from.1, to.0, to.1),
                    job_id,
                    &mut self.progress,
                    JobStatus::Complete,
                ),
            }
        }

        if self.config.force_square {
            let (w, h) = self.compositor.force_square(&mut result)?;
            self.reporter.report(
                "Squaring",
                &format!("{} to {}x{}", shown, w, h),
                job_id,
                &mut self.progress,
                JobStatus::Complete,
            );
        }

        let outcome = self.emitter.emit(
            &self.config,
            &plan.names,
            &plan.sequencer,
            &key,
            unit.frames(),
            &result,
        )?;
        match &outcome {
            EmitOutcome::Written(path) => self.reporter.report(
                "Metadata",
                &display_path(path),
                job_id,
                &mut self.progress,
                JobStatus::Complete,
            ),
            EmitOutcome::Skipped(path) => self.reporter.report(
                "Metadata",
                &format!("{} already written", display_path(path)),
                job_id,
                &mut self.progress,
                JobStatus::Skipped,
            ),
        }

        self.spritesheets.push(output_path);
        drop(unit);

        if self.cursor < plan.total_frames() {
            self.unit = Some(OutputUnit::new()?);
            self.unit_job_id = self.progress.allocate_job_id();
        }
        self.state = JobState::RenderingUnit;
        Ok(())
    }

    fn finish(&mut self) -> Result<Step> {
        self.state = JobState::SanityChecking;
        let plan = self
            .plan
            .as_ref()
            .ok_or_else(|| RigError::consistency("sanity check before enumeration"))?;
        sanity::check_job(
            &self.progress,
            self.emitter.documents(),
            plan.axes.expected_sidecar_count(),
            plan.names.output_dir(),
        )?;

        self.restore_scene();
        self.state = JobState::Completed;

        let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        self.progress.elapsed_time = elapsed;
        let banner = format!(
            "{} into {} in {}",
            plural(self.progress.total_num_frames, "frame", "frames"),
            plural(self.spritesheets.len(), "spritesheet", "spritesheets"),
            format_duration(elapsed)
        );
        tracing::info!(
            frames = self.progress.total_num_frames,
            sidecars = self.emitter.documents().len(),
            "render job completed"
        );

        let job_id = self.progress.allocate_job_id();
        self.reporter.report(
            "Finished",
            &banner,
            job_id,
            &mut self.progress,
            JobStatus::Complete,
        );
        Ok(Step::Done)
    }

    fn fail(&mut self, err: RigError) -> Step {
        // Dropping the unit discards its frames and scratch directory
        self.unit = None;
        self.restore_scene();

        let title = if err.is_cancellation() {
            self.state = JobState::Cancelled;
            tracing::info!(frame = self.progress.current_frame_num, "render job cancelled");
            "Cancelled"
        } else {
            self.state = JobState::Failed;
            tracing::error!(error = %err, "render job failed");
            "Failed"
        };

        let job_id = self.progress.allocate_job_id();
        self.reporter.report(
            title,
            &err.to_string(),
            job_id,
            &mut self.progress,
            JobStatus::Error,
        );

        self.fatal = Some(err.clone());
        Step::Failed(err)
    }

    fn restore_scene(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.renderer.restore(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::{BuiltinTool, CompositeTool, MontageRequest, ToolOutput};
    use crate::job::NullSink;
    use crate::render::{SceneState, SwatchRenderer};
    use crate::sidecar::FrameRecords;
    use crate::types::{AnimationSet, MaterialSet};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    /// Swatch renderer that counts calls and can pull the cancel flag.
    struct RecordingRenderer {
        inner: SwatchRenderer,
        rendered: usize,
        snapshots: usize,
        restored: Vec<SceneState>,
        cancel_after: Option<(usize, CancelToken)>,
    }

    impl RecordingRenderer {
        fn new() -> Self {
            Self {
                inner: SwatchRenderer::new(),
                rendered: 0,
                snapshots: 0,
                restored: Vec::new(),
                cancel_after: None,
            }
        }
    }

    impl FrameRenderer for RecordingRenderer {
        type Snapshot = SceneState;

        fn snapshot(&mut self) -> SceneState {
            self.snapshots += 1;
            self.inner.snapshot()
        }

        fn restore(&mut self, snapshot: SceneState) {
            self.restored.push(snapshot.clone());
            self.inner.restore(snapshot);
        }

        fn render_frame(&mut self, request: &FrameRequest<'_>) -> Result<()> {
            self.inner.render_frame(request)?;
            self.rendered += 1;
            if let Some((after, token)) = &self.cancel_after {
                if self.rendered == *after {
                    token.cancel();
                }
            }
            Ok(())
        }
    }

    /// A compositor whose montage always fails.
    struct BrokenTool;

    impl CompositeTool for BrokenTool {
        fn name(&self) -> &str {
            "montage"
        }

        fn ensure_available(&self) -> Result<()> {
            Ok(())
        }

        fn montage(&self, _request: &MontageRequest<'_>) -> ToolOutput {
            ToolOutput::failed(1, "montage: unable to open image")
        }

        fn extend(&self, _image: &Path, _size: (u32, u32)) -> ToolOutput {
            ToolOutput::ok()
        }

        fn squarify(&self, _image: &Path, _side: u32) -> ToolOutput {
            ToolOutput::ok()
        }
    }

    fn scenario_a(out: &Path) -> RenderJobConfig {
        RenderJobConfig {
            base_object_name: "knight".to_string(),
            output_dir: out.to_path_buf(),
            sprite_width: 8,
            sprite_height: 8,
            control_animations: true,
            animation_sets: vec![
                AnimationSet::new("walk", 1.0, 10.0),
                AnimationSet::new("attack", 1.0, 5.0),
            ],
            compositor: crate::config::CompositorConfig::Builtin,
            ..Default::default()
        }
    }

    fn job<R: FrameRenderer>(config: RenderJobConfig, renderer: R) -> RenderJob<R> {
        RenderJob::new(
            config,
            renderer,
            Compositor::new(Box::new(BuiltinTool)),
            Box::new(NullSink),
        )
    }

    #[test]
    fn test_scenario_single_sheet_for_two_animations() {
        let out = tempfile::tempdir().unwrap();
        let mut job = job(scenario_a(out.path()), SwatchRenderer::new());

        assert_eq!(job.step(), Step::Continue);
        assert_eq!(job.state(), JobState::RenderingUnit);
        assert_eq!(job.progress().total_num_frames, 15);

        job.run_to_end().unwrap();
        assert_eq!(job.state(), JobState::Completed);
        assert_eq!(job.progress().current_frame_num, 15);
        assert_eq!(job.sidecars().len(), 1);
        assert_eq!(job.spritesheets().len(), 1);

        let document = &job.sidecars()[&out.path().join("knight.json")];
        assert_eq!((document.num_columns, document.num_rows), (5, 3));
        assert_eq!(document.image_file.as_deref(), Some("knight.png"));
        assert_eq!(
            image::image_dimensions(out.path().join("knight.png")).unwrap(),
            (40, 24)
        );

        // attack_* sorts before walk_*
        let FrameRecords::Animations(records) = &document.frames else {
            panic!("expected animation records");
        };
        let starts: Vec<(&str, usize, usize)> = records
            .iter()
            .map(|r| (r.name.as_str(), r.start_frame, r.num_frames))
            .collect();
        assert_eq!(starts, vec![("walk", 5, 10), ("attack", 0, 5)]);

        // Finished jobs keep reporting the same outcome
        assert_eq!(job.step(), Step::Done);
        assert!(job
            .transcript()
            .last()
            .unwrap()
            .contains("15 frames into 1 spritesheet"));
    }

    #[test]
    fn test_scenario_sheet_per_animation() {
        let out = tempfile::tempdir().unwrap();
        let config = RenderJobConfig {
            separate_per_animation: true,
            ..scenario_a(out.path())
        };
        let mut job = job(config, SwatchRenderer::new());
        job.run_to_end().unwrap();

        assert_eq!(job.sidecars().len(), 2);
        assert_eq!(job.spritesheets().len(), 2);

        let walk = &job.sidecars()[&out.path().join("knight_walk.json")];
        assert_eq!((walk.num_columns, walk.num_rows), (4, 3));
        assert_eq!(walk.image_file.as_deref(), Some("knight_walk.png"));

        let attack = &job.sidecars()[&out.path().join("knight_attack.json")];
        assert_eq!((attack.num_columns, attack.num_rows), (3, 2));
        assert!(out.path().join("knight_attack.png").is_file());
    }

    #[test]
    fn test_scenario_padded_rotations() {
        let out = tempfile::tempdir().unwrap();
        let config = RenderJobConfig {
            base_object_name: "barrel".to_string(),
            output_dir: out.path().to_path_buf(),
            sprite_width: 100,
            sprite_height: 100,
            control_rotation: true,
            rotation_count: 3,
            pad_to_power_of_two: true,
            ..Default::default()
        };
        let mut job = job(config, SwatchRenderer::new());
        job.run_to_end().unwrap();

        let document = &job.sidecars()[&out.path().join("barrel.json")];
        assert_eq!((document.num_columns, document.num_rows), (3, 1));
        assert_eq!((document.padding_width, document.padding_height), (212, 28));
        assert_eq!(
            image::image_dimensions(out.path().join("barrel.png")).unwrap(),
            (512, 128)
        );

        let FrameRecords::Stills(stills) = &document.frames else {
            panic!("expected still records");
        };
        let rotations: Vec<Option<u32>> = stills.iter().map(|s| s.rotation).collect();
        assert_eq!(rotations, vec![Some(0), Some(120), Some(240)]);
    }

    #[test]
    fn test_material_sets_share_one_sidecar() {
        let out = tempfile::tempdir().unwrap();
        let config = RenderJobConfig {
            control_materials: true,
            material_sets: vec![
                MaterialSet::shared("red", "red_paint"),
                MaterialSet::shared("blue", "blue_paint"),
            ],
            ..scenario_a(out.path())
        };
        let mut job = job(config, SwatchRenderer::new());
        job.run_to_end().unwrap();

        assert_eq!(job.spritesheets().len(), 2);
        assert_eq!(job.sidecars().len(), 1);
        let document = &job.sidecars()[&out.path().join("knight.json")];
        let files: Vec<&str> = document.referenced_images();
        assert_eq!(files, vec!["knight_red.png", "knight_blue.png"]);
        assert!(job
            .transcript()
            .iter()
            .any(|line| line.contains("SKIPPED") && line.contains("already written")));
    }

    #[test]
    fn test_cancel_mid_render() {
        let out = tempfile::tempdir().unwrap();
        let token = CancelToken::new();
        let mut renderer = RecordingRenderer::new();
        renderer.cancel_after = Some((7, token.clone()));

        let mut job = job(scenario_a(out.path()), renderer).with_cancel_token(token);

        let mut steps = 0;
        let outcome = loop {
            match job.step() {
                Step::Continue => steps += 1,
                other => break other,
            }
        };

        assert_eq!(outcome, Step::Failed(RigError::Cancelled));
        assert_eq!(steps, 8);
        assert_eq!(job.state(), JobState::Cancelled);
        assert_eq!(job.progress().current_frame_num, 7);
        assert_eq!(job.renderer().rendered, 7);
        assert_eq!(job.renderer().snapshots, 1);
        assert_eq!(job.renderer().restored, vec![SceneState::default()]);
        assert_eq!(job.renderer().inner.scene(), &SceneState::default());
        assert!(job.sidecars().is_empty());
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
        assert_eq!(job.fatal_error(), Some(&RigError::Cancelled));
    }

    #[test]
    fn test_invalid_config_fails_before_snapshot() {
        let out = tempfile::tempdir().unwrap();
        let config = RenderJobConfig {
            control_animations: true,
            animation_sets: vec![],
            ..scenario_a(out.path())
        };
        let mut job = job(config, RecordingRenderer::new());

        let Step::Failed(err) = job.step() else {
            panic!("expected preflight failure");
        };
        assert!(matches!(err, RigError::Preflight { .. }));
        assert_eq!(job.state(), JobState::Failed);
        assert_eq!(job.renderer().snapshots, 0);
        assert!(job.renderer().restored.is_empty());
    }

    #[test]
    fn test_compositor_failure_is_fatal() {
        let out = tempfile::tempdir().unwrap();
        let mut job = RenderJob::new(
            scenario_a(out.path()),
            RecordingRenderer::new(),
            Compositor::new(Box::new(BrokenTool)),
            Box::new(NullSink),
        );

        let err = job.run_to_end().unwrap_err();
        assert_eq!(
            err,
            RigError::ExternalTool {
                tool: "montage".to_string(),
                exit_code: 1,
                stderr: "montage: unable to open image".to_string(),
            }
        );
        assert_eq!(job.fatal_error(), Some(&err));
        assert_eq!(job.renderer().restored.len(), 1);
        assert!(job.sidecars().is_empty());
        assert!(job.transcript().last().unwrap().contains("ERROR"));
    }

    #[test]
    fn test_frame_total_comes_from_axes_not_work_list() {
        let out = tempfile::tempdir().unwrap();
        let mut job = job(scenario_a(out.path()), RecordingRenderer::new());

        assert_eq!(job.step(), Step::Continue);
        assert_eq!(job.progress().total_num_frames, 15);

        // A work list that lost a frame must not pass the end-of-job check
        job.plan.as_mut().unwrap().truncate(14);
        let err = job.run_to_end().unwrap_err();

        assert_eq!(err, RigError::consistency("rendered 14 frames, expected 15"));
        assert_eq!(job.state(), JobState::Failed);
        assert_eq!(job.renderer().rendered, 14);
        assert_eq!(job.renderer().restored.len(), 1);
    }
}
