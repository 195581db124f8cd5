//! Frame sequencing and frame file naming.
//!
//! Frame files are named `<animation>_[rot<NNN>_]<frame>.png`, with the
//! frame index zero-padded to the widest frame index in the job. The
//! compositor tiles frames in lexicographic file-name order and the
//! sidecar records positions from that same order, so the naming scheme is
//! the only thing keeping playback order and pixel layout in step: within
//! one (animation, rotation) run names must sort in render order, and
//! different runs must not interleave.

use crate::config::RenderJobConfig;
use crate::types::AnimationSet;

use super::Axes;

/// Animation name used for frames rendered with animations disabled.
pub const STILL_NAME: &str = "still";

/// Frame index rendered for stills.
const STILL_FRAME: i64 = 0;

/// Computes frame lists and file names for every combination in a job.
#[derive(Debug, Clone)]
pub struct FrameSequencer {
    animation_sets: Vec<AnimationSet>,
    pad_width: usize,
}

impl FrameSequencer {
    /// Sequencer for `config`, padding to the widest frame index in use.
    pub fn new(config: &RenderJobConfig, axes: &Axes) -> Self {
        let animation_sets = config.animation_sets.clone();
        let highest = axes
            .animations
            .iter()
            .flatten()
            .filter_map(|&i| animation_sets.get(i))
            .map(AnimationSet::last_frame)
            .max()
            .unwrap_or(STILL_FRAME);

        Self {
            animation_sets,
            pad_width: digit_count(highest),
        }
    }

    /// Zero-padding width applied to frame indices.
    pub fn pad_width(&self) -> usize {
        self.pad_width
    }

    /// The animation set behind an axis value.
    pub fn animation(&self, animation: Option<usize>) -> Option<&AnimationSet> {
        animation.and_then(|i| self.animation_sets.get(i))
    }

    /// Animation name for file names and records; `still` when disabled.
    pub fn animation_name(&self, animation: Option<usize>) -> &str {
        self.animation(animation)
            .map_or(STILL_NAME, |set| set.name.as_str())
    }

    /// Frame indices to render for an animation, in playback order.
    pub fn frames(&self, animation: Option<usize>) -> Vec<i64> {
        match self.animation(animation) {
            Some(set) => set.frames().collect(),
            None => vec![STILL_FRAME],
        }
    }

    /// Frames rendered per pass of this animation.
    pub fn frame_count(&self, animation: Option<usize>) -> usize {
        self.animation(animation).map_or(1, AnimationSet::frame_count)
    }

    /// File stem for one frame: `<animation>_[rot<NNN>_]<frame>`.
    pub fn frame_stem(&self, animation: Option<usize>, rotation: Option<u32>, frame: i64) -> String {
        let name = self.animation_name(animation);
        let width = self.pad_width;
        match rotation {
            Some(angle) => format!("{}_{}_{:0width$}", name, rotation_token(angle), frame),
            None => format!("{}_{:0width$}", name, frame),
        }
    }

    /// File name for one frame: `<animation>_[rot<NNN>_]<frame>.png`.
    pub fn frame_file_name(
        &self,
        animation: Option<usize>,
        rotation: Option<u32>,
        frame: i64,
    ) -> String {
        format!("{}.png", self.frame_stem(animation, rotation, frame))
    }

    /// Frames rendered across the whole job.
    pub fn total_frames(&self, axes: &Axes) -> usize {
        let per_pass: usize = axes
            .animations
            .iter()
            .map(|&animation| self.frame_count(animation))
            .sum();
        per_pass * axes.materials.len() * axes.rotations.len()
    }
}

/// `rot<NNN>` token used in frame and output file names.
pub fn rotation_token(angle: u32) -> String {
    format!("rot{:03}", angle)
}

fn digit_count(n: i64) -> usize {
    n.max(0).to_string().len()
}
