//! Enumeration of every frame a job renders, grouped into output units.

use crate::config::RenderJobConfig;
use crate::sidecar::{OutputNames, UnitKey};

use super::{Axes, FrameSequencer};

/// One frame to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    /// The output unit this frame belongs to.
    pub unit: UnitKey,
    pub material: Option<usize>,
    pub rotation: Option<u32>,
    pub animation: Option<usize>,
    pub frame: i64,
}

/// An output unit and how many frames it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSummary {
    pub key: UnitKey,
    pub frames: usize,
}

/// The resolved work list for one job.
///
/// Frames are enumerated material set, then rotation, then animation, then
/// frame index. A unit is flushed when the innermost separation boundary is
/// crossed: per animation, else per rotation, else per material set. When
/// animations are split into separate files but rotations aren't, the
/// rotations of one animation would not be adjacent in that order, so each
/// unit's frames are gathered together while keeping their relative order.
#[derive(Debug, Clone)]
pub struct JobPlan {
    pub axes: Axes,
    pub sequencer: FrameSequencer,
    pub names: OutputNames,
    items: Vec<WorkItem>,
}

impl JobPlan {
    /// Resolve the axes of `config` and enumerate its work list.
    pub fn new(config: &RenderJobConfig) -> Self {
        let axes = Axes::resolve(config);
        let sequencer = FrameSequencer::new(config, &axes);
        let names = OutputNames::new(config, &axes);

        let mut items = Vec::with_capacity(sequencer.total_frames(&axes));
        for &material in &axes.materials {
            for &rotation in &axes.rotations {
                for &animation in &axes.animations {
                    let unit = UnitKey {
                        material,
                        rotation: rotation.filter(|_| axes.separate_files_per_rotation),
                        animation: animation.filter(|_| axes.separate_files_per_animation),
                    };
                    for frame in sequencer.frames(animation) {
                        items.push(WorkItem {
                            unit,
                            material,
                            rotation,
                            animation,
                            frame,
                        });
                    }
                }
            }
        }

        Self {
            axes,
            sequencer,
            names,
            items: group_by_unit(items),
        }
    }

    /// Every frame to render, in render order.
    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    /// Number of work items in the plan.
    pub fn total_frames(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub(crate) fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Whether the item at `index` is the last one of its unit.
    pub fn ends_unit(&self, index: usize) -> bool {
        match (self.items.get(index), self.items.get(index + 1)) {
            (Some(item), Some(next)) => item.unit != next.unit,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Output units in flush order.
    pub fn units(&self) -> Vec<UnitSummary> {
        let mut units: Vec<UnitSummary> = Vec::new();
        for item in &self.items {
            match units.last_mut() {
                Some(last) if last.key == item.unit => last.frames += 1,
                _ => units.push(UnitSummary {
                    key: item.unit,
                    frames: 1,
                }),
            }
        }
        units
    }
}

/// Stable grouping by unit, units ordered by first appearance.
fn group_by_unit(items: Vec<WorkItem>) -> Vec<WorkItem> {
    let mut order: Vec<UnitKey> = Vec::new();
    for item in &items {
        if !order.contains(&item.unit) {
            order.push(item.unit);
        }
    }

    let mut grouped = items;
    grouped.sort_by_key(|item| order.iter().position(|key| *key == item.unit));
    grouped
}
