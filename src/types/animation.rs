//! Animation sets.

use serde::Deserialize;

/// A named group of per-target actions that play together.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimationSet {
    pub name: String,
    /// Inclusive frame range as authored; fractional bounds are widened to
    /// whole frames.
    pub frame_range: (f64, f64),
    /// Number of frames skipped between rendered frames.
    #[serde(default)]
    pub frame_skip: u32,
}

impl AnimationSet {
    /// An animation over `first..=last` with no frame skip.
    pub fn new(name: impl Into<String>, first: f64, last: f64) -> Self {
        Self {
            name: name.into(),
            frame_range: (first, last),
            frame_skip: 0,
        }
    }

    /// First whole frame, rounded down.
    pub fn first_frame(&self) -> i64 {
        self.frame_range.0.floor() as i64
    }

    /// Last whole frame, rounded up.
    pub fn last_frame(&self) -> i64 {
        self.frame_range.1.ceil() as i64
    }

    fn step(&self) -> usize {
        self.frame_skip as usize + 1
    }

    /// Frame indices rendered for this set, in playback order.
    pub fn frames(&self) -> impl Iterator<Item = i64> {
        (self.first_frame()..=self.last_frame()).step_by(self.step())
    }

    /// Number of frames rendered for this set.
    pub fn frame_count(&self) -> usize {
        let span = self.last_frame() - self.first_frame() + 1;
        if span <= 0 {
            return 0;
        }
        (span as usize - 1) / self.step() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_inclusive() {
        assert_eq!(AnimationSet::new("walk", 1.0, 10.0).frame_count(), 10);
        assert_eq!(AnimationSet::new("idle", 0.0, 0.0).frame_count(), 1);
    }

    #[test]
    fn test_fractional_range_widens() {
        let set = AnimationSet::new("swing", 1.5, 4.2);
        assert_eq!(set.first_frame(), 1);
        assert_eq!(set.last_frame(), 5);
        assert_eq!(set.frame_count(), 5);
    }

    #[test]
    fn test_frame_skip() {
        let mut set = AnimationSet::new("run", 1.0, 10.0);
        set.frame_skip = 2;
        let frames: Vec<i64> = set.frames().collect();
        assert_eq!(frames, vec![1, 4, 7, 10]);
        assert_eq!(set.frame_count(), frames.len());
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let set = AnimationSet::new("broken", 5.0, 1.0);
        assert_eq!(set.frame_count(), 0);
        assert_eq!(set.frames().count(), 0);
    }
}
