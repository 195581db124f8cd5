//! Render job configuration.
//!
//! A job is described by a `spriterig.yaml` file. Every field has a default,
//! so the smallest useful job file only names the object and its sprite
//! size.

mod job;

pub use job::{CompositorConfig, RenderJobConfig, RendererConfig};

/// The conventional job file name.
pub const JOB_FILENAME: &str = "spriterig.yaml";
