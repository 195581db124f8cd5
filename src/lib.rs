//! spriterig - Batch spritesheet renderer
//!
//! Renders every combination of material set, rotation and animation frame
//! for an object, composites the frames into spritesheets and writes a JSON
//! sidecar describing each sheet's layout.

pub mod cli;
pub mod compositor;
pub mod config;
pub mod error;
pub mod job;
pub mod output;
pub mod render;
pub mod sidecar;
pub mod types;
pub mod validation;

pub use compositor::{BuiltinTool, CompositeTool, Compositor, CompositorResult, MagickTool};
pub use config::{CompositorConfig, RenderJobConfig, RendererConfig, JOB_FILENAME};
pub use error::{Result, RigError};
pub use job::{CancelToken, JobPlan, JobState, RenderJob, Step};
pub use render::{
    CommandRenderer, ConfiguredRenderer, FrameRenderer, FrameRequest, SwatchRenderer,
};
pub use sidecar::{EmitOutcome, SidecarDocument, SidecarEmitter};
pub use types::{AnimationSet, Colour, MaterialAssignment, MaterialSet};
pub use validation::{validate_job, Diagnostic, Severity, ValidationResult};
