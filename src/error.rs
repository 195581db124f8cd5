use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for spriterig operations.
///
/// Cloneable so the orchestrator can keep the fatal error in its slot while
/// also handing it back from `step()`.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum RigError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(spriterig::io))]
    Io { path: PathBuf, message: String },

    #[error("Parse error: {message}")]
    #[diagnostic(code(spriterig::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Cannot start render job: {message}")]
    #[diagnostic(code(spriterig::preflight))]
    Preflight {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("{tool} exited with status {exit_code}: {stderr}")]
    #[diagnostic(code(spriterig::external_tool))]
    ExternalTool {
        tool: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Frame render failed: {message}")]
    #[diagnostic(code(spriterig::render))]
    Render { message: String },

    #[error("Internal consistency check failed: {message}")]
    #[diagnostic(
        code(spriterig::consistency),
        help("this indicates a bug in job orchestration rather than a configuration problem")
    )]
    InternalConsistency { message: String },

    #[error("Render job cancelled")]
    #[diagnostic(code(spriterig::cancelled))]
    Cancelled,
}

impl RigError {
    /// An I/O failure on `path`.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    /// A reason the job cannot start, with a hint for fixing it.
    pub fn preflight(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Preflight {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// An end-of-job check that found the outputs out of step.
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::InternalConsistency {
            message: message.into(),
        }
    }

    /// Whether this error ended the job by user request rather than failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, RigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_tool_display_includes_stderr() {
        let err = RigError::ExternalTool {
            tool: "montage".to_string(),
            exit_code: 1,
            stderr: "unable to open image".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("montage"));
        assert!(text.contains("unable to open image"));
    }

    #[test]
    fn test_preflight_carries_help() {
        let err = RigError::preflight("ImageMagick not found", "Install ImageMagick");
        assert_eq!(err.to_string(), "Cannot start render job: ImageMagick not found");

        let help = miette::Diagnostic::help(&err).map(|h| h.to_string());
        assert_eq!(help.as_deref(), Some("Install ImageMagick"));
    }

    #[test]
    fn test_cancellation_flag() {
        assert!(RigError::Cancelled.is_cancellation());
        assert!(!RigError::consistency("x").is_cancellation());
    }
}
