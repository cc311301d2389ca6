//! Errors reported by the external compiler.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::base::Location;

/// Failure of one compilation run.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Malformed input text.
    #[error("{message}")]
    Syntax { message: String, location: Location },

    /// Well-formed text that violates a project rule (unknown field, bad template...).
    #[error("{message}")]
    Semantic {
        message: String,
        location: Option<Location>,
    },

    /// No project file was found under the workspace root.
    #[error("no project file found in {}", .0.display())]
    NoProject(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The compilation observed its cancellation token and stopped.
    #[error("compilation cancelled")]
    Cancelled,
}

impl CompileError {
    pub fn syntax(message: impl Into<String>, location: Location) -> Self {
        Self::Syntax {
            message: message.into(),
            location,
        }
    }

    pub fn semantic(message: impl Into<String>, location: Option<Location>) -> Self {
        Self::Semantic {
            message: message.into(),
            location,
        }
    }

    /// Source position of the failure, if the compiler reported one.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Syntax { location, .. } => Some(location),
            Self::Semantic { location, .. } => location.as_ref(),
            Self::NoProject(_) | Self::Io(_) | Self::Cancelled => None,
        }
    }

    /// Rewrite the reported location relative to the workspace `root`.
    pub fn into_workspace_relative(self, root: &Path) -> Self {
        match self {
            Self::Syntax { message, location } => Self::Syntax {
                message,
                location: location.relative_to(root),
            },
            Self::Semantic { message, location } => Self::Semantic {
                message,
                location: location.map(|l| l.relative_to(root)),
            },
            other => other,
        }
    }
}
