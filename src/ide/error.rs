//! Errors surfaced by the reload host and the rename engine.

use thiserror::Error;

use crate::base::Location;
use crate::project::CompileError;

/// Why a reload did not produce a new snapshot.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("invalid workspace: {0}")]
    InvalidWorkspace(String),

    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A newer reload for the same workspace took over.
    #[error("reload superseded by a newer request")]
    Superseded,

    #[error("reload task failed: {0}")]
    TaskFailed(String),
}

impl ReloadError {
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Compile(err) => err.location(),
            _ => None,
        }
    }
}

/// Why a rename could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    #[error("workspace not loaded")]
    Unavailable,

    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    #[error("invalid name '{0}'")]
    InvalidName(String),

    #[error("'{0}' already names a symbol")]
    NameConflict(String),

    /// The new name already appears as a word in a scanned file.
    #[error("'{0}' already appears in the workspace")]
    NameInUse(String),

    /// The symbol is written with more than one spelling.
    #[error("'{name}' is also spelled '{variant}'")]
    SpellingMismatch { name: String, variant: String },

    #[error("no occurrences to rename")]
    NoChanges,
}
