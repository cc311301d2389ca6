//! Seam to the external compiler that turns workspace text into a [`CompiledProject`].

use std::path::Path;

use tokio_util::sync::CancellationToken;

use super::{CompileError, CompiledProject};

/// Compiles the project rooted at a workspace directory.
///
/// Implementations run on a blocking thread. Long-running compilers should poll
/// `cancel` and return [`CompileError::Cancelled`] once it fires.
pub trait Compiler: Send + Sync + 'static {
    fn compile(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<CompiledProject, CompileError>;
}

impl<F> Compiler for F
where
    F: Fn(&Path, &CancellationToken) -> Result<CompiledProject, CompileError>
        + Send
        + Sync
        + 'static,
{
    fn compile(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<CompiledProject, CompileError> {
        self(root, cancel)
    }
}
