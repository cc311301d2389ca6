//! AnalysisHost and Analysis: reload management and snapshot queries.
//!
//! The `AnalysisHost` owns the cache and drives reloads; `Analysis` is a cheap
//! handle on one immutable snapshot. Queries on an `Analysis` never block on a
//! reload and always see one consistent snapshot.
//!
//! ## Usage
//!
//! ```ignore
//! let host = AnalysisHost::new(my_compiler);
//!
//! // Rebuild (async, cancellable, single-flight per workspace)
//! let response = host.reload_response("/ws/thesis").await;
//!
//! // Query the last good snapshot
//! let analysis = host.analysis("/ws/thesis").unwrap();
//! let codes = analysis.codes();
//! let graph = analysis.relation_graph(Some("@smith2019"));
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cache::{Snapshot, WorkspaceCache};
use super::codes::{CodeEntry, get_codes};
use super::error::{ReloadError, RenameError};
use super::goto::{GotoResult, goto_definition};
use super::graph::{RelationGraph, relation_graph};
use super::hover::{HoverResult, hover};
use super::ontology::{OntologyAnnotation, TopicEntry, ontology_annotations, ontology_topics};
use super::references::{ReferenceEntry, ReferenceResult, find_references, get_references};
use super::relations::{RelationEntry, get_relations};
use super::rename::{
    PrepareRename, RenameKind, WorkspaceEdit, compute_rename, is_renameable, prepare_rename,
};
use super::response::{
    AnnotationsPayload, CodesPayload, GraphPayload, ReferencesPayload, RelationsPayload,
    ReloadResponse, RenameablePayload, Response, StatsPayload, TopicsPayload,
};
use super::workspace::{workspace_key, workspace_path};
use crate::hir::{LinkedProject, ProjectStats};
use crate::project::file_loader::get_extension;
use crate::project::{CompileError, Compiler, WorkspaceOptions};

/// Where a workspace stands in its reload cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadState {
    /// Nothing cached and nothing running.
    Idle,
    Reloading,
    /// A snapshot is cached and the last reload succeeded.
    Ready,
    /// A snapshot is cached but the last reload failed.
    Stale { error: String },
}

struct InFlight {
    ticket: u64,
    cancel: CancellationToken,
}

/// Held by a running reload. Dropping it cancels the compile and, unless a newer
/// reload took over, clears the in-flight entry.
struct ReloadGuard<'a> {
    reloads: &'a Mutex<FxHashMap<String, InFlight>>,
    key: String,
    ticket: u64,
    cancel: CancellationToken,
}

impl Drop for ReloadGuard<'_> {
    fn drop(&mut self) {
        self.cancel.cancel();
        let mut reloads = self.reloads.lock();
        if reloads
            .get(&self.key)
            .is_some_and(|current| current.ticket == self.ticket)
        {
            debug!(key = %self.key, ticket = self.ticket, "reload dropped before finishing");
            reloads.remove(&self.key);
        }
    }
}

/// Owns the workspace cache and runs reloads through the external compiler.
pub struct AnalysisHost {
    cache: Arc<WorkspaceCache>,
    compiler: Arc<dyn Compiler>,
    options: Arc<WorkspaceOptions>,
    /// Latest reload per workspace key. Only the holder of the current ticket may
    /// publish its result.
    reloads: Mutex<FxHashMap<String, InFlight>>,
    /// Last reload error per key, cleared by a successful reload.
    failures: Mutex<FxHashMap<String, String>>,
    next_ticket: AtomicU64,
}

impl AnalysisHost {
    pub fn new(compiler: impl Compiler) -> Self {
        Self {
            cache: Arc::new(WorkspaceCache::new()),
            compiler: Arc::new(compiler),
            options: Arc::new(WorkspaceOptions::default()),
            reloads: Mutex::new(FxHashMap::default()),
            failures: Mutex::new(FxHashMap::default()),
            next_ticket: AtomicU64::new(0),
        }
    }

    pub fn with_options(mut self, options: WorkspaceOptions) -> Self {
        self.options = Arc::new(options);
        self
    }

    /// Share an existing cache (e.g. between hosts in tests).
    pub fn with_cache(mut self, cache: Arc<WorkspaceCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<WorkspaceCache> {
        &self.cache
    }

    pub fn options(&self) -> &Arc<WorkspaceOptions> {
        &self.options
    }

    // ------------------------------------------------------------------
    // Reload
    // ------------------------------------------------------------------

    /// Compile and index the workspace at `root`, then swap the cache entry.
    ///
    /// A newer reload for the same workspace cancels this one, which then returns
    /// [`ReloadError::Superseded`]. On failure the previous snapshot stays cached.
    /// Dropping the returned future cancels the compile.
    pub async fn reload(&self, root: &str) -> Result<Arc<Snapshot>, ReloadError> {
        let (key, path) = resolve_root(root)?;
        let guard = self.begin_reload(&key);
        let (ticket, cancel) = (guard.ticket, guard.cancel.clone());
        info!(key = %key, ticket, "reload started");

        let compiler = Arc::clone(&self.compiler);
        let options = Arc::clone(&self.options);
        let task_root = path.clone();
        let task_cancel = cancel.clone();
        let task = tokio::task::spawn_blocking(move || -> Result<LinkedProject, CompileError> {
            let project = compiler
                .compile(&task_root, &task_cancel)
                .map_err(|err| err.into_workspace_relative(&task_root))?;
            if task_cancel.is_cancelled() {
                return Err(CompileError::Cancelled);
            }
            let project = project.into_workspace_relative(&task_root);
            Ok(LinkedProject::build(Arc::new(project), &options))
        });

        let outcome = tokio::select! {
            _ = cancel.cancelled() => Err(ReloadError::Superseded),
            joined = task => match joined {
                Ok(Ok(linked)) => Ok(linked),
                Ok(Err(CompileError::Cancelled)) => Err(ReloadError::Superseded),
                Ok(Err(err)) => Err(ReloadError::Compile(err)),
                Err(err) => Err(ReloadError::TaskFailed(err.to_string())),
            },
        };

        self.finish_reload(&key, ticket, path, outcome)
    }

    /// [`reload`](Self::reload) shaped for the editor boundary.
    pub async fn reload_response(&self, root: &str) -> ReloadResponse {
        match self.reload(root).await {
            Ok(snapshot) => ReloadResponse::ok(snapshot.stats()),
            Err(err) => ReloadResponse::failed(&err),
        }
    }

    fn begin_reload(&self, key: &str) -> ReloadGuard<'_> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();
        let previous = self.reloads.lock().insert(
            key.to_string(),
            InFlight {
                ticket,
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            debug!(key = %key, superseded = previous.ticket, ticket, "superseding reload");
            previous.cancel.cancel();
        }
        ReloadGuard {
            reloads: &self.reloads,
            key: key.to_string(),
            ticket,
            cancel,
        }
    }

    fn finish_reload(
        &self,
        key: &str,
        ticket: u64,
        root: PathBuf,
        outcome: Result<LinkedProject, ReloadError>,
    ) -> Result<Arc<Snapshot>, ReloadError> {
        let mut reloads = self.reloads.lock();
        if reloads.get(key).is_none_or(|current| current.ticket != ticket) {
            debug!(key = %key, ticket, "discarding superseded reload");
            return Err(ReloadError::Superseded);
        }
        reloads.remove(key);

        match outcome {
            Ok(linked) => {
                let snapshot = self.cache.put(key, root, Arc::new(linked));
                self.failures.lock().remove(key);
                info!(key = %key, stats = ?snapshot.stats(), "reload finished");
                Ok(snapshot)
            }
            Err(err) => {
                warn!(
                    key = %key,
                    error = %err,
                    location = ?err.location(),
                    "reload failed, keeping previous snapshot"
                );
                if !matches!(err, ReloadError::Superseded) {
                    self.failures.lock().insert(key.to_string(), err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Cancel any running reload for `root` and drop its cached snapshot.
    pub fn invalidate(&self, root: &str) -> bool {
        let Some(key) = workspace_key(root) else {
            return false;
        };
        self.invalidate_key(&key)
    }

    fn invalidate_key(&self, key: &str) -> bool {
        let running = self.reloads.lock().remove(key);
        if let Some(running) = running {
            running.cancel.cancel();
        }
        self.failures.lock().remove(key);
        self.cache.invalidate(key)
    }

    /// React to a saved or changed file.
    ///
    /// A file with a context extension inside a cached (or reloading) workspace
    /// invalidates that workspace. Returns the invalidated key.
    pub fn notify_file_changed(&self, file: &str) -> Option<String> {
        let path = workspace_path(file)?;
        let ext = get_extension(&path)?;
        if !self.options.is_context_extension(&ext) {
            return None;
        }

        let key = self
            .cache
            .key_containing(&path)
            .or_else(|| self.reloading_key_containing(&path))?;
        self.invalidate_key(&key);
        debug!(key = %key, file = %path.display(), "context file changed");
        Some(key)
    }

    fn reloading_key_containing(&self, path: &Path) -> Option<String> {
        self.reloads
            .lock()
            .keys()
            .filter(|key| path.starts_with(Path::new(key.as_str())))
            .max_by_key(|key| key.len())
            .cloned()
    }

    pub fn state(&self, root: &str) -> ReloadState {
        let Some(key) = workspace_key(root) else {
            return ReloadState::Idle;
        };
        if self.reloads.lock().contains_key(&key) {
            return ReloadState::Reloading;
        }
        if !self.cache.has(&key) {
            return ReloadState::Idle;
        }
        match self.failures.lock().get(&key) {
            Some(error) => ReloadState::Stale {
                error: error.clone(),
            },
            None => ReloadState::Ready,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Snapshot handle for `root`, if one is cached.
    pub fn analysis(&self, root: &str) -> Option<Analysis> {
        let key = workspace_key(root)?;
        let snapshot = self.cache.get(&key)?;
        Some(Analysis {
            snapshot,
            options: Arc::clone(&self.options),
        })
    }

    fn with_analysis<T>(&self, root: &str, query: impl FnOnce(&Analysis) -> T) -> Response<T> {
        match self.analysis(root) {
            Some(analysis) => Response::ok(query(&analysis)),
            None => Response::unavailable(),
        }
    }

    pub fn stats(&self, root: &str) -> Response<StatsPayload> {
        self.with_analysis(root, |a| StatsPayload { stats: a.stats() })
    }

    pub fn references(&self, root: &str) -> Response<ReferencesPayload> {
        self.with_analysis(root, |a| ReferencesPayload {
            references: a.references(),
        })
    }

    pub fn codes(&self, root: &str) -> Response<CodesPayload> {
        self.with_analysis(root, |a| CodesPayload { codes: a.codes() })
    }

    pub fn relations(&self, root: &str) -> Response<RelationsPayload> {
        self.with_analysis(root, |a| RelationsPayload {
            relations: a.relations(),
        })
    }

    pub fn relation_graph(&self, root: &str, reference: Option<&str>) -> Response<GraphPayload> {
        self.with_analysis(root, |a| a.relation_graph(reference).into())
    }

    pub fn rename(
        &self,
        root: &str,
        kind: RenameKind,
        old_name: &str,
        new_name: &str,
    ) -> Response<WorkspaceEdit> {
        let result = match self.analysis(root) {
            Some(analysis) => analysis.rename(kind, old_name, new_name),
            None => Err(RenameError::Unavailable),
        };
        match result {
            Ok(edit) => Response::ok(edit),
            Err(err) => Response::failure(err.to_string()),
        }
    }

    pub fn is_renameable(&self, root: &str, token: &str) -> Response<RenameablePayload> {
        self.with_analysis(root, |a| RenameablePayload {
            renameable: a.is_renameable(token),
        })
    }

    pub fn ontology_topics(&self, root: &str) -> Response<TopicsPayload> {
        self.with_analysis(root, |a| TopicsPayload {
            topics: a.ontology_topics(),
        })
    }

    pub fn ontology_annotations(
        &self,
        root: &str,
        active_file: Option<&str>,
    ) -> Response<AnnotationsPayload> {
        self.with_analysis(root, |a| AnnotationsPayload {
            annotations: a.ontology_annotations(active_file),
        })
    }
}

fn resolve_root(root: &str) -> Result<(String, PathBuf), ReloadError> {
    let invalid = || ReloadError::InvalidWorkspace(root.to_string());
    let key = workspace_key(root).ok_or_else(invalid)?;
    let path = workspace_path(root).ok_or_else(invalid)?;
    Ok((key, path))
}

/// Read-only view over one workspace snapshot.
#[derive(Clone)]
pub struct Analysis {
    snapshot: Arc<Snapshot>,
    options: Arc<WorkspaceOptions>,
}

impl Analysis {
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    pub fn linked(&self) -> &LinkedProject {
        &self.snapshot.linked
    }

    pub fn generation(&self) -> u64 {
        self.snapshot.generation
    }

    pub fn stats(&self) -> ProjectStats {
        self.snapshot.stats()
    }

    pub fn references(&self) -> Vec<ReferenceEntry> {
        get_references(self.linked())
    }

    pub fn codes(&self) -> Vec<CodeEntry> {
        get_codes(self.linked())
    }

    pub fn relations(&self) -> Vec<RelationEntry> {
        get_relations(self.linked())
    }

    pub fn relation_graph(&self, reference: Option<&str>) -> RelationGraph {
        relation_graph(self.linked(), reference)
    }

    pub fn find_references(&self, token: &str, include_declaration: bool) -> ReferenceResult {
        find_references(self.linked(), token, include_declaration)
    }

    pub fn goto_definition(&self, line_text: &str, column: u32) -> GotoResult {
        goto_definition(self.linked(), line_text, column)
    }

    pub fn hover(&self, line_text: &str, column: u32) -> Option<HoverResult> {
        hover(self.linked(), line_text, column)
    }

    pub fn ontology_topics(&self) -> Vec<TopicEntry> {
        ontology_topics(self.linked())
    }

    pub fn ontology_annotations(&self, active_file: Option<&str>) -> Vec<OntologyAnnotation> {
        ontology_annotations(self.linked(), active_file)
    }

    pub fn rename(
        &self,
        kind: RenameKind,
        old_name: &str,
        new_name: &str,
    ) -> Result<WorkspaceEdit, RenameError> {
        compute_rename(
            self.linked(),
            &self.snapshot.root,
            &self.options,
            kind,
            old_name,
            new_name,
        )
    }

    pub fn is_renameable(&self, token: &str) -> bool {
        is_renameable(self.linked(), token)
    }

    pub fn prepare_rename(&self, line_text: &str, column: u32) -> Option<PrepareRename> {
        prepare_rename(self.linked(), line_text, column)
    }
}
