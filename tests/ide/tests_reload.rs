//! Reload lifecycle: success, failure with a stale snapshot, supersession, abandonment
//! and invalidation.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use synesis::Location;
use synesis::hir::ProjectStats;
use synesis::ide::{AnalysisHost, NOT_LOADED, ReloadError, ReloadState, workspace_key};
use synesis::project::{CompileError, CompiledProject};

use crate::helpers::workspace_fixtures::*;

fn scenario_stats() -> ProjectStats {
    ProjectStats {
        source_count: 2,
        item_count: 2,
        ontology_count: 2,
        code_count: 3,
        chain_count: 1,
        triple_count: 1,
    }
}

#[tokio::test]
async fn test_queries_before_reload_are_unavailable() {
    let workspace = ScenarioWorkspace::new();
    let host = AnalysisHost::new(scenario_compiler());
    let root = workspace.root_str();

    assert_eq!(host.state(&root), ReloadState::Idle);
    assert!(host.analysis(&root).is_none());

    let codes = host.codes(&root);
    assert!(!codes.is_success());
    assert_eq!(codes.error.as_deref(), Some(NOT_LOADED));
    assert!(codes.data().is_none());
    assert!(!host.relation_graph(&root, None).is_success());
    assert!(!host.ontology_topics(&root).is_success());
}

#[tokio::test]
async fn test_successful_reload() {
    let workspace = ScenarioWorkspace::new();
    let host = AnalysisHost::new(scenario_compiler());
    let root = workspace.root_str();

    let response = host.reload_response(&root).await;
    assert!(response.success);
    assert_eq!(response.stats, Some(scenario_stats()));
    assert_eq!(host.state(&root), ReloadState::Ready);

    let analysis = host.analysis(&root).unwrap();
    assert_eq!(analysis.generation(), 1);
    let relations = analysis.relations();
    assert_eq!(relations[0].location, Some(Location::new("interviews.syn", 6, 16)));

    let stats = host.stats(&root);
    assert_eq!(stats.data().map(|s| s.stats), Some(scenario_stats()));
}

#[tokio::test]
async fn test_graph_for_source_without_relations() {
    let workspace = ScenarioWorkspace::new();
    let host = AnalysisHost::new(scenario_compiler());
    let root = workspace.root_str();
    host.reload(&root).await.unwrap();

    let response = host.relation_graph(&root, Some("@r3"));
    assert!(response.is_success());
    let payload = response.data().unwrap();
    assert!(payload.graph.is_empty());
    assert_eq!(payload.mermaid_code, "graph LR\n    empty[No relations]");

    let full = host.relation_graph(&root, None);
    assert_eq!(full.data().map(|p| p.graph.edges.len()), Some(1));
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_snapshot() {
    let workspace = ScenarioWorkspace::new();
    let host = AnalysisHost::new(scenario_compiler());
    let root = workspace.root_str();
    host.reload(&root).await.unwrap();

    workspace.write("broken.syn", "SOURCE @r9\n    ITEM\n");
    let err = host.reload(&root).await.unwrap_err();
    assert!(matches!(err, ReloadError::Compile(CompileError::Syntax { .. })));
    assert_eq!(err.location(), Some(&Location::new("broken.syn", 3, 1)));

    let response = host.reload_response(&root).await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("expected END before end of file"));
    assert_eq!(response.location, Some(Location::new("broken.syn", 3, 1)));

    assert_eq!(
        host.state(&root),
        ReloadState::Stale {
            error: "expected END before end of file".to_string()
        }
    );
    let analysis = host.analysis(&root).unwrap();
    assert_eq!(analysis.generation(), 1);
    assert_eq!(analysis.stats(), scenario_stats());
    assert!(host.codes(&root).is_success());
}

#[tokio::test]
async fn test_missing_project_file() {
    let workspace = ScenarioWorkspace::new();
    std::fs::remove_file(workspace.root().join("project.synp")).unwrap();
    let host = AnalysisHost::new(scenario_compiler());

    let err = host.reload(&workspace.root_str()).await.unwrap_err();
    assert!(matches!(err, ReloadError::Compile(CompileError::NoProject(_))));
    assert_eq!(host.state(&workspace.root_str()), ReloadState::Idle);
}

#[tokio::test]
async fn test_invalid_workspace_root() {
    let host = AnalysisHost::new(scenario_compiler());
    let err = host.reload("   ").await.unwrap_err();
    assert!(matches!(err, ReloadError::InvalidWorkspace(_)));
}

#[tokio::test]
async fn test_newer_reload_supersedes_running_one() {
    let workspace = ScenarioWorkspace::new();
    let root = workspace.root_str();
    let started = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let compiler = {
        let started = Arc::clone(&started);
        let calls = Arc::clone(&calls);
        move |root: &Path, cancel: &CancellationToken| -> Result<CompiledProject, CompileError> {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                started.notify_one();
                while !cancel.is_cancelled() {
                    std::thread::sleep(std::time::Duration::from_millis(5));
                }
                return Err(CompileError::Cancelled);
            }
            Ok(scenario_project(root, "alpha", "r1"))
        }
    };
    let host = Arc::new(AnalysisHost::new(compiler));

    let first = {
        let host = Arc::clone(&host);
        let root = root.clone();
        tokio::spawn(async move { host.reload(&root).await })
    };
    started.notified().await;
    assert_eq!(host.state(&root), ReloadState::Reloading);

    let second = host.reload(&root).await.unwrap();
    assert_eq!(second.stats(), scenario_stats());

    let first = first.await.unwrap();
    assert!(matches!(first, Err(ReloadError::Superseded)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(host.state(&root), ReloadState::Ready);
    assert_eq!(
        host.analysis(&root).map(|a| a.generation()),
        Some(second.generation)
    );
}

#[tokio::test]
async fn test_abandoned_reload_returns_to_idle() {
    let workspace = ScenarioWorkspace::new();
    let root = workspace.root_str();
    let started = Arc::new(Notify::new());
    let stopped = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let compiler = {
        let started = Arc::clone(&started);
        let stopped = Arc::clone(&stopped);
        let calls = Arc::clone(&calls);
        move |root: &Path, cancel: &CancellationToken| -> Result<CompiledProject, CompileError> {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                started.notify_one();
                while !cancel.is_cancelled() {
                    std::thread::sleep(std::time::Duration::from_millis(5));
                }
                stopped.notify_one();
                return Err(CompileError::Cancelled);
            }
            Ok(scenario_project(root, "alpha", "r1"))
        }
    };
    let host = Arc::new(AnalysisHost::new(compiler));

    let abandoned = {
        let host = Arc::clone(&host);
        let root = root.clone();
        tokio::spawn(async move { host.reload(&root).await })
    };
    started.notified().await;
    assert_eq!(host.state(&root), ReloadState::Reloading);

    abandoned.abort();
    assert!(abandoned.await.unwrap_err().is_cancelled());
    assert_eq!(host.state(&root), ReloadState::Idle);
    stopped.notified().await;

    host.reload(&root).await.unwrap();
    assert_eq!(host.state(&root), ReloadState::Ready);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_file_change_invalidates_workspace() {
    let workspace = ScenarioWorkspace::new();
    let host = AnalysisHost::new(scenario_compiler());
    let root = workspace.root_str();
    host.reload(&root).await.unwrap();

    let notes = workspace.root().join("notes.md");
    assert_eq!(host.notify_file_changed(&notes.to_string_lossy()), None);
    assert!(host.analysis(&root).is_some());

    let changed = workspace.root().join("interviews.syn");
    assert_eq!(
        host.notify_file_changed(&changed.to_string_lossy()),
        workspace_key(&root)
    );
    assert!(host.analysis(&root).is_none());
    assert_eq!(host.state(&root), ReloadState::Idle);
    assert_eq!(host.stats(&root).error.as_deref(), Some(NOT_LOADED));

    host.reload(&root).await.unwrap();
    assert_eq!(host.analysis(&root).map(|a| a.generation()), Some(2));
}

#[tokio::test]
async fn test_explicit_invalidate() {
    let workspace = ScenarioWorkspace::new();
    let host = AnalysisHost::new(scenario_compiler());
    let root = workspace.root_str();

    assert!(!host.invalidate(&root));
    host.reload(&root).await.unwrap();
    assert!(host.invalidate(&root));
    assert!(host.cache().is_empty());
}
