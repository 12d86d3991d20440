//! Receive engine: runs each map file reception as one background task.
//!
//! The map directory is resolved up front so an unusable directory fails the
//! request before any task exists. The copy itself runs on the blocking pool
//! and cooperates with a per-task cancel flag. Every task ends with a
//! `receive:finished` event carrying its [`ReceiveReport`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tauri::{AppHandle, Emitter, Runtime};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::models::receive::{CopyOutcome, ReceiveReport, ReceiveRequest};
use crate::models::settings::ConflictPolicy;
use crate::services::map_receiver::{self, ReceiveResult};
use crate::services::map_library;
use crate::services::progress::ProgressThrottle;
use crate::storage::{map_sources, settings};

/// Event carrying the [`ReceiveReport`] of a finished task.
pub const FINISHED_EVENT: &str = "receive:finished";

/// Cancel flags of running receive tasks, keyed by task id.
pub type CancelFlags = Arc<Mutex<HashMap<String, Arc<AtomicBool>>>>;

/// Handle to a started receive task.
pub struct ReceiveTask {
    pub task_id: String,
    pub cancel_flag: Arc<AtomicBool>,
    pub handle: JoinHandle<ReceiveReport>,
}

/// Start receiving a map file. Returns as soon as the task is spawned.
pub async fn start<R: Runtime>(
    request: ReceiveRequest,
    app: AppHandle<R>,
    cancel_flags: CancelFlags,
) -> crate::error::Result<ReceiveTask> {
    let setup_app = app.clone();
    let (map_dir, policy) = tokio::task::spawn_blocking(move || {
        let dir = settings::ensure_map_directory(&setup_app)?;
        let policy = settings::get_settings(&setup_app)?.conflict_policy;
        Ok::<_, AppError>((dir, policy))
    })
    .await
    .map_err(|e| AppError::Internal(format!("spawn_blocking join error: {}", e)))??;

    let task_id = uuid::Uuid::new_v4().simple().to_string();
    let cancel_flag = Arc::new(AtomicBool::new(false));
    {
        let mut flags = cancel_flags.lock().await;
        flags.insert(task_id.clone(), cancel_flag.clone());
    }

    let handle = {
        let task_id = task_id.clone();
        let cancel_flag = cancel_flag.clone();
        tokio::spawn(async move {
            let report = run(
                task_id.clone(),
                request,
                app.clone(),
                map_dir,
                policy,
                cancel_flag,
            )
            .await;
            {
                let mut flags = cancel_flags.lock().await;
                flags.remove(&task_id);
            }
            let _ = app.emit(FINISHED_EVENT, report.clone());
            report
        })
    };

    Ok(ReceiveTask {
        task_id,
        cancel_flag,
        handle,
    })
}

async fn run<R: Runtime>(
    task_id: String,
    request: ReceiveRequest,
    app: AppHandle<R>,
    map_dir: PathBuf,
    policy: ConflictPolicy,
    cancel_flag: Arc<AtomicBool>,
) -> ReceiveReport {
    let source_name = request
        .source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let joined = {
        let task_id = task_id.clone();
        let request = request.clone();
        let map_dir = map_dir.clone();
        let app = app.clone();
        tokio::task::spawn_blocking(move || {
            let mut throttle = ProgressThrottle::new(task_id, source_name, app);
            let result = map_receiver::receive_map_file(
                &request,
                &map_dir,
                policy,
                &cancel_flag,
                |n| throttle.update(n),
            );
            throttle.finish();
            result
        })
        .await
    };

    let result = match joined {
        Ok(result) => result,
        Err(e) => {
            log::error!(
                "Receive task for '{}' failed: {}",
                request.source.to_string_lossy(),
                e
            );
            ReceiveResult {
                outcome: CopyOutcome::Unknown,
                name: map_receiver::guess_filename(request.file_name.as_deref(), &request.source),
                destination: None,
                bytes_copied: 0,
            }
        }
    };

    if result.outcome == CopyOutcome::Success {
        record_import(&app, &request, &result).await;
    }

    report(task_id, &result, &map_dir)
}

/// Record provenance and select the new map. Failures here do not change the
/// outcome of an already completed copy.
async fn record_import<R: Runtime>(
    app: &AppHandle<R>,
    request: &ReceiveRequest,
    result: &ReceiveResult,
) {
    let app = app.clone();
    let request = request.clone();
    let name = result.name.clone();
    let joined = tokio::task::spawn_blocking(move || {
        if let Some(url) = request.source_url.as_deref().filter(|u| !u.trim().is_empty()) {
            if let Err(e) = map_sources::write_info(
                &app,
                url,
                &name.file_name,
                &name.label,
                request.source_date,
                request.map_type.id(),
            ) {
                log::warn!("Recording source of '{}' failed: {}", name.file_name, e);
            }
        }
        if let Err(e) = map_library::set_current_map(&app, &name.file_name) {
            log::warn!("Selecting map '{}' failed: {}", name.file_name, e);
        }
    })
    .await;
    if let Err(e) = joined {
        log::warn!("Recording map import failed: {}", e);
    }
}

fn report(task_id: String, result: &ReceiveResult, map_dir: &Path) -> ReceiveReport {
    ReceiveReport {
        task_id,
        outcome: result.outcome,
        file_name: result.name.file_name.clone(),
        label: result.name.label.clone(),
        bytes_copied: result.bytes_copied,
        message: result.outcome.message(&result.name.label, map_dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::offline_map::OfflineMapType;
    use crate::models::receive::ReceiveProgress;
    use crate::services::progress::PROGRESS_EVENT;
    use crate::test_support::TestApp;
    use std::sync::atomic::Ordering;
    use tauri::Listener;

    fn new_flags() -> CancelFlags {
        Arc::new(Mutex::new(HashMap::new()))
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().unwrap()
    }

    #[test]
    fn test_receive_success_records_provenance_and_selects_map() {
        let app = TestApp::new();
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("bavaria.map");
        std::fs::write(&source, vec![7u8; 100_000]).unwrap();

        let progress = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = progress.clone();
        app.handle().listen(PROGRESS_EVENT, move |event| {
            let p: ReceiveProgress = serde_json::from_str(event.payload()).unwrap();
            sink.lock().unwrap().push(p.bytes_copied);
        });
        let finished = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = finished.clone();
        app.handle().listen(FINISHED_EVENT, move |event| {
            let r: ReceiveReport = serde_json::from_str(event.payload()).unwrap();
            sink.lock().unwrap().push(r);
        });

        let mut request = ReceiveRequest::new(&source);
        request.source_url = Some("https://download.mapsforge.org/maps/v5/europe/".to_string());
        request.source_date = 1_700_000_000_000;
        request.map_type = OfflineMapType::OpenAndroMaps;

        let flags = new_flags();
        let report = runtime().block_on(async {
            let task = start(request, app.handle().clone(), flags.clone())
                .await
                .unwrap();
            assert_eq!(task.task_id.len(), 32);
            task.handle.await.unwrap()
        });

        assert_eq!(report.outcome, CopyOutcome::Success);
        assert_eq!(report.file_name, "bavaria.map");
        assert_eq!(report.bytes_copied, 100_000);
        assert!(report.message.contains("bavaria"));
        assert!(!source.exists());

        let record = map_sources::find(app.handle(), "bavaria.map").unwrap().unwrap();
        assert_eq!(record.display_name, "Bavaria");
        assert_eq!(record.type_id, 1);
        assert_eq!(record.remote_date, 1_700_000_000_000);
        assert_eq!(
            settings::get_settings(app.handle())
                .unwrap()
                .current_map_file
                .as_deref(),
            Some("bavaria.map")
        );

        let progress = progress.lock().unwrap();
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(progress.last(), Some(&100_000));
        assert_eq!(*finished.lock().unwrap(), vec![report]);

        assert!(runtime().block_on(async { flags.lock().await.is_empty() }));
    }

    #[test]
    fn test_receive_without_source_url_records_nothing() {
        let app = TestApp::new();
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("alps.map");
        std::fs::write(&source, b"alps").unwrap();

        let report = runtime().block_on(async {
            let task = start(ReceiveRequest::new(&source), app.handle().clone(), new_flags())
                .await
                .unwrap();
            task.handle.await.unwrap()
        });

        assert_eq!(report.outcome, CopyOutcome::Success);
        assert!(map_sources::get_all(app.handle()).unwrap().is_empty());
    }

    #[test]
    fn test_cancel_before_copy_starts() {
        let app = TestApp::new();
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("alps.map");
        std::fs::write(&source, vec![1u8; 300_000]).unwrap();

        // the spawned task cannot run before the flag is raised on a current-thread runtime
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let flags = new_flags();
        let report = rt.block_on(async {
            let task = start(ReceiveRequest::new(&source), app.handle().clone(), flags.clone())
                .await
                .unwrap();
            assert!(flags.lock().await.contains_key(&task.task_id));
            task.cancel_flag.store(true, Ordering::Relaxed);
            let report = task.handle.await.unwrap();
            assert!(flags.lock().await.is_empty());
            report
        });

        assert_eq!(report.outcome, CopyOutcome::Cancelled);
        assert!(source.exists());
        assert!(!app.data_dir().join("maps").join("alps.map").exists());
        assert!(settings::get_settings(app.handle())
            .unwrap()
            .current_map_file
            .is_none());
    }

    #[test]
    fn test_missing_source_reports_not_found() {
        let app = TestApp::new();
        let dir = tempfile::tempdir().unwrap();
        let report = runtime().block_on(async {
            let task = start(
                ReceiveRequest::new(dir.path().join("missing.map")),
                app.handle().clone(),
                new_flags(),
            )
            .await
            .unwrap();
            task.handle.await.unwrap()
        });
        assert_eq!(report.outcome, CopyOutcome::SourceNotFound);
        assert_eq!(report.message, "Could not find the map file to copy.");
    }
}
