// src/services/script_generation.rs
//! Drives workflow runs on background tasks and reports progress through the
//! task store or an event stream.

use crate::files;
use crate::models::response::GenerationEvent;
use crate::workflow::{run_script_workflow, run_script_workflow_with_state, ScriptRequest};
use crate::AppState;
use futures::Stream;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Run one workflow for a polled task: mark it running, execute, persist the
/// script file, and record the terminal status. Stage errors become a failed
/// task, never a partial result.
pub async fn run_generation_task(app: Arc<AppState>, task_id: String, request: ScriptRequest) {
    app.task_manager.mark_running(&task_id).await;
    tracing::info!("🎬 Task {}: generating script for '{}'", task_id, request.topic);

    let file_path = request.file_path.clone();
    let topic = request.topic.clone();

    match run_script_workflow(app.runtime.clone(), request).await {
        Ok(script) => {
            let saved_path = match files::create_script_file(&script, &topic).await {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("Task {}: could not persist script file: {}", task_id, e);
                    None
                }
            };
            app.task_manager.mark_completed(&task_id, script, saved_path).await;
            tracing::info!("✅ Task {} completed", task_id);
        }
        Err(e) => {
            tracing::error!("❌ Task {} failed: {}", task_id, e);
            app.task_manager.mark_failed(&task_id, e).await;
        }
    }

    files::cleanup_upload(&file_path).await;
}

/// Run one workflow and surface progress as a stream of events:
/// started → research_completed → completed, or failed.
pub fn stream_generation(
    app: Arc<AppState>,
    request: ScriptRequest,
) -> impl Stream<Item = GenerationEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let _ = tx.send(GenerationEvent::Started);

        let file_path = request.file_path.clone();
        let topic = request.topic.clone();

        let research_tx = tx.clone();
        let result = run_script_workflow_with_state(app.runtime.clone(), request, move |state, node| {
            // Each completed research pass is worth reporting, including reruns
            if node == "research" && !state.research_results.is_empty() {
                let _ = research_tx.send(GenerationEvent::ResearchCompleted {
                    research_results: state.research_results.clone(),
                });
            }
        })
        .await;

        match result {
            Ok(state) => {
                let final_script = if state.final_script.is_empty() {
                    "No script generated".to_string()
                } else {
                    state.final_script
                };
                let saved_path = match files::create_script_file(&final_script, &topic).await {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!("Could not persist streamed script file: {}", e);
                        None
                    }
                };
                let _ = tx.send(GenerationEvent::Completed {
                    final_script,
                    file_path: saved_path,
                });
            }
            Err(e) => {
                let _ = tx.send(GenerationEvent::Failed { error: e });
            }
        }

        files::cleanup_upload(&file_path).await;
    });

    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (event, rx))
    })
}
