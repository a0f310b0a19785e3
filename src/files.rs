// src/files.rs
//! Upload persistence and script file creation.

use std::path::Path;
use uuid::Uuid;

pub const UPLOADS_DIR: &str = "uploads";
pub const OUTPUTS_DIR: &str = "outputs";

/// Persist an uploaded reference document under `uploads/` and return its
/// path. The stored name is prefixed with a uuid so concurrent uploads with
/// the same name never collide.
pub async fn save_upload_file(file_name: &str, data: &[u8]) -> Result<String, String> {
    tokio::fs::create_dir_all(UPLOADS_DIR)
        .await
        .map_err(|e| format!("Failed to create uploads directory: {}", e))?;

    let safe_name = sanitize_file_name(file_name);
    let path = format!("{}/{}_{}", UPLOADS_DIR, Uuid::new_v4(), safe_name);
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| format!("Failed to save upload '{}': {}", file_name, e))?;

    tracing::info!("📄 Saved uploaded reference: {}", path);
    Ok(path)
}

/// Write a finished script to `outputs/` as Markdown and return its path.
pub async fn create_script_file(script: &str, topic: &str) -> Result<String, String> {
    tokio::fs::create_dir_all(OUTPUTS_DIR)
        .await
        .map_err(|e| format!("Failed to create outputs directory: {}", e))?;

    let path = format!("{}/{}-{}.md", OUTPUTS_DIR, slugify(topic), Uuid::new_v4());
    tokio::fs::write(&path, script)
        .await
        .map_err(|e| format!("Failed to write script file: {}", e))?;

    tracing::info!("💾 Saved script: {}", path);
    Ok(path)
}

/// Whether `path` is an upload this service owns and may delete after a run.
pub fn is_managed_upload(path: &str) -> bool {
    path.starts_with(&format!("{}/", UPLOADS_DIR))
}

/// Delete a run's uploaded reference once the run is over. Default templates
/// are never touched.
pub async fn cleanup_upload(path: &str) {
    if !is_managed_upload(path) {
        return;
    }
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::debug!("Upload cleanup skipped for {}: {}", path, e);
    }
}

fn sanitize_file_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    base.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn slugify(topic: &str) -> String {
    let slug: String = topic
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let trimmed: String = slug.chars().take(40).collect();
    if trimmed.is_empty() {
        "script".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_keeps_alphanumerics() {
        assert_eq!(slugify("History of Rome"), "history-of-rome");
        assert_eq!(slugify("  Deep & Sea!  "), "deep-sea");
        assert_eq!(slugify("!!!"), "script");
    }

    #[test]
    fn test_sanitize_file_name_strips_paths() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("my notes.md"), "my_notes.md");
    }

    #[test]
    fn test_managed_upload_detection() {
        assert!(is_managed_upload("uploads/abc_ref.md"));
        assert!(!is_managed_upload("template_scripts/script-template-en.md"));
        assert!(!is_managed_upload("uploads.md"));
    }
}
