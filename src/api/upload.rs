//! Upload staging
//!
//! Writes multipart `file` parts to the uploads directory under unique
//! names. The pipeline reads the staged copies; the upload body itself is
//! never parsed in memory beyond the multipart framing.

use std::path::Path;

use axum::extract::Multipart;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::ingest::StagedFile;

/// Stage every `file` part of the multipart body to disk.
///
/// Parts under any other field name are ignored. Exceeding the configured
/// file-count limit rejects the request.
pub async fn store_uploads(
    mut multipart: Multipart,
    config: &Config,
) -> Result<Vec<StagedFile>, AppError> {
    tokio::fs::create_dir_all(&config.uploads_dir).await?;

    let mut staged = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        if staged.len() >= config.files_limit {
            return Err(AppError::InvalidRequest(format!(
                "At most {} files per upload",
                config.files_limit
            )));
        }

        let filename = field.file_name().unwrap_or("upload.txt").to_string();
        let data = field.bytes().await?;

        let path = config.uploads_dir.join(staged_filename(&filename));
        tokio::fs::write(&path, &data).await?;
        tracing::debug!(filename = %filename, path = %path.display(), "staged upload");

        staged.push(StagedFile { path, filename });
    }

    Ok(staged)
}

/// Unique on-disk name for an uploaded file, preserving its extension.
fn staged_filename(original: &str) -> String {
    let original = Path::new(original);
    let stem = original
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload");
    let extension = original
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    format!("{}_{}{}", stem, Uuid::new_v4(), extension)
}
