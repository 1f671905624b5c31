//! Local-folder document source.
//!
//! Reads `.txt` and `.md` files from a configured directory and exposes
//! them through the `DocumentSource` contract (`name → content`).

use std::path::PathBuf;

use async_trait::async_trait;

use veribot_core::error::{Result, VeribotError};
use veribot_core::traits::{DocumentMeta, DocumentSource};

pub struct FolderSource {
    dir: PathBuf,
}

impl FolderSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DocumentSource for FolderSource {
    async fn list_documents(&self) -> Result<Vec<DocumentMeta>> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| VeribotError::Source(format!("read {}: {e}", self.dir.display())))?;

        let mut docs = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            let mime_type = match ext {
                "txt" => "text/plain",
                "md" => "text/markdown",
                _ => continue,
            };
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339())
                .unwrap_or_default();

            docs.push(DocumentMeta {
                id: path.display().to_string(),
                name,
                mime_type: mime_type.to_string(),
                modified,
            });
        }

        docs.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::info!("📁 Found {} documents in {}", docs.len(), self.dir.display());
        Ok(docs)
    }

    async fn content(&self, id: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(id) {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                tracing::warn!("⚠️ Skipping unreadable document {id}: {e}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_folder(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("veribot-source-tests").join(name);
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).ok();
        dir
    }

    #[tokio::test]
    async fn test_lists_only_supported_extensions() {
        let dir = temp_folder("extensions");
        std::fs::write(dir.join("guide.txt"), "报到指南").unwrap();
        std::fs::write(dir.join("notes.md"), "# 须知").unwrap();
        std::fs::write(dir.join("photo.png"), [0u8; 4]).unwrap();

        let source = FolderSource::new(&dir);
        let docs = source.list_documents().await.unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["guide", "notes"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_collect_maps_names_to_content() {
        let dir = temp_folder("collect");
        std::fs::write(dir.join("faq.txt"), "常见问题内容").unwrap();

        let source = FolderSource::new(&dir);
        let contents = source.collect().await.unwrap();
        assert_eq!(contents.get("faq").map(String::as_str), Some("常见问题内容"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_missing_document_is_absent_not_error() {
        let dir = temp_folder("absent");
        let source = FolderSource::new(&dir);
        let content = source.content("/definitely/not/a/file.txt").await.unwrap();
        assert!(content.is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_missing_folder_is_an_error() {
        let source = FolderSource::new("/definitely/not/a/folder");
        assert!(source.list_documents().await.is_err());
    }
}
