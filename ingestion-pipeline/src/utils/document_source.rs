use std::path::{Path, PathBuf};

use common::error::AppError;
use tracing::{debug, warn};

/// A candidate document found in the ingestion folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub file_name: String,
    pub path: PathBuf,
}

impl SourceDocument {
    pub fn new(file_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            path: path.into(),
        }
    }
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Lists the regular `.pdf` files directly inside `folder`, sorted by file
/// name. Subdirectories are not descended into.
pub async fn list_pdf_documents(folder: &Path) -> Result<Vec<SourceDocument>, AppError> {
    let metadata = tokio::fs::metadata(folder).await.map_err(|err| {
        AppError::Validation(format!(
            "folder '{}' cannot be read: {err}",
            folder.display()
        ))
    })?;
    if !metadata.is_dir() {
        return Err(AppError::Validation(format!(
            "'{}' is not a directory",
            folder.display()
        )));
    }

    let mut entries = tokio::fs::read_dir(folder).await?;
    let mut documents = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !has_pdf_extension(&path) {
            continue;
        }
        // Follows symlinks so linked documents are picked up.
        if !tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            debug!(path = %path.display(), "Skipping non-file entry");
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            warn!(path = %path.display(), "Skipping file with a non UTF-8 name");
            continue;
        };
        documents.push(SourceDocument::new(file_name, path));
    }

    documents.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_pdfs_in_lexicographic_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf"] {
            std::fs::write(dir.path().join(name), b"content").expect("write");
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).expect("mkdir");

        let documents = list_pdf_documents(dir.path()).await.expect("list");
        let names: Vec<_> = documents.iter().map(|d| d.file_name.as_str()).collect();

        assert_eq!(names, vec!["a.PDF", "b.pdf", "c.pdf"]);
    }

    #[tokio::test]
    async fn test_missing_folder_is_a_validation_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing");

        let err = list_pdf_documents(&missing).await.expect_err("missing");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_folder_yields_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let documents = list_pdf_documents(dir.path()).await.expect("list");
        assert!(documents.is_empty());
    }
}
