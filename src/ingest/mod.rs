//! Markdown discovery and reading
//!
//! Turns a list of user-supplied paths into documents for the store. A file
//! argument is read as-is; a directory argument is walked recursively and
//! every `*.md` file inside it is collected. Paths that are neither are
//! skipped.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::store::Metadata;

/// One markdown document, keyed by the path it was read from
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub text: String,
}

/// Collect markdown documents from files and directories
pub fn collect_markdown(paths: &[PathBuf]) -> Result<Vec<SourceDocument>> {
    let mut docs = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk_markdown(path, &mut docs)?;
        } else if path.is_file() {
            docs.push(read_document(path)?);
        }
    }
    Ok(docs)
}

/// Aligned id/text/metadata columns for `RetrievalStore::add`
///
/// Ids are the source paths; each document carries a `source` metadata
/// entry pointing back at its file.
pub fn batch(docs: &[SourceDocument]) -> (Vec<String>, Vec<String>, Vec<Metadata>) {
    let ids: Vec<String> = docs
        .iter()
        .map(|doc| doc.path.display().to_string())
        .collect();
    let texts: Vec<String> = docs.iter().map(|doc| doc.text.clone()).collect();
    let metadatas: Vec<Metadata> = ids
        .iter()
        .map(|id| {
            let mut metadata = Metadata::new();
            metadata.insert("source".to_string(), serde_json::Value::String(id.clone()));
            metadata
        })
        .collect();
    (ids, texts, metadatas)
}

fn walk_markdown(dir: &Path, docs: &mut Vec<SourceDocument>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_markdown(&path, docs)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("md") {
            docs.push(read_document(&path)?);
        }
    }
    Ok(())
}

fn read_document(path: &Path) -> Result<SourceDocument> {
    let text = fs::read_to_string(path)?;
    Ok(SourceDocument {
        path: path.to_path_buf(),
        text,
    })
}
