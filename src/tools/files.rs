//! File tools over a working directory.
//!
//! Relative paths resolve against the root the toolset was created with;
//! absolute paths are used as given. No sandboxing is applied.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::{Tool, ToolArgs};
use crate::types::{ParameterSpec, ParameterType, ToolDeclaration};
use crate::{Error, Result};

fn not_found(err: std::io::Error, shown: &str) -> Error {
    if err.kind() == ErrorKind::NotFound {
        Error::NotFound {
            path: shown.to_string(),
        }
    } else {
        Error::Io(err)
    }
}

/// Sorted entry names of the directory at `path`.
pub async fn list_entries(path: &Path) -> Result<Vec<String>> {
    let shown = path.display().to_string();
    let mut dir = tokio::fs::read_dir(path)
        .await
        .map_err(|e| not_found(e, &shown))?;
    let mut names = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

pub async fn read_text(path: &Path) -> Result<String> {
    let shown = path.display().to_string();
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| not_found(e, &shown))
}

/// Write `content`, creating missing parent directories. Returns bytes written.
pub async fn write_text(path: &Path, content: &str) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    Ok(content.len())
}

pub(crate) fn tools(root: PathBuf) -> Vec<Arc<dyn Tool>> {
    let root = Arc::new(root);
    vec![
        Arc::new(ListFiles { root: root.clone() }),
        Arc::new(ReadFile { root: root.clone() }),
        Arc::new(WriteFile { root }),
    ]
}

pub struct ListFiles {
    root: Arc<PathBuf>,
}

#[async_trait]
impl Tool for ListFiles {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration::new("list_files", "Lists the entries of a directory").parameter(
            ParameterSpec::new(
                "directory",
                ParameterType::String,
                "Directory to list, defaults to the working directory",
            ),
        )
    }

    async fn call(&self, args: &ToolArgs<'_>) -> Result<Value> {
        let directory = args.opt_str("directory")?.unwrap_or(".");
        let entries = list_entries(&self.root.join(directory)).await?;
        debug!(directory, count = entries.len(), "listed directory");
        Ok(json!({ "directory": directory, "files": entries }))
    }
}

pub struct ReadFile {
    root: Arc<PathBuf>,
}

#[async_trait]
impl Tool for ReadFile {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration::new("read_file", "Reads a UTF-8 text file").parameter(
            ParameterSpec::new("file_path", ParameterType::String, "Path of the file to read")
                .required(),
        )
    }

    async fn call(&self, args: &ToolArgs<'_>) -> Result<Value> {
        let file_path = args.str("file_path")?;
        let content = read_text(&self.root.join(file_path))
            .await
            .map_err(|e| match e {
                Error::NotFound { .. } => Error::NotFound {
                    path: file_path.to_string(),
                },
                other => other,
            })?;
        Ok(json!({ "file_path": file_path, "content": content }))
    }
}

pub struct WriteFile {
    root: Arc<PathBuf>,
}

#[async_trait]
impl Tool for WriteFile {
    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration::new(
            "write_file",
            "Writes text to a file, replacing any existing content",
        )
        .parameter(
            ParameterSpec::new("file_path", ParameterType::String, "Path of the file to write")
                .required(),
        )
        .parameter(
            ParameterSpec::new("content", ParameterType::String, "Text to write").required(),
        )
    }

    async fn call(&self, args: &ToolArgs<'_>) -> Result<Value> {
        let file_path = args.str("file_path")?;
        let content = args.str("content")?;
        let bytes_written = write_text(&self.root.join(file_path), content).await?;
        Ok(json!({ "path": file_path, "bytes_written": bytes_written }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;
    use crate::types::{ToolInvocation, ToolOutcome};

    #[tokio::test]
    async fn test_write_then_read_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::files(dir.path());

        let written = registry
            .invoke(&ToolInvocation::new(
                "write_file",
                json!({"file_path": "notes/b.txt", "content": "hello"}),
            ))
            .await;
        assert_eq!(written.payload()["result"]["bytes_written"], 5);

        std::fs::write(dir.path().join("a.txt"), "x").unwrap();

        let read = registry
            .invoke(&ToolInvocation::new("read_file", json!({"file_path": "notes/b.txt"})))
            .await;
        assert_eq!(read.payload()["result"]["content"], "hello");

        let listed = registry
            .invoke(&ToolInvocation::new("list_files", json!({})))
            .await;
        assert_eq!(listed.payload()["result"]["files"], json!(["a.txt", "notes"]));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::files(dir.path());
        let result = registry
            .invoke(&ToolInvocation::new("read_file", json!({"file_path": "nope.txt"})))
            .await;
        match result.outcome {
            ToolOutcome::Failure { kind, message } => {
                assert_eq!(kind, "not_found");
                assert_eq!(message, "Not found: nope.txt");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_entries(&dir.path().join("missing")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        write_text(&path, "first version").await.unwrap();
        assert_eq!(write_text(&path, "second").await.unwrap(), 6);
        assert_eq!(read_text(&path).await.unwrap(), "second");
    }
}
