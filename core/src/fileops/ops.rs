use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::executor::ExecutionResult;
use crate::intent::FileFunction;

use super::sandbox::{Sandbox, SandboxError};

#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("{0}")]
    Sandbox(#[from] SandboxError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("{0} is a directory, not a file")]
    NotAFile(String),

    #[error("{0} is not a directory")]
    NotADirectory(String),

    #[error("Failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

impl FileEntry {
    fn render(&self) -> String {
        match self.entry_type {
            EntryType::Directory => format!("[DIR] {}", self.name),
            EntryType::File => {
                let modified = self
                    .modified
                    .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                format!(
                    "[FILE] {} ({} bytes, modified {})",
                    self.name, self.size, modified
                )
            }
        }
    }
}

/// Filesystem primitives confined to the sandbox root.
///
/// Existence checks and the mutation that follows are not atomic; two racing
/// callers on the same target can interleave. `create_file` is the exception:
/// it opens with `create_new`, so it never truncates an existing file.
#[derive(Debug, Clone)]
pub struct FileOps {
    sandbox: Sandbox,
}

impl FileOps {
    pub fn new(sandbox: Sandbox) -> Self {
        Self { sandbox }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    pub async fn create_file(&self, name: &str) -> ExecutionResult {
        let f = FileFunction::CreateFile;
        into_result(f, self.try_create_file(name).await)
    }

    pub async fn create_directory(&self, name: &str) -> ExecutionResult {
        let f = FileFunction::CreateDirectory;
        into_result(f, self.try_create_directory(name).await)
    }

    pub async fn delete_file(&self, name: &str) -> ExecutionResult {
        let f = FileFunction::DeleteFile;
        into_result(f, self.try_delete_file(name).await)
    }

    pub async fn copy_file(&self, src: &str, dst: &str) -> ExecutionResult {
        let f = FileFunction::CopyFile;
        into_result(f, self.try_copy_file(src, dst).await)
    }

    pub async fn move_file(&self, src: &str, dst: &str) -> ExecutionResult {
        let f = FileFunction::MoveFile;
        into_result(f, self.try_move_file(src, dst).await)
    }

    pub async fn list_files(&self, dir: Option<&str>) -> ExecutionResult {
        let action = FileFunction::ListFiles.action();
        let dir = dir.unwrap_or(".");
        match self.try_list_files(dir).await {
            Ok(entries) => {
                let shown = self.shown(dir);
                let text = if entries.is_empty() {
                    format!("Directory {shown} is empty")
                } else {
                    let lines: Vec<String> = entries.iter().map(FileEntry::render).collect();
                    format!("Contents of {shown}:\n{}", lines.join("\n"))
                };
                ExecutionResult::ok(action, text)
                    .with_data(serde_json::to_value(&entries).unwrap_or_default())
            }
            Err(e) => failure(action, e),
        }
    }

    async fn try_create_file(&self, name: &str) -> Result<String, FileOpError> {
        let path = self.sandbox.resolve(name)?;
        let shown = self.sandbox.display(&path);
        if exists(&path).await {
            return Err(FileOpError::AlreadyExists(shown));
        }
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::AlreadyExists => FileOpError::AlreadyExists(shown.clone()),
                _ => io_err("create", &shown, source),
            })?;
        Ok(format!("Created file {shown}"))
    }

    async fn try_create_directory(&self, name: &str) -> Result<String, FileOpError> {
        let path = self.sandbox.resolve(name)?;
        let shown = self.sandbox.display(&path);
        if exists(&path).await {
            return Err(FileOpError::AlreadyExists(shown));
        }
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| io_err("create directory", &shown, e))?;
        Ok(format!("Created directory {shown}"))
    }

    async fn try_delete_file(&self, name: &str) -> Result<String, FileOpError> {
        let path = self.sandbox.resolve(name)?;
        let shown = self.sandbox.display(&path);
        let meta = metadata(&path, &shown).await?;
        if meta.is_dir() {
            return Err(FileOpError::NotAFile(shown));
        }
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| io_err("delete", &shown, e))?;
        Ok(format!("Deleted file {shown}"))
    }

    async fn try_copy_file(&self, src: &str, dst: &str) -> Result<String, FileOpError> {
        let from = self.sandbox.resolve(src)?;
        let to = self.sandbox.resolve(dst)?;
        let from_shown = self.sandbox.display(&from);
        let to_shown = self.sandbox.display(&to);

        let meta = metadata(&from, &from_shown).await?;
        if meta.is_dir() {
            return Err(FileOpError::NotAFile(from_shown));
        }
        if exists(&to).await {
            return Err(FileOpError::AlreadyExists(to_shown));
        }
        tokio::fs::copy(&from, &to)
            .await
            .map_err(|e| io_err("copy", &from_shown, e))?;
        Ok(format!("Copied {from_shown} to {to_shown}"))
    }

    async fn try_move_file(&self, src: &str, dst: &str) -> Result<String, FileOpError> {
        let from = self.sandbox.resolve(src)?;
        let from_shown = self.sandbox.display(&from);
        metadata(&from, &from_shown).await?;

        // A trailing separator means "into this directory, keep the name".
        let to = if dst.trim_end().ends_with(['/', '\\']) {
            let file_name = from
                .file_name()
                .ok_or_else(|| SandboxError::Invalid(src.to_string()))?;
            self.sandbox.resolve(dst)?.join(file_name)
        } else {
            self.sandbox.resolve(dst)?
        };
        let to_shown = self.sandbox.display(&to);

        if exists(&to).await {
            return Err(FileOpError::AlreadyExists(to_shown));
        }
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_err("create directory", &self.sandbox.display(parent), e))?;
        }
        tokio::fs::rename(&from, &to)
            .await
            .map_err(|e| io_err("move", &from_shown, e))?;
        Ok(format!("Moved {from_shown} to {to_shown}"))
    }

    async fn try_list_files(&self, dir: &str) -> Result<Vec<FileEntry>, FileOpError> {
        let path = self.sandbox.resolve(dir)?;
        let shown = self.sandbox.display(&path);
        let meta = metadata(&path, &shown).await?;
        if !meta.is_dir() {
            return Err(FileOpError::NotADirectory(shown));
        }

        let mut read = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| io_err("list", &shown, e))?;
        let mut entries = Vec::new();
        while let Some(entry) = read
            .next_entry()
            .await
            .map_err(|e| io_err("list", &shown, e))?
        {
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            entries.push(FileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                entry_type: if meta.is_dir() {
                    EntryType::Directory
                } else {
                    EntryType::File
                },
                size: if meta.is_dir() { 0 } else { meta.len() },
                modified: meta.modified().ok().map(DateTime::<Local>::from),
            });
        }

        entries.sort_by(|a, b| {
            a.entry_type
                .cmp(&b.entry_type)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(entries)
    }

    fn shown(&self, raw: &str) -> String {
        self.sandbox
            .resolve(raw)
            .map(|p| self.sandbox.display(&p))
            .unwrap_or_else(|_| raw.to_string())
    }
}

impl PartialOrd for EntryType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntryType {
    /// Directories sort ahead of files.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let rank = |t: &EntryType| match t {
            EntryType::Directory => 0,
            EntryType::File => 1,
        };
        rank(self).cmp(&rank(other))
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::symlink_metadata(path).await.is_ok()
}

async fn metadata(path: &Path, shown: &str) -> Result<std::fs::Metadata, FileOpError> {
    tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FileOpError::NotFound(shown.to_string()),
        _ => io_err("inspect", shown, e),
    })
}

fn io_err(op: &'static str, path: &str, source: std::io::Error) -> FileOpError {
    FileOpError::Io {
        op,
        path: path.to_string(),
        source,
    }
}

fn into_result(function: FileFunction, outcome: Result<String, FileOpError>) -> ExecutionResult {
    match outcome {
        Ok(text) => {
            tracing::info!(target: "vox.fileops", op = function.as_str(), "{text}");
            ExecutionResult::ok(function.action(), text)
        }
        Err(e) => failure(function.action(), e),
    }
}

fn failure(action: &str, e: FileOpError) -> ExecutionResult {
    tracing::warn!(target: "vox.fileops", action, error = %e, "file operation failed");
    ExecutionResult::failed(action, e.to_string(), ErrorKind::FileOperationFailed)
}
