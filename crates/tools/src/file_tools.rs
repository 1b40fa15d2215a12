//! Generic file actions. Every path goes through the workspace guard
//! before any storage is touched; secret scanning happens upstream in
//! the dispatcher.

use crate::sandbox::WorkspaceGuard;
use neural_desk_core::ToolError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const MAX_SEARCH_MATCHES: usize = 100;

fn parse<T: DeserializeOwned>(args: &Value) -> Result<T, ToolError> {
    serde_json::from_value(args.clone()).map_err(|e| ToolError::Validation(e.to_string()))
}

fn default_dir() -> String {
    ".".to_string()
}

#[derive(Deserialize)]
struct ReadFileInput {
    path: String,
}

pub async fn read_file(guard: &WorkspaceGuard, args: &Value) -> Result<Value, ToolError> {
    let input: ReadFileInput = parse(args)?;
    let path = guard.resolve(&input.path)?;
    let content = fs::read_to_string(&path)
        .await
        .map_err(|e| ToolError::Execution(format!("read {}: {e}", input.path)))?;
    Ok(json!({ "path": input.path, "content": content }))
}

#[derive(Deserialize)]
struct WriteFileInput {
    path: String,
    content: String,
}

pub async fn write_file(guard: &WorkspaceGuard, args: &Value) -> Result<Value, ToolError> {
    let input: WriteFileInput = parse(args)?;
    let path = guard.resolve(&input.path)?;
    atomic_write(&path, &input.content).await?;
    Ok(json!({ "path": input.path, "bytes_written": input.content.len() }))
}

#[derive(Deserialize)]
struct EditFileInput {
    path: String,
    old_text: String,
    new_text: String,
}

pub async fn edit_file(guard: &WorkspaceGuard, args: &Value) -> Result<Value, ToolError> {
    let input: EditFileInput = parse(args)?;
    if input.old_text.is_empty() {
        return Err(ToolError::Validation("old_text must not be empty".into()));
    }
    let path = guard.resolve(&input.path)?;
    let content = fs::read_to_string(&path)
        .await
        .map_err(|e| ToolError::Execution(format!("read {}: {e}", input.path)))?;

    match content.matches(&input.old_text).count() {
        0 => {
            return Err(ToolError::Validation(format!(
                "old_text not found in {}",
                input.path
            )))
        }
        1 => {}
        n => {
            return Err(ToolError::Validation(format!(
                "old_text occurs {n} times in {}; it must be unique",
                input.path
            )))
        }
    }

    let updated = content.replacen(&input.old_text, &input.new_text, 1);
    atomic_write(&path, &updated).await?;
    Ok(json!({ "path": input.path, "replaced": true }))
}

#[derive(Deserialize)]
struct ListFilesInput {
    #[serde(default = "default_dir")]
    path: String,
}

pub async fn list_files(guard: &WorkspaceGuard, args: &Value) -> Result<Value, ToolError> {
    let input: ListFilesInput = parse(args)?;
    let path = guard.resolve(&input.path)?;

    let mut entries = Vec::new();
    let mut dir = fs::read_dir(&path)
        .await
        .map_err(|e| ToolError::Execution(format!("list {}: {e}", input.path)))?;
    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?
    {
        let name = entry.file_name().to_string_lossy().to_string();
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        entries.push(json!({ "name": name, "is_dir": is_dir }));
    }
    entries.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));

    Ok(json!({ "entries": entries }))
}

#[derive(Deserialize)]
struct SearchFilesInput {
    pattern: String,
    #[serde(default = "default_dir")]
    path: String,
}

pub async fn search_files(guard: &WorkspaceGuard, args: &Value) -> Result<Value, ToolError> {
    let input: SearchFilesInput = parse(args)?;
    if input.pattern.is_empty() {
        return Err(ToolError::Validation("pattern must not be empty".into()));
    }
    let start = guard.resolve(&input.path)?;

    let mut matches = Vec::new();
    let mut truncated = false;
    let mut stack = vec![start];

    'walk: while let Some(dir_path) = stack.pop() {
        let mut dir = match fs::read_dir(&dir_path).await {
            Ok(dir) => dir,
            Err(_) => continue,
        };
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?
        {
            let entry_path = entry.path();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                stack.push(entry_path);
                continue;
            }
            // non-UTF-8 files are skipped, not errors
            let Ok(content) = fs::read_to_string(&entry_path).await else {
                continue;
            };
            for (line_no, line) in content.lines().enumerate() {
                if line.contains(&input.pattern) {
                    if matches.len() >= MAX_SEARCH_MATCHES {
                        truncated = true;
                        break 'walk;
                    }
                    matches.push(json!({
                        "path": display_path(guard, &entry_path),
                        "line": line_no + 1,
                        "text": line,
                    }));
                }
            }
        }
    }

    Ok(json!({ "matches": matches, "truncated": truncated }))
}

fn display_path(guard: &WorkspaceGuard, path: &Path) -> String {
    path.strip_prefix(guard.default_root())
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

/// Temp-file-then-rename write so a crashed call never leaves a half
/// written file at the target path.
async fn atomic_write(path: &Path, content: &str) -> Result<(), ToolError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;
    file.write_all(content.as_bytes())
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;
    file.sync_all()
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;
    fs::rename(&temp_path, path)
        .await
        .map_err(|e| ToolError::Execution(e.to_string()))?;
    Ok(())
}
