use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use glob::Pattern;
use regex::Regex;
use tokio::process::Command;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, SwarmError};
use crate::tools::tool::{DynTool, Tool, ToolParameter, ToolParameters, ToolParams, ToolResult};

fn required_str<'a>(tool: &str, params: &'a ToolParams, key: &str) -> Result<&'a str> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| SwarmError::tool(tool, format!("missing string parameter `{}`", key)))
}

fn optional_str<'a>(params: &'a ToolParams, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

/// 遍历目录，返回 (相对路径, 是否目录)，按路径排序
fn walk(root: &Path, recursive: bool) -> Result<Vec<(PathBuf, bool)>> {
    let mut walker = WalkDir::new(root).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        entries.push((relative, entry.file_type().is_dir()));
    }

    entries.sort();
    Ok(entries)
}

async fn walk_blocking(root: &Path, recursive: bool) -> Result<Vec<(PathBuf, bool)>> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || walk(&root, recursive))
        .await
        .map_err(|e| SwarmError::Other(e.into()))?
}

pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a file"
    }

    fn parameters(&self) -> ToolParameters {
        ToolParameters::from([(
            "path".to_string(),
            ToolParameter::string("Path to the file").required(),
        )])
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult> {
        let path = required_str(self.name(), params, "path")?;
        let content = tokio::fs::read_to_string(path).await?;
        Ok(ToolResult::ok(content))
    }
}

pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file"
    }

    fn parameters(&self) -> ToolParameters {
        ToolParameters::from([
            (
                "path".to_string(),
                ToolParameter::string("Path to the file").required(),
            ),
            (
                "content".to_string(),
                ToolParameter::string("Content to write").required(),
            ),
        ])
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult> {
        let path = Path::new(required_str(self.name(), params, "path")?);
        let content = required_str(self.name(), params, "content")?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;

        Ok(ToolResult::ok(format!("File written: {}", path.display())))
    }
}

pub struct ListFilesTool;

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List files in a directory"
    }

    fn parameters(&self) -> ToolParameters {
        ToolParameters::from([
            (
                "path".to_string(),
                ToolParameter::string("Directory path").required(),
            ),
            (
                "recursive".to_string(),
                ToolParameter::boolean("List recursively"),
            ),
        ])
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult> {
        let root = Path::new(required_str(self.name(), params, "path")?);
        let recursive = params
            .get("recursive")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let listing: Vec<String> = walk_blocking(root, recursive)
            .await?
            .into_iter()
            .map(|(path, is_dir)| {
                let display = path.to_string_lossy().replace('\\', "/");
                if is_dir {
                    format!("{}/", display)
                } else {
                    display
                }
            })
            .collect();

        Ok(ToolResult::ok(listing.join("\n")))
    }
}

pub struct RunCommandTool;

#[async_trait]
impl Tool for RunCommandTool {
    fn name(&self) -> &str {
        "run_command"
    }

    fn description(&self) -> &str {
        "Execute a shell command"
    }

    fn parameters(&self) -> ToolParameters {
        ToolParameters::from([
            (
                "command".to_string(),
                ToolParameter::string("Command to execute").required(),
            ),
            (
                "cwd".to_string(),
                ToolParameter::string("Working directory"),
            ),
        ])
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult> {
        let command_line = required_str(self.name(), params, "command")?;

        let mut command = if cfg!(windows) {
            let mut command = Command::new("cmd");
            command.arg("/C").arg(command_line);
            command
        } else {
            let mut command = Command::new("sh");
            command.arg("-c").arg(command_line);
            command
        };
        if let Some(cwd) = optional_str(params, "cwd") {
            command.current_dir(cwd);
        }

        debug!(command = %command_line, "running shell command");
        let output = command.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(SwarmError::tool(
                self.name(),
                format!("command exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let mut text = stdout.into_owned();
        if !stderr.is_empty() {
            text.push_str("\nSTDERR:\n");
            text.push_str(&stderr);
        }
        Ok(ToolResult::ok(text))
    }
}

pub struct SearchCodeTool;

impl SearchCodeTool {
    /// 文件名 glob 过滤，如 `*.rs`
    fn file_filter(pattern: &str) -> Result<Pattern> {
        Pattern::new(pattern)
            .map_err(|e| SwarmError::tool("search_code", format!("invalid file pattern: {}", e)))
    }
}

#[async_trait]
impl Tool for SearchCodeTool {
    fn name(&self) -> &str {
        "search_code"
    }

    fn description(&self) -> &str {
        "Search for a pattern in files"
    }

    fn parameters(&self) -> ToolParameters {
        ToolParameters::from([
            (
                "pattern".to_string(),
                ToolParameter::string("Search pattern (regex)").required(),
            ),
            (
                "path".to_string(),
                ToolParameter::string("Directory to search").required(),
            ),
            (
                "filePattern".to_string(),
                ToolParameter::string("File glob pattern (e.g., *.rs)"),
            ),
        ])
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult> {
        let pattern = required_str(self.name(), params, "pattern")?;
        let root = Path::new(required_str(self.name(), params, "path")?);
        let matcher = Regex::new(pattern)
            .map_err(|e| SwarmError::tool(self.name(), format!("invalid pattern: {}", e)))?;
        let filter = Self::file_filter(optional_str(params, "filePattern").unwrap_or("*"))?;

        let mut hits = Vec::new();
        for (relative, is_dir) in walk_blocking(root, true).await? {
            let file_name = relative
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            if is_dir || !filter.matches(&file_name) {
                continue;
            }
            let full_path = root.join(&relative);
            // 非 UTF-8 文件直接跳过
            let Ok(content) = tokio::fs::read_to_string(&full_path).await else {
                continue;
            };
            for (index, line) in content.lines().enumerate() {
                if matcher.is_match(line) {
                    hits.push(format!("{}:{}:{}", full_path.display(), index + 1, line));
                }
            }
        }

        if hits.is_empty() {
            Ok(ToolResult::ok("No matches found"))
        } else {
            Ok(ToolResult::ok(hits.join("\n")))
        }
    }
}

pub fn default_tools() -> Vec<DynTool> {
    vec![
        Arc::new(ReadFileTool),
        Arc::new(WriteFileTool),
        Arc::new(ListFilesTool),
        Arc::new(RunCommandTool),
        Arc::new(SearchCodeTool),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> ToolParams {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn write_then_read_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out.txt");
        let target_str = target.to_string_lossy().to_string();

        let written = WriteFileTool
            .execute(&params(json!({"path": target_str, "content": "abc"})))
            .await
            .unwrap();
        assert!(written.success);

        let read = ReadFileTool
            .execute(&params(json!({"path": target_str})))
            .await
            .unwrap();
        assert_eq!(read.output, "abc");
    }

    #[tokio::test]
    async fn list_files_marks_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/inner.rs"), "fn main() {}").unwrap();
        std::fs::write(dir.path().join("top.txt"), "x").unwrap();
        let root = dir.path().to_string_lossy().to_string();

        let flat = ListFilesTool
            .execute(&params(json!({"path": root})))
            .await
            .unwrap();
        assert_eq!(flat.output, "sub/\ntop.txt");

        let deep = ListFilesTool
            .execute(&params(json!({"path": root, "recursive": true})))
            .await
            .unwrap();
        assert_eq!(deep.output, "sub/\nsub/inner.rs\ntop.txt");
    }

    #[tokio::test]
    async fn search_code_filters_by_file_pattern() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn reverse() {}\nfn other() {}").unwrap();
        std::fs::write(dir.path().join("b.txt"), "reverse").unwrap();
        let root = dir.path().to_string_lossy().to_string();

        let result = SearchCodeTool
            .execute(&params(json!({"pattern": "reverse", "path": root, "filePattern": "*.rs"})))
            .await
            .unwrap();
        assert!(result.output.ends_with("a.rs:1:fn reverse() {}"));
        assert_eq!(result.output.lines().count(), 1);

        let none = SearchCodeTool
            .execute(&params(json!({"pattern": "absent", "path": root})))
            .await
            .unwrap();
        assert_eq!(none.output, "No matches found");
    }

    #[tokio::test]
    async fn search_code_file_pattern_supports_glob_classes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/a1.rs"), "let total = sum(xs);").unwrap();
        std::fs::write(dir.path().join("b1.rs"), "let total = sum(ys);").unwrap();
        std::fs::write(dir.path().join("a10.rs"), "let total = sum(zs);").unwrap();
        let root = dir.path().to_string_lossy().to_string();

        let result = SearchCodeTool
            .execute(&params(json!({"pattern": "sum\\(", "path": root, "filePattern": "[a]?.rs"})))
            .await
            .unwrap();
        assert_eq!(result.output.lines().count(), 1);
        assert!(result.output.contains("a1.rs:1:"));

        let err = SearchCodeTool
            .execute(&params(json!({"pattern": "sum", "path": root, "filePattern": "[a"})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid file pattern"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_is_an_error() {
        let err = RunCommandTool
            .execute(&params(json!({"command": "exit 3"})))
            .await
            .unwrap_err();
        assert!(matches!(err, SwarmError::Tool { .. }));
    }
}
