//! File operations tool — read, write, create directories, list.
//!
//! Dispatches on the required `operation` parameter. All failures, from a
//! missing parameter to an I/O error, come back as an unsuccessful
//! `ToolResult` with the underlying error text verbatim — nothing here
//! raises. Operations are independent and non-transactional; a
//! create-then-write request that fails halfway leaves the directory in
//! place.

use async_trait::async_trait;
use oxidesk_core::tool::{Tool, ToolParams, ToolResult};
use tracing::debug;

pub struct FileOperationsTool;

impl FileOperationsTool {
    pub fn new() -> Self {
        Self
    }

    fn require<'a>(params: &'a ToolParams, key: &str) -> Result<&'a str, ToolResult> {
        match params.get(key) {
            Some(value) => Ok(value),
            None => Err(ToolResult::fail(format!("Missing '{key}' parameter"))),
        }
    }

    async fn read_file(params: &ToolParams) -> ToolResult {
        let path = match Self::require(params, "path") {
            Ok(p) => p,
            Err(fail) => return fail,
        };

        match tokio::fs::read_to_string(path).await {
            Ok(content) => ToolResult::ok(content),
            Err(e) => ToolResult::fail(e.to_string()),
        }
    }

    async fn write_file(params: &ToolParams) -> ToolResult {
        let path = match Self::require(params, "path") {
            Ok(p) => p,
            Err(fail) => return fail,
        };
        let content = match Self::require(params, "content") {
            Ok(c) => c,
            Err(fail) => return fail,
        };

        match tokio::fs::write(path, content).await {
            Ok(()) => ToolResult::ok("File written successfully"),
            Err(e) => ToolResult::fail(e.to_string()),
        }
    }

    async fn create_directory(params: &ToolParams) -> ToolResult {
        let path = match Self::require(params, "path") {
            Ok(p) => p,
            Err(fail) => return fail,
        };

        match tokio::fs::create_dir_all(path).await {
            Ok(()) => ToolResult::ok("Directory created successfully"),
            Err(e) => ToolResult::fail(e.to_string()),
        }
    }

    async fn list_directory(params: &ToolParams) -> ToolResult {
        let path = match Self::require(params, "path") {
            Ok(p) => p,
            Err(fail) => return fail,
        };

        let mut entries = match tokio::fs::read_dir(path).await {
            Ok(entries) => entries,
            Err(e) => return ToolResult::fail(e.to_string()),
        };

        let mut names: Vec<String> = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => names.push(entry.file_name().to_string_lossy().into_owned()),
                Ok(None) => break,
                Err(e) => return ToolResult::fail(e.to_string()),
            }
        }

        names.sort();
        ToolResult::ok(names.join("\n"))
    }
}

impl Default for FileOperationsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileOperationsTool {
    fn name(&self) -> &str {
        "file_operations"
    }

    fn description(&self) -> &str {
        "Perform file system operations: read, write, create directories, and list directory contents"
    }

    async fn execute(&self, params: &ToolParams) -> ToolResult {
        let operation = match Self::require(params, "operation") {
            Ok(op) => op,
            Err(fail) => return fail,
        };

        debug!(operation, "Executing file operation");

        match operation {
            "read" => Self::read_file(params).await,
            "write" => Self::write_file(params).await,
            "create_directory" => Self::create_directory(params).await,
            "list" => Self::list_directory(params).await,
            other => ToolResult::fail(format!("Unknown operation: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ToolParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn missing_operation_parameter() {
        let tool = FileOperationsTool::new();
        let result = tool.execute(&ToolParams::new()).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Missing 'operation' parameter"));
    }

    #[tokio::test]
    async fn unknown_operation() {
        let tool = FileOperationsTool::new();
        let result = tool.execute(&params(&[("operation", "delete")])).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Unknown operation: delete"));
    }

    #[tokio::test]
    async fn write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let path_str = path.to_str().unwrap();
        let tool = FileOperationsTool::new();

        let write = tool
            .execute(&params(&[
                ("operation", "write"),
                ("path", path_str),
                ("content", "Hello from test!"),
            ]))
            .await;
        assert!(write.success);
        assert_eq!(write.output, "File written successfully");

        let read = tool
            .execute(&params(&[("operation", "read"), ("path", path_str)]))
            .await;
        assert!(read.success);
        assert_eq!(read.output, "Hello from test!");
    }

    #[tokio::test]
    async fn write_missing_content_parameter() {
        let tool = FileOperationsTool::new();
        let result = tool
            .execute(&params(&[("operation", "write"), ("path", "/tmp/x.txt")]))
            .await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Missing 'content' parameter"));
    }

    #[tokio::test]
    async fn read_nonexistent_file_propagates_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let tool = FileOperationsTool::new();

        let result = tool
            .execute(&params(&[
                ("operation", "read"),
                ("path", path.to_str().unwrap()),
            ]))
            .await;
        assert!(!result.success);
        assert!(result.error.is_some());
        assert!(result.output.is_empty());
    }

    #[tokio::test]
    async fn create_directory_is_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        let tool = FileOperationsTool::new();

        let result = tool
            .execute(&params(&[
                ("operation", "create_directory"),
                ("path", nested.to_str().unwrap()),
            ]))
            .await;
        assert!(result.success);
        assert_eq!(result.output, "Directory created successfully");
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn list_joins_names_with_newlines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let tool = FileOperationsTool::new();
        let result = tool
            .execute(&params(&[
                ("operation", "list"),
                ("path", dir.path().to_str().unwrap()),
            ]))
            .await;
        assert!(result.success);
        assert_eq!(result.output, "a.txt\nb.txt\nsub");
    }
}
