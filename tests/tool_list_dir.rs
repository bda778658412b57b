//! Integration tests for the list_dir tool

mod common;

use common::TestFixture;
use fleet::tool::base::*;
use fleet::tool::list_dir::ListDirTool;
use serde_json::json;

#[tokio::test]
async fn test_list_dirs_first_sorted() {
    let fixture = TestFixture::new();
    fixture.create_file("b.txt", "");
    fixture.create_file("a.txt", "");
    fixture.create_dir("zeta");
    fixture.create_dir("alpha");

    let result = ListDirTool
        .execute(json!({"path": "."}), &fixture.context())
        .await
        .unwrap();

    let lines: Vec<&str> = result.output.lines().collect();
    assert_eq!(
        lines,
        vec!["[dir]  alpha/", "[dir]  zeta/", "[file] a.txt", "[file] b.txt"]
    );
    assert_eq!(result.metadata["entries"], json!(4));
}

#[tokio::test]
async fn test_list_empty_dir() {
    let fixture = TestFixture::new();
    fixture.create_dir("empty");

    let result = ListDirTool
        .execute(json!({"path": "empty"}), &fixture.context())
        .await
        .unwrap();
    assert!(result.output.contains("is empty"));
}

#[tokio::test]
async fn test_list_missing_and_not_a_dir() {
    let fixture = TestFixture::new();
    fixture.create_file("file.txt", "x");

    let err = ListDirTool
        .execute(json!({"path": "missing"}), &fixture.context())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::FileNotFound(_)));

    let err = ListDirTool
        .execute(json!({"path": "file.txt"}), &fixture.context())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::NotADirectory(_)));
}

#[tokio::test]
async fn test_list_outside_workspace_refused() {
    let fixture = TestFixture::new();
    let err = ListDirTool
        .execute(json!({"path": "/"}), &fixture.restricted_context())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::OutsideWorkspace(_)));
}
