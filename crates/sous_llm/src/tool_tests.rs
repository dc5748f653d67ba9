use pretty_assertions::assert_eq;
use serde_json::json;
use test_log::test;

use super::*;
use crate::test::{EchoTool, FailingTool, args};

#[test]
fn test_registry_keeps_registration_order() {
    let registry = ToolRegistry::new()
        .with(EchoTool("b"))
        .with(FailingTool("a"));

    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(
        registry
            .definitions()
            .into_iter()
            .map(|d| d.name)
            .collect::<Vec<_>>(),
        vec!["b", "a"]
    );
    assert_eq!(format!("{registry:?}"), r#"["b", "a"]"#);
}

#[test]
fn test_registry_replaces_duplicates() {
    let mut registry = ToolRegistry::new();
    registry.register(FailingTool("echo")).register(EchoTool("echo"));

    assert_eq!(registry.len(), 1);
}

#[test(tokio::test)]
async fn test_registry_lookup() {
    let registry = ToolRegistry::new().with(EchoTool("echo"));

    assert!(registry.get("missing").is_none());

    let tool = registry.get("echo").unwrap();
    let output = tool.call(&args(json!({ "a": 1 }))).await.unwrap();
    assert_eq!(output, r#"{"a":1}"#);
}

#[test]
fn test_definition_serializes_as_tool_schema() {
    let definition = EchoTool("echo").definition();

    assert_eq!(
        serde_json::to_value(&definition).unwrap(),
        json!({
            "name": "echo",
            "description": "Echo the arguments.",
            "input_schema": { "type": "object", "properties": {} }
        })
    );
}
