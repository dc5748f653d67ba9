use pretty_assertions::assert_eq;
use serde_json::json;
use test_log::test;

use super::*;
use crate::test::args;

#[test]
fn test_plain_text_response() {
    let parsed = parse_response(ModelResponse::new("Hello there"));

    assert_eq!(parsed.text, "Hello there");
    assert!(parsed.tool_calls.is_empty());
}

#[test]
fn test_last_text_step_wins() {
    let parsed = parse_response(ModelResponse::new(vec![
        ContentStep::text("first"),
        ContentStep::text("second"),
    ]));

    assert_eq!(parsed, ParsedResponse {
        text: "second".to_owned(),
        tool_calls: vec![],
    });
}

#[test]
fn test_tool_use_is_pending() {
    let parsed = parse_response(ModelResponse::new(vec![
        ContentStep::text("Let me look that up."),
        ContentStep::tool_use(
            "toolu_1",
            "get_recipe",
            args(json!({ "name": "chicken parmesan" })),
        ),
    ]));

    assert_eq!(parsed.text, "Let me look that up.");
    assert_eq!(parsed.tool_calls, vec![ToolCall::pending(
        "toolu_1",
        "get_recipe",
        args(json!({ "name": "chicken parmesan" }))
    )]);
    assert!(!parsed.tool_calls[0].is_executed());
}

#[test]
fn test_partial_json_takes_precedence_over_input() {
    let parsed = parse_response(ModelResponse::new(vec![ContentStep::ToolUse {
        id: Some("toolu_1".to_owned()),
        name: Some("get_recipe".to_owned()),
        partial_json: Some(r#"{"name":"cake"}"#.to_owned()),
        input: Some(Map::new()),
        index: Some(1),
    }]));

    assert_eq!(
        parsed.tool_calls[0].arguments,
        args(json!({ "name": "cake" }))
    );
}

#[test]
fn test_missing_arguments_default_to_empty_object() {
    let parsed = parse_response(ModelResponse::new(vec![ContentStep::ToolUse {
        id: Some("toolu_1".to_owned()),
        name: Some("get_recipe".to_owned()),
        partial_json: Some("  ".to_owned()),
        input: None,
        index: None,
    }]));

    assert_eq!(parsed.tool_calls[0].arguments, Map::new());
}

#[test]
fn test_faulty_steps_are_skipped() {
    let parsed = parse_response(ModelResponse::new(vec![
        ContentStep::ToolUse {
            id: Some("bad_json".to_owned()),
            name: Some("get_recipe".to_owned()),
            partial_json: Some(r#"{"name":"#.to_owned()),
            input: None,
            index: None,
        },
        ContentStep::ToolUse {
            id: None,
            name: Some("get_recipe".to_owned()),
            partial_json: None,
            input: Some(Map::new()),
            index: None,
        },
        ContentStep::ToolUse {
            id: Some("no_name".to_owned()),
            name: Some(String::new()),
            partial_json: None,
            input: Some(Map::new()),
            index: None,
        },
        ContentStep::Other,
        ContentStep::tool_use("ok", "get_recipe", Map::new()),
        ContentStep::text("done"),
    ]));

    assert_eq!(parsed.text, "done");
    assert_eq!(
        parsed
            .tool_calls
            .iter()
            .map(|c| c.id.as_str())
            .collect::<Vec<_>>(),
        vec!["ok"]
    );
}

#[test]
fn test_deserializes_provider_content() {
    let response: ModelResponse = serde_json::from_value(json!({
        "content": [
            { "type": "thinking", "thinking": "hmm" },
            { "type": "text", "text": "Sure." },
            { "type": "tool_use", "id": "toolu_1", "name": "get_recipe", "input": { "name": "cake" } }
        ]
    }))
    .unwrap();

    let parsed = parse_response(response);
    assert_eq!(parsed.text, "Sure.");
    assert_eq!(parsed.tool_calls[0].name, "get_recipe");
    assert_eq!(
        parsed.tool_calls[0].arguments,
        args(json!({ "name": "cake" }))
    );
}
