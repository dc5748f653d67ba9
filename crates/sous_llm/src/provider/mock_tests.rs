use assert_matches::assert_matches;
use futures::{StreamExt as _, TryStreamExt as _};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_log::test;

use super::*;
use crate::{parser::parse_response, stream::parse_stream, test::args};

#[test(tokio::test)]
async fn test_scripts_are_consumed_in_order() {
    let provider = MockProvider::with_message("first").then_chunked_message(&["sec", "ond"]);
    let prompt = Prompt::new(&[], "hi");

    let first = provider.chat_completion(&prompt).await.unwrap();
    assert_eq!(parse_response(first).text, "first");

    let chunks = provider
        .chat_completion_stream(&prompt)
        .await
        .unwrap()
        .try_collect::<Vec<_>>()
        .await
        .unwrap();
    assert_eq!(chunks, vec![ResponseChunk::new("sec"), ResponseChunk::new("ond")]);

    assert_eq!(provider.remaining(), 0);
    assert_matches!(
        provider.chat_completion(&prompt).await,
        Err(Error::Stream(_))
    );
    assert_eq!(provider.prompts().len(), 3);
}

#[test(tokio::test)]
async fn test_tool_call_forms_agree() {
    let arguments = args(json!({ "name": "crème brûlée" }));
    let provider = MockProvider::new()
        .then_text_and_tool_call("Looking.", "toolu_1", "get_recipe", arguments.clone())
        .then_text_and_tool_call("Looking.", "toolu_1", "get_recipe", arguments.clone());
    let prompt = Prompt::new(&[], "hi");

    let complete = parse_response(provider.chat_completion(&prompt).await.unwrap());

    let stream = provider.chat_completion_stream(&prompt).await.unwrap();
    let parsed = parse_stream(stream).try_collect::<Vec<_>>().await.unwrap();

    let streamed_tools = parsed
        .iter()
        .flat_map(|c| c.completed_tools.clone())
        .collect::<Vec<_>>();

    assert_eq!(complete.text, "Looking.");
    assert_eq!(parsed.last().unwrap().accumulated_text, complete.text);
    assert_eq!(streamed_tools, complete.tool_calls);
    assert_eq!(complete.tool_calls[0].arguments, arguments);
}

#[test(tokio::test)]
async fn test_failures() {
    let provider = MockProvider::new()
        .then_failure(503, "unavailable")
        .then_interrupted(&["par", "tial"], "reset");
    let prompt = Prompt::new(&[], "hi");

    assert_eq!(
        provider.chat_completion_stream(&prompt).await.err(),
        Some(Error::Api {
            status: 503,
            body: "unavailable".to_owned()
        })
    );

    let items = provider
        .chat_completion_stream(&prompt)
        .await
        .unwrap()
        .collect::<Vec<_>>()
        .await;
    assert_eq!(items.len(), 3);
    assert_matches!(&items[2], Err(Error::Stream(msg)) if msg == "reset");
}
