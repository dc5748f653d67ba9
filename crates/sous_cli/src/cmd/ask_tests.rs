use std::sync::Arc;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;
use sous_config::{RecipeApiConfig, recipe::parse_base_url};
use sous_llm::MockProvider;
use sous_recipe::RecipeClient;
use test_log::test;

use super::*;
use crate::error::Error;

fn ctx(provider: &MockProvider) -> Ctx {
    let recipes = RecipeClient::new(&RecipeApiConfig {
        base_url: parse_base_url("http://127.0.0.1:9").unwrap(),
        api_key: None,
    });

    Ctx::with_provider(Arc::new(provider.clone()), recipes)
}

async fn ask(provider: &MockProvider, message: &str, no_stream: bool) -> (Result<()>, String) {
    let mut out = vec![];
    let result = Ask {
        message: message.to_owned(),
        no_stream,
    }
    .run(&ctx(provider), &mut out)
    .await;

    (result, String::from_utf8(out).unwrap())
}

#[test(tokio::test)]
async fn test_streamed_answer_is_printed() {
    let provider = MockProvider::with_chunked_message(&["Hel", "lo!"]);

    let (result, out) = ask(&provider, "hi", false).await;

    result.unwrap();
    assert_eq!(out, "Hello!\n");
    assert_eq!(provider.prompts()[0].input(), Some("hi"));
    assert_eq!(provider.prompts()[0].tools[0].name, "get_recipe");
}

#[test(tokio::test)]
async fn test_complete_answer_is_printed() {
    let provider = MockProvider::with_chunked_message(&["Hel", "lo!"]);

    let (result, out) = ask(&provider, "hi", true).await;

    result.unwrap();
    assert_eq!(out, "Hello!\n");
}

#[test(tokio::test)]
async fn test_unknown_tool_is_skipped() {
    let provider = MockProvider::new().then_text_and_tool_call(
        "Hmm.",
        "toolu_1",
        "get_weather",
        json!({ "city": "Oslo" }).as_object().cloned().unwrap(),
    );

    let (result, out) = ask(&provider, "weather?", false).await;

    result.unwrap();
    assert_eq!(out, "Hmm.\n");
    assert_eq!(provider.remaining(), 0);
    assert_eq!(provider.prompts().len(), 1);
}

#[test(tokio::test)]
async fn test_stream_failure_is_an_error() {
    let provider = MockProvider::new().then_interrupted(&["Par"], "connection reset");

    let (result, out) = ask(&provider, "hi", false).await;

    assert_matches!(result, Err(Error::Llm(sous_llm::Error::Stream(_))));
    assert_eq!(out, "Par");
}

#[test(tokio::test)]
async fn test_requires_model_configuration() {
    let env = |_: &str| -> Option<String> { None };

    let mut out = vec![];
    let result = crate::cmd::Commands::Ask(Ask {
        message: "hi".to_owned(),
        no_stream: true,
    })
    .run(&env, &mut out)
    .await;

    assert_matches!(
        result,
        Err(Error::Config(sous_config::Error::MissingEnv(missing))) if missing.len() == 3
    );
    assert!(out.is_empty());
}
