use assert_matches::assert_matches;
use httpmock::{Method::GET, MockServer};
use indoc::indoc;
use pretty_assertions::assert_eq;
use serde_json::json;
use sous_config::{
    RecipeApiConfig,
    recipe::{BASE_URL_ENV, parse_base_url},
};
use sous_recipe::RecipeClient;
use test_log::test;

use super::*;
use crate::{cmd::Commands, error::Error};

async fn run(server: &MockServer, name: &str, json: bool) -> (Result<()>, String) {
    let recipes = RecipeClient::new(&RecipeApiConfig {
        base_url: parse_base_url(&server.url("/v1")).unwrap(),
        api_key: None,
    });

    let mut out = vec![];
    let result = Recipe {
        name: name.to_owned(),
        json,
    }
    .run(&recipes, &mut out)
    .await;

    (result, String::from_utf8(out).unwrap())
}

async fn mock_pancakes(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/recipe")
                .query_param("query", "pancakes");
            then.status(200).json_body(json!([{
                "title": "Pancakes",
                "ingredients": "INGREDIENTS: flour|milk",
                "servings": "2 Servings",
                "instructions": "Mix.|Fry."
            }]));
        })
        .await;
}

#[test(tokio::test)]
async fn test_prints_markdown() {
    let server = MockServer::start_async().await;
    mock_pancakes(&server).await;

    let (result, out) = run(&server, "pancakes", false).await;

    result.unwrap();
    assert_eq!(out, indoc! {"
        # Pancakes

        ## Ingredients
        - flour
        - milk

        ## Instructions
        1. Mix.
        2. Fry.

        **Servings:** 2 Servings
    "});
}

#[test(tokio::test)]
async fn test_prints_json() {
    let server = MockServer::start_async().await;
    mock_pancakes(&server).await;

    let (result, out) = run(&server, "pancakes", true).await;

    result.unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["ingredients"], json!(["flour", "milk"]));
}

#[test(tokio::test)]
async fn test_missing_recipe_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/recipe");
            then.status(200).body("[]");
        })
        .await;

    let (result, out) = run(&server, "unobtainium stew", false).await;

    assert_matches!(result, Err(Error::Recipe(sous_recipe::Error::NotFound(_))));
    assert!(out.is_empty());
}

#[test(tokio::test)]
async fn test_runs_without_model_configuration() {
    let server = MockServer::start_async().await;
    mock_pancakes(&server).await;

    let base_url = server.url("/v1");
    let env = |key: &str| (key == BASE_URL_ENV).then(|| base_url.clone());

    let mut out = vec![];
    Commands::Recipe(Recipe {
        name: "pancakes".to_owned(),
        json: false,
    })
    .run(&env, &mut out)
    .await
    .unwrap();

    assert!(String::from_utf8(out).unwrap().starts_with("# Pancakes\n"));
}
