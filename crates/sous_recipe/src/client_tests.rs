use httpmock::{Method::GET, MockServer};
use pretty_assertions::assert_eq;
use sous_config::recipe::parse_base_url;
use test_log::test;

use super::*;

fn client(server: &MockServer, api_key: Option<&str>) -> RecipeClient {
    RecipeClient::new(&RecipeApiConfig {
        base_url: parse_base_url(&server.url("/v1")).unwrap(),
        api_key: api_key.map(str::to_owned),
    })
}

#[test(tokio::test)]
async fn test_sends_query_and_api_key() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/recipe")
                .query_param("query", "chicken parmesan")
                .header("X-Api-Key", "secret");
            then.status(200).body("[]");
        })
        .await;

    let body = client(&server, Some("secret"))
        .get_recipe("chicken parmesan")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(body, "[]");
}

#[test(tokio::test)]
async fn test_omits_missing_api_key() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/recipe")
                .header_missing("X-Api-Key");
            then.status(200).body("[]");
        })
        .await;

    client(&server, None).get_recipe("cake").await.unwrap();
    mock.assert_async().await;
}

#[test(tokio::test)]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/recipe");
            then.status(401).body(r#"{"error": "Invalid API Key."}"#);
        })
        .await;

    let error = client(&server, Some("wrong"))
        .get_recipe("cake")
        .await
        .unwrap_err();

    assert_eq!(error, Error::Api {
        status: 401,
        body: r#"{"error": "Invalid API Key."}"#.to_owned(),
    });
}

#[test(tokio::test)]
async fn test_find_recipe_reports_empty_results() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/recipe");
            then.status(200).body("[]");
        })
        .await;

    let error = client(&server, None)
        .find_recipe("unobtainium stew")
        .await
        .unwrap_err();

    assert_eq!(error, Error::NotFound("unobtainium stew".to_owned()));
}
