use std::env;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serial_test::serial;

use super::*;

#[test]
fn test_recipe_defaults() {
    let lookup = |key: &str| match key {
        llm::MODEL_ID_ENV | llm::REGION_ENV | llm::API_KEY_ENV => Some("x".to_owned()),
        _ => None,
    };

    let config = AppConfig::from_lookup(&lookup).unwrap();
    assert_eq!(config.recipe.base_url.as_str(), recipe::DEFAULT_BASE_URL);
    assert_eq!(config.recipe.api_key, None);
}

#[test]
fn test_recipe_base_url_gets_trailing_slash() {
    let lookup = |key: &str| match key {
        llm::MODEL_ID_ENV | llm::REGION_ENV | llm::API_KEY_ENV => Some("x".to_owned()),
        recipe::BASE_URL_ENV => Some("http://localhost:8080/v1".to_owned()),
        recipe::API_KEY_ENV => Some("ninja".to_owned()),
        _ => None,
    };

    let config = AppConfig::from_lookup(&lookup).unwrap();
    assert_eq!(config.recipe.base_url.as_str(), "http://localhost:8080/v1/");
    assert_eq!(
        config.recipe.base_url.join("recipe").unwrap().as_str(),
        "http://localhost:8080/v1/recipe"
    );
    assert_eq!(config.recipe.api_key.as_deref(), Some("ninja"));
}

#[test]
fn test_invalid_recipe_base_url() {
    let lookup = |key: &str| match key {
        llm::MODEL_ID_ENV | llm::REGION_ENV | llm::API_KEY_ENV => Some("x".to_owned()),
        recipe::BASE_URL_ENV => Some("not a url".to_owned()),
        _ => None,
    };

    assert_matches!(
        AppConfig::from_lookup(&lookup),
        Err(Error::InvalidEnv {
            key: recipe::BASE_URL_ENV,
            ..
        })
    );
}

#[test]
#[serial(env)]
fn test_from_process_env() {
    // SAFETY: serialized with all other tests touching the environment.
    unsafe {
        env::set_var(llm::MODEL_ID_ENV, "model");
        env::set_var(llm::REGION_ENV, "eu-west-1");
        env::set_var(llm::API_KEY_ENV, "token");
    }

    let config = AppConfig::from_lookup(&process_env).unwrap();
    assert_eq!(config.llm.region, "eu-west-1");

    // SAFETY: see above.
    unsafe {
        env::remove_var(llm::API_KEY_ENV);
    }

    assert_matches!(
        AppConfig::from_lookup(&process_env),
        Err(Error::MissingEnv(missing)) if missing == vec![llm::API_KEY_ENV]
    );

    // SAFETY: see above.
    unsafe {
        env::remove_var(llm::MODEL_ID_ENV);
        env::remove_var(llm::REGION_ENV);
    }
}
