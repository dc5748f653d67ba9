use pretty_assertions::assert_eq;
use test_log::test;

use super::*;
use crate::test::EchoTool;
use crate::tool::Tool as _;

#[test]
fn test_prompt_orders_history_before_input() {
    let history = vec![Turn::user("hi"), Turn::assistant("hello!")];
    let prompt = Prompt::new(&history, "chicken parmesan recipe");

    assert!(prompt.system.starts_with("You are a helpful recipe assistant"));
    assert!(prompt.system.contains("friendly, conversational"));
    assert_eq!(prompt.turns, vec![
        Turn::user("hi"),
        Turn::assistant("hello!"),
        Turn::user("chicken parmesan recipe"),
    ]);
    assert_eq!(prompt.input(), Some("chicken parmesan recipe"));
    assert!(prompt.tools.is_empty());
}

#[test]
fn test_prompt_from_history() {
    let mut history = ConversationHistory::new();
    history.push_user("hi");

    let prompt = Prompt::from_history(&history).with_tools(vec![EchoTool("echo").definition()]);

    assert_eq!(prompt, Prompt::new(&[], "hi").with_tools(vec![EchoTool("echo").definition()]));
}
