//! The chat widget page.

use maud::{DOCTYPE, Markup, PreEscaped, html};

const EXAMPLES: &[&str] = &[
    "What's a good recipe for chicken parmesan?",
    "How do I make a chocolate cake?",
    "What are some healthy breakfast options?",
    "Can you suggest a vegetarian dinner recipe?",
    "What nutritional benefits does spinach have?",
];

const STYLE: &str = r"
body { font-family: system-ui, sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }
header { display: flex; justify-content: space-between; align-items: center; }
#log { border: 1px solid #ccc; border-radius: 6px; height: 60vh; overflow-y: auto; padding: 1rem; }
.user, .assistant { white-space: pre-wrap; padding: .5rem .75rem; border-radius: 6px; margin: .5rem 0; }
.user { background: #eef3ff; margin-left: 20%; }
.assistant { background: #f4f4f4; margin-right: 20%; }
form { display: flex; gap: .5rem; margin-top: 1rem; }
#message { flex: 1; padding: .5rem; }
.examples button { margin: .25rem .25rem 0 0; }
";

const SCRIPT: &str = r#"
let history = [];
const log = document.getElementById("log");
const input = document.getElementById("message");

function render() {
  log.replaceChildren();
  for (const turn of history) {
    const user = document.createElement("div");
    user.className = "user";
    user.textContent = turn.user;
    log.appendChild(user);
    if (turn.assistant !== null && turn.assistant !== undefined) {
      const assistant = document.createElement("div");
      assistant.className = "assistant";
      assistant.textContent = turn.assistant;
      log.appendChild(assistant);
    }
  }
  log.scrollTop = log.scrollHeight;
}

async function send(message) {
  input.value = "";
  const response = await fetch("/api/chat", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({
      message,
      history,
      stream: document.getElementById("stream").checked,
    }),
  });

  const reader = response.body.pipeThrough(new TextDecoderStream()).getReader();
  let buffer = "";
  for (;;) {
    const { value, done } = await reader.read();
    if (done) break;
    buffer += value;
    const events = buffer.split("\n\n");
    buffer = events.pop();
    for (const event of events) {
      const data = event.split("\n").filter((l) => l.startsWith("data:")).map((l) => l.slice(5).trim()).join("\n");
      if (data) {
        history = JSON.parse(data);
        render();
      }
    }
  }
}

document.getElementById("chat").addEventListener("submit", (e) => {
  e.preventDefault();
  send(input.value);
});

document.getElementById("clear").addEventListener("click", async () => {
  const response = await fetch("/api/clear", { method: "POST" });
  history = await response.json();
  input.value = "";
  render();
});

for (const button of document.querySelectorAll(".examples button")) {
  button.addEventListener("click", () => { input.value = button.textContent; input.focus(); });
}
"#;

pub(crate) fn page() -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Recipe Assistant" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                header {
                    div {
                        h1 { "Recipe Assistant" }
                        p { "Ask me about recipes, cooking instructions, or nutritional information!" }
                    }
                    label { input #stream type="checkbox" checked; " Stream" }
                }
                div #log {}
                form #chat {
                    input #message type="text" autocomplete="off"
                        placeholder="What recipe would you like to know about?";
                    button type="submit" { "Send" }
                }
                p { button #clear type="button" { "Clear Chat" } }
                div .examples {
                    h2 { "Examples" }
                    @for example in EXAMPLES {
                        button type="button" { (example) }
                    }
                }
                script { (PreEscaped(SCRIPT)) }
            }
        }
    }
}
