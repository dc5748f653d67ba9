//! The HTTP server behind the chat widget.

use std::{convert::Infallible, sync::Arc};

use async_stream::stream;
use axum::{
    Json, Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use futures::{Stream, StreamExt as _};
use maud::Markup;
use serde::Deserialize;
use sous_conversation::DisplayHistory;
use tokio::{net::TcpListener, sync::Mutex};
use tracing::{error, info};

use crate::{chat::ChatManager, widget};

/// Server state.
///
/// The chat manager is locked for the duration of a turn, so turns are
/// processed one at a time.
#[derive(Debug, Clone)]
struct AppState {
    chat: Arc<Mutex<ChatManager>>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,

    #[serde(default)]
    history: DisplayHistory,

    #[serde(default = "default_stream")]
    stream: bool,
}

fn default_stream() -> bool {
    true
}

pub(crate) fn router(chat: ChatManager) -> Router {
    let state = AppState {
        chat: Arc::new(Mutex::new(chat)),
    };

    Router::new()
        .route("/", get(index))
        .route("/api/chat", post(handle_chat))
        .route("/api/clear", post(handle_clear))
        .with_state(state)
}

pub(crate) async fn serve(address: &str, port: u16, chat: ChatManager) -> std::io::Result<()> {
    let listener = TcpListener::bind((address, port)).await?;
    info!(address = %listener.local_addr()?, "Chat widget listening.");

    axum::serve(listener, router(chat)).await
}

async fn index() -> Markup {
    widget::page()
}

/// Run a chat turn, sending every display snapshot as a server-sent event.
async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = stream! {
        let mut chat = state.chat.lock_owned().await;
        let snapshots = chat.submit(request.message, request.history, request.stream);
        futures::pin_mut!(snapshots);

        while let Some(display) = snapshots.next().await {
            match Event::default().json_data(&display) {
                Ok(event) => yield Ok(event),
                Err(error) => error!(%error, "Failed to encode display snapshot."),
            }
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}

async fn handle_clear(State(state): State<AppState>) -> Json<DisplayHistory> {
    Json(state.chat.lock().await.clear())
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
