pub mod display;
pub mod error;
pub mod history;
pub mod tool_call;
pub mod turn;

pub use display::{DisplayHistory, DisplayTurn};
pub use error::Error;
pub use history::ConversationHistory;
pub use tool_call::{ToolCall, ToolCallResponse};
pub use turn::{ToolUse, Turn};
