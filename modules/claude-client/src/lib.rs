mod client;
mod types;

pub use client::ClaudeClient;
pub use types::{ChatRequest, ChatResponse, ContentBlock, Role, Usage, WireMessage};
