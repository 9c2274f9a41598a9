pub mod gateway;
pub mod provider;

pub use gateway::{Dispatch, DispatchOutcome, ToolGateway};
pub use provider::{ChatMessage, ChatRequest, ChatResponse, Provider, Role};
