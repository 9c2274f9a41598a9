pub mod agent;
pub mod config;
pub mod directive;
pub mod gateway;
pub mod providers;
pub mod server;
pub mod traits;

pub use agent::{AgentLoop, ContextBuilder, RunLogWriter, RunOutcome, RunTrace};
pub use config::{Config, ServerConfig};
pub use directive::{Argument, DirectiveError, ToolDirective, parse_directive};
pub use gateway::{ArgumentShape, HttpToolGateway, ToolError, ToolSpec};
pub use providers::{OllamaProvider, OpenAIProvider, create_provider};
pub use traits::{
    ChatMessage, ChatRequest, ChatResponse, Dispatch, DispatchOutcome, Provider, Role,
    ToolGateway,
};
