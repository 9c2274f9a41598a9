pub mod http;
pub mod shaping;

pub use http::HttpToolGateway;
pub use shaping::{FetchRequest, ShapedRequest, shape_request};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_REFERENCE_TIMEZONE: &str = "America/New_York";

/// How a directive argument is turned into a request body for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentShape {
    /// `{"input": <argument>}`; memory, news and any generic tool.
    Input,
    /// `{url, max_length, start_index, raw}`; the response body is returned verbatim.
    Fetch,
    /// Routed to `/convert_time` or `/get_current_time` below the endpoint.
    Time,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub endpoint: String,
    #[serde(default = "default_shape")]
    pub shape: ArgumentShape,
}

fn default_shape() -> ArgumentShape {
    ArgumentShape::Input
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, shape: ArgumentShape) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            shape,
        }
    }
}

pub fn default_tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(
            "memory",
            "http://localhost:8001/memory/memory",
            ArgumentShape::Input,
        ),
        ToolSpec::new("time", "http://localhost:8001/time", ArgumentShape::Time),
        ToolSpec::new(
            "fetch",
            "http://localhost:8001/fetch/fetch",
            ArgumentShape::Fetch,
        ),
        ToolSpec::new(
            "ainews",
            "http://localhost:8001/ainews/latest_genai_news",
            ArgumentShape::Input,
        ),
    ]
}

/// Every variant's `Display` is the exact text handed back to the model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Tool {0} not configured.")]
    Unconfigured(String),
    #[error("Invalid input to {0} tool.")]
    InvalidFetchInput(String),
    #[error("Input to '{0}' tool must be a dictionary.")]
    ExpectedMapping(String),
    #[error("Error calling {tool}: {detail}")]
    Invocation { tool: String, detail: String },
}

impl ToolError {
    pub fn invocation(tool: &str, detail: impl std::fmt::Display) -> Self {
        Self::Invocation {
            tool: tool.to_string(),
            detail: detail.to_string(),
        }
    }
}
