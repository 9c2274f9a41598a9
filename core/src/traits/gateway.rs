use crate::directive::Argument;
use async_trait::async_trait;
use serde::Serialize;

/// How a single dispatch ended. Recorded in the run trace; never surfaced to
/// the caller except through `Dispatch::output`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Completed { status: u16 },
    Unconfigured,
    InvalidInput,
    Failed,
}

impl std::fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed { status } => write!(f, "completed ({status})"),
            Self::Unconfigured => f.write_str("unconfigured"),
            Self::InvalidInput => f.write_str("invalid input"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub output: String,
    pub outcome: DispatchOutcome,
}

impl Dispatch {
    pub fn completed(status: u16, output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            outcome: DispatchOutcome::Completed { status },
        }
    }
}

#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Names of every configured tool, in configuration order.
    fn tool_names(&self) -> Vec<String>;

    /// Runs one tool call. Infallible: every failure becomes text in
    /// `Dispatch::output` so the model can react to it.
    async fn invoke(&self, name: &str, argument: &Argument) -> Dispatch;
}
