use crate::directive::Argument;
use crate::gateway::shaping::{ShapedRequest, shape_request};
use crate::gateway::{DEFAULT_REFERENCE_TIMEZONE, ToolError, ToolSpec};
use crate::traits::{Dispatch, DispatchOutcome, ToolGateway};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Tool gateway backed by plain HTTP POSTs against a fixed endpoint table.
///
/// The table is built once and never mutated, so one gateway can be shared
/// across any number of concurrent runs.
pub struct HttpToolGateway {
    client: reqwest::Client,
    tools: Vec<ToolSpec>,
    index: HashMap<String, usize>,
    reference_timezone: String,
}

impl HttpToolGateway {
    pub fn new(tools: Vec<ToolSpec>) -> Result<Self> {
        Self::with_timeout(tools, DEFAULT_TOOL_TIMEOUT)
    }

    pub fn with_timeout(tools: Vec<ToolSpec>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build tool HTTP client")?;

        let index = tools
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name.clone(), i))
            .collect();

        Ok(Self {
            client,
            tools,
            index,
            reference_timezone: DEFAULT_REFERENCE_TIMEZONE.to_string(),
        })
    }

    pub fn with_reference_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.reference_timezone = timezone.into();
        self
    }

    pub fn spec(&self, name: &str) -> Option<&ToolSpec> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    async fn send(&self, name: &str, request: ShapedRequest) -> Result<Dispatch, ToolError> {
        debug!(tool = name, url = %request.url, body = %request.body, "Calling tool");

        let response = self
            .client
            .post(&request.url)
            .json(&request.body)
            .send()
            .await
            .map_err(|e| ToolError::invocation(name, e))?;

        let status = response.status();
        let response = response
            .error_for_status()
            .map_err(|e| ToolError::invocation(name, e))?;
        let text = response
            .text()
            .await
            .map_err(|e| ToolError::invocation(name, e))?;

        debug!(tool = name, status = status.as_u16(), bytes = text.len(), "Tool responded");

        let output = if request.verbatim {
            text
        } else {
            extract_result(&text)
        };

        Ok(Dispatch::completed(status.as_u16(), output))
    }
}

/// Prefers a `result` field of a JSON body, falling back to the raw text.
pub fn extract_result(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("result") {
            Some(Value::String(result)) => result.clone(),
            Some(result) => result.to_string(),
            None => body.to_string(),
        },
        Err(_) => body.to_string(),
    }
}

#[async_trait]
impl ToolGateway for HttpToolGateway {
    fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }

    async fn invoke(&self, name: &str, argument: &Argument) -> Dispatch {
        let Some(spec) = self.spec(name) else {
            warn!(tool = name, "Tool not configured");
            return Dispatch {
                output: ToolError::Unconfigured(name.to_string()).to_string(),
                outcome: DispatchOutcome::Unconfigured,
            };
        };

        let request = match shape_request(spec, argument, &self.reference_timezone) {
            Ok(request) => request,
            Err(e) => {
                warn!(tool = name, "Rejected tool input: {}", e);
                return Dispatch {
                    output: e.to_string(),
                    outcome: DispatchOutcome::InvalidInput,
                };
            }
        };

        match self.send(name, request).await {
            Ok(dispatch) => dispatch,
            Err(e) => {
                warn!(tool = name, "{}", e);
                Dispatch {
                    output: e.to_string(),
                    outcome: DispatchOutcome::Failed,
                }
            }
        }
    }
}
