use crate::agent::ContextBuilder;
use crate::agent::trace::{RunLogWriter, RunTrace, StopReason, TraceEvent};
use crate::directive::{DirectiveError, ToolDirective, contains_directive, parse_directive};
use crate::traits::{ChatMessage, ChatRequest, Provider, ToolGateway};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const DEFAULT_MAX_ROUNDS: usize = 3;
const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(300);
const TRACE_TAIL_MESSAGES: usize = 2;

/// Result of one orchestration run. Only `answer` is meant for the caller;
/// the rest is diagnostics.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub answer: String,
    pub trace: RunTrace,
    pub messages: Vec<ChatMessage>,
}

enum RoundState {
    AwaitingModel,
    HaveReply(String),
    DispatchingTool(Result<ToolDirective, DirectiveError>),
    Done(String, StopReason),
}

pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    gateway: Arc<dyn ToolGateway>,
    context_builder: ContextBuilder,
    max_rounds: usize,
    temperature: Option<f64>,
    model_timeout: Duration,
    run_log: Option<RunLogWriter>,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        gateway: Arc<dyn ToolGateway>,
        context_builder: ContextBuilder,
    ) -> Self {
        Self {
            provider,
            gateway,
            context_builder,
            max_rounds: DEFAULT_MAX_ROUNDS,
            temperature: None,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
            run_log: None,
        }
    }

    pub fn with_max_rounds(mut self, max: usize) -> Self {
        self.max_rounds = max;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_run_log(mut self, writer: RunLogWriter) -> Self {
        self.run_log = Some(writer);
        self
    }

    pub async fn process(&self, message: &str) -> String {
        self.process_with_history(vec![ChatMessage::user(message)])
            .await
    }

    /// Runs the loop and persists its trace. Failures of any kind come back
    /// as answer text.
    pub async fn process_with_history(&self, history: Vec<ChatMessage>) -> String {
        let outcome = self.run(history).await;

        if let Some(writer) = &self.run_log {
            match writer.write(&outcome.trace).await {
                Ok(path) => debug!(path = %path.display(), "Run log written"),
                Err(e) => error!("Failed to persist run log: {:#}", e),
            }
        }

        outcome.answer
    }

    pub async fn run(&self, history: Vec<ChatMessage>) -> RunOutcome {
        let mut messages = self.context_builder.build_messages(history);
        let mut trace = RunTrace::new();
        let mut round = 0;
        let mut last_reply = String::new();
        let mut state = RoundState::AwaitingModel;

        loop {
            state = match state {
                RoundState::AwaitingModel => {
                    if round >= self.max_rounds {
                        RoundState::Done(
                            std::mem::take(&mut last_reply),
                            StopReason::BudgetExhausted,
                        )
                    } else {
                        round += 1;
                        let tail = messages.len().saturating_sub(TRACE_TAIL_MESSAGES);
                        trace.record(
                            round,
                            TraceEvent::ModelCall {
                                outgoing: messages[tail..].to_vec(),
                            },
                        );

                        match self.call_model(&messages).await {
                            Ok(reply) => {
                                debug!(round, chars = reply.len(), "Model replied");
                                trace.record(round, TraceEvent::ModelReply { text: reply.clone() });
                                messages.push(ChatMessage::assistant(reply.clone()));
                                last_reply.clone_from(&reply);
                                RoundState::HaveReply(reply)
                            }
                            Err(e) => {
                                let detail = format!("{:#}", e);
                                error!(round, "Model call failed: {}", detail);
                                trace.record(
                                    round,
                                    TraceEvent::ModelCallFailed {
                                        detail: detail.clone(),
                                    },
                                );
                                RoundState::Done(
                                    format!("Error calling LLM: {}", detail),
                                    StopReason::ModelCallFailed,
                                )
                            }
                        }
                    }
                }
                RoundState::HaveReply(reply) if !contains_directive(&reply) => {
                    RoundState::Done(reply, StopReason::NoDirective)
                }
                RoundState::HaveReply(reply) => match parse_directive(&reply) {
                    Ok(None) => RoundState::Done(reply, StopReason::NoDirective),
                    Ok(Some(directive)) => RoundState::DispatchingTool(Ok(directive)),
                    Err(e) => RoundState::DispatchingTool(Err(e)),
                },
                RoundState::DispatchingTool(parsed) => {
                    let result = match parsed {
                        Ok(directive) => {
                            let dispatch = self
                                .gateway
                                .invoke(&directive.name, &directive.argument)
                                .await;
                            debug!(
                                round,
                                tool = %directive.name,
                                outcome = %dispatch.outcome,
                                "Tool dispatched"
                            );
                            trace.record(
                                round,
                                TraceEvent::ToolDispatch {
                                    tool: directive.name,
                                    input: directive.argument.to_string(),
                                    outcome: dispatch.outcome,
                                    result: dispatch.output.clone(),
                                },
                            );
                            dispatch.output
                        }
                        Err(e) => {
                            let detail = e.to_string();
                            warn!(round, "Malformed tool call: {}", detail);
                            trace.record(
                                round,
                                TraceEvent::DirectiveMalformed {
                                    detail: detail.clone(),
                                },
                            );
                            format!("Tool call parsing failed: {}", detail)
                        }
                    };
                    messages.push(ChatMessage::tool_result(result));
                    RoundState::AwaitingModel
                }
                RoundState::Done(answer, reason) => {
                    trace.record(round, TraceEvent::Stopped { reason });
                    info!(rounds = round, ?reason, "Agent run finished");
                    break RunOutcome {
                        answer,
                        trace,
                        messages,
                    };
                }
            };
        }
    }

    async fn call_model(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        let request = ChatRequest {
            messages,
            temperature: self.temperature,
        };

        let response = tokio::time::timeout(self.model_timeout, self.provider.chat(request))
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "{} did not answer within {}s",
                    self.provider.name(),
                    self.model_timeout.as_secs_f64()
                )
            })??;

        Ok(response.text_or_empty().to_string())
    }
}
