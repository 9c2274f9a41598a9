//! Per-run diagnostic record.
//!
//! Entries are structured so callers and tests can query them; each one also
//! renders to a single human-readable line for the run log file.

use crate::traits::{ChatMessage, DispatchOutcome};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const MAX_NAME_COLLISIONS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    NoDirective,
    BudgetExhausted,
    ModelCallFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    ModelCall {
        outgoing: Vec<ChatMessage>,
    },
    ModelReply {
        text: String,
    },
    ToolDispatch {
        tool: String,
        input: String,
        outcome: DispatchOutcome,
        result: String,
    },
    DirectiveMalformed {
        detail: String,
    },
    ModelCallFailed {
        detail: String,
    },
    Stopped {
        reason: StopReason,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    pub round: usize,
    #[serde(flatten)]
    pub event: TraceEvent,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.event {
            TraceEvent::ModelCall { outgoing } => {
                let rendered = serde_json::to_string_pretty(outgoing).map_err(|_| fmt::Error)?;
                write!(
                    f,
                    "[Round {}] Calling LLM with messages: {}",
                    self.round, rendered
                )
            }
            TraceEvent::ModelReply { text } => {
                write!(f, "[Round {}] LLM Reply: {}", self.round, text)
            }
            TraceEvent::ToolDispatch {
                tool,
                input,
                outcome,
                result,
            } => write!(
                f,
                "[Round {}] Tool Call -> {} | Input: {} | Outcome: {} | Result: {}",
                self.round, tool, input, outcome, result
            ),
            TraceEvent::DirectiveMalformed { detail } => {
                write!(f, "[Round {}] [ERROR] Tool call parsing failed: {}", self.round, detail)
            }
            TraceEvent::ModelCallFailed { detail } => {
                write!(f, "[Round {}] [ERROR] Error calling LLM: {}", self.round, detail)
            }
            TraceEvent::Stopped { reason } => {
                let reason = match reason {
                    StopReason::NoDirective => "final answer produced",
                    StopReason::BudgetExhausted => "round budget exhausted, returning last reply",
                    StopReason::ModelCallFailed => "model call failed",
                };
                write!(f, "[Round {}] Stopped: {}", self.round, reason)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunTrace {
    entries: Vec<TraceEntry>,
}

impl RunTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, round: usize, event: TraceEvent) {
        self.entries.push(TraceEntry { round, event });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn model_calls(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.event, TraceEvent::ModelCall { .. }))
            .count()
    }

    pub fn dispatches(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.event, TraceEvent::ToolDispatch { .. }))
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.entries.iter().rev().find_map(|e| match e.event {
            TraceEvent::Stopped { reason } => Some(reason),
            _ => None,
        })
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

/// Persists one plain-text file per run.
#[derive(Debug, Clone)]
pub struct RunLogWriter {
    dir: PathBuf,
}

impl RunLogWriter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub async fn write(&self, trace: &RunTrace) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create log directory {}", self.dir.display()))?;

        let stem = chrono::Local::now()
            .format("agent-%Y%m%d-%H%M%S-%3f")
            .to_string();

        // create_new never truncates, so runs sharing a timestamp take the
        // next free suffix instead of overwriting each other.
        for attempt in 0..MAX_NAME_COLLISIONS {
            let file_name = match attempt {
                0 => format!("{stem}.log"),
                n => format!("{stem}-{n}.log"),
            };
            let path = self.dir.join(file_name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to create run log {}", path.display()));
                }
            };

            file.write_all(trace.render().as_bytes())
                .await
                .with_context(|| format!("Failed to write run log {}", path.display()))?;
            file.flush()
                .await
                .with_context(|| format!("Failed to flush run log {}", path.display()))?;

            return Ok(path);
        }

        anyhow::bail!(
            "No free run log name for {} in {}",
            stem,
            self.dir.display()
        )
    }
}
