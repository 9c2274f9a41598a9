pub mod context;
pub mod loop_;
pub mod trace;

pub use context::ContextBuilder;
pub use loop_::{AgentLoop, RunOutcome};
pub use trace::{RunLogWriter, RunTrace, StopReason, TraceEntry, TraceEvent};
