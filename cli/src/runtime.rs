use anyhow::{Context, Result};
use relay_core::agent::{AgentLoop, ContextBuilder, RunLogWriter};
use relay_core::config::Config;
use relay_core::gateway::HttpToolGateway;
use relay_core::providers;
use relay_core::traits::ToolGateway;
use std::sync::Arc;
use tracing::info;

pub fn build_agent(config: &Config) -> Result<AgentLoop> {
    let provider = providers::create_provider(config).context("Failed to set up model provider")?;

    let gateway = HttpToolGateway::with_timeout(config.tools.clone(), config.tool_timeout())?
        .with_reference_timezone(config.reference_timezone.clone());
    let gateway: Arc<dyn ToolGateway> = Arc::new(gateway);

    let mut context_builder = ContextBuilder::new(gateway.tool_names());
    if let Some(prompt) = &config.system_prompt {
        context_builder = context_builder.with_system_prompt(prompt.clone());
    }

    info!(
        provider = provider.name(),
        model = %config.model,
        tools = ?gateway.tool_names(),
        "Agent ready"
    );

    Ok(AgentLoop::new(provider, gateway, context_builder)
        .with_max_rounds(config.max_rounds)
        .with_temperature(config.temperature)
        .with_model_timeout(config.model_timeout())
        .with_run_log(RunLogWriter::new(&config.log_dir)))
}
