use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use relay_core::config::Config;
use relay_core::gateway::{ArgumentShape, ToolSpec};

const BANNER: &str = r"
    -------------------------------------

      r e l a y
      model  <->  TOOLCALL[...]  <->  tools

    -------------------------------------
";

const DEFAULT_TOOL_HOST: &str = "http://localhost:8001";

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn setup_provider() -> Result<(String, String, String)> {
    let providers = ["ollama", "openai"];

    let selection = Select::new()
        .with_prompt("Select your model provider")
        .items(&providers)
        .default(0)
        .interact()
        .context("Failed to select provider")?;

    let provider = providers[selection].to_string();

    let (models, api_key) = if provider == "openai" {
        let api_key: String = Input::new()
            .with_prompt("Enter your OpenAI API key")
            .interact_text()
            .context("Failed to read API key")?;
        if api_key.is_empty() {
            return Err(anyhow::anyhow!("API key cannot be empty"));
        }
        (vec!["gpt-4o", "gpt-4o-mini"], api_key)
    } else {
        (vec!["gemma3:12b", "llama3.2", "qwen2.5"], String::new())
    };

    let model_selection = Select::new()
        .with_prompt("Select your model")
        .items(&models)
        .default(0)
        .interact()
        .context("Failed to select model")?;

    Ok((provider, models[model_selection].to_string(), api_key))
}

fn setup_tools() -> Result<Vec<ToolSpec>> {
    let host: String = Input::new()
        .with_prompt("Tool server base URL")
        .default(DEFAULT_TOOL_HOST.to_string())
        .interact_text()
        .context("Failed to read tool server URL")?;
    let host = host.trim_end_matches('/');

    let with_news = Confirm::new()
        .with_prompt("Enable the ainews tool?")
        .default(true)
        .interact()
        .context("Failed to read answer")?;

    let mut tools = vec![
        ToolSpec::new("memory", format!("{host}/memory/memory"), ArgumentShape::Input),
        ToolSpec::new("time", format!("{host}/time"), ArgumentShape::Time),
        ToolSpec::new("fetch", format!("{host}/fetch/fetch"), ArgumentShape::Fetch),
    ];
    if with_news {
        tools.push(ToolSpec::new(
            "ainews",
            format!("{host}/ainews/latest_genai_news"),
            ArgumentShape::Input,
        ));
    }

    Ok(tools)
}

pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan().bold());

    println!("  {}", style("Welcome to relay!").white().bold());
    println!(
        "  {}",
        style("This wizard will configure your agent in under 30 seconds.").dim()
    );
    println!();

    print_step(1, 2, "Model Setup");
    let (provider, model, api_key) = setup_provider()?;

    print_step(2, 2, "Tool Endpoints");
    let tools = setup_tools()?;

    let config = Config {
        provider: Some(provider),
        api_key,
        model,
        tools,
        ..Default::default()
    };
    config.validate()?;

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(relay_core::config::get_config_path().display()).cyan()
    );
    println!(
        "  {} Run logs go to {}",
        style("→").green(),
        style(config.log_dir.display()).cyan()
    );
    println!();
    println!(
        "  {} You can now run: {} or {}",
        style("→").green(),
        style("relay chat").cyan().bold(),
        style("relay serve").cyan().bold()
    );
    println!();

    Ok(config)
}
