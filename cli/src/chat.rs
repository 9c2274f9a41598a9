use anyhow::Result;
use console::style;
use relay_core::agent::AgentLoop;
use relay_core::traits::ChatMessage;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

const REPEAT_NOTICE: &str =
    "It seems like you're asking the same thing again. Do you want me to repeat the last response?";

pub async fn run_once(agent: &AgentLoop, message: &str) {
    println!("\n🤔 Processing...\n");
    let answer = agent.process(message).await;
    termimad::print_text(&answer);
}

/// The REPL owns the conversation; the agent only ever sees a full history.
pub async fn run_interactive(agent: &AgentLoop) -> Result<()> {
    println!("{}", style("relay").cyan().bold());
    println!("Type your message (Ctrl+D to exit):\n");

    let mut editor = DefaultEditor::new()?;
    let mut history: Vec<ChatMessage> = Vec::new();
    let mut last_input = String::new();

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("\n👋 Goodbye!");
                break;
            }
            Err(e) => return Err(e.into()),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        if input.eq_ignore_ascii_case(&last_input) {
            history.push(ChatMessage::assistant(REPEAT_NOTICE));
            println!("\n{}\n", style(REPEAT_NOTICE).dim());
            continue;
        }

        last_input = input.to_string();
        history.push(ChatMessage::user(input));

        println!("\n🤔 Processing...\n");
        let answer = agent.process_with_history(history.clone()).await;
        termimad::print_text(&answer);
        println!();

        history.push(ChatMessage::assistant(answer));
    }

    Ok(())
}
