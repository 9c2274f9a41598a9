use crate::traits::ChatMessage;
use std::fmt::Write;

pub const NEWS_TOOL: &str = "ainews";

const KNOWN_TOOLS: &[(&str, &str)] = &[
    (
        "memory",
        "store and recall facts across conversations; input is free text",
    ),
    (
        "time",
        "current time or timezone conversion; input must be a JSON object such as {\"timezone\": \"UTC\"} or {\"source_timezone\": ..., \"target_timezone\": ..., \"time\": \"HH:MM\"}",
    ),
    (
        "fetch",
        "download a web page; input is a URL or {\"url\": ..., \"max_length\": ..., \"start_index\": ..., \"raw\": ...}",
    ),
    (
        NEWS_TOOL,
        "latest generative-AI news from Medium and arXiv, newest first",
    ),
];

const NEWS_RULES: &str = "When using the 'ainews' tool, your job is to return a high-quality human-readable list of exactly 10 recent AI-related news items, \
carefully selected to ensure a balanced distribution: ideally 5 from Medium blogs and 5 from arXiv preprints or similar sources. \
Ensure that each item includes:\n\
- A concise headline or summary\n\
- A valid, accurate, and complete URL (users will click on them, so incorrect or missing URLs make the output unusable)\n\
- A logical order, grouped by topic or source where appropriate\n\n\
URLs must be exactly as returned by the ainews tool. Do not rewrite or drop them. If a URL is missing or appears malformed, do not include that item.\n\n\
After displaying the result, store all returned URLs and headlines in memory. \
On future calls to ainews, only show items that are new (i.e., not already stored in memory).";

/// Builds the system prompt that opens every run.
pub struct ContextBuilder {
    pub tool_names: Vec<String>,
    pub system_prompt_override: Option<String>,
}

impl ContextBuilder {
    pub fn new(tool_names: Vec<String>) -> Self {
        Self {
            tool_names,
            system_prompt_override: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt_override = Some(prompt.into());
        self
    }

    pub fn build_system_prompt(&self) -> String {
        if let Some(prompt) = &self.system_prompt_override {
            return prompt.clone();
        }

        let mut prompt = String::new();
        let _ = write!(
            prompt,
            "You are an intelligent agent with access to the following tools: {}. ",
            self.tool_names.join(", ")
        );
        prompt.push_str(
            "When a user asks a question, you should first think through your plan and, if needed, issue a tool call using the format: \
TOOLCALL[tool_name|input_data]. Issue at most one tool call per reply. \
You will receive the tool result as TOOLRESULT[...] and can continue reasoning based on it.\n\n",
        );

        prompt.push_str("## Available Tools\n\n");
        for name in &self.tool_names {
            let description = KNOWN_TOOLS
                .iter()
                .find(|(known, _)| *known == name.as_str())
                .map(|(_, description)| *description)
                .unwrap_or("HTTP tool; input is free text or a JSON object");
            let _ = writeln!(prompt, "- **{}**: {}", name, description);
        }
        prompt.push('\n');

        if self.tool_names.iter().any(|name| name == NEWS_TOOL) {
            prompt.push_str(NEWS_RULES);
            prompt.push_str("\n\n");
        }

        prompt.push_str("Use your tools wisely, reason clearly, and avoid hallucinating information or links.");
        prompt
    }

    /// System prompt first, then the caller's history untouched.
    pub fn build_messages(&self, history: Vec<ChatMessage>) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.build_system_prompt()));
        messages.extend(history);
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Role;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn prompt_lists_tools_and_directive_syntax() {
        let prompt = ContextBuilder::new(names(&["memory", "weather"])).build_system_prompt();
        assert!(prompt.contains("TOOLCALL[tool_name|input_data]"));
        assert!(prompt.contains("- **memory**: store and recall"));
        assert!(prompt.contains("- **weather**: HTTP tool"));
        assert!(!prompt.contains("exactly 10 recent AI-related news items"));
    }

    #[test]
    fn news_rules_follow_news_tool() {
        let prompt = ContextBuilder::new(names(&["memory", "ainews"])).build_system_prompt();
        assert!(prompt.contains("only show items that are new"));
    }

    #[test]
    fn messages_start_with_system_prompt() {
        let builder = ContextBuilder::new(names(&["time"])).with_system_prompt("be brief");
        let messages = builder.build_messages(vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::user("what time is it?"),
        ]);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], ChatMessage::system("be brief"));
        assert_eq!(messages[3].role, Role::User);
    }
}
