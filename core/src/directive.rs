//! Extraction of `TOOLCALL[<name>|<argument>]` directives from model output.
//!
//! Only the first directive in a reply is honored. The marker is not escaped,
//! so a literal `]` inside the argument ends the directive early.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub const TOOL_CALL_OPEN: &str = "TOOLCALL[";
pub const TOOL_CALL_CLOSE: char = ']';
pub const TOOL_CALL_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Argument {
    Text(String),
    Structured(Map<String, Value>),
}

impl Argument {
    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Structured(map) => Some(map),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Structured(map) => {
                let json = serde_json::to_string(map).map_err(|_| std::fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolDirective {
    pub name: String,
    pub argument: Argument,
}

#[derive(Debug, Error)]
pub enum DirectiveError {
    #[error("directive is missing its closing ']'")]
    Unterminated,
    #[error("directive '{0}' has no '|' between tool name and input")]
    MissingSeparator(String),
    #[error("structured input is not a valid JSON object: {0}")]
    InvalidStructuredArgument(#[from] serde_json::Error),
}

pub fn contains_directive(text: &str) -> bool {
    text.contains(TOOL_CALL_OPEN)
}

/// Returns `Ok(None)` when `text` carries no directive marker at all.
pub fn parse_directive(text: &str) -> Result<Option<ToolDirective>, DirectiveError> {
    let Some(start) = text.find(TOOL_CALL_OPEN) else {
        return Ok(None);
    };

    let after_open = &text[start + TOOL_CALL_OPEN.len()..];
    let close_idx = after_open
        .find(TOOL_CALL_CLOSE)
        .ok_or(DirectiveError::Unterminated)?;
    let inner = &after_open[..close_idx];

    let (name, raw_argument) = inner
        .split_once(TOOL_CALL_SEPARATOR)
        .ok_or_else(|| DirectiveError::MissingSeparator(inner.to_string()))?;

    Ok(Some(ToolDirective {
        name: name.trim().to_string(),
        argument: decode_argument(raw_argument)?,
    }))
}

fn decode_argument(raw: &str) -> Result<Argument, DirectiveError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        let map: Map<String, Value> = serde_json::from_str(trimmed)?;
        Ok(Argument::Structured(map))
    } else {
        Ok(Argument::Text(trimmed.to_string()))
    }
}
