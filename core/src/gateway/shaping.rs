use crate::directive::Argument;
use crate::gateway::{ArgumentShape, ToolError, ToolSpec};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

const CONVERSION_FIELDS: [&str; 3] = ["source_timezone", "target_timezone", "time"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_length")]
    pub max_length: u64,
    #[serde(default)]
    pub start_index: u64,
    #[serde(default)]
    pub raw: bool,
}

fn default_max_length() -> u64 {
    5000
}

impl FetchRequest {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_length: default_max_length(),
            start_index: 0,
            raw: false,
        }
    }
}

/// A fully built tool request, ready to be POSTed.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRequest {
    pub url: String,
    pub body: Value,
    /// Return the response body untouched instead of looking for `result`.
    pub verbatim: bool,
}

pub fn shape_request(
    spec: &ToolSpec,
    argument: &Argument,
    reference_timezone: &str,
) -> Result<ShapedRequest, ToolError> {
    match spec.shape {
        ArgumentShape::Input => Ok(ShapedRequest {
            url: spec.endpoint.clone(),
            body: json!({ "input": argument }),
            verbatim: false,
        }),
        ArgumentShape::Fetch => {
            let fetch = match argument {
                Argument::Text(url) => FetchRequest::for_url(url.as_str()),
                Argument::Structured(map) => serde_json::from_value(Value::Object(map.clone()))
                    .map_err(|_| ToolError::InvalidFetchInput(spec.name.clone()))?,
            };
            let body = serde_json::to_value(&fetch)
                .map_err(|_| ToolError::InvalidFetchInput(spec.name.clone()))?;

            Ok(ShapedRequest {
                url: spec.endpoint.clone(),
                body,
                verbatim: true,
            })
        }
        ArgumentShape::Time => {
            let map = argument
                .as_map()
                .ok_or_else(|| ToolError::ExpectedMapping(spec.name.clone()))?;
            let (route, body) = shape_time(map.clone(), reference_timezone);

            Ok(ShapedRequest {
                url: format!("{}/{}", spec.endpoint.trim_end_matches('/'), route),
                body: Value::Object(body),
                verbatim: false,
            })
        }
    }
}

fn shape_time(
    mut map: Map<String, Value>,
    reference_timezone: &str,
) -> (&'static str, Map<String, Value>) {
    if CONVERSION_FIELDS.iter().all(|field| map.contains_key(*field)) {
        map.entry("target_timezone")
            .or_insert_with(|| Value::String(reference_timezone.to_string()));
        ("convert_time", map)
    } else {
        map.entry("timezone")
            .or_insert_with(|| Value::String(reference_timezone.to_string()));
        ("get_current_time", map)
    }
}
