// ABOUTME: Tolerant parsing of the assistant reply into AssistantResponse.
// ABOUTME: Stages: pick the reply text, strip a markdown fence, strictly decode the JSON.

use serde::{Deserialize, Deserializer, Serialize};
use smartyshop_scrapers::Product;

use crate::error::AssistantError;
use crate::wire::GenerateResponse;

/// Structured answer returned to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub products: Vec<Product>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Product>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<Product>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Text of the first part of the first candidate.
pub fn reply_text(response: &GenerateResponse) -> Result<&str, AssistantError> {
    response
        .candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .and_then(|p| p.text.as_deref())
        .ok_or(AssistantError::NoContent)
}

/// Removes a surrounding ```` ```json ```` (or bare ```` ``` ````) fence and outer whitespace.
pub fn strip_code_fence(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    s = s.trim();
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Decodes a reply into [`AssistantResponse`]; the error keeps `raw` untouched.
pub fn parse_reply(raw: &str) -> Result<AssistantResponse, AssistantError> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|source| AssistantError::Schema {
        raw: raw.to_string(),
        source,
    })
}
