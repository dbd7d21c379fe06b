// ABOUTME: Error type for the generative assistant client.
// ABOUTME: Separates transport, upstream status, envelope decoding and reply schema failures.

/// Everything that can go wrong while asking the assistant.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("assistant API key is missing")]
    MissingApiKey,

    #[error("invalid assistant endpoint {endpoint:?}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("assistant request failed")]
    Request(#[source] reqwest::Error),

    #[error("assistant returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode assistant response: {body}")]
    Decode {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("assistant response has no content")]
    NoContent,

    /// The reply text was not the expected JSON object. `raw` is the reply as received.
    #[error("assistant reply does not match the expected schema: {raw}")]
    Schema {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AssistantError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AssistantError::Request(e) if e.is_timeout())
    }

    pub fn is_schema(&self) -> bool {
        matches!(self, AssistantError::Schema { .. })
    }

    /// The raw reply text for schema failures.
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            AssistantError::Schema { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_keeps_raw_text() {
        let source = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = AssistantError::Schema {
            raw: "nope".to_string(),
            source,
        };
        assert!(err.is_schema());
        assert_eq!(err.raw_reply(), Some("nope"));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn status_display_includes_body() {
        let err = AssistantError::Status {
            status: 429,
            body: "quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "assistant returned status 429: quota exceeded");
        assert!(!err.is_timeout());
        assert_eq!(err.raw_reply(), None);
    }
}
