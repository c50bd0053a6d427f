use thiserror::Error;

/// Errors returned by the generative-AI client.
#[derive(Debug, Error)]
pub enum GenAiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status. `message` is the service's error message when the body
    /// carried one.
    #[error("unexpected HTTP status {status} from {model}: {message}")]
    UnexpectedStatus {
        status: u16,
        model: String,
        message: String,
    },

    /// The prompt was refused before any candidate was produced.
    #[error("prompt blocked by {model}: {reason}")]
    Blocked { model: String, reason: String },

    /// The response carried no text.
    #[error("empty response from {model}")]
    EmptyResponse { model: String },

    /// A response body could not be decoded into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
