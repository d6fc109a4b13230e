//! Error types for the digest pipeline.
//!
//! Each pipeline stage returns [`DigestError`]. The stages that must not abort
//! the run (per-site scraping, summarization, delivery) match on the error and
//! log it; only [`DigestError::MissingCredential`] is meant to reach `main`.

use reqwest::StatusCode;

/// Top-level error type for a digest run.
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("Invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Failed to parse site table: {0}")]
    SiteTable(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generative backend returned no text")]
    EmptyResponse,

    #[error("Missing required credential: {0}")]
    MissingCredential(&'static str),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_the_variable() {
        let e = DigestError::MissingCredential("TELEGRAM_BOT_TOKEN");
        assert_eq!(
            e.to_string(),
            "Missing required credential: TELEGRAM_BOT_TOKEN"
        );
    }

    #[test]
    fn status_error_carries_url_and_body() {
        let e = DigestError::Status {
            url: "https://example.com/".into(),
            status: StatusCode::NOT_FOUND,
            body: "gone".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("https://example.com/"));
        assert!(msg.contains("gone"));
    }
}
