//! Telegram delivery.
//!
//! Telegram's HTML parse mode accepts only a handful of tags, so list and
//! line-break markup that a model may still emit is rewritten first. The
//! digest goes out as one `sendMessage` call with link previews disabled.

use crate::error::DigestError;
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, instrument};

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

static LIST_CONTAINER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?[uo]l\s*>").expect("valid list regex"));
static ITEM_THEN_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</li\s*>\s*<br\s*/?>").expect("valid item-break regex"));
static ITEM_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<li\s*>").expect("valid li regex"));
static ITEM_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</li\s*>").expect("valid /li regex"));
static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid br regex"));

/// Rewrite markup Telegram rejects into plain-text equivalents.
///
/// List containers disappear, list items become `• ` bullets ending in a
/// newline, `<br>` variants become newlines and `&nbsp;` a space.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize("<li>Foo</li><br>Bar"), "• Foo\nBar");
/// ```
pub fn sanitize(text: &str) -> String {
    let text = LIST_CONTAINER.replace_all(text, "");
    let text = ITEM_THEN_BREAK.replace_all(&text, "\n");
    let text = ITEM_OPEN.replace_all(&text, "• ");
    let text = ITEM_CLOSE.replace_all(&text, "\n");
    let text = LINE_BREAK.replace_all(&text, "\n");
    text.replace("&nbsp;", " ")
}

/// Drop the request URL from a transport error; it embeds the bot token.
fn redact(e: reqwest::Error) -> DigestError {
    DigestError::Http(e.without_url())
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API client bound to one chat.
pub struct TelegramClient {
    client: Client,
    bot_token: String,
    chat_id: String,
    api_base: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    pub fn new(bot_token: String, chat_id: String, api_base: String) -> Result<Self, DigestError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            bot_token,
            chat_id,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    /// Sanitize `text` and send it as a single HTML message.
    #[instrument(level = "info", skip_all, fields(chat_id = %self.chat_id))]
    pub async fn send(&self, text: &str) -> Result<(), DigestError> {
        let body = json!({
            "chat_id": self.chat_id,
            "text": sanitize(text),
            "parse_mode": "HTML",
            "link_preview_options": { "is_disabled": true },
        });

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(redact)?;

        let status = resp.status();
        let raw = resp.text().await.map_err(redact)?;
        let parsed: Option<ApiResponse> = serde_json::from_str(&raw).ok();
        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            other => Err(DigestError::Status {
                // The URL embeds the bot token.
                url: "sendMessage".to_string(),
                status,
                body: other
                    .and_then(|r| r.description)
                    .unwrap_or_else(|| truncate_for_log(&raw, 300)),
            }),
        }
    }

    /// Send the digest; failures are logged, never returned.
    pub async fn deliver(&self, text: &str) {
        match self.send(text).await {
            Ok(()) => info!(bytes = text.len(), "Digest delivered"),
            Err(e) => error!(error = %e, "Telegram delivery failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_sanitize_list_and_break() {
        assert_eq!(sanitize("<li>Foo</li><br>Bar"), "• Foo\nBar");
    }

    #[test]
    fn test_sanitize_full_list() {
        assert_eq!(
            sanitize("<b>Energy</b><ul><li>One</li><li>Two</li></ul>Done"),
            "<b>Energy</b>• One\n• Two\nDone"
        );
    }

    #[test]
    fn test_sanitize_break_variants_and_nbsp() {
        assert_eq!(sanitize("a<br>b<br/>c<br />d<BR>e"), "a\nb\nc\nd\ne");
        assert_eq!(sanitize("one&nbsp;two"), "one two");
    }

    #[test]
    fn test_sanitize_keeps_supported_tags() {
        let text = "<b>Heavy Equipment:</b>\n<i>BEML</i> ships cranes.";
        assert_eq!(sanitize(text), text);
    }

    fn client(server: &MockServer) -> TelegramClient {
        TelegramClient::new("123:abc".into(), "42".into(), server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_sanitized_html_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_json(json!({
                "chat_id": "42",
                "text": "• Foo\nBar",
                "parse_mode": "HTML",
                "link_preview_options": { "is_disabled": true },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": {} })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).send("<li>Foo</li><br>Bar").await.unwrap();
    }

    #[tokio::test]
    async fn test_send_reports_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "description": "Bad Request: can't parse entities"
            })))
            .mount(&server)
            .await;

        let err = client(&server).send("<p>bad</p>").await.unwrap_err();
        match err {
            DigestError::Status { status, body, url } => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(body, "Bad Request: can't parse entities");
                assert!(!url.contains("123:abc"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deliver_swallows_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        // Must return normally.
        client(&server).deliver("hello").await;
    }

    #[tokio::test]
    async fn test_transport_error_hides_token() {
        // Nothing listens on port 9 of localhost in the test environment.
        let c = TelegramClient::new("123:SECRET".into(), "42".into(), "http://127.0.0.1:9".into())
            .unwrap();
        let err = c.send("hi").await.unwrap_err();
        assert!(matches!(err, DigestError::Http(_)));
        let shown = format!("{err} {err:?}");
        assert!(!shown.contains("SECRET"), "token leaked: {shown}");
    }

    #[test]
    fn test_debug_hides_token() {
        let c = TelegramClient::new("secret-token".into(), "42".into(), "http://x".into()).unwrap();
        assert!(!format!("{c:?}").contains("secret-token"));
    }
}
