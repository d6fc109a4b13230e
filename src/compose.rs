//! Digest composition.
//!
//! The digest is written by the generative backend from a structured prompt.
//! When that call fails for any reason, a deterministic digest listing counts
//! and sources per bucket is built instead, so a run always has something to
//! send. Output uses only `<b>` and `<i>` markup.

use crate::api::AskAsync;
use crate::models::CategorizedHeadlines;
use crate::utils::{date_header, greeting, truncate_for_log};
use chrono::{DateTime, FixedOffset};
use itertools::Itertools;
use std::fmt::Write;
use tracing::{info, instrument, warn};

pub const DEFAULT_SIGNATURE: &str = "\u{1F680} Stay ahead with your Infrastructure Digest";

const CHART: &str = "\u{1F4C8}";
const NO_NEWS_PROMPT: &str = "No infrastructure news available.";
const NO_NEWS_DIGEST: &str = "No infrastructure news today.";
const DIGEST_TITLE: &str = "Daily Infrastructure Industry Digest";

/// Per-run values the digest text depends on.
#[derive(Debug, Clone)]
pub struct DigestContext {
    /// Name used in the greeting; may be empty.
    pub recipient: String,
    /// Closing line of every digest.
    pub signature: String,
    /// Current time in the digest's time zone.
    pub now: DateTime<FixedOffset>,
}

/// Where a digest came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Digest {
    Generated(String),
    Fallback(String),
}

impl Digest {
    pub fn text(&self) -> &str {
        match self {
            Digest::Generated(text) | Digest::Fallback(text) => text,
        }
    }
}

/// Build the prompt sent to the generative backend.
pub fn build_prompt(categorized: &CategorizedHeadlines, ctx: &DigestContext) -> String {
    let mut listing = String::new();
    for bucket in categorized.non_empty() {
        let _ = writeln!(listing, "\n{}:", bucket.label);
        for h in &bucket.headlines {
            let _ = writeln!(listing, "- {} ({})", h.title, h.source);
        }
    }
    if listing.trim().is_empty() {
        listing = NO_NEWS_PROMPT.to_string();
    }

    format!(
        "{greeting}! {CHART}\n{date}\n\n\
Here are today's top Infrastructure Headlines ({total} total):\n\
{listing}\n\n\
Now write a Telegram-friendly summary using the following rules:\n\
- Use only <b> and <i> HTML tags.\n\
- For each category (like Energy & Oil, Heavy Equipment, etc.), summarize in 2-3 impactful sentences.\n\
- Include specific company names, numbers, and regions.\n\
- Mention the source name (e.g., ET Infra), but do not hyperlink it.\n\
- Make a separate section for <b>Heavy Equipment</b> updates (like cranes, excavators, machinery).\n\
- End with: {signature}",
        greeting = greeting(&ctx.now, &ctx.recipient),
        date = date_header(&ctx.now),
        total = categorized.total(),
        signature = ctx.signature,
    )
}

/// Deterministic digest: counts and up to two sources per non-empty bucket.
pub fn fallback_digest(categorized: &CategorizedHeadlines, ctx: &DigestContext) -> String {
    let mut digest = format!(
        "<b>{}! {CHART}</b>\n{}\n\n<b>{DIGEST_TITLE}</b>\n\n",
        greeting(&ctx.now, &ctx.recipient),
        date_header(&ctx.now),
    );

    for bucket in categorized.non_empty() {
        let sources = bucket
            .headlines
            .iter()
            .map(|h| h.source.as_str())
            .unique()
            .take(2)
            .join(", ");
        let _ = write!(
            digest,
            "<b>{}:</b>\n{} key updates from {}.\n\n",
            bucket.label,
            bucket.headlines.len(),
            sources
        );
    }

    if categorized.is_empty() {
        let _ = write!(digest, "{NO_NEWS_DIGEST}\n\n");
    }

    digest.push_str(&ctx.signature);
    digest
}

/// Compose the digest, preferring the generative backend.
///
/// Never fails: a backend error is logged and the fallback is returned.
#[instrument(level = "info", skip_all, fields(total = categorized.total()))]
pub async fn compose<A: AskAsync>(
    backend: &A,
    categorized: &CategorizedHeadlines,
    ctx: &DigestContext,
) -> Digest {
    let prompt = build_prompt(categorized, ctx);
    match backend.ask(&prompt).await {
        Ok(text) => {
            info!(bytes = text.len(), "Digest generated by backend");
            Digest::Generated(text)
        }
        Err(e) => {
            warn!(error = %e, prompt = %truncate_for_log(&prompt, 200), "Generative backend failed; using fallback digest");
            Digest::Fallback(fallback_digest(categorized, ctx))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::{self, CONSTRUCTION, ENERGY, HEAVY_EQUIPMENT};
    use crate::error::DigestError;
    use crate::models::Headline;
    use chrono::TimeZone;
    use std::cell::RefCell;

    struct FailingBackend;

    impl AskAsync for FailingBackend {
        async fn ask(&self, _prompt: &str) -> Result<String, DigestError> {
            Err(DigestError::EmptyResponse)
        }
    }

    #[derive(Default)]
    struct RecordingBackend {
        prompts: RefCell<Vec<String>>,
    }

    impl AskAsync for RecordingBackend {
        async fn ask(&self, prompt: &str) -> Result<String, DigestError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            Ok("<b>Energy & Oil</b>\n<i>ONGC</i> is drilling.".to_string())
        }
    }

    fn ctx(hour: u32) -> DigestContext {
        DigestContext {
            recipient: "Mr. Sharma".to_string(),
            signature: DEFAULT_SIGNATURE.to_string(),
            now: FixedOffset::east_opt(330 * 60)
                .unwrap()
                .with_ymd_and_hms(2025, 5, 6, hour, 0, 0)
                .unwrap(),
        }
    }

    fn headline(title: &str, source: &str) -> Headline {
        Headline {
            title: title.to_string(),
            source: source.to_string(),
            url: "https://example.com/".to_string(),
        }
    }

    fn two_categories() -> CategorizedHeadlines {
        categorize::categorize(vec![
            headline("ONGC discovers new oil field", "ONGC"),
            headline("BEML ships 40 excavators", "BEML"),
        ])
    }

    #[test]
    fn test_fallback_with_no_headlines() {
        let digest = fallback_digest(&categorize::categorize(vec![]), &ctx(9));
        assert!(digest.starts_with("<b>Good Morning, Mr. Sharma! \u{1F4C8}</b>\n06 May 2025\n\n"));
        assert!(digest.contains("No infrastructure news today."));
        assert!(digest.ends_with(DEFAULT_SIGNATURE));
        for label in categorize::DISPLAY_ORDER {
            assert!(!digest.contains(&format!("<b>{label}:</b>")), "empty heading {label}");
        }
    }

    #[test]
    fn test_fallback_end_to_end_two_categories() {
        let categorized = two_categories();
        let non_empty: Vec<_> = categorized.non_empty().map(|b| b.label).collect();
        assert_eq!(non_empty, vec![ENERGY, HEAVY_EQUIPMENT]);

        let digest = fallback_digest(&categorized, &ctx(18));
        assert!(digest.starts_with("<b>Good Evening, Mr. Sharma!"));
        assert!(digest.contains("<b>Energy & Oil:</b>\n1 key updates from ONGC.\n\n"));
        assert!(digest.contains("<b>Heavy Equipment:</b>\n1 key updates from BEML.\n\n"));
        assert_eq!(digest.matches("key updates from").count(), 2);
        assert!(!digest.contains("No infrastructure news today."));
        assert!(digest.ends_with(DEFAULT_SIGNATURE));
    }

    #[test]
    fn test_fallback_lists_at_most_two_distinct_sources() {
        let categorized = categorize::categorize(vec![
            headline("Metro phase one", "ET Infra"),
            headline("Metro phase two", "ET Infra"),
            headline("Bridge repairs", "Construction World"),
            headline("Infrastructure push", "Projects Today"),
        ]);
        let digest = fallback_digest(&categorized, &ctx(9));
        assert!(digest.contains(&format!(
            "<b>{CONSTRUCTION}:</b>\n4 key updates from ET Infra, Construction World.\n\n"
        )));
        assert!(!digest.contains("Projects Today"));
    }

    #[test]
    fn test_fallback_follows_display_order() {
        let categorized = categorize::categorize(vec![
            headline("Quarterly results", "L&T"),
            headline("Gas grid expansion", "ONGC"),
        ]);
        let digest = fallback_digest(&categorized, &ctx(9));
        let energy = digest.find("<b>Energy & Oil:</b>").unwrap();
        let other = digest.find("<b>Other News:</b>").unwrap();
        assert!(energy < other);
    }

    #[test]
    fn test_prompt_lists_headlines_and_rules() {
        let prompt = build_prompt(&two_categories(), &ctx(9));
        assert!(prompt.starts_with("Good Morning, Mr. Sharma! \u{1F4C8}\n06 May 2025"));
        assert!(prompt.contains("(2 total)"));
        assert!(prompt.contains("\nEnergy & Oil:\n- ONGC discovers new oil field (ONGC)\n"));
        assert!(prompt.contains("\nHeavy Equipment:\n- BEML ships 40 excavators (BEML)\n"));
        assert!(!prompt.contains("Other News:"));
        assert!(prompt.contains("Use only <b> and <i> HTML tags."));
        assert!(prompt.ends_with(&format!("End with: {DEFAULT_SIGNATURE}")));
    }

    #[test]
    fn test_prompt_without_headlines() {
        let prompt = build_prompt(&categorize::categorize(vec![]), &ctx(15));
        assert!(prompt.starts_with("Good Evening"));
        assert!(prompt.contains("(0 total)"));
        assert!(prompt.contains("No infrastructure news available."));
    }

    #[tokio::test]
    async fn test_compose_returns_backend_text_verbatim() {
        let backend = RecordingBackend::default();
        let categorized = two_categories();
        let digest = compose(&backend, &categorized, &ctx(9)).await;

        assert_eq!(
            digest,
            Digest::Generated("<b>Energy & Oil</b>\n<i>ONGC</i> is drilling.".to_string())
        );
        let prompts = backend.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0], build_prompt(&categorized, &ctx(9)));
    }

    #[tokio::test]
    async fn test_compose_falls_back_when_backend_fails() {
        let categorized = two_categories();
        let digest = compose(&FailingBackend, &categorized, &ctx(9)).await;

        assert!(matches!(digest, Digest::Fallback(_)));
        assert!(!digest.text().is_empty());
        assert!(digest.text().ends_with(DEFAULT_SIGNATURE));
        assert_eq!(digest.text(), fallback_digest(&categorized, &ctx(9)));
    }

    #[tokio::test]
    async fn test_compose_falls_back_with_no_news() {
        let digest = compose(&FailingBackend, &categorize::categorize(vec![]), &ctx(9)).await;
        assert!(digest.text().contains("No infrastructure news today."));
        assert!(digest.text().contains(DEFAULT_SIGNATURE));
    }
}
