//! Headline scraping from the configured news sites.
//!
//! Scraping is table-driven: every site is a [`SiteDescriptor`] carrying a CSS
//! selector (see [`sites`]). For each site, in table order:
//!
//! 1. **Fetching**: one GET with a browser-like `User-Agent` and a 20s timeout
//! 2. **Extracting**: the first [`MAX_PER_SITE`] selector matches become
//!    [`Headline`]s with cleaned titles and resolved links
//!
//! A site that fails (transport error, non-200 status, bad selector) is logged
//! and skipped; the others still contribute. Sites are fetched one after the
//! other and never retried.

pub mod sites;

use crate::error::DigestError;
use crate::models::{Headline, SiteDescriptor};
use crate::utils::{clean, truncate_for_log};
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Headlines kept per site.
pub const MAX_PER_SITE: usize = 10;

/// Per-request timeout.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Identification sent to the news sites.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Build the HTTP client used for scraping.
pub fn http_client() -> Result<Client, DigestError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()?)
}

/// Scrape every site and return all headlines in site order.
///
/// Failed sites are logged and contribute nothing.
#[instrument(level = "info", skip_all, fields(sites = sites.len()))]
pub async fn collect_headlines(client: &Client, sites: &[SiteDescriptor]) -> Vec<Headline> {
    let per_site: Vec<Vec<Headline>> = stream::iter(sites)
        .then(|site| async move {
            match scrape_site(client, site).await {
                Ok(headlines) => {
                    info!(source = %site.label, count = headlines.len(), "Scraped site");
                    headlines
                }
                Err(e) => {
                    error!(source = %site.label, url = %site.url, error = %e, "Scraping failed; skipping site");
                    Vec::new()
                }
            }
        })
        .collect()
        .await;

    let headlines: Vec<Headline> = per_site.into_iter().flatten().collect();
    info!(count = headlines.len(), "Collected headlines");
    headlines
}

/// Fetch one site and extract its headlines.
#[instrument(level = "info", skip_all, fields(source = %site.label))]
async fn scrape_site(client: &Client, site: &SiteDescriptor) -> Result<Vec<Headline>, DigestError> {
    let resp = client.get(&site.url).send().await?;
    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        return Err(DigestError::Status {
            url: site.url.clone(),
            status,
            body: truncate_for_log(&body, 200),
        });
    }

    let bytes = resp.bytes().await?;
    debug!(bytes = bytes.len(), "Fetched page");
    let html = String::from_utf8_lossy(&bytes);
    extract_headlines(&html, site)
}

/// Apply the site's selector to `html` and build headlines.
///
/// Takes the first [`MAX_PER_SITE`] matches, skips those whose cleaned text is
/// empty, and resolves each `href` against the site URL. Elements without a
/// usable link point at the site page itself.
pub fn extract_headlines(html: &str, site: &SiteDescriptor) -> Result<Vec<Headline>, DigestError> {
    let base = Url::parse(&site.url)?;
    let selector = Selector::parse(&site.selector).map_err(|e| DigestError::Selector {
        selector: site.selector.clone(),
        reason: format!("{e:?}"),
    })?;
    let document = Html::parse_document(html);

    let mut headlines = Vec::new();
    for element in document.select(&selector).take(MAX_PER_SITE) {
        let raw = element.text().collect::<Vec<_>>().join(" ");
        let title = clean(&raw);
        if title.is_empty() {
            continue;
        }

        let url = match element.value().attr("href") {
            Some(href) => resolve_link(&base, href),
            None => base.to_string(),
        };
        headlines.push(Headline {
            title,
            source: site.label.clone(),
            url,
        });
    }

    if headlines.is_empty() {
        warn!(source = %site.label, selector = %site.selector, "Selector matched no headlines");
    }
    Ok(headlines)
}

/// Resolve `href` against `base`, falling back to the base on garbage.
fn resolve_link(base: &Url, href: &str) -> String {
    match base.join(href.trim()) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            debug!(%href, error = %e, "Unresolvable link; using site URL");
            base.to_string()
        }
    }
}
