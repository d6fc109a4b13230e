//! The table of sites to scrape.
//!
//! The built-in table is the reference deployment. A YAML file with the same
//! shape (a list of `label`/`url`/`selector` entries) replaces it when
//! configured:
//!
//! ```yaml
//! - label: ONGC
//!   url: https://ongcindia.com/
//!   selector: div.news a
//! ```

use crate::error::DigestError;
use crate::models::SiteDescriptor;
use tracing::{info, instrument};

/// Built-in reference site table.
pub fn builtin_sites() -> Vec<SiteDescriptor> {
    vec![
        SiteDescriptor::new("ET Infra", "https://infra.economictimes.indiatimes.com/", "h3 a"),
        SiteDescriptor::new(
            "Infrastructure Today",
            "https://infrastructuretoday.co.in/",
            ".jeg_post_title a",
        ),
        SiteDescriptor::new(
            "L&T",
            "https://www.larsentoubro.com/corporate/media/press-releases/",
            "div.latest-news h3 a",
        ),
        SiteDescriptor::new(
            "Construction World",
            "https://www.constructionworld.in/latest-news",
            "h3 a",
        ),
        SiteDescriptor::new("ONGC", "https://ongcindia.com/", "div.news a"),
        SiteDescriptor::new(
            "Projects Today",
            "https://www.projectstoday.com/News",
            "div.card h4 a",
        ),
        SiteDescriptor::new(
            "BEML",
            "https://www.bemlindia.in/press-release/",
            "div.page-title h1",
        ),
    ]
}

/// Parse a YAML site table.
pub fn parse_sites(yaml: &str) -> Result<Vec<SiteDescriptor>, DigestError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load the site table from `path`, or the built-in one when `path` is `None`.
#[instrument(level = "info")]
pub async fn load_sites(path: Option<&str>) -> Result<Vec<SiteDescriptor>, DigestError> {
    let sites = match path {
        Some(path) => {
            let yaml = tokio::fs::read_to_string(path).await?;
            parse_sites(&yaml)?
        }
        None => builtin_sites(),
    };
    info!(count = sites.len(), custom = path.is_some(), "Loaded site table");
    Ok(sites)
}
