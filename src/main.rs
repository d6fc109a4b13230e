//! # Infrastructure Digest
//!
//! Collects infrastructure-industry headlines from a fixed table of news
//! sites, groups them by topic, has a generative model summarize them and
//! posts the result to a Telegram chat.
//!
//! ## Usage
//!
//! ```sh
//! GEMINI_API_KEY=... TELEGRAM_BOT_TOKEN=... TELEGRAM_CHAT_ID=... infra_digest
//! ```
//!
//! Scheduling is left to the invoker (cron, a CI schedule, ...). Each run is
//! independent and keeps no state.
//!
//! ## Architecture
//!
//! The run is one linear pipeline:
//! 1. **Scraping**: Fetch each site once and extract up to ten headlines
//! 2. **Categorizing**: File each headline under exactly one topic bucket
//! 3. **Composing**: Ask the model for a digest, or build one deterministically
//! 4. **Delivering**: Sanitize the markup and send a single Telegram message
//!
//! Only a configuration error stops a run; every later failure is logged and
//! the pipeline carries on.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod categorize;
mod cli;
mod compose;
mod error;
mod models;
mod outputs;
mod scrapers;
mod utils;

use api::GeminiClient;
use cli::Cli;
use compose::{Digest, DigestContext};
use outputs::telegram::TelegramClient;
use utils::now_in_offset;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("infra_digest starting up");

    if let Err(e) = dotenvy::dotenv() {
        debug!(error = %e, "No .env file loaded");
    }

    let args = Cli::parse();
    debug!(dry_run = args.dry_run, sites_file = ?args.sites_file, "Parsed CLI arguments");

    // Fail fast, before any network activity.
    if let Err(e) = args.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }
    let sites = match scrapers::sites::load_sites(args.sites_file.as_deref()).await {
        Ok(sites) => sites,
        Err(e) => {
            error!(error = %e, "Could not load site table");
            return Err(e.into());
        }
    };

    run(&args, &sites).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// One digest run: scrape, categorize, compose, deliver.
///
/// Returns an error only when an HTTP client cannot be constructed.
#[instrument(level = "info", skip_all)]
async fn run(args: &Cli, sites: &[models::SiteDescriptor]) -> Result<(), error::DigestError> {
    let http = scrapers::http_client()?;
    let gemini = GeminiClient::new(
        args.gemini_api_key.clone(),
        args.gemini_model.clone(),
        args.gemini_api_base.clone(),
    )?;

    // ---- Scrape ----
    let headlines = scrapers::collect_headlines(&http, sites).await;

    // ---- Categorize ----
    let categorized = categorize::categorize(headlines);

    // ---- Compose ----
    let ctx = DigestContext {
        recipient: args.recipient.clone(),
        signature: args.signature.clone(),
        now: now_in_offset(args.utc_offset_minutes),
    };
    let digest = compose::compose(&gemini, &categorized, &ctx).await;
    let fallback = matches!(digest, Digest::Fallback(_));
    info!(fallback, bytes = digest.text().len(), "Digest composed");

    // ---- Deliver ----
    if args.dry_run {
        println!("{}", outputs::telegram::sanitize(digest.text()));
        info!("Dry run; digest printed instead of sent");
        return Ok(());
    }
    let telegram = TelegramClient::new(
        args.telegram_bot_token.clone(),
        args.telegram_chat_id.clone(),
        args.telegram_api_base.clone(),
    )?;
    telegram.deliver(digest.text()).await;
    Ok(())
}
