//! Command-line interface definitions for the infrastructure digest.
//!
//! Every option can be supplied via an environment variable, so a scheduled
//! invoker can run the binary without flags. Credentials default to empty and
//! are checked by [`Cli::validate`] before any network activity.

use crate::api::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};
use crate::compose::DEFAULT_SIGNATURE;
use crate::error::DigestError;
use crate::outputs::telegram::DEFAULT_TELEGRAM_API_BASE;
use clap::Parser;

/// Command-line arguments for a digest run.
///
/// # Examples
///
/// ```sh
/// # All configuration from the environment
/// GEMINI_API_KEY=... TELEGRAM_BOT_TOKEN=... TELEGRAM_CHAT_ID=... infra_digest
///
/// # Print the digest instead of sending it
/// infra_digest --dry-run --recipient "Mr. Sharma"
///
/// # Scrape a custom site table
/// infra_digest --sites-file ./sites.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, default_value = "")]
    pub gemini_api_key: String,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true, default_value = "")]
    pub telegram_bot_token: String,

    /// Telegram chat that receives the digest
    #[arg(long, env = "TELEGRAM_CHAT_ID", default_value = "")]
    pub telegram_chat_id: String,

    /// Name addressed in the greeting
    #[arg(long, env = "DIGEST_RECIPIENT", default_value = "")]
    pub recipient: String,

    /// Closing line of every digest
    #[arg(long, env = "DIGEST_SIGNATURE", default_value = DEFAULT_SIGNATURE)]
    pub signature: String,

    /// Time zone of the greeting and date, in minutes east of UTC
    #[arg(long, env = "DIGEST_UTC_OFFSET_MINUTES", default_value_t = 330, allow_negative_numbers = true)]
    pub utc_offset_minutes: i32,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// Base URL of the Generative Language API
    #[arg(long, env = "GEMINI_API_BASE", default_value = DEFAULT_GEMINI_API_BASE)]
    pub gemini_api_base: String,

    /// Base URL of the Telegram Bot API
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = DEFAULT_TELEGRAM_API_BASE)]
    pub telegram_api_base: String,

    /// Optional YAML file replacing the built-in site table
    #[arg(long, env = "DIGEST_SITES_FILE")]
    pub sites_file: Option<String>,

    /// Print the digest to stdout instead of sending it
    #[arg(long, env = "DIGEST_DRY_RUN")]
    pub dry_run: bool,
}

impl Cli {
    /// Reject blank credentials and out-of-range offsets.
    ///
    /// The Telegram values are not needed for a dry run.
    pub fn validate(&self) -> Result<(), DigestError> {
        if self.gemini_api_key.trim().is_empty() {
            return Err(DigestError::MissingCredential("GEMINI_API_KEY"));
        }
        if !self.dry_run {
            if self.telegram_bot_token.trim().is_empty() {
                return Err(DigestError::MissingCredential("TELEGRAM_BOT_TOKEN"));
            }
            if self.telegram_chat_id.trim().is_empty() {
                return Err(DigestError::MissingCredential("TELEGRAM_CHAT_ID"));
            }
        }
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(DigestError::InvalidValue {
                key: "DIGEST_UTC_OFFSET_MINUTES",
                message: format!("{} is not within +/-24h", self.utc_offset_minutes),
            });
        }
        Ok(())
    }
}
