//! Data models for scraped headlines and their categorized representation.
//!
//! This module defines the core data structures used throughout a run:
//! - [`SiteDescriptor`]: Static description of a news site and how to read it
//! - [`Headline`]: A cleaned headline scraped from one site
//! - [`Bucket`] / [`CategorizedHeadlines`]: Headlines grouped by topic, in display order
//!
//! Nothing here outlives a single run.

use serde::{Deserialize, Serialize};

/// A news site to scrape.
///
/// Sites are plain data: adding one means adding an entry with a CSS
/// selector, never changing pipeline code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SiteDescriptor {
    /// Human-readable source label shown in the digest (e.g. "ET Infra").
    pub label: String,
    /// Page to fetch; also the base for resolving relative links.
    pub url: String,
    /// CSS selector matching headline elements on that page.
    pub selector: String,
}

impl SiteDescriptor {
    pub fn new(label: &str, url: &str, selector: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
            selector: selector.to_string(),
        }
    }
}

/// A single headline as scraped and cleaned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headline {
    /// Cleaned title, at most 200 characters plus an ellipsis.
    pub title: String,
    /// Label of the site it came from.
    pub source: String,
    /// Absolute link to the story, or the site page when none was found.
    pub url: String,
}

/// A named topic partition of headlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: &'static str,
    pub headlines: Vec<Headline>,
}

/// Headlines grouped into buckets, kept in display order.
///
/// Every bucket of the category table is present, even when empty, and one of
/// them is the catch-all that receives headlines for unknown labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizedHeadlines {
    buckets: Vec<Bucket>,
    catch_all: usize,
}

impl CategorizedHeadlines {
    /// Create an empty bucket for each label, in the given order.
    ///
    /// `catch_all` is appended as the last bucket unless `labels` already has it.
    pub fn new(labels: &[&'static str], catch_all: &'static str) -> Self {
        let mut buckets: Vec<Bucket> = labels
            .iter()
            .map(|&label| Bucket {
                label,
                headlines: Vec::new(),
            })
            .collect();
        let catch_all = match buckets.iter().position(|b| b.label == catch_all) {
            Some(index) => index,
            None => {
                buckets.push(Bucket {
                    label: catch_all,
                    headlines: Vec::new(),
                });
                buckets.len() - 1
            }
        };
        Self { buckets, catch_all }
    }

    /// Append a headline to the bucket called `label`, or to the catch-all
    /// when there is no such bucket. Returns the label it was filed under.
    pub fn push(&mut self, label: &str, headline: Headline) -> &'static str {
        let index = self
            .buckets
            .iter()
            .position(|b| b.label == label)
            .unwrap_or(self.catch_all);
        let bucket = &mut self.buckets[index];
        bucket.headlines.push(headline);
        bucket.label
    }

    /// All buckets in display order, including empty ones.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Buckets holding at least one headline, in display order.
    pub fn non_empty(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter().filter(|b| !b.headlines.is_empty())
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.headlines.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
