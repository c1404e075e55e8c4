//! Web page scraping.

mod client;
mod extract;

pub use client::{normalize_url, WebScraper};
pub use extract::html_to_text;
