//! Remote APIs used by the front end

pub mod client;

pub use client::BrowserQuoteSource;
