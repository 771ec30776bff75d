//! Integration tests for the scraper
//!
//! `http_tests` runs the full stack against wiremock servers; the scheduler
//! tests drive the engine with a scripted in-memory page source.

mod http_tests;
mod scheduler_tests;
mod support;
