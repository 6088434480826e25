//! Integration tests for crawlq
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! crawl routine and the worker pool end-to-end.

mod crawl_tests;
mod worker_tests;
