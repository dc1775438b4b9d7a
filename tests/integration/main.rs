//! Integration tests for the harvester
//!
//! `pipeline_tests` drives the pagination controller with a scripted fetcher;
//! `http_session_tests` uses wiremock to serve catalog pages over HTTP.

mod common;
mod pipeline_tests;
