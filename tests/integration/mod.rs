//! Integration tests for graph-batch
//!
//! These tests run the reqwest transport and the batch client against a local wiremock
//! server standing in for the `$batch` endpoint.

pub mod client_tests;
pub mod config_tests;
pub mod transport_tests;
