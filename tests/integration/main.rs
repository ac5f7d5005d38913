//! Integration tests for the ads counter service

mod common;
mod http_tests;
mod lifecycle_tests;
mod metrics_tests;
