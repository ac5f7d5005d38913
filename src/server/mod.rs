//! HTTP facade
//!
//! Read-only endpoint reporting the current ads count.

mod http;

pub use http::{build_router, HttpServer};
