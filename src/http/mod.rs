//! HTTP client module
//!
//! Transport for the remote catalog source.
//!
//! # Features
//!
//! - **Credential Injection**: Static query parameters (API key, locale) on every request
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Error Classification**: Timeouts and connection failures become transport
//!   errors, non-2xx statuses become protocol errors
//! - **Bounded Retries**: Off by default; pagination never retries on its own

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
