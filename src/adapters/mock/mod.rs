//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable and scripted responses
//! - [`RecordingDisplaySink`] - Display sink that records every update

pub mod display;
pub mod http;

pub use display::RecordingDisplaySink;
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
