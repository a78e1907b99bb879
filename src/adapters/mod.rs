//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`ChannelActionSource`] / [`ActionTrigger`] - billable actions over a channel
//! - [`ConsoleDisplaySink`] / [`TracingDisplaySink`] - headless display sinks
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable HTTP responses
//! - [`mock::RecordingDisplaySink`] - Records balance updates

pub mod channel_action;
pub mod console_sink;
pub mod mock;
pub mod reqwest_http;

pub use channel_action::{ActionTrigger, ChannelActionSource};
pub use console_sink::{ConsoleDisplaySink, TracingDisplaySink};
pub use mock::{MockHttpClient, RecordingDisplaySink};
pub use reqwest_http::ReqwestHttpClient;
