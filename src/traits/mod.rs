//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST)
//! - [`DisplaySink`] - Receiver of balance updates
//! - [`ActionSource`] - Producer of billable action events

pub mod action;
pub mod display;
pub mod http;

pub use action::{ActionReply, ActionSource, ActionStream, BillableAction};
pub use display::{DisplaySink, NullDisplaySink};
pub use http::{Headers, HttpClient, HttpError, Response};
