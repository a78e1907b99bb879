//! Mock implementations for test fixtures.
//!
//! Re-exports the doubles from `credit_sync::adapters::mock` and adds small
//! constructors for the responses the tests script.

pub use credit_sync::adapters::mock::{MockHttpClient, MockResponse, RecordingDisplaySink};
pub use credit_sync::traits::{HttpError, Response};

use serde_json::Value;

/// A JSON response with the given status.
pub fn json_response(status: u16, body: Value) -> MockResponse {
    MockResponse::json(status, body)
}

/// A connection failure.
pub fn connection_refused() -> MockResponse {
    MockResponse::Error(HttpError::ConnectionFailed("connection refused".to_string()))
}

/// A plain-text server error that does not parse as a ledger response.
pub fn server_error(status: u16) -> MockResponse {
    MockResponse::Success(Response::new(status, bytes::Bytes::from("upstream unavailable")))
}
