//! credit-sync - keeps a local view of a user's credit balance in step with
//! the ledger that owns it.
//!
//! The library is organised the same way end to end:
//!
//! - [`traits`] - seams for HTTP, display and billable action sources
//! - [`adapters`] - reqwest, console and channel implementations plus mocks
//! - [`api`] - the ledger and mirror HTTP contracts
//! - [`client`] - [`CreditSyncClient`](client::CreditSyncClient), the state
//!   machine, timer and reservation protocol
//! - [`config`], [`error`], [`models`], [`storage`] - supporting types
//! - [`cost`], [`display`] - pricing and presentation helpers

pub mod adapters;
pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod cost;
pub mod display;
pub mod error;
pub mod models;
pub mod storage;
pub mod traits;
