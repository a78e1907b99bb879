//! Data types for the credit session and the remote endpoints.

pub mod session;
pub mod wire;

pub use session::{ReservationRequest, Settlement, UserSession, DEFAULT_CREDITS_ORIGINAL};
pub use wire::{
    DeductRequest, DeductResponse, MirrorForward, ReconcileResponse, SessionStatusResponse,
};
