//! Core domain types for Carelog.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod bytes;
mod error;
mod ids;
mod session;
mod settings;

pub use bytes::{DeviceId, Digest32, LengthMismatch, Signature};
pub use error::{LedgerError, UnknownErrorCode};
pub use ids::{BlockHeight, Principal, SessionId};
pub use session::{
    Milestone, PrivacyLevel, Session, SessionMinutes, SessionProgress, SessionStatus,
    SessionTerms, SessionType,
};
pub use settings::{LedgerSettings, SettingsError};
