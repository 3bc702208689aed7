//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use carelog_core::{CallContext, LogSessionRequest, SessionLedger};
use carelog_types::{BlockHeight, LedgerSettings, Principal};

pub const ADMIN: &str = "ST1ADMIN";
pub const PATIENT: &str = "ST1PATIENT";
pub const THERAPIST: &str = "ST2THERAPIST";

pub static NOTES: [u8; 32] = [0x11; 32];
pub static LOCATION: [u8; 32] = [0x22; 32];
pub static DEVICE: [u8; 32] = [0x33; 32];
pub static SIGNATURE: [u8; 65] = [0x44; 65];
pub static CONFIRMATION: [u8; 32] = [0x55; 32];
pub static PROGRESS_NOTES: [u8; 32] = [0x66; 32];

/// Ledger with default settings and `ADMIN` as admin.
pub fn fresh_ledger() -> SessionLedger {
    SessionLedger::with_transfer_log(LedgerSettings::with_admin(ADMIN).unwrap())
}

pub fn call(caller: &str, height: u64) -> CallContext {
    CallContext::new(caller, BlockHeight::new(height))
}

/// A request that passes every validation step.
pub fn valid_request(therapist: &Principal) -> LogSessionRequest<'_> {
    LogSessionRequest {
        notes_hash: &NOTES,
        duration: 60,
        session_type: "individual",
        privacy_level: 3,
        location_hash: &LOCATION,
        device_id: &DEVICE,
        signature: &SIGNATURE,
        therapist,
    }
}

pub fn b64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// JSON step for a valid `log_session` call.
pub fn log_step(caller: &str, therapist: &str, height: u64) -> serde_json::Value {
    serde_json::json!({
        "op": "log_session",
        "caller": caller,
        "block_height": height,
        "notes_hash": b64(&NOTES),
        "duration": 60,
        "session_type": "individual",
        "privacy_level": 3,
        "location_hash": b64(&LOCATION),
        "device_id": b64(&DEVICE),
        "signature": b64(&SIGNATURE),
        "therapist": therapist,
    })
}
