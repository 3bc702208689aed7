//! Session ledger for Carelog.
//!
//! A single authoritative state container: patients log sessions with a
//! therapist, therapists confirm them, either party records progress, and
//! anyone can verify a confirmed session's notes hash.
//!
//! Calls are evaluated strictly one at a time by the host; the ledger has no
//! locking of its own.

mod context;
mod ledger;
mod transfer;


pub use context::CallContext;
pub use ledger::{LogSessionRequest, SessionLedger};
pub use transfer::{FeeTransfer, TransferLog, TransferRecord};
