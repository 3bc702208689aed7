//! JSON call scripts.
//!
//! A script is an array of steps executed in order against one ledger.
//! Byte arguments are base64 and are passed to the ledger undecoded in
//! length, so wrong-length values surface as ledger error codes. Integer
//! arguments accept any JSON integer; values the ledger type cannot hold are
//! replaced by one the ledger rejects with the matching code.

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use carelog_core::{CallContext, FeeTransfer, LogSessionRequest, SessionLedger};
use carelog_types::{BlockHeight, LedgerError, Principal, SessionId};

fn base64_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    STANDARD.decode(encoded.as_bytes()).map_err(D::Error::custom)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub caller: Option<Principal>,
    #[serde(default)]
    pub block_height: BlockHeight,
    #[serde(flatten)]
    pub call: Call,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    SetAdminPrincipal {
        new_admin: Principal,
    },
    SetMaxSessions {
        new_max: i128,
    },
    SetLoggingFee {
        fee: u64,
    },
    LogSession {
        #[serde(deserialize_with = "base64_bytes")]
        notes_hash: Vec<u8>,
        duration: i128,
        session_type: String,
        privacy_level: i128,
        #[serde(deserialize_with = "base64_bytes")]
        location_hash: Vec<u8>,
        #[serde(deserialize_with = "base64_bytes")]
        device_id: Vec<u8>,
        #[serde(deserialize_with = "base64_bytes")]
        signature: Vec<u8>,
        therapist: Principal,
    },
    ConfirmSession {
        session_id: SessionId,
        #[serde(deserialize_with = "base64_bytes")]
        confirmation_hash: Vec<u8>,
    },
    UpdateSessionProgress {
        session_id: SessionId,
        milestone: i128,
        #[serde(deserialize_with = "base64_bytes")]
        progress_notes_hash: Vec<u8>,
    },
    VerifySession {
        session_id: SessionId,
        #[serde(deserialize_with = "base64_bytes")]
        provided_hash: Vec<u8>,
    },
    GetSessionCount,
}

/// Zero when out of range; the ledger rejects zero for every argument
/// passed through here.
fn or_zero<T: TryFrom<i128> + Default>(value: i128) -> T {
    T::try_from(value).unwrap_or_default()
}

impl Call {
    fn name(&self) -> &'static str {
        match self {
            Call::SetAdminPrincipal { .. } => "set_admin_principal",
            Call::SetMaxSessions { .. } => "set_max_sessions",
            Call::SetLoggingFee { .. } => "set_logging_fee",
            Call::LogSession { .. } => "log_session",
            Call::ConfirmSession { .. } => "confirm_session",
            Call::UpdateSessionProgress { .. } => "update_session_progress",
            Call::VerifySession { .. } => "verify_session",
            Call::GetSessionCount => "get_session_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Flag(bool),
    Session(SessionId),
    Count(u64),
}

/// One printed result line: `{"ok":true,"value":..}` or `{"ok":false,"error":code}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<u32>,
}

impl From<Result<Value, LedgerError>> for Outcome {
    fn from(result: Result<Value, LedgerError>) -> Self {
        match result {
            Ok(value) => Self {
                ok: true,
                value: Some(value),
                error: None,
            },
            Err(err) => Self {
                ok: false,
                value: None,
                error: Some(err.code()),
            },
        }
    }
}

pub fn parse(json: &str) -> Result<Vec<Step>> {
    serde_json::from_str(json).context("script must be a JSON array of calls")
}

/// Execute every step in order. A ledger rejection is an outcome, not an
/// error; only a malformed step (missing caller) aborts the replay.
pub fn replay<T: FeeTransfer>(
    ledger: &mut SessionLedger<T>,
    steps: &[Step],
) -> Result<Vec<Outcome>> {
    steps
        .iter()
        .enumerate()
        .map(|(index, step)| run_step(ledger, step).with_context(|| format!("step {index}")))
        .collect()
}

fn context(step: &Step) -> Result<CallContext> {
    let caller = step
        .caller
        .clone()
        .ok_or_else(|| anyhow!("{} requires a caller", step.call.name()))?;
    Ok(CallContext::new(caller, step.block_height))
}

fn run_step<T: FeeTransfer>(ledger: &mut SessionLedger<T>, step: &Step) -> Result<Outcome> {
    tracing::debug!(op = step.call.name(), caller = ?step.caller, "Replaying call");

    let result = match &step.call {
        Call::SetAdminPrincipal { new_admin } => ledger
            .set_admin_principal(&context(step)?, new_admin.clone())
            .map(|()| Value::Flag(true)),
        Call::SetMaxSessions { new_max } => ledger
            .set_max_sessions(&context(step)?, or_zero(*new_max))
            .map(|()| Value::Flag(true)),
        Call::SetLoggingFee { fee } => ledger
            .set_logging_fee(&context(step)?, *fee)
            .map(|()| Value::Flag(true)),
        Call::LogSession {
            notes_hash,
            duration,
            session_type,
            privacy_level,
            location_hash,
            device_id,
            signature,
            therapist,
        } => ledger
            .log_session(
                &context(step)?,
                LogSessionRequest {
                    notes_hash,
                    duration: or_zero(*duration),
                    session_type,
                    privacy_level: u32::try_from(*privacy_level).unwrap_or(u32::MAX),
                    location_hash,
                    device_id,
                    signature,
                    therapist,
                },
            )
            .map(Value::Session),
        Call::ConfirmSession {
            session_id,
            confirmation_hash,
        } => ledger
            .confirm_session(&context(step)?, *session_id, confirmation_hash)
            .map(|()| Value::Flag(true)),
        Call::UpdateSessionProgress {
            session_id,
            milestone,
            progress_notes_hash,
        } => ledger
            .update_session_progress(
                &context(step)?,
                *session_id,
                or_zero(*milestone),
                progress_notes_hash,
            )
            .map(|()| Value::Flag(true)),
        Call::VerifySession {
            session_id,
            provided_hash,
        } => ledger
            .verify_session(*session_id, provided_hash)
            .map(|()| Value::Flag(true)),
        Call::GetSessionCount => Ok(Value::Count(ledger.session_count())),
    };
    Ok(Outcome::from(result))
}
