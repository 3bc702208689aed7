//! Resolved ledger configuration.
//!
//! Raw TOML deserialization structs stay private; the parse boundary
//! resolves them into [`LedgerSettings`]. Existence of a value is the proof
//! of its validity.

use std::num::{NonZeroU64, NonZeroUsize};

use serde::Deserialize;

use crate::ids::Principal;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("admin principal must not be empty")]
    EmptyAdmin,
    #[error("max_sessions must be positive")]
    ZeroMaxSessions,
    #[error("party_index_cap must be positive")]
    ZeroPartyIndexCap,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLedgerSettings {
    admin: String,
    #[serde(default = "default_max_sessions")]
    max_sessions: u64,
    #[serde(default = "default_logging_fee")]
    logging_fee: u64,
    #[serde(default = "default_party_index_cap")]
    party_index_cap: usize,
}

const fn default_max_sessions() -> u64 {
    LedgerSettings::DEFAULT_MAX_SESSIONS
}

const fn default_logging_fee() -> u64 {
    LedgerSettings::DEFAULT_LOGGING_FEE
}

const fn default_party_index_cap() -> usize {
    LedgerSettings::DEFAULT_PARTY_INDEX_CAP
}

/// Initial state for a fresh ledger.
///
/// Invariant: `admin` is non-empty, `max_sessions` and `party_index_cap`
/// are positive (enforced via `#[serde(try_from)]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawLedgerSettings")]
pub struct LedgerSettings {
    admin: Principal,
    max_sessions: NonZeroU64,
    logging_fee: u64,
    party_index_cap: NonZeroUsize,
}

impl TryFrom<RawLedgerSettings> for LedgerSettings {
    type Error = SettingsError;

    fn try_from(raw: RawLedgerSettings) -> Result<Self, Self::Error> {
        Self::new(
            Principal::new(raw.admin),
            raw.max_sessions,
            raw.logging_fee,
            raw.party_index_cap,
        )
    }
}

impl LedgerSettings {
    pub const DEFAULT_MAX_SESSIONS: u64 = 10_000;
    pub const DEFAULT_LOGGING_FEE: u64 = 100;
    pub const DEFAULT_PARTY_INDEX_CAP: usize = 100;

    pub fn new(
        admin: Principal,
        max_sessions: u64,
        logging_fee: u64,
        party_index_cap: usize,
    ) -> Result<Self, SettingsError> {
        if admin.as_str().trim().is_empty() {
            return Err(SettingsError::EmptyAdmin);
        }
        Ok(Self {
            admin,
            max_sessions: NonZeroU64::new(max_sessions).ok_or(SettingsError::ZeroMaxSessions)?,
            logging_fee,
            party_index_cap: NonZeroUsize::new(party_index_cap)
                .ok_or(SettingsError::ZeroPartyIndexCap)?,
        })
    }

    /// Defaults for everything but the admin, which has no sensible default.
    pub fn with_admin(admin: impl Into<Principal>) -> Result<Self, SettingsError> {
        Self::new(
            admin.into(),
            Self::DEFAULT_MAX_SESSIONS,
            Self::DEFAULT_LOGGING_FEE,
            Self::DEFAULT_PARTY_INDEX_CAP,
        )
    }

    #[must_use]
    pub fn admin(&self) -> &Principal {
        &self.admin
    }

    #[must_use]
    pub fn max_sessions(&self) -> NonZeroU64 {
        self.max_sessions
    }

    #[must_use]
    pub fn logging_fee(&self) -> u64 {
        self.logging_fee
    }

    #[must_use]
    pub fn party_index_cap(&self) -> NonZeroUsize {
        self.party_index_cap
    }

    #[must_use]
    pub fn set_admin(mut self, admin: Principal) -> Self {
        self.admin = admin;
        self
    }

    #[must_use]
    pub fn set_max_sessions(mut self, max_sessions: NonZeroU64) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    #[must_use]
    pub fn set_logging_fee(mut self, fee: u64) -> Self {
        self.logging_fee = fee;
        self
    }

    #[must_use]
    pub fn set_party_index_cap(mut self, cap: NonZeroUsize) -> Self {
        self.party_index_cap = cap;
        self
    }
}
