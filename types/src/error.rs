//! Ledger error taxonomy.
//!
//! The numeric code is the contract; callers match on [`LedgerError::code`].
//! `Display` text exists for logs and is not stable.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[repr(u32)]
pub enum LedgerError {
    #[error("caller is not authorized for this operation")]
    NotAuthorized = 100,
    #[error("invalid session id")]
    InvalidSessionId = 101,
    #[error("hash must be exactly 32 bytes")]
    InvalidHash = 102,
    #[error("invalid timestamp")]
    InvalidTimestamp = 103,
    #[error("invalid patient")]
    InvalidPatient = 104,
    #[error("invalid therapist")]
    InvalidTherapist = 105,
    #[error("session already exists")]
    SessionAlreadyExists = 106,
    #[error("session not found")]
    SessionNotFound = 107,
    #[error("duration must be between 1 and 360 minutes")]
    InvalidDuration = 108,
    #[error("session is not in the required status")]
    InvalidStatus = 109,
    #[error("invalid notes hash")]
    InvalidNotesHash = 110,
    #[error("invalid confirmation hash")]
    InvalidConfirmationHash = 111,
    #[error("session is unconfirmed or the provided hash does not match")]
    ConfirmationMismatch = 112,
    #[error("session expired")]
    SessionExpired = 113,
    #[error("progress milestone must be positive")]
    InvalidProgressMilestone = 114,
    #[error("session capacity exceeded")]
    MaxSessionsExceeded = 115,
    #[error("session type must be individual, group or online")]
    InvalidSessionType = 116,
    #[error("privacy level must be between 0 and 5")]
    InvalidPrivacyLevel = 117,
    #[error("location hash must be exactly 32 bytes")]
    InvalidLocationHash = 118,
    #[error("device id must be exactly 32 bytes")]
    InvalidDeviceId = 119,
    #[error("signature must be exactly 65 bytes")]
    InvalidSignature = 120,
}

impl LedgerError {
    /// Every variant, in code order.
    pub const ALL: [LedgerError; 21] = [
        Self::NotAuthorized,
        Self::InvalidSessionId,
        Self::InvalidHash,
        Self::InvalidTimestamp,
        Self::InvalidPatient,
        Self::InvalidTherapist,
        Self::SessionAlreadyExists,
        Self::SessionNotFound,
        Self::InvalidDuration,
        Self::InvalidStatus,
        Self::InvalidNotesHash,
        Self::InvalidConfirmationHash,
        Self::ConfirmationMismatch,
        Self::SessionExpired,
        Self::InvalidProgressMilestone,
        Self::MaxSessionsExceeded,
        Self::InvalidSessionType,
        Self::InvalidPrivacyLevel,
        Self::InvalidLocationHash,
        Self::InvalidDeviceId,
        Self::InvalidSignature,
    ];

    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Reserved codes are part of the taxonomy but never produced by the ledger.
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        matches!(
            self,
            Self::InvalidSessionId
                | Self::InvalidTimestamp
                | Self::InvalidPatient
                | Self::InvalidTherapist
                | Self::SessionAlreadyExists
                | Self::InvalidNotesHash
                | Self::InvalidConfirmationHash
                | Self::SessionExpired
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown ledger error code {0}")]
pub struct UnknownErrorCode(pub u32);

impl TryFrom<u32> for LedgerError {
    type Error = UnknownErrorCode;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|err| err.code() == code)
            .ok_or(UnknownErrorCode(code))
    }
}

impl From<LedgerError> for u32 {
    fn from(err: LedgerError) -> Self {
        err.code()
    }
}
