//! Session data model.
//!
//! Pure domain types with no IO. Range and enumeration invariants are
//! enforced at construction time, and a session's confirmation hash exists
//! only inside the confirmed status, so "hash set iff confirmed" cannot be
//! violated.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bytes::{DeviceId, Digest32, Signature};
use crate::error::LedgerError;
use crate::ids::{BlockHeight, Principal};

// ── Value types ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Individual,
    Group,
    Online,
}

impl SessionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Group => "group",
            Self::Online => "online",
        }
    }
}

impl FromStr for SessionType {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "individual" => Ok(Self::Individual),
            "group" => Ok(Self::Group),
            "online" => Ok(Self::Online),
            _ => Err(LedgerError::InvalidSessionType),
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session length in minutes, `1..=360`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SessionMinutes(u16);

impl SessionMinutes {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 360;

    pub fn new(minutes: u32) -> Result<Self, LedgerError> {
        if (Self::MIN..=Self::MAX).contains(&minutes) {
            Ok(Self(minutes as u16))
        } else {
            Err(LedgerError::InvalidDuration)
        }
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0 as u32
    }
}

impl TryFrom<u32> for SessionMinutes {
    type Error = LedgerError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionMinutes> for u32 {
    fn from(value: SessionMinutes) -> Self {
        value.get()
    }
}

/// Privacy level, `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PrivacyLevel(u8);

impl PrivacyLevel {
    pub const MAX: u8 = 5;

    pub fn new(level: u8) -> Result<Self, LedgerError> {
        if level <= Self::MAX {
            Ok(Self(level))
        } else {
            Err(LedgerError::InvalidPrivacyLevel)
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PrivacyLevel {
    type Error = LedgerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PrivacyLevel> for u8 {
    fn from(value: PrivacyLevel) -> Self {
        value.0
    }
}

/// Positive progress marker. Zero is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Milestone(NonZeroU64);

impl Milestone {
    pub fn new(value: u64) -> Result<Self, LedgerError> {
        NonZeroU64::new(value)
            .map(Self)
            .ok_or(LedgerError::InvalidProgressMilestone)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

// ── Status ───────────────────────────────────────────────────

/// Confirmation state. Moves `Pending -> Confirmed` once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Confirmed { confirmation_hash: Digest32 },
}

impl SessionStatus {
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    #[must_use]
    pub const fn confirmation_hash(&self) -> Option<&Digest32> {
        match self {
            Self::Pending => None,
            Self::Confirmed { confirmation_hash } => Some(confirmation_hash),
        }
    }
}

// ── Session ──────────────────────────────────────────────────

/// Validated payload of a new session, as supplied by the patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTerms {
    pub notes_hash: Digest32,
    pub duration: SessionMinutes,
    pub session_type: SessionType,
    pub privacy_level: PrivacyLevel,
    pub location_hash: Digest32,
    pub device_id: DeviceId,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    patient: Principal,
    therapist: Principal,
    notes_hash: Digest32,
    timestamp: BlockHeight,
    duration: SessionMinutes,
    session_type: SessionType,
    privacy_level: PrivacyLevel,
    location_hash: Digest32,
    device_id: DeviceId,
    signature: Signature,
    status: SessionStatus,
}

impl Session {
    /// A freshly logged, unconfirmed session.
    #[must_use]
    pub fn pending(
        patient: Principal,
        therapist: Principal,
        terms: SessionTerms,
        timestamp: BlockHeight,
    ) -> Self {
        let SessionTerms {
            notes_hash,
            duration,
            session_type,
            privacy_level,
            location_hash,
            device_id,
            signature,
        } = terms;
        Self {
            patient,
            therapist,
            notes_hash,
            timestamp,
            duration,
            session_type,
            privacy_level,
            location_hash,
            device_id,
            signature,
            status: SessionStatus::Pending,
        }
    }

    /// Record the therapist's confirmation.
    ///
    /// Fails with `InvalidStatus` if the session is already confirmed; the
    /// stored confirmation hash is never replaced.
    pub fn confirm(&mut self, confirmation_hash: Digest32) -> Result<(), LedgerError> {
        if self.status.is_confirmed() {
            return Err(LedgerError::InvalidStatus);
        }
        self.status = SessionStatus::Confirmed { confirmation_hash };
        Ok(())
    }

    #[must_use]
    pub fn patient(&self) -> &Principal {
        &self.patient
    }

    #[must_use]
    pub fn therapist(&self) -> &Principal {
        &self.therapist
    }

    /// Whether `who` is the patient or therapist of record.
    #[must_use]
    pub fn is_party(&self, who: &Principal) -> bool {
        self.patient == *who || self.therapist == *who
    }

    #[must_use]
    pub fn notes_hash(&self) -> &Digest32 {
        &self.notes_hash
    }

    #[must_use]
    pub fn timestamp(&self) -> BlockHeight {
        self.timestamp
    }

    #[must_use]
    pub fn duration(&self) -> SessionMinutes {
        self.duration
    }

    #[must_use]
    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    #[must_use]
    pub fn privacy_level(&self) -> PrivacyLevel {
        self.privacy_level
    }

    #[must_use]
    pub fn location_hash(&self) -> &Digest32 {
        &self.location_hash
    }

    #[must_use]
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    #[must_use]
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status.is_confirmed()
    }
}

/// Latest progress marker for a confirmed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub milestone: Milestone,
    pub progress_notes_hash: Digest32,
    pub update_timestamp: BlockHeight,
}
