//! Session ledger state machine.
//!
//! Single authority over sessions, per-party indexes, progress records and
//! admin configuration. Every mutating call validates completely before it
//! touches state, so a rejected call is a no-op.

use std::collections::HashMap;
use std::num::NonZeroU64;

use carelog_types::{
    DeviceId, Digest32, LedgerError, LedgerSettings, Milestone, Principal, PrivacyLevel, Session,
    SessionId, SessionMinutes, SessionProgress, SessionTerms, SessionType, Signature,
};

use crate::context::CallContext;
use crate::transfer::{FeeTransfer, TransferLog};

/// Raw arguments of a `log_session` call, exactly as the patient supplied them.
///
/// Nothing here is validated yet; [`SessionLedger::log_session`] converts
/// each field in a fixed order and the first failure wins.
#[derive(Debug, Clone, Copy)]
pub struct LogSessionRequest<'a> {
    pub notes_hash: &'a [u8],
    pub duration: u32,
    pub session_type: &'a str,
    pub privacy_level: u32,
    pub location_hash: &'a [u8],
    pub device_id: &'a [u8],
    pub signature: &'a [u8],
    pub therapist: &'a Principal,
}

impl LogSessionRequest<'_> {
    fn validate(&self) -> Result<SessionTerms, LedgerError> {
        let notes_hash =
            Digest32::try_from(self.notes_hash).map_err(|_| LedgerError::InvalidHash)?;
        let duration = SessionMinutes::new(self.duration)?;
        let session_type = self.session_type.parse::<SessionType>()?;
        let privacy_level = u8::try_from(self.privacy_level)
            .map_err(|_| LedgerError::InvalidPrivacyLevel)
            .and_then(PrivacyLevel::new)?;
        let location_hash =
            Digest32::try_from(self.location_hash).map_err(|_| LedgerError::InvalidLocationHash)?;
        let device_id =
            DeviceId::try_from(self.device_id).map_err(|_| LedgerError::InvalidDeviceId)?;
        let signature =
            Signature::try_from(self.signature).map_err(|_| LedgerError::InvalidSignature)?;
        Ok(SessionTerms {
            notes_hash,
            duration,
            session_type,
            privacy_level,
            location_hash,
            device_id,
            signature,
        })
    }
}

/// Owns every session, the per-party indexes, progress history and admin
/// settings, and charges logging fees through `T`.
pub struct SessionLedger<T = TransferLog> {
    settings: LedgerSettings,
    /// Indexed by `SessionId`; ids are dense, so the next id is `len()`.
    sessions: Vec<Session>,
    by_patient: HashMap<Principal, Vec<SessionId>>,
    by_therapist: HashMap<Principal, Vec<SessionId>>,
    /// Accepted progress updates per session, oldest first.
    progress: HashMap<SessionId, Vec<SessionProgress>>,
    transfers: T,
}

impl SessionLedger<TransferLog> {
    #[must_use]
    pub fn with_transfer_log(settings: LedgerSettings) -> Self {
        Self::new(settings, TransferLog::new())
    }
}

impl<T: FeeTransfer> SessionLedger<T> {
    pub fn new(settings: LedgerSettings, transfers: T) -> Self {
        Self {
            settings,
            sessions: Vec::new(),
            by_patient: HashMap::new(),
            by_therapist: HashMap::new(),
            progress: HashMap::new(),
            transfers,
        }
    }

    // ── Admin ────────────────────────────────────────────────

    pub fn set_admin_principal(
        &mut self,
        ctx: &CallContext,
        new_admin: Principal,
    ) -> Result<(), LedgerError> {
        self.require_admin(ctx)
            .inspect_err(|err| rejected("set_admin_principal", ctx, *err))?;
        tracing::info!(
            previous = %self.settings.admin(),
            admin = %new_admin,
            "Admin principal replaced"
        );
        self.settings = self.settings.clone().set_admin(new_admin);
        Ok(())
    }

    /// Fails with `MaxSessionsExceeded` for a zero capacity.
    pub fn set_max_sessions(&mut self, ctx: &CallContext, new_max: u64) -> Result<(), LedgerError> {
        self.require_admin(ctx)
            .and_then(|()| NonZeroU64::new(new_max).ok_or(LedgerError::MaxSessionsExceeded))
            .map(|max| {
                self.settings = self.settings.clone().set_max_sessions(max);
                tracing::info!(max_sessions = max.get(), "Session capacity updated");
            })
            .inspect_err(|err| rejected("set_max_sessions", ctx, *err))
    }

    pub fn set_logging_fee(&mut self, ctx: &CallContext, new_fee: u64) -> Result<(), LedgerError> {
        self.require_admin(ctx)
            .inspect_err(|err| rejected("set_logging_fee", ctx, *err))?;
        self.settings = self.settings.clone().set_logging_fee(new_fee);
        tracing::info!(fee = new_fee, "Logging fee updated");
        Ok(())
    }

    fn require_admin(&self, ctx: &CallContext) -> Result<(), LedgerError> {
        if ctx.caller() == self.settings.admin() {
            Ok(())
        } else {
            Err(LedgerError::NotAuthorized)
        }
    }

    // ── Sessions ─────────────────────────────────────────────

    /// Register a session with the caller as patient.
    ///
    /// Checks, in order: capacity, notes hash, duration, session type,
    /// privacy level, location hash, device id, signature, self-dealing,
    /// then the per-party index caps. The fee is charged only once every
    /// check has passed.
    pub fn log_session(
        &mut self,
        ctx: &CallContext,
        request: LogSessionRequest<'_>,
    ) -> Result<SessionId, LedgerError> {
        self.try_log_session(ctx, request)
            .inspect_err(|err| rejected("log_session", ctx, *err))
    }

    fn try_log_session(
        &mut self,
        ctx: &CallContext,
        request: LogSessionRequest<'_>,
    ) -> Result<SessionId, LedgerError> {
        if self.session_count() >= self.settings.max_sessions().get() {
            return Err(LedgerError::MaxSessionsExceeded);
        }
        let terms = request.validate()?;
        let patient = ctx.caller();
        let therapist = request.therapist;
        if therapist == patient {
            return Err(LedgerError::NotAuthorized);
        }
        let cap = self.settings.party_index_cap().get();
        if self.sessions_by_patient(patient).len() >= cap
            || self.sessions_by_therapist(therapist).len() >= cap
        {
            return Err(LedgerError::MaxSessionsExceeded);
        }

        let fee = self.settings.logging_fee();
        self.transfers.transfer(fee, patient, self.settings.admin());

        let id = self.next_session_id();
        self.sessions.push(Session::pending(
            patient.clone(),
            therapist.clone(),
            terms,
            ctx.block_height(),
        ));
        self.by_patient.entry(patient.clone()).or_default().push(id);
        self.by_therapist
            .entry(therapist.clone())
            .or_default()
            .push(id);

        tracing::info!(
            session_id = %id,
            patient = %patient,
            therapist = %therapist,
            fee,
            block_height = %ctx.block_height(),
            "Session logged"
        );
        Ok(id)
    }

    /// The recorded therapist attests that the session took place.
    pub fn confirm_session(
        &mut self,
        ctx: &CallContext,
        id: SessionId,
        confirmation_hash: &[u8],
    ) -> Result<(), LedgerError> {
        self.try_confirm_session(ctx, id, confirmation_hash)
            .inspect_err(|err| rejected("confirm_session", ctx, *err))
    }

    fn try_confirm_session(
        &mut self,
        ctx: &CallContext,
        id: SessionId,
        confirmation_hash: &[u8],
    ) -> Result<(), LedgerError> {
        let session = self.session_mut(id)?;
        if session.therapist() != ctx.caller() {
            return Err(LedgerError::NotAuthorized);
        }
        if session.is_confirmed() {
            return Err(LedgerError::InvalidStatus);
        }
        let hash = Digest32::try_from(confirmation_hash).map_err(|_| LedgerError::InvalidHash)?;
        session.confirm(hash)?;
        tracing::info!(session_id = %id, therapist = %ctx.caller(), "Session confirmed");
        Ok(())
    }

    /// Replace the progress marker of a confirmed session.
    ///
    /// Either party may update. The previous marker stays in
    /// [`progress_history`](Self::progress_history).
    pub fn update_session_progress(
        &mut self,
        ctx: &CallContext,
        id: SessionId,
        milestone: u64,
        progress_notes_hash: &[u8],
    ) -> Result<(), LedgerError> {
        self.try_update_session_progress(ctx, id, milestone, progress_notes_hash)
            .inspect_err(|err| rejected("update_session_progress", ctx, *err))
    }

    fn try_update_session_progress(
        &mut self,
        ctx: &CallContext,
        id: SessionId,
        milestone: u64,
        progress_notes_hash: &[u8],
    ) -> Result<(), LedgerError> {
        let session = self.session(id).ok_or(LedgerError::SessionNotFound)?;
        if !session.is_party(ctx.caller()) {
            return Err(LedgerError::NotAuthorized);
        }
        if !session.is_confirmed() {
            return Err(LedgerError::InvalidStatus);
        }
        let milestone = Milestone::new(milestone)?;
        let progress_notes_hash =
            Digest32::try_from(progress_notes_hash).map_err(|_| LedgerError::InvalidHash)?;

        self.progress.entry(id).or_default().push(SessionProgress {
            milestone,
            progress_notes_hash,
            update_timestamp: ctx.block_height(),
        });
        tracing::info!(
            session_id = %id,
            caller = %ctx.caller(),
            milestone = milestone.get(),
            "Session progress updated"
        );
        Ok(())
    }

    /// Succeeds iff the session is confirmed and `provided_hash` equals the
    /// stored notes hash. Unconfirmed and mismatched both report
    /// `ConfirmationMismatch`.
    pub fn verify_session(&self, id: SessionId, provided_hash: &[u8]) -> Result<(), LedgerError> {
        let session = self.session(id).ok_or(LedgerError::SessionNotFound)?;
        if session.is_confirmed() && session.notes_hash().matches(provided_hash) {
            Ok(())
        } else {
            Err(LedgerError::ConfirmationMismatch)
        }
    }

    /// Total sessions ever created. Sessions are never deleted.
    #[must_use]
    pub fn session_count(&self) -> u64 {
        self.sessions.len() as u64
    }

    // ── Reads ────────────────────────────────────────────────

    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<&Session> {
        usize::try_from(id.value())
            .ok()
            .and_then(|index| self.sessions.get(index))
    }

    fn session_mut(&mut self, id: SessionId) -> Result<&mut Session, LedgerError> {
        usize::try_from(id.value())
            .ok()
            .and_then(|index| self.sessions.get_mut(index))
            .ok_or(LedgerError::SessionNotFound)
    }

    fn next_session_id(&self) -> SessionId {
        SessionId::new(self.session_count())
    }

    /// Sessions where `patient` is the patient, in creation order.
    #[must_use]
    pub fn sessions_by_patient(&self, patient: &Principal) -> &[SessionId] {
        self.by_patient.get(patient).map(Vec::as_slice).unwrap_or_default()
    }

    /// Sessions assigned to `therapist`, in creation order.
    #[must_use]
    pub fn sessions_by_therapist(&self, therapist: &Principal) -> &[SessionId] {
        self.by_therapist.get(therapist).map(Vec::as_slice).unwrap_or_default()
    }

    /// Latest progress marker, if any update has been accepted.
    #[must_use]
    pub fn progress(&self, id: SessionId) -> Option<&SessionProgress> {
        self.progress_history(id).last()
    }

    #[must_use]
    pub fn progress_history(&self, id: SessionId) -> &[SessionProgress] {
        self.progress.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn admin(&self) -> &Principal {
        self.settings.admin()
    }

    #[must_use]
    pub fn max_sessions(&self) -> u64 {
        self.settings.max_sessions().get()
    }

    #[must_use]
    pub fn logging_fee(&self) -> u64 {
        self.settings.logging_fee()
    }

    #[must_use]
    pub fn transfers(&self) -> &T {
        &self.transfers
    }
}

fn rejected(op: &'static str, ctx: &CallContext, err: LedgerError) {
    tracing::debug!(
        op,
        caller = %ctx.caller(),
        code = err.code(),
        error = %err,
        "Ledger call rejected"
    );
}
