//! End-to-end ledger scenarios

use carelog_core::{FeeTransfer, SessionLedger, TransferRecord};
use carelog_types::{LedgerError, LedgerSettings, Principal, SessionId};

use crate::common::{
    ADMIN, CONFIRMATION, NOTES, PATIENT, PROGRESS_NOTES, THERAPIST, call, fresh_ledger,
    valid_request,
};

#[test]
fn fee_change_then_log_records_transfer() {
    let mut ledger = fresh_ledger();
    let therapist = Principal::from(THERAPIST);

    ledger.set_logging_fee(&call(ADMIN, 1), 200).unwrap();
    let id = ledger
        .log_session(&call(PATIENT, 2), valid_request(&therapist))
        .unwrap();

    assert_eq!(id, SessionId::new(0));
    assert_eq!(
        ledger.transfers().records(),
        &[TransferRecord {
            amount: 200,
            from: Principal::from(PATIENT),
            to: Principal::from(ADMIN),
        }]
    );
    let session = ledger.session(id).unwrap();
    assert!(!session.is_confirmed());
    assert_eq!(session.timestamp().value(), 2);
}

#[test]
fn therapist_confirmation_sets_status_and_hash() {
    let mut ledger = fresh_ledger();
    let therapist = Principal::from(THERAPIST);
    let id = ledger
        .log_session(&call(PATIENT, 1), valid_request(&therapist))
        .unwrap();

    ledger
        .confirm_session(&call(THERAPIST, 2), id, &CONFIRMATION)
        .unwrap();

    let status = ledger.session(id).unwrap().status();
    assert!(status.is_confirmed());
    assert_eq!(status.confirmation_hash().unwrap().as_bytes(), &CONFIRMATION);
    assert_eq!(
        ledger.confirm_session(&call(THERAPIST, 3), id, &CONFIRMATION),
        Err(LedgerError::InvalidStatus)
    );
}

#[test]
fn capacity_of_one_blocks_second_session() {
    let mut ledger = fresh_ledger();
    let therapist = Principal::from(THERAPIST);
    ledger.set_max_sessions(&call(ADMIN, 1), 1).unwrap();

    ledger
        .log_session(&call(PATIENT, 2), valid_request(&therapist))
        .unwrap();
    let second = ledger.log_session(&call(PATIENT, 3), valid_request(&therapist));

    assert_eq!(second, Err(LedgerError::MaxSessionsExceeded));
    assert_eq!(ledger.session_count(), 1);
    assert!(ledger.session(SessionId::new(1)).is_none());
    assert_eq!(ledger.transfers().records().len(), 1);
}

#[test]
fn full_lifecycle_verifies_and_tracks_progress() {
    let mut ledger = fresh_ledger();
    let therapist = Principal::from(THERAPIST);
    let id = ledger
        .log_session(&call(PATIENT, 1), valid_request(&therapist))
        .unwrap();

    assert_eq!(
        ledger.verify_session(id, &NOTES),
        Err(LedgerError::ConfirmationMismatch)
    );
    ledger
        .confirm_session(&call(THERAPIST, 2), id, &CONFIRMATION)
        .unwrap();
    ledger.verify_session(id, &NOTES).unwrap();

    ledger
        .update_session_progress(&call(PATIENT, 3), id, 1, &PROGRESS_NOTES)
        .unwrap();
    ledger
        .update_session_progress(&call(THERAPIST, 4), id, 2, &PROGRESS_NOTES)
        .unwrap();

    let latest = ledger.progress(id).unwrap();
    assert_eq!(latest.milestone.get(), 2);
    assert_eq!(latest.update_timestamp.value(), 4);
    assert_eq!(ledger.progress_history(id).len(), 2);
}

#[test]
fn ids_are_dense_across_parties() {
    let mut ledger = fresh_ledger();
    let therapists: Vec<Principal> = (0..4).map(|n| Principal::new(format!("ST{n}T"))).collect();

    for (expected, therapist) in therapists.iter().enumerate() {
        let id = ledger
            .log_session(&call(PATIENT, 10), valid_request(therapist))
            .unwrap();
        assert_eq!(id.value(), expected as u64);
    }
    assert_eq!(ledger.session_count(), 4);
    assert_eq!(ledger.sessions_by_patient(&Principal::from(PATIENT)).len(), 4);
    assert_eq!(
        ledger.sessions_by_therapist(&therapists[2]),
        &[SessionId::new(2)]
    );
}

/// Counts charges without keeping records.
#[derive(Default)]
struct Tally {
    calls: usize,
    total: u64,
}

impl FeeTransfer for Tally {
    fn transfer(&mut self, amount: u64, _from: &Principal, _to: &Principal) {
        self.calls += 1;
        self.total += amount;
    }
}

#[test]
fn custom_transfer_sink_is_charged_once_per_session() {
    let settings = LedgerSettings::with_admin(ADMIN).unwrap();
    let mut tally = Tally::default();
    {
        let mut ledger = SessionLedger::new(settings, &mut tally);
        let therapist = Principal::from(THERAPIST);
        ledger
            .log_session(&call(PATIENT, 1), valid_request(&therapist))
            .unwrap();
        let mut bad = valid_request(&therapist);
        bad.duration = 0;
        assert_eq!(
            ledger.log_session(&call(PATIENT, 2), bad),
            Err(LedgerError::InvalidDuration)
        );
        ledger
            .log_session(&call(PATIENT, 3), valid_request(&therapist))
            .unwrap();
    }
    assert_eq!(tally.calls, 2);
    assert_eq!(tally.total, 200);
}
