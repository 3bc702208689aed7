//! Ledgers built from config files

use std::fs;

use carelog_config::{CarelogConfig, ConfigError};
use carelog_core::SessionLedger;
use carelog_types::{LedgerError, Principal};
use tempfile::tempdir;

use crate::common::{PATIENT, THERAPIST, call, valid_request};

#[test]
fn config_file_drives_ledger_limits() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[ledger]\nadmin = \"ST9ADMIN\"\nmax_sessions = 2\nlogging_fee = 0\n",
    )
    .unwrap();

    let config = CarelogConfig::load_from(&path).unwrap().unwrap();
    let mut ledger = SessionLedger::with_transfer_log(config.ledger_settings(None).unwrap());
    let therapist = Principal::from(THERAPIST);

    for height in 0..2 {
        ledger
            .log_session(&call(PATIENT, height), valid_request(&therapist))
            .unwrap();
    }
    assert_eq!(
        ledger.log_session(&call(PATIENT, 9), valid_request(&therapist)),
        Err(LedgerError::MaxSessionsExceeded)
    );

    let records = ledger.transfers().records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record.amount == 0));
    assert_eq!(ledger.transfers().total_to(&Principal::from("ST9ADMIN")), 0);
}

#[test]
fn configured_admin_gates_setters() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[ledger]\nadmin = \"ST9ADMIN\"\n").unwrap();

    let config = CarelogConfig::load_from(&path).unwrap().unwrap();
    let mut ledger = SessionLedger::with_transfer_log(config.ledger_settings(None).unwrap());

    assert_eq!(
        ledger.set_logging_fee(&call(PATIENT, 1), 5),
        Err(LedgerError::NotAuthorized)
    );
    ledger.set_logging_fee(&call("ST9ADMIN", 1), 5).unwrap();
    assert_eq!(ledger.logging_fee(), 5);
}

#[test]
fn config_without_admin_needs_override() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[ledger]\nlogging_fee = 3\n").unwrap();

    let config = CarelogConfig::load_from(&path).unwrap().unwrap();
    assert!(matches!(
        config.ledger_settings(None),
        Err(ConfigError::MissingAdmin)
    ));
    let settings = config
        .ledger_settings(Some(Principal::from("ST3ADMIN")))
        .unwrap();
    assert_eq!(settings.admin().as_str(), "ST3ADMIN");
    assert_eq!(settings.logging_fee(), 3);
}
