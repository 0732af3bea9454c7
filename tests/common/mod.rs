//! Common test utilities

use chrono::NaiveDate;
use std::sync::Arc;
use turnero::config::RotationSettings;
use turnero::scheduler::ScheduleService;
use turnero::storage::{Database, MockAbsenceLog, MockOverrideStore};

/// Monday 2024-01-01, the anchor used throughout the tests
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Date `days` after [`monday`]
#[allow(dead_code)]
pub fn day(days: i64) -> NaiveDate {
    monday() + chrono::Duration::days(days)
}

/// One month of rotation starting at [`monday`]
pub fn settings() -> RotationSettings {
    RotationSettings {
        anchor: monday(),
        horizon_months: 1,
        offset: 0,
        floater_rest_weekday: None,
    }
}

/// Service over in-memory mocks, with a handle on the absence log
#[allow(dead_code)]
pub fn mock_service() -> (ScheduleService, Arc<MockAbsenceLog>) {
    let log = Arc::new(MockAbsenceLog::new());
    let service = ScheduleService::new(settings(), Arc::new(MockOverrideStore::new()), log.clone())
        .expect("service over mocks");
    (service, log)
}

/// Service over a SQLite database
#[allow(dead_code)]
pub fn sqlite_service(db: &Database) -> ScheduleService {
    ScheduleService::new(settings(), Arc::new(db.overrides()), Arc::new(db.absences()))
        .expect("service over sqlite")
}
