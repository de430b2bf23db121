//! Query modules, one per table group.

pub mod cluster_ops;
pub mod decision_ops;
pub mod event_ops;
pub mod report_ops;

use chrono::{DateTime, SecondsFormat, Utc};

use tideguard_core::errors::TideguardResult;

use crate::corrupt_row;

/// Fixed-width RFC 3339 (microseconds, `Z`) so stored timestamps compare
/// lexicographically in SQL.
pub(crate) fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(table: &str, s: &str) -> TideguardResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt_row(table, format!("parse datetime '{s}': {e}")))
}

/// Make `query_row` return `Option` on not-found.
pub(crate) trait OptionalRow<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalRow<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Run `f` inside a transaction, rolling back on any error.
pub(crate) fn in_transaction<F, T>(
    conn: &rusqlite::Connection,
    label: &str,
    f: F,
) -> TideguardResult<T>
where
    F: FnOnce(&rusqlite::Connection) -> TideguardResult<T>,
{
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| crate::to_storage_err(format!("{label} begin: {e}")))?;
    match f(&tx) {
        Ok(value) => {
            tx.commit()
                .map_err(|e| crate::to_storage_err(format!("{label} commit: {e}")))?;
            Ok(value)
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}
