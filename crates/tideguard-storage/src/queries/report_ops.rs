//! Insert and read raw reports.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use tideguard_core::errors::TideguardResult;
use tideguard_core::models::{ClusterId, GeoPoint, RawReport, ReportId, SourceType};

use super::{fmt_ts, parse_ts, OptionalRow};
use crate::{corrupt_row, to_storage_err};

const TABLE: &str = "raw_reports";

pub(crate) const REPORT_COLUMNS: &str = "r.id, r.source_type, r.submitted_at, r.received_at, \
     r.lat, r.lon, r.hazard_type_guess, r.base_confidence, r.credibility_score, \
     r.self_submitted, r.unclassified";

pub fn insert_report(conn: &Connection, report: &RawReport) -> TideguardResult<()> {
    conn.execute(
        "INSERT INTO raw_reports (
            id, source_type, submitted_at, received_at, lat, lon,
            hazard_type_guess, base_confidence, credibility_score,
            self_submitted, unclassified
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            report.id.as_str(),
            report.source_type.as_str(),
            fmt_ts(&report.submitted_at),
            fmt_ts(&report.received_at),
            report.position.lat,
            report.position.lon,
            report.hazard_type_guess,
            report.base_confidence,
            report.credibility_score,
            report.self_submitted_by_viewer as i32,
            report.unclassified as i32,
        ],
    )
    .map_err(|e| to_storage_err(format!("insert report {}: {e}", report.id)))?;
    Ok(())
}

pub fn get_report(conn: &Connection, id: &ReportId) -> TideguardResult<Option<RawReport>> {
    let raw = conn
        .query_row(
            &format!("SELECT {REPORT_COLUMNS} FROM raw_reports r WHERE r.id = ?1"),
            params![id.as_str()],
            RawReportRow::from_row,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(RawReportRow::into_report).transpose()
}

/// Fetch reports in the order of `ids`. Unknown ids are skipped.
pub fn get_reports(conn: &Connection, ids: &[ReportId]) -> TideguardResult<Vec<RawReport>> {
    let mut reports = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(report) = get_report(conn, id)? {
            reports.push(report);
        }
    }
    Ok(reports)
}

/// Reports with no membership row, oldest first.
pub fn unattached_reports(conn: &Connection) -> TideguardResult<Vec<RawReport>> {
    query_reports(
        conn,
        &format!(
            "SELECT {REPORT_COLUMNS} FROM raw_reports r
             LEFT JOIN cluster_members m ON m.report_id = r.id
             WHERE m.report_id IS NULL
             ORDER BY r.submitted_at, r.id"
        ),
        &[],
    )
}

pub fn self_submitted_since(
    conn: &Connection,
    since: DateTime<Utc>,
) -> TideguardResult<Vec<RawReport>> {
    let since = fmt_ts(&since);
    query_reports(
        conn,
        &format!(
            "SELECT {REPORT_COLUMNS} FROM raw_reports r
             WHERE r.self_submitted = 1 AND r.submitted_at >= ?1
             ORDER BY r.submitted_at, r.id"
        ),
        &[&since],
    )
}

pub fn cluster_of_report(conn: &Connection, id: &ReportId) -> TideguardResult<Option<ClusterId>> {
    conn.query_row(
        "SELECT cluster_id FROM cluster_members WHERE report_id = ?1",
        params![id.as_str()],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .map(|found| found.map(ClusterId))
    .map_err(|e| to_storage_err(e.to_string()))
}

pub(crate) fn query_reports(
    conn: &Connection,
    sql: &str,
    args: &[&dyn rusqlite::ToSql],
) -> TideguardResult<Vec<RawReport>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(args, RawReportRow::from_row)
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.into_iter().map(RawReportRow::into_report).collect()
}

/// Column values as read, before enum and timestamp decoding.
pub(crate) struct RawReportRow {
    id: String,
    source_type: String,
    submitted_at: String,
    received_at: String,
    lat: f64,
    lon: f64,
    hazard_type_guess: String,
    base_confidence: f64,
    credibility_score: f64,
    self_submitted: bool,
    unclassified: bool,
}

impl RawReportRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            source_type: row.get(1)?,
            submitted_at: row.get(2)?,
            received_at: row.get(3)?,
            lat: row.get(4)?,
            lon: row.get(5)?,
            hazard_type_guess: row.get(6)?,
            base_confidence: row.get(7)?,
            credibility_score: row.get(8)?,
            self_submitted: row.get::<_, i32>(9)? != 0,
            unclassified: row.get::<_, i32>(10)? != 0,
        })
    }

    pub(crate) fn into_report(self) -> TideguardResult<RawReport> {
        let source_type: SourceType = self
            .source_type
            .parse()
            .map_err(|e| corrupt_row(TABLE, format!("report {}: {e}", self.id)))?;
        Ok(RawReport {
            source_type,
            submitted_at: parse_ts(TABLE, &self.submitted_at)?,
            received_at: parse_ts(TABLE, &self.received_at)?,
            position: GeoPoint::new(self.lat, self.lon),
            hazard_type_guess: self.hazard_type_guess,
            base_confidence: self.base_confidence,
            credibility_score: self.credibility_score,
            self_submitted_by_viewer: self.self_submitted,
            unclassified: self.unclassified,
            id: ReportId(self.id),
        })
    }
}
