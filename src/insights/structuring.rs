use chrono::{DateTime, Utc};
use serde::Serialize;

use super::dates::{resolve_report_date, DateSource, ResolvedDate};
use super::extraction::{extract_values, ExtractedValues};
use super::reference::{RefRange, TestDefinition, TestStatus, REFERENCE_TABLE};
use crate::models::HealthRecord;

/// A stored report with its timeline date and extracted readings.
#[derive(Debug, Clone)]
pub struct DatedReport<'a> {
    pub record: &'a HealthRecord,
    pub date: ResolvedDate,
    pub values: ExtractedValues,
}

/// Resolve dates and readings for every record, oldest report first.
/// Records with equal dates keep their stored order.
pub fn prepare_reports(records: &[HealthRecord]) -> Vec<DatedReport<'_>> {
    let mut reports: Vec<_> = records
        .iter()
        .map(|record| {
            let text = record.extracted_text.as_deref();
            DatedReport {
                record,
                date: resolve_report_date(text, record.uploaded_at),
                values: text.map(extract_values).unwrap_or_default(),
            }
        })
        .collect();
    reports.sort_by_key(|r| r.date.at);

    for r in &reports {
        tracing::debug!(
            record_id = %r.record.id,
            date = %r.date.at.date_naive(),
            from_text = r.date.source == DateSource::ReportText,
            readings = r.values.len(),
            "prepared report"
        );
    }
    reports
}

/// One point of a test's time series.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReading {
    pub test_id: &'static str,
    pub date: DateTime<Utc>,
    /// `Mon YYYY` axis label.
    pub label: String,
    pub value: f64,
    pub status: TestStatus,
}

/// All readings of one test across a patient's reports.
#[derive(Debug, Clone)]
pub struct TestSeries {
    pub test: &'static TestDefinition,
    pub range: Option<RefRange>,
    pub readings: Vec<TestReading>,
}

impl TestSeries {
    pub fn values(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.value).collect()
    }

    pub fn latest(&self) -> Option<&TestReading> {
        self.readings.last()
    }
}

/// Group readings by test, in reference-table order. Tests never seen are left out.
pub fn structure_series(reports: &[DatedReport<'_>]) -> Vec<TestSeries> {
    REFERENCE_TABLE
        .iter()
        .filter_map(|test| {
            let range = test.range();
            let readings: Vec<_> = reports
                .iter()
                .filter_map(|report| {
                    let value = report.values.get(test.id)?;
                    Some(TestReading {
                        test_id: test.id,
                        date: report.date.at,
                        label: report.date.label(),
                        value,
                        status: range.map_or(TestStatus::Normal, |r| r.classify(value)),
                    })
                })
                .collect();

            (!readings.is_empty()).then_some(TestSeries {
                test,
                range,
                readings,
            })
        })
        .collect()
}
