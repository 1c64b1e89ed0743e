//! Report-to-chart pipeline.
//!
//! Stored report text is mined for lab values and a report date, readings
//! are grouped into per-test time series, classified against reference
//! ranges and turned into chart payloads. The earliest and latest reports
//! also feed an organ-system comparison. Everything here is pure and
//! total: bad or missing text simply yields fewer readings.

pub mod charts;
pub mod dates;
pub mod extraction;
pub mod knowledge;
pub mod organ;
pub mod reference;
pub mod structuring;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::HealthRecord;
use charts::{build_line_chart, LineChart};
use organ::{assess_organ_systems, OrganRadar};
use reference::{TestDefinition, REFERENCE_TABLE};
use structuring::{prepare_reports, structure_series};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualInsights {
    pub line_charts: Vec<LineChart>,
    pub radar_chart: Option<OrganRadar>,
    pub simplified_terms: BTreeMap<&'static str, &'static TestDefinition>,
}

/// Plain-language names for every test, keyed by test id.
pub fn simplified_terms() -> BTreeMap<&'static str, &'static TestDefinition> {
    REFERENCE_TABLE.iter().map(|t| (t.id, t)).collect()
}

pub fn visual_insights(records: &[HealthRecord]) -> VisualInsights {
    let reports = prepare_reports(records);
    let series = structure_series(&reports);
    let line_charts: Vec<_> = series.iter().filter_map(build_line_chart).collect();
    let radar_chart = assess_organ_systems(&reports).map(|a| OrganRadar::from(&a));

    tracing::info!(
        reports = reports.len(),
        charts = line_charts.len(),
        organ_scores = radar_chart.is_some(),
        "built visual insights"
    );

    VisualInsights {
        line_charts,
        radar_chart,
        simplified_terms: simplified_terms(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::insights::structuring::tests::record;

    #[test]
    fn single_report_has_charts_but_no_radar() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let records = vec![record("r1", Some("HbA1c: 6.1\nHDL: 52"), t0)];
        let insights = visual_insights(&records);

        assert_eq!(insights.line_charts.len(), 2);
        assert!(insights.radar_chart.is_none());
        assert_eq!(insights.simplified_terms.len(), REFERENCE_TABLE.len());
    }

    #[test]
    fn json_shape() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let records = vec![
            record("r1", Some("Report Date: 05-Jan-2024\nCRP: 0.4"), t0),
            record("r2", Some("Report Date: 05-Apr-2024\nCRP: 1.8"), t0 + Duration::days(1)),
        ];
        let json = serde_json::to_value(visual_insights(&records)).unwrap();

        assert_eq!(json["lineCharts"][0]["testId"], "CRP");
        assert_eq!(json["lineCharts"][0]["summary"]["status"], "high");
        assert_eq!(json["lineCharts"][0]["data"]["labels"][1], "Apr 2024");
        assert_eq!(json["radarChart"]["explanations"].as_array().unwrap().len(), 4);
        assert_eq!(json["simplifiedTerms"]["LDL"]["simpleName"], "Bad Cholesterol");
    }

    #[test]
    fn reports_without_text_still_count_for_radar() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let records = vec![record("r1", None, t0), record("r2", None, t0 + Duration::days(3))];
        let insights = visual_insights(&records);
        assert!(insights.line_charts.is_empty());
        assert!(insights.radar_chart.is_some());
    }
}
