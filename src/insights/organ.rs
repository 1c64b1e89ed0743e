use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::charts::RiskLevel;
use super::extraction::ExtractedValues;
use super::reference::find_test;
use super::structuring::DatedReport;

const FOLLOW_UP: &[&str] = &["Consult specialist", "Get follow-up tests"];
const MAINTAIN: &[&str] = &["Maintain healthy habits"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrganSystem {
    Heart,
    Kidney,
    Liver,
    Inflammation,
}

impl OrganSystem {
    pub const ALL: [OrganSystem; 4] = [Self::Heart, Self::Kidney, Self::Liver, Self::Inflammation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heart => "Heart",
            Self::Kidney => "Kidney",
            Self::Liver => "Liver",
            Self::Inflammation => "Inflammation",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Heart => "Heart health indicators",
            Self::Kidney => "Kidney function measurements",
            Self::Liver => "Liver function tests",
            Self::Inflammation => "Infection/inflammation signs",
        }
    }

    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            Self::Heart => &["troponin", "BNP", "heartRate"],
            Self::Kidney => &["creatinine", "eGFR", "BUN"],
            Self::Liver => &["ALT", "AST", "bilirubin"],
            Self::Inflammation => &["CRP", "ESR", "WBC"],
        }
    }
}

/// 0–100 health score for one marker reading. `None` when the marker has no range.
pub fn marker_score(marker: &str, value: f64) -> Option<f64> {
    let range = find_test(marker)?.range()?;
    if marker == "eGFR" {
        return Some((value / 100.0).min(1.0) * 100.0);
    }
    let (min, max) = range.score_span();
    if max <= min {
        return None;
    }
    Some((100.0 - (value - min) / (max - min) * 100.0).clamp(0.0, 100.0))
}

/// Mean of the available marker scores, 0 when none were measured.
pub fn system_score(system: OrganSystem, values: &ExtractedValues) -> f64 {
    let scores: Vec<f64> = system
        .markers()
        .iter()
        .filter_map(|m| marker_score(m, values.get(m)?))
        .collect();
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

fn percent_change(baseline: f64, current: f64) -> f64 {
    if baseline > 0.0 {
        (current - baseline) / baseline * 100.0
    } else {
        0.0
    }
}

fn risk_for_change(change: f64) -> RiskLevel {
    if change < -10.0 {
        RiskLevel::High
    } else if change < 0.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrganSystemScore {
    pub system: OrganSystem,
    pub baseline: f64,
    pub current: f64,
    pub change: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone)]
pub struct OrganAssessment {
    pub baseline_date: DateTime<Utc>,
    pub current_date: DateTime<Utc>,
    pub scores: Vec<OrganSystemScore>,
}

/// Compare the earliest and latest report. Needs at least two reports.
/// `reports` must already be in timeline order.
pub fn assess_organ_systems(reports: &[DatedReport<'_>]) -> Option<OrganAssessment> {
    if reports.len() < 2 {
        tracing::debug!(reports = reports.len(), "too few reports for organ scoring");
        return None;
    }
    let first = reports.first()?;
    let last = reports.last()?;

    let scores = OrganSystem::ALL
        .iter()
        .map(|&system| {
            let baseline = system_score(system, &first.values);
            let current = system_score(system, &last.values);
            let change = percent_change(baseline, current);
            OrganSystemScore {
                system,
                baseline,
                current,
                change,
                risk_level: risk_for_change(change),
            }
        })
        .collect();

    Some(OrganAssessment {
        baseline_date: first.date.at,
        current_date: last.date.at,
        scores,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub border_color: &'static str,
    pub background_color: &'static str,
    pub point_radius: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganExplanation {
    pub system: OrganSystem,
    pub description: &'static str,
    pub baseline: String,
    pub current: String,
    pub change: String,
    pub explanation: String,
    pub risk_level: RiskLevel,
    pub risk_color: &'static str,
    pub recommendations: &'static [&'static str],
}

/// Radar chart payload for the organ-health view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganRadar {
    pub labels: Vec<String>,
    pub datasets: Vec<RadarDataset>,
    pub changes: BTreeMap<&'static str, f64>,
    pub baseline_date: DateTime<Utc>,
    pub current_date: DateTime<Utc>,
    pub explanations: Vec<OrganExplanation>,
}

impl From<&OrganAssessment> for OrganRadar {
    fn from(a: &OrganAssessment) -> Self {
        let explanations = a
            .scores
            .iter()
            .map(|s| {
                let verb = if s.change >= 0.0 { "Improved" } else { "Declined" };
                OrganExplanation {
                    system: s.system,
                    description: s.system.description(),
                    baseline: format!("{:.1}", s.baseline),
                    current: format!("{:.1}", s.current),
                    change: format!("{:.1}", s.change),
                    explanation: format!("{verb} by {:.1}% since baseline", s.change.abs()),
                    risk_level: s.risk_level,
                    risk_color: s.risk_level.color(),
                    recommendations: if s.change < 0.0 { FOLLOW_UP } else { MAINTAIN },
                }
            })
            .collect();

        Self {
            labels: a
                .scores
                .iter()
                .map(|s| format!("{}\n{}", s.system.as_str(), s.system.description()))
                .collect(),
            datasets: vec![
                RadarDataset {
                    label: format!("Baseline ({})", a.baseline_date.format("%b %Y")),
                    data: a.scores.iter().map(|s| s.baseline).collect(),
                    border_color: "rgba(100, 100, 255, 0.8)",
                    background_color: "rgba(100, 100, 255, 0.2)",
                    point_radius: 5,
                },
                RadarDataset {
                    label: format!("Current ({})", a.current_date.format("%b %Y")),
                    data: a.scores.iter().map(|s| s.current).collect(),
                    border_color: "rgba(255, 99, 132, 1)",
                    background_color: "rgba(255, 99, 132, 0.2)",
                    point_radius: 6,
                },
            ],
            changes: a.scores.iter().map(|s| (s.system.as_str(), s.change)).collect(),
            baseline_date: a.baseline_date,
            current_date: a.current_date,
            explanations,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::insights::extraction::extract_values;
    use crate::insights::structuring::prepare_reports;
    use crate::insights::structuring::tests::record;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn marker_scores() {
        // 0.7-1.3: midpoint scores 50.
        assert!(close(marker_score("creatinine", 1.0).unwrap(), 50.0));
        // Far above range clamps at 0, below range clamps at 100.
        assert_eq!(marker_score("creatinine", 5.0), Some(0.0));
        assert_eq!(marker_score("creatinine", 0.1), Some(100.0));
        // "<1.0" scores against 0..1.
        assert!(close(marker_score("CRP", 0.25).unwrap(), 75.0));
        // eGFR is capped at 100.
        assert_eq!(marker_score("eGFR", 130.0), Some(100.0));
        assert!(close(marker_score("eGFR", 45.0).unwrap(), 45.0));
        assert_eq!(marker_score("unknown", 1.0), None);
    }

    #[test]
    fn system_score_averages_available_markers() {
        let values = extract_values("ALT: 7\nAST: 48");
        // ALT at its minimum scores 100, AST at its maximum scores 0.
        assert!(close(system_score(OrganSystem::Liver, &values), 50.0));
        assert_eq!(system_score(OrganSystem::Heart, &values), 0.0);
    }

    #[test]
    fn needs_two_reports() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let one = vec![record("r1", Some("CRP: 0.5"), t0)];
        assert!(assess_organ_systems(&prepare_reports(&one)).is_none());
        assert!(assess_organ_systems(&[]).is_none());
    }

    #[test]
    fn compares_first_and_last_report() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let records = vec![
            record("r1", Some("CRP: 0.2\nCreatinine: 1.0"), t0),
            record("r2", Some("no readings"), t0 + Duration::days(30)),
            record("r3", Some("CRP: 0.6\nCreatinine: 1.0"), t0 + Duration::days(60)),
        ];
        let reports = prepare_reports(&records);
        let assessment = assess_organ_systems(&reports).unwrap();

        assert_eq!(assessment.scores.len(), 4);
        let inflammation = &assessment.scores[3];
        assert_eq!(inflammation.system, OrganSystem::Inflammation);
        assert!(close(inflammation.baseline, 80.0));
        assert!(close(inflammation.current, 40.0));
        assert!(close(inflammation.change, -50.0));
        assert_eq!(inflammation.risk_level, RiskLevel::High);

        let kidney = &assessment.scores[1];
        assert!(close(kidney.change, 0.0));
        assert_eq!(kidney.risk_level, RiskLevel::Low);

        // No heart markers at all: zero baseline means zero change.
        assert_eq!(assessment.scores[0].change, 0.0);
    }

    #[test]
    fn small_decline_is_moderate() {
        assert_eq!(risk_for_change(-5.0), RiskLevel::Moderate);
        assert_eq!(risk_for_change(-10.0), RiskLevel::Moderate);
        assert_eq!(risk_for_change(-10.5), RiskLevel::High);
        assert_eq!(risk_for_change(0.0), RiskLevel::Low);
    }

    #[test]
    fn radar_payload() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let records = vec![
            record("r1", Some("CRP: 0.2"), t0),
            record("r2", Some("CRP: 0.6"), t0 + Duration::days(60)),
        ];
        let reports = prepare_reports(&records);
        let radar = OrganRadar::from(&assess_organ_systems(&reports).unwrap());

        assert_eq!(radar.labels.len(), 4);
        assert!(radar.labels[0].starts_with("Heart\n"));
        assert_eq!(radar.datasets[0].label, "Baseline (Jan 2024)");
        assert_eq!(radar.datasets[1].label, "Current (Mar 2024)");
        assert_eq!(radar.changes.len(), 4);

        let inflammation = &radar.explanations[3];
        assert_eq!(inflammation.explanation, "Declined by 50.0% since baseline");
        assert_eq!(inflammation.risk_color, "#e74c3c");
        assert_eq!(inflammation.recommendations[0], "Consult specialist");
        assert_eq!(radar.explanations[0].recommendations, &["Maintain healthy habits"]);
    }
}
