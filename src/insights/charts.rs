use serde::Serialize;

use super::knowledge::{potential_diseases, risk_explanation};
use super::reference::TestStatus;
use super::structuring::TestSeries;

const ANOMALY_COLOR: &str = "#f1c40f";
const BAND_COLOR: &str = "#2ecc71";
/// Share of the band's upper edge a change must exceed to count as a trend.
const TREND_TOLERANCE: f64 = 0.05;
const KEEP_GOING: &[&str] = &["Continue healthy habits"];
const FOLLOW_UP: &[&str] = &["Consult your doctor", "Consider lifestyle changes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "#2ecc71",
            Self::Moderate => "#f39c12",
            Self::High => "#e74c3c",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    /// Direction of the last step, ignoring moves within the tolerance.
    pub fn from_last_two(values: &[f64], band_max: f64) -> Self {
        let [.., prev, last] = values else {
            return Self::Stable;
        };
        let tolerance = band_max * TREND_TOLERANCE;
        if *last > prev + tolerance {
            Self::Increasing
        } else if *last < prev - tolerance {
            Self::Decreasing
        } else {
            Self::Stable
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Increasing => "↑",
            Self::Decreasing => "↓",
            Self::Stable => "→",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Increasing => "#e74c3c",
            Self::Decreasing => "#3498db",
            Self::Stable => "#666",
        }
    }
}

/// Either a number or an open chart edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Bound {
    Value(f64),
    Edge(Edge),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Min,
    Max,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotationLabel {
    pub content: String,
    pub position: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxAnnotation {
    pub x_min: Bound,
    pub x_max: Bound,
    pub y_min: Bound,
    pub y_max: Bound,
    pub background_color: String,
    pub border_color: String,
    pub label: AnnotationLabel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelAnnotation {
    pub content: String,
    pub x: usize,
    pub y: f64,
    pub y_adjust: i32,
    pub background_color: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Annotation {
    Box(BoxAnnotation),
    Label(LabelAnnotation),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub border_color: String,
    pub background_color: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub point_background_color: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub point_radius: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_dash: Option<[u8; 2]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub title: String,
    pub subtitle: String,
    pub subtitle_color: &'static str,
    pub y_min: f64,
    pub y_max: f64,
    pub annotations: Vec<Annotation>,
}

/// An out-of-range point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    pub index: usize,
    pub date: String,
    pub value: f64,
    pub status: TestStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSummary {
    pub current_value: f64,
    pub unit: &'static str,
    pub status: TestStatus,
    pub status_color: &'static str,
    pub status_explanation: &'static str,
    pub trend: Trend,
    pub trend_icon: &'static str,
    pub trend_color: &'static str,
    pub normal_range: &'static str,
    pub what_it_means: &'static str,
    pub risk_explanation: &'static str,
    pub potential_diseases: &'static [&'static str],
    pub risk_level: RiskLevel,
    pub risk_color: &'static str,
    pub action_items: &'static [&'static str],
    pub anomalies: Vec<Anomaly>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChart {
    pub test_id: &'static str,
    pub metric: &'static str,
    pub description: &'static str,
    pub chart_type: &'static str,
    pub data: ChartData,
    pub options: ChartOptions,
    pub summary: ChartSummary,
}

fn zone(y_min: Bound, y_max: Bound, rgb: &str, content: &str, position: &'static str) -> Annotation {
    Annotation::Box(BoxAnnotation {
        x_min: Bound::Edge(Edge::Min),
        x_max: Bound::Edge(Edge::Max),
        y_min,
        y_max,
        background_color: format!("rgba({rgb}, 0.2)"),
        border_color: "transparent".into(),
        label: AnnotationLabel {
            content: content.into(),
            position,
        },
    })
}

fn reference_line(value: f64, len: usize) -> Dataset {
    Dataset {
        label: "Reference Range".into(),
        data: vec![value; len],
        border_color: BAND_COLOR.into(),
        background_color: "rgba(46, 204, 113, 0.1)".into(),
        point_background_color: Vec::new(),
        point_radius: Vec::new(),
        border_dash: Some([5, 5]),
    }
}

/// Build the line chart, annotations and summary for one test series.
/// Returns `None` for an empty series.
pub fn build_line_chart(series: &TestSeries) -> Option<LineChart> {
    let latest = series.latest()?;
    let test = series.test;
    let values = series.values();
    let labels: Vec<String> = series.readings.iter().map(|r| r.label.clone()).collect();

    let data_min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let data_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (band_min, band_max) = series.range.map_or((data_min, data_max), |r| r.band());

    let anomalies: Vec<Anomaly> = series
        .readings
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.status.is_normal())
        .map(|(index, r)| Anomaly {
            index,
            date: r.label.clone(),
            value: r.value,
            status: r.status,
        })
        .collect();

    let trend = Trend::from_last_two(&values, band_max);
    let status = latest.status;
    let risk_level = if status.is_normal() {
        RiskLevel::Low
    } else {
        RiskLevel::High
    };
    let explanation = risk_explanation(test.id, status);

    let mut annotations = vec![zone(
        Bound::Value(band_min),
        Bound::Value(band_max),
        "46, 204, 113",
        "Safe Zone",
        "center",
    )];
    if series.range.map_or(true, |r| r.bounds_low()) {
        annotations.push(zone(
            Bound::Edge(Edge::Min),
            Bound::Value(band_min),
            "52, 152, 219",
            "Low Risk Zone",
            "bottom",
        ));
    }
    if series.range.map_or(true, |r| r.bounds_high()) {
        annotations.push(zone(
            Bound::Value(band_max),
            Bound::Edge(Edge::Max),
            "231, 76, 60",
            "High Risk Zone",
            "top",
        ));
    }
    for (i, a) in anomalies.iter().enumerate() {
        let status = a.status.as_str().to_uppercase();
        annotations.push(Annotation::Label(LabelAnnotation {
            content: format!("⚠️ {status} on {}", a.date),
            x: a.index,
            y: a.value,
            y_adjust: -15 - 15 * i as i32,
            background_color: "rgba(241, 196, 15, 0.8)".into(),
        }));
        let high = a.status == TestStatus::High;
        annotations.push(Annotation::Box(BoxAnnotation {
            x_min: Bound::Value(a.index as f64 - 0.5),
            x_max: Bound::Value(a.index as f64 + 0.5),
            y_min: Bound::Value(if high { band_max } else { 0.0 }),
            y_max: Bound::Value(if high { data_max * 1.1 } else { band_min }),
            background_color: "rgba(241, 196, 15, 0.2)".into(),
            border_color: "rgba(241, 196, 15, 0.5)".into(),
            label: AnnotationLabel {
                content: format!("Anomaly: {status}"),
                position: if high { "top" } else { "bottom" },
            },
        }));
    }

    let status_color = status.color();
    let main = Dataset {
        label: format!("{} ({})", test.simple_name, test.unit),
        data: values.clone(),
        border_color: status_color.into(),
        background_color: format!("{status_color}20"),
        point_background_color: series
            .readings
            .iter()
            .map(|r| if r.status.is_normal() { status_color } else { ANOMALY_COLOR })
            .collect(),
        point_radius: series
            .readings
            .iter()
            .map(|r| if r.status.is_normal() { 4 } else { 6 })
            .collect(),
        border_dash: None,
    };

    Some(LineChart {
        test_id: test.id,
        metric: test.simple_name,
        description: test.description,
        chart_type: "line",
        data: ChartData {
            labels,
            datasets: vec![
                main,
                reference_line(band_max, values.len()),
                reference_line(band_min, values.len()),
            ],
        },
        options: ChartOptions {
            title: format!("{} Trend Analysis", test.simple_name),
            subtitle: explanation.into(),
            subtitle_color: status_color,
            y_min: data_min.min(band_min) * 0.9,
            y_max: data_max.max(band_max) * 1.1,
            annotations,
        },
        summary: ChartSummary {
            current_value: latest.value,
            unit: test.unit,
            status,
            status_color,
            status_explanation: status.explanation(),
            trend,
            trend_icon: trend.icon(),
            trend_color: trend.color(),
            normal_range: test.ref_range,
            what_it_means: test.description,
            risk_explanation: explanation,
            potential_diseases: potential_diseases(test.id, status),
            risk_level,
            risk_color: status_color,
            action_items: if status.is_normal() { KEEP_GOING } else { FOLLOW_UP },
            anomalies,
        },
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::insights::structuring::tests::record;
    use crate::insights::structuring::{prepare_reports, structure_series};

    fn ldl_chart(texts: &[&str]) -> LineChart {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let records: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| record(&format!("r{i}"), Some(t), t0 + Duration::days(31 * i as i64)))
            .collect();
        let reports = prepare_reports(&records);
        let series = structure_series(&reports);
        build_line_chart(&series[0]).unwrap()
    }

    #[test]
    fn trend_needs_to_clear_tolerance() {
        assert_eq!(Trend::from_last_two(&[90.0], 100.0), Trend::Stable);
        assert_eq!(Trend::from_last_two(&[90.0, 94.0], 100.0), Trend::Stable);
        assert_eq!(Trend::from_last_two(&[90.0, 96.0], 100.0), Trend::Increasing);
        assert_eq!(Trend::from_last_two(&[90.0, 84.0], 100.0), Trend::Decreasing);
        assert_eq!(Trend::from_last_two(&[], 100.0), Trend::Stable);
    }

    #[test]
    fn crossing_above_range_is_one_anomaly_at_later_report() {
        let chart = ldl_chart(&["LDL: 90", "LDL: 140"]);

        let anomalies = &chart.summary.anomalies;
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].index, 1);
        assert_eq!(anomalies[0].date, "Feb 2024");
        assert_eq!(anomalies[0].status, TestStatus::High);

        assert_eq!(chart.summary.status, TestStatus::High);
        assert_eq!(chart.summary.trend, Trend::Increasing);
        assert_eq!(chart.summary.risk_level, RiskLevel::High);
        assert_eq!(chart.summary.potential_diseases[0], "Heart disease");
    }

    #[test]
    fn one_sided_band_and_zones() {
        let chart = ldl_chart(&["LDL: 90"]);
        let json = serde_json::to_value(&chart).unwrap();

        let band_low = &json["data"]["datasets"][2]["data"][0];
        assert!((band_low.as_f64().unwrap() - 70.0).abs() < 1e-9);
        assert_eq!(json["data"]["datasets"][1]["data"][0], 100.0);

        // "<100" bounds only the high side: safe zone plus high-risk zone.
        let annotations = json["options"]["annotations"].as_array().unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0]["type"], "box");
        assert_eq!(annotations[1]["label"]["content"], "High Risk Zone");
        assert_eq!(annotations[1]["yMax"], "max");
    }

    #[test]
    fn normal_series_summary() {
        let chart = ldl_chart(&["LDL: 90", "LDL: 91"]);
        assert!(chart.summary.anomalies.is_empty());
        assert_eq!(chart.summary.trend, Trend::Stable);
        assert_eq!(chart.summary.risk_level, RiskLevel::Low);
        assert_eq!(chart.summary.action_items, &["Continue healthy habits"]);
        assert_eq!(chart.summary.risk_explanation, "No significant risk identified");
    }

    #[test]
    fn anomaly_points_are_highlighted() {
        let chart = ldl_chart(&["LDL: 90", "LDL: 140"]);
        let main = &chart.data.datasets[0];
        assert_eq!(main.point_background_color, vec!["#e74c3c", ANOMALY_COLOR]);
        assert_eq!(main.point_radius, vec![4, 6]);
        assert_eq!(main.label, "Bad Cholesterol (mg/dL)");
    }
}
