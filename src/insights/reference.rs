use serde::Serialize;

/// One lab test the pipeline knows how to read and chart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDefinition {
    #[serde(skip)]
    pub id: &'static str,
    pub simple_name: &'static str,
    pub description: &'static str,
    /// `"a-b"`, `"<b"` or `">a"`.
    pub ref_range: &'static str,
    pub unit: &'static str,
}

impl TestDefinition {
    pub fn range(&self) -> Option<RefRange> {
        RefRange::parse(self.ref_range)
    }
}

const fn test(
    id: &'static str,
    simple_name: &'static str,
    description: &'static str,
    ref_range: &'static str,
    unit: &'static str,
) -> TestDefinition {
    TestDefinition {
        id,
        simple_name,
        description,
        ref_range,
        unit,
    }
}

/// Every charted test, in display order.
pub static REFERENCE_TABLE: &[TestDefinition] = &[
    test("HbA1c", "Average Blood Sugar", "3-month blood sugar average", "4.0-5.6", "%"),
    test("fastingGlucose", "Fasting Blood Sugar", "Morning blood sugar level", "70-100", "mg/dL"),
    test("LDL", "Bad Cholesterol", "Cholesterol that can clog arteries", "<100", "mg/dL"),
    test("HDL", "Good Cholesterol", "Cholesterol that helps clear arteries", ">40", "mg/dL"),
    test("troponin", "Heart Stress Marker", "Shows heart muscle damage", "<0.04", "ng/mL"),
    test("BNP", "Heart Strain Marker", "Rises when the heart is under strain", "<100", "pg/mL"),
    test("heartRate", "Heart Rate", "Heart beats per minute at rest", "60-100", "bpm"),
    test("creatinine", "Kidney Waste Product", "Shows how well kidneys filter", "0.7-1.3", "mg/dL"),
    test("eGFR", "Kidney Filter Rate", "How fast kidneys clean blood", ">60", "mL/min"),
    test("BUN", "Blood Urea Nitrogen", "Waste the kidneys should clear", "7-20", "mg/dL"),
    test("ALT", "Liver Enzyme", "Shows liver inflammation", "7-55", "U/L"),
    test("AST", "Liver Enzyme", "Another liver inflammation marker", "8-48", "U/L"),
    test("bilirubin", "Bile Pigment", "How well the liver clears old blood cells", "0.1-1.2", "mg/dL"),
    test("CRP", "Inflammation Level", "General inflammation in body", "<1.0", "mg/L"),
    test("ESR", "Inflammation Speed", "How fast blood cells settle", "0-20", "mm/hr"),
    test("WBC", "White Blood Cells", "Infection-fighting cell count", "4.0-11.0", "thousand/µL"),
];

pub fn find_test(id: &str) -> Option<&'static TestDefinition> {
    REFERENCE_TABLE.iter().find(|t| t.id == id)
}

/// Normal range of a test, parsed from its textual form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefRange {
    Between(f64, f64),
    Below(f64),
    Above(f64),
}

impl RefRange {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(max) = s.strip_prefix('<') {
            return max.trim().parse().ok().map(Self::Below);
        }
        if let Some(min) = s.strip_prefix('>') {
            return min.trim().parse().ok().map(Self::Above);
        }
        let (min, max) = s.split_once('-')?;
        Some(Self::Between(min.trim().parse().ok()?, max.trim().parse().ok()?))
    }

    /// Bounds are inclusive on the normal side.
    pub fn classify(&self, value: f64) -> TestStatus {
        match *self {
            Self::Between(min, _) if value < min => TestStatus::Low,
            Self::Between(_, max) if value > max => TestStatus::High,
            Self::Below(max) if value > max => TestStatus::High,
            Self::Above(min) if value < min => TestStatus::Low,
            _ => TestStatus::Normal,
        }
    }

    /// Band drawn on charts. One-sided ranges get a synthetic second edge.
    pub fn band(&self) -> (f64, f64) {
        match *self {
            Self::Between(min, max) => (min, max),
            Self::Below(max) => (max * 0.7, max),
            Self::Above(min) => (min, min * 1.3),
        }
    }

    /// Span a value is scored across for organ health.
    pub fn score_span(&self) -> (f64, f64) {
        match *self {
            Self::Between(min, max) => (min, max),
            Self::Below(max) => (0.0, max),
            Self::Above(min) => (min, min * 2.0),
        }
    }

    pub fn bounds_low(&self) -> bool {
        !matches!(self, Self::Below(_))
    }

    pub fn bounds_high(&self) -> bool {
        !matches!(self, Self::Above(_))
    }
}

/// Classify against a textual range. Unparseable ranges read as normal.
pub fn classify(value: f64, ref_range: &str) -> TestStatus {
    RefRange::parse(ref_range).map_or(TestStatus::Normal, |r| r.classify(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Low,
    Normal,
    High,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "#3498db",
            Self::Normal => "#2ecc71",
            Self::High => "#e74c3c",
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            Self::Low => "Lower than recommended",
            Self::Normal => "Within healthy range",
            Self::High => "Higher than recommended",
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}
