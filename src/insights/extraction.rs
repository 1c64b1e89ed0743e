use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// A test name pattern. Group 1 captures the reading.
struct ValuePattern {
    test_id: &'static str,
    regex: Regex,
}

fn pattern(test_id: &'static str, name: &str) -> ValuePattern {
    ValuePattern {
        test_id,
        regex: Regex::new(&format!(r"(?i){name}[\s:]*(\d*\.?\d+)")).unwrap(),
    }
}

static VALUE_PATTERNS: LazyLock<Vec<ValuePattern>> = LazyLock::new(|| {
    vec![
        pattern("HbA1c", r"\b(?:HbA1c|Glycated\s+Ha?emoglobin)\b"),
        pattern(
            "fastingGlucose",
            r"\b(?:Fasting\s+(?:Blood\s+)?Glucose|FBS|Blood\s+Sugar)\b",
        ),
        pattern("LDL", r"\bLDL(?:\s+Cholesterol)?\b"),
        pattern("HDL", r"\bHDL(?:\s+Cholesterol)?\b"),
        pattern("troponin", r"\bTroponin(?:\s+[IT])?\b"),
        pattern("BNP", r"\bBNP\b"),
        pattern("heartRate", r"\b(?:Heart\s+Rate|Pulse\s+Rate|(?-i:HR))\b"),
        pattern("creatinine", r"\bCreatinine\b"),
        pattern("eGFR", r"\beGFR\b"),
        pattern("BUN", r"\b(?:BUN|Blood\s+Urea\s+Nitrogen)\b"),
        pattern("ALT", r"\b(?:ALT|SGPT)\b"),
        pattern("AST", r"\b(?:AST|SGOT)\b"),
        pattern("bilirubin", r"\b(?:Total\s+)?Bilirubin\b"),
        pattern("CRP", r"\b(?:hs-?)?CRP\b"),
        pattern("ESR", r"\bESR\b"),
        pattern("WBC", r"\b(?:WBC|White\s+Blood\s+Cells?)(?:\s+Count)?\b"),
    ]
});

/// One numeric reading per recognised test, keyed by test id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedValues(BTreeMap<&'static str, f64>);

impl ExtractedValues {
    pub fn get(&self, test_id: &str) -> Option<f64> {
        self.0.get(test_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

/// Pull the first reading of every known test out of report text.
pub fn extract_values(text: &str) -> ExtractedValues {
    let mut values = BTreeMap::new();
    if text.trim().is_empty() {
        return ExtractedValues(values);
    }

    for p in VALUE_PATTERNS.iter() {
        let reading = p
            .regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok());
        if let Some(value) = reading {
            values.insert(p.test_id, value);
        }
    }

    tracing::debug!(found = values.len(), "extracted lab values");
    ExtractedValues(values)
}
