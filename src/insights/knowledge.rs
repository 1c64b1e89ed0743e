//! Plain-language risk notes and candidate conditions per out-of-range test.

use super::reference::TestStatus;

pub const NO_RISK: &str = "No significant risk identified";
pub const NO_DISEASE: &[&str] = &["No significant disease risk identified"];

pub fn risk_explanation(test_id: &str, status: TestStatus) -> &'static str {
    use TestStatus::{High, Low};
    match (test_id, status) {
        ("HbA1c", High) => "High HbA1c indicates poor blood sugar control. This increases risk of diabetes complications: heart disease, stroke, kidney disease, nerve damage, and eye problems.",
        ("HbA1c", Low) => "Low HbA1c may indicate frequent hypoglycemia which can cause dizziness, confusion, and loss of consciousness.",
        ("fastingGlucose", High) => "High fasting glucose suggests prediabetes or diabetes. Risks include frequent urination, increased thirst, blurred vision, and long-term organ damage.",
        ("fastingGlucose", Low) => "Low fasting glucose (hypoglycemia) can cause shakiness, sweating, confusion, and in severe cases, loss of consciousness.",
        ("LDL", High) => "High LDL (bad cholesterol) can lead to plaque buildup in arteries, increasing risk of heart attack and stroke.",
        ("LDL", Low) => "Low LDL is generally beneficial but extremely low levels may increase bleeding risk.",
        ("HDL", High) => "High HDL (good cholesterol) is protective against heart disease.",
        ("HDL", Low) => "Low HDL increases risk of heart disease as it helps remove bad cholesterol from arteries.",
        ("troponin", High) => "Elevated troponin suggests heart muscle damage, possibly from a heart attack, heart inflammation, or other cardiac stress.",
        ("troponin", Low) => "Low troponin is normal and expected.",
        ("creatinine", High) => "High creatinine indicates poor kidney function. Risks include fluid retention, electrolyte imbalances, and toxin buildup.",
        ("creatinine", Low) => "Low creatinine may suggest low muscle mass but is generally not concerning.",
        ("eGFR", High) => "High eGFR is generally not concerning and may indicate excellent kidney function.",
        ("eGFR", Low) => "Low eGFR indicates reduced kidney function. Risks include fluid retention, high blood pressure, and anemia.",
        ("ALT", High) => "High ALT suggests liver inflammation or damage from conditions like hepatitis, fatty liver disease, or alcohol use.",
        ("ALT", Low) => "Low ALT is normal and expected.",
        ("AST", High) => "High AST may indicate liver damage, heart problems, or muscle injury.",
        ("AST", Low) => "Low AST is normal and expected.",
        ("CRP", High) => "High CRP indicates inflammation in the body from infection, autoimmune disease, or other inflammatory conditions.",
        ("CRP", Low) => "Low CRP is normal and suggests no significant inflammation.",
        ("ESR", High) => "High ESR suggests inflammation from infection, autoimmune disease, or other inflammatory conditions.",
        ("ESR", Low) => "Low ESR is normal and expected.",
        _ => NO_RISK,
    }
}

pub fn potential_diseases(test_id: &str, status: TestStatus) -> &'static [&'static str] {
    use TestStatus::{High, Low};
    match (test_id, status) {
        ("HbA1c", High) => &["Diabetes", "Prediabetes", "Metabolic syndrome"],
        ("HbA1c", Low) => &["Hypoglycemia", "Overmedication with diabetes drugs"],
        ("fastingGlucose", High) => &["Diabetes", "Prediabetes", "Pancreatic disorders"],
        ("fastingGlucose", Low) => &["Hypoglycemia", "Liver disease", "Hormone deficiencies"],
        ("LDL", High) => &["Heart disease", "Atherosclerosis", "Stroke risk"],
        ("LDL", Low) => &["Malnutrition", "Hyperthyroidism"],
        ("HDL", High) => &["Generally protective"],
        ("HDL", Low) => &["Heart disease risk", "Metabolic syndrome"],
        ("troponin", High) => &["Heart attack", "Heart failure", "Myocarditis"],
        ("creatinine", High) => &["Kidney disease", "Dehydration", "Urinary obstruction"],
        ("creatinine", Low) => &["Low muscle mass", "Pregnancy"],
        ("eGFR", High) => &["Normal variant"],
        ("eGFR", Low) => &["Chronic kidney disease", "Acute kidney injury"],
        ("ALT", High) => &["Hepatitis", "Fatty liver disease", "Liver damage"],
        ("AST", High) => &["Liver disease", "Heart attack", "Muscle injury"],
        ("CRP", High) => &["Infection", "Autoimmune disease", "Inflammatory conditions"],
        ("ESR", High) => &["Infection", "Autoimmune disease", "Cancer"],
        ("troponin" | "ALT" | "AST" | "CRP" | "ESR", Low) => &["Normal finding"],
        _ => NO_DISEASE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_pairs_have_text() {
        assert!(risk_explanation("LDL", TestStatus::High).contains("plaque"));
        assert_eq!(
            potential_diseases("eGFR", TestStatus::Low),
            &["Chronic kidney disease", "Acute kidney injury"]
        );
    }

    #[test]
    fn normal_status_uses_fallbacks() {
        assert_eq!(risk_explanation("LDL", TestStatus::Normal), NO_RISK);
        assert_eq!(potential_diseases("LDL", TestStatus::Normal), NO_DISEASE);
    }

    #[test]
    fn unknown_test_uses_fallbacks() {
        assert_eq!(risk_explanation("BUN", TestStatus::High), NO_RISK);
        assert_eq!(potential_diseases("WBC", TestStatus::Low), NO_DISEASE);
    }
}
