use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AdvisoryError;

const BUNDLED_RULES: &str = include_str!("../../resources/access_rules.json");

/// Which record categories each specialization may reasonably request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessRules(BTreeMap<String, Vec<String>>);

impl AccessRules {
    pub fn from_json(json: &str, source_name: &str) -> Result<Self, AdvisoryError> {
        serde_json::from_str(json).map_err(|e| AdvisoryError::AccessRules {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })
    }

    /// The table shipped with the binary.
    pub fn bundled() -> Result<Self, AdvisoryError> {
        Self::from_json(BUNDLED_RULES, "bundled access_rules.json")
    }

    /// Load from a file, or fall back to the bundled table when no path is set.
    pub fn load(path: Option<&Path>) -> Result<Self, AdvisoryError> {
        let Some(path) = path else {
            return Self::bundled();
        };
        let source_name = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| AdvisoryError::AccessRules {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;
        let rules = Self::from_json(&json, &source_name)?;
        tracing::info!(path = %source_name, specializations = rules.0.len(), "loaded access rules");
        Ok(rules)
    }

    pub fn allowed_for(&self, specialization: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(specialization.trim()))
            .map(|(_, accesses)| accesses.as_slice())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rules as a prompt section, one block per specialization.
    pub fn format_for_prompt(&self) -> String {
        self.0
            .iter()
            .map(|(specialization, accesses)| {
                format!("\n{specialization} may access:\n - {}\n", accesses.join("\n - "))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn bundled_table_parses() {
        let rules = AccessRules::bundled().unwrap();
        assert!(!rules.is_empty());
        assert!(rules.allowed_for("cardiologist").is_some());
    }

    #[test]
    fn prompt_format() {
        let rules = AccessRules::from_json(
            r#"{"Cardiologist": ["ECG reports", "Lipid profile"]}"#,
            "inline",
        )
        .unwrap();
        assert_eq!(
            rules.format_for_prompt(),
            "\nCardiologist may access:\n - ECG reports\n - Lipid profile\n"
        );
    }

    #[test]
    fn load_from_file_and_missing_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Dentist": ["Dental X-rays"]}}"#).unwrap();

        let rules = AccessRules::load(Some(file.path())).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.allowed_for("Dentist").unwrap(), ["Dental X-rays".to_string()]);

        let err = AccessRules::load(Some(Path::new("/nonexistent/rules.json"))).unwrap_err();
        assert!(matches!(err, AdvisoryError::AccessRules { .. }));
    }

    #[test]
    fn no_path_means_bundled() {
        assert_eq!(AccessRules::load(None).unwrap(), AccessRules::bundled().unwrap());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(AccessRules::from_json("[1, 2]", "inline").is_err());
    }
}
