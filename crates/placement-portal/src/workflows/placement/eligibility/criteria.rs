use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::parse_leading_decimal;

/// Structured view of a job's `Key: Value; Key: Value` eligibility text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_cgpa: Option<f64>,
    #[serde(rename = "classX", skip_serializing_if = "Option::is_none")]
    pub class_x: Option<f64>,
    #[serde(rename = "classXII", skip_serializing_if = "Option::is_none")]
    pub class_xii: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Unrecognized keys, kept under their original casing.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl EligibilityCriteria {
    /// Whether any enforceable requirement is present.
    pub fn has_requirements(&self) -> bool {
        self.degree.is_some()
            || self.min_cgpa.is_some()
            || self.class_x.is_some()
            || self.class_xii.is_some()
    }
}

/// Parse criteria text. Never fails: malformed segments are skipped and numeric values
/// that do not parse leave the criterion unset.
pub fn parse(criteria_text: Option<&str>) -> EligibilityCriteria {
    let mut criteria = EligibilityCriteria::default();
    let Some(text) = criteria_text else {
        return criteria;
    };

    for segment in text.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((raw_key, raw_value)) = segment.split_once(':') else {
            continue;
        };
        let key = raw_key.trim();
        let value = raw_value.trim();
        if value.is_empty() {
            continue;
        }

        match key.to_lowercase().as_str() {
            "mincgpa" => criteria.min_cgpa = parse_leading_decimal(value),
            "classx" => criteria.class_x = parse_leading_decimal(value),
            "classxii" => criteria.class_xii = parse_leading_decimal(value),
            "degree" => criteria.degree = Some(value.to_string()),
            "notes" => criteria.notes = Some(value.to_string()),
            _ => {
                criteria.extra.insert(key.to_string(), value.to_string());
            }
        }
    }

    criteria
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recognized_keys_case_insensitively() {
        let criteria = parse(Some(
            "Degree: B.Tech in Computer Science; MINCGPA: 8.0; classx: 90; ClassXII: 85",
        ));

        assert_eq!(criteria.degree.as_deref(), Some("B.Tech in Computer Science"));
        assert_eq!(criteria.min_cgpa, Some(8.0));
        assert_eq!(criteria.class_x, Some(90.0));
        assert_eq!(criteria.class_xii, Some(85.0));
        assert!(criteria.extra.is_empty());
    }

    #[test]
    fn keeps_colons_inside_values() {
        let criteria = parse(Some("Notes: Interview at 10:30; Location: Pune: Hinjewadi"));

        assert_eq!(criteria.notes.as_deref(), Some("Interview at 10:30"));
        assert_eq!(
            criteria.extra.get("Location").map(String::as_str),
            Some("Pune: Hinjewadi")
        );
    }

    #[test]
    fn drops_segments_without_separator_or_value() {
        let criteria = parse(Some(";; Open to all ; Degree: ; MinCGPA:7.5 ;"));

        assert_eq!(criteria.degree, None);
        assert_eq!(criteria.min_cgpa, Some(7.5));
        assert!(criteria.extra.is_empty());
    }

    #[test]
    fn non_numeric_threshold_leaves_criterion_unset() {
        let criteria = parse(Some("MinCGPA: good; ClassX: 85%"));

        assert_eq!(criteria.min_cgpa, None);
        assert_eq!(criteria.class_x, Some(85.0));
        assert!(criteria.has_requirements());
    }

    #[test]
    fn absent_or_blank_text_is_empty() {
        assert_eq!(parse(None), EligibilityCriteria::default());
        assert_eq!(parse(Some("   ")), EligibilityCriteria::default());
        assert!(!parse(Some("Notes: anyone")).has_requirements());
    }

    #[test]
    fn serializes_with_portal_field_names() {
        let criteria = parse(Some("MinCGPA: 7; ClassXII: 60; Backlogs: none"));
        let value = serde_json::to_value(&criteria).expect("serializes");

        assert_eq!(value["minCgpa"], serde_json::json!(7.0));
        assert_eq!(value["classXII"], serde_json::json!(60.0));
        assert_eq!(value["Backlogs"], serde_json::json!("none"));
        assert!(value.get("degree").is_none());
    }
}
