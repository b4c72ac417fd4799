//! Eligibility matching shared by previews, pre-submit checks and authorization.

pub mod criteria;
mod degree;
mod rules;

pub use criteria::{parse, EligibilityCriteria};
pub use degree::DegreeMatch;

use super::domain::AcademicRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stateless evaluator comparing parsed criteria with a student's record.
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityEvaluator {
    degree_match: DegreeMatch,
}

impl EligibilityEvaluator {
    pub fn new(degree_match: DegreeMatch) -> Self {
        Self { degree_match }
    }

    /// Evaluator used when deciding submissions.
    pub fn authoritative() -> Self {
        Self::new(DegreeMatch::Containment)
    }

    pub fn degree_match(&self) -> DegreeMatch {
        self.degree_match
    }

    pub fn evaluate(
        &self,
        criteria: &EligibilityCriteria,
        record: &AcademicRecord,
    ) -> EligibilityVerdict {
        let unmet = rules::unmet_criteria(criteria, record, self.degree_match);
        EligibilityVerdict {
            ok: unmet.is_empty(),
            unmet,
        }
    }

    pub fn evaluate_text(
        &self,
        criteria_text: Option<&str>,
        record: &AcademicRecord,
    ) -> EligibilityVerdict {
        self.evaluate(&parse(criteria_text), record)
    }
}

/// Criteria that can fail an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriterionField {
    #[serde(rename = "degree")]
    Degree,
    #[serde(rename = "minCgpa")]
    MinCgpa,
    #[serde(rename = "classX")]
    ClassX,
    #[serde(rename = "classXII")]
    ClassXii,
}

impl CriterionField {
    pub const fn label(self) -> &'static str {
        match self {
            CriterionField::Degree => "degree",
            CriterionField::MinCgpa => "minCgpa",
            CriterionField::ClassX => "classX",
            CriterionField::ClassXii => "classXII",
        }
    }

    const fn description(self) -> &'static str {
        match self {
            CriterionField::Degree => "degree",
            CriterionField::MinCgpa => "CGPA",
            CriterionField::ClassX => "Class X percentage",
            CriterionField::ClassXii => "Class XII percentage",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriterionValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for CriterionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriterionValue::Number(value) => write!(f, "{value}"),
            CriterionValue::Text(value) => f.write_str(value),
        }
    }
}

/// One failed requirement; `actual` is `None` when the record could not supply a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmetCriterion {
    pub field: CriterionField,
    pub required: CriterionValue,
    pub actual: Option<CriterionValue>,
}

impl UnmetCriterion {
    pub fn summary(&self) -> String {
        let actual = self
            .actual
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "not provided".to_string());
        match self.field {
            CriterionField::Degree => {
                format!("degree {} required (enrolled: {actual})", self.required)
            }
            field => format!(
                "minimum {} {} required (found {actual})",
                field.description(),
                self.required
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub ok: bool,
    pub unmet: Vec<UnmetCriterion>,
}

impl EligibilityVerdict {
    pub fn summary(&self) -> String {
        if self.ok {
            "all eligibility criteria met".to_string()
        } else {
            let reasons: Vec<String> = self.unmet.iter().map(UnmetCriterion::summary).collect();
            format!("eligibility criteria not met: {}", reasons.join("; "))
        }
    }

    pub fn unmet_fields(&self) -> Vec<CriterionField> {
        self.unmet.iter().map(|entry| entry.field).collect()
    }
}
