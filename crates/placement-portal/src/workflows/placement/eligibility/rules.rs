use super::super::domain::AcademicRecord;
use super::criteria::EligibilityCriteria;
use super::degree::DegreeMatch;
use super::{CriterionField, CriterionValue, UnmetCriterion};

pub(crate) fn unmet_criteria(
    criteria: &EligibilityCriteria,
    record: &AcademicRecord,
    degree_match: DegreeMatch,
) -> Vec<UnmetCriterion> {
    let mut unmet = Vec::new();

    if let Some(required) = criteria.degree.as_deref() {
        if !degree_match.matches(required, record.course_enrolled.as_deref()) {
            unmet.push(UnmetCriterion {
                field: CriterionField::Degree,
                required: CriterionValue::Text(required.to_string()),
                actual: record
                    .course_enrolled
                    .as_ref()
                    .filter(|course| !course.trim().is_empty())
                    .map(|course| CriterionValue::Text(course.clone())),
            });
        }
    }

    let thresholds = [
        (CriterionField::MinCgpa, criteria.min_cgpa, record.current_cgpa),
        (CriterionField::ClassX, criteria.class_x, record.class_x_percentage),
        (
            CriterionField::ClassXii,
            criteria.class_xii,
            record.class_xii_percentage,
        ),
    ];

    for (field, required, actual) in thresholds {
        let Some(required) = required.filter(|value| value.is_finite()) else {
            continue;
        };
        let actual = actual.filter(|value| value.is_finite());

        let meets = actual.map(|value| value >= required).unwrap_or(false);
        if !meets {
            unmet.push(UnmetCriterion {
                field,
                required: CriterionValue::Number(required),
                actual: actual.map(CriterionValue::Number),
            });
        }
    }

    unmet
}
