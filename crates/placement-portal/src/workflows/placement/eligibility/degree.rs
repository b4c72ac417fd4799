use serde::{Deserialize, Serialize};

/// How a required degree is compared with the student's enrolled course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeMatch {
    /// Enrolled course must contain the required text. Authoritative for submissions.
    #[default]
    Containment,
    /// Coarse discipline/programme buckets. Only used as a non-binding preview hint.
    Bucket,
}

const COMPUTING_REQUIREMENT: &[&str] = &["computer", "cs"];
const COMPUTING_COURSE: &[&str] = &["cs", "computer"];
const ENGINEERING_REQUIREMENT: &[&str] = &["btech", "b.tech", "engineering", "bachelor"];
const ENGINEERING_COURSE: &[&str] = &["engineering", "btech", "b.tech", "bachelor", "b e", "be"];

impl DegreeMatch {
    pub fn matches(self, required: &str, course: Option<&str>) -> bool {
        let Some(course) = course.map(str::trim).filter(|course| !course.is_empty()) else {
            return false;
        };
        let required = required.trim().to_lowercase();
        let course = course.to_lowercase();

        match self {
            DegreeMatch::Containment => course.contains(&required),
            DegreeMatch::Bucket => bucket_match(&required, &course),
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn bucket_match(required: &str, course: &str) -> bool {
    let mut applicable = false;

    if contains_any(required, COMPUTING_REQUIREMENT) {
        applicable = true;
        if !contains_any(course, COMPUTING_COURSE) {
            return false;
        }
    }

    if contains_any(required, ENGINEERING_REQUIREMENT) {
        applicable = true;
        if !contains_any(course, ENGINEERING_COURSE) {
            return false;
        }
    }

    applicable || course.contains(required)
}
