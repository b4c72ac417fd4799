use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::money::parse_amount;

/// Identifier wrapper for registered students.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

/// Aliases observed for each academic field, tried in order.
pub const COURSE_KEYS: &[&str] = &["courseEnrolled"];
pub const CGPA_KEYS: &[&str] = &["currentCGPA", "currentCgpa", "currentGPA"];
pub const CLASS_X_KEYS: &[&str] = &["classXPercentage", "classX"];
pub const CLASS_XII_KEYS: &[&str] = &["classXIIPercentage", "classXii", "classXII"];
pub const CTC_KEYS: &[&str] = &[
    "currentCtc",
    "current_ctc",
    "ctc",
    "currentSalary",
    "current_salary",
    "salary",
];
pub const COLLEGE_KEYS: &[&str] = &["college"];
pub const RESUME_KEYS: &[&str] = &["resumeLink"];
pub const YEAR_SEMESTER_KEYS: &[&str] = &["currentYearSemester"];

/// Academic record as stored by the student repository: either a decoded object or a
/// JSON document still encoded as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAcademicRecord {
    Object(Map<String, Value>),
    Encoded(String),
}

impl RawAcademicRecord {
    /// Decode into a JSON object. Anything that does not resolve to an object after one
    /// parse step is treated as an empty record.
    pub fn into_object(self) -> Map<String, Value> {
        match self {
            RawAcademicRecord::Object(map) => map,
            RawAcademicRecord::Encoded(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            },
        }
    }
}

/// Normalized academic record. Every field is optional; a missing field means the value
/// cannot be verified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcademicRecord {
    pub course_enrolled: Option<String>,
    pub current_cgpa: Option<f64>,
    pub class_x_percentage: Option<f64>,
    pub class_xii_percentage: Option<f64>,
    pub college: Option<String>,
    pub resume_link: Option<String>,
    pub current_year_semester: Option<String>,
    /// Annual compensation in currency units.
    pub current_ctc: Option<f64>,
}

impl AcademicRecord {
    pub fn from_raw(raw: Option<RawAcademicRecord>) -> Self {
        match raw {
            Some(raw) => Self::from_object(&raw.into_object()),
            None => Self::default(),
        }
    }

    pub fn from_object(bag: &Map<String, Value>) -> Self {
        Self {
            course_enrolled: text_field(bag, COURSE_KEYS),
            current_cgpa: decimal_field(bag, CGPA_KEYS),
            class_x_percentage: decimal_field(bag, CLASS_X_KEYS),
            class_xii_percentage: decimal_field(bag, CLASS_XII_KEYS),
            college: text_field(bag, COLLEGE_KEYS),
            resume_link: text_field(bag, RESUME_KEYS),
            current_year_semester: text_field(bag, YEAR_SEMESTER_KEYS),
            current_ctc: money_field(bag, CTC_KEYS),
        }
    }
}

fn first_present<'a>(bag: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| bag.get(*key))
        .find(|value| match value {
            Value::Null => false,
            Value::String(text) => !text.trim().is_empty(),
            _ => true,
        })
}

fn text_field(bag: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match first_present(bag, keys)? {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn decimal_field(bag: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    match first_present(bag, keys)? {
        Value::Number(number) => number.as_f64().filter(|value| value.is_finite()),
        Value::String(text) => parse_leading_decimal(text),
        _ => None,
    }
}

fn money_field(bag: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    match first_present(bag, keys)? {
        Value::Number(number) => number.as_f64().filter(|value| value.is_finite()),
        Value::String(text) => parse_amount(text),
        _ => None,
    }
}

/// Reads the leading decimal number of `text` (`"85%"` is 85, `"CGPA 8"` is absent).
pub fn parse_leading_decimal(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (index, ch) in trimmed.char_indices() {
        match ch {
            '+' | '-' if index == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = index + ch.len_utf8();
    }

    if !seen_digit {
        return None;
    }

    trimmed[..end]
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Student snapshot the authorizer needs: identity, record, and hire history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantContext {
    pub student_id: StudentId,
    pub record: AcademicRecord,
    /// True when the student holds a HIRED application or carries the PLACED marker.
    pub already_hired: bool,
}

/// TPO moderation state of a job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Recruiter-posted job as the engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub job_description: String,
    #[serde(default)]
    pub eligibility_criteria: Option<String>,
    pub application_deadline: DateTime<Utc>,
    pub approval_status: ApprovalStatus,
}

impl JobPosting {
    /// Title embedded in the description, either a leading `(Title)` or a JSON `title` field.
    pub fn title(&self) -> Option<String> {
        let trimmed = self.job_description.trim();

        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
            return map
                .get("title")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|title| !title.is_empty())
                .map(str::to_string);
        }

        let rest = trimmed.strip_prefix('(')?;
        let (title, _) = rest.split_once(')')?;
        let title = title.trim();
        (!title.is_empty()).then(|| title.to_string())
    }
}

/// Lifecycle of an application once it has been accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Applied,
    Shortlisted,
    InterviewScheduled,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "APPLIED",
            ApplicationStatus::Shortlisted => "SHORTLISTED",
            ApplicationStatus::InterviewScheduled => "INTERVIEW_SCHEDULED",
            ApplicationStatus::Hired => "HIRED",
            ApplicationStatus::Rejected => "REJECTED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Hired | ApplicationStatus::Rejected)
    }

    /// Forward progress one step at a time, or rejection from any open state.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;

        match (self, next) {
            (current, Rejected) => !current.is_terminal(),
            (Applied, Shortlisted) | (Shortlisted, InterviewScheduled) => true,
            (InterviewScheduled, Hired) => true,
            _ => false,
        }
    }
}

/// Persisted link between one student and one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub student_id: StudentId,
    pub job_id: JobId,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

impl Application {
    pub fn concerns(&self, student_id: &StudentId, job_id: &JobId) -> bool {
        &self.student_id == student_id && &self.job_id == job_id
    }
}
