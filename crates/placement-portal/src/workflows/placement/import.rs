//! CSV seed import for job postings and student records.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{ApprovalStatus, JobId, JobPosting, RawAcademicRecord, StudentId};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read placement export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid placement CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {detail}")]
    InvalidRow { row: usize, detail: String },
}

/// Student row as loaded from the registration export.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSeed {
    pub id: StudentId,
    pub placed: bool,
    pub academic_record: Option<RawAcademicRecord>,
}

pub struct PlacementDataImporter;

impl PlacementDataImporter {
    pub fn jobs_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<JobPosting>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::jobs_from_reader(file)
    }

    pub fn jobs_from_reader<R: Read>(reader: R) -> Result<Vec<JobPosting>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut jobs = Vec::new();

        for (index, record) in csv_reader.deserialize::<JobRow>().enumerate() {
            let row = record?;
            let line = index + 2;

            let application_deadline =
                parse_deadline(&row.deadline).ok_or_else(|| ImportError::InvalidRow {
                    row: line,
                    detail: format!("unrecognized deadline '{}'", row.deadline),
                })?;
            let approval_status = match row.approval_status.as_deref() {
                None => ApprovalStatus::Pending,
                Some(raw) => ApprovalStatus::parse(raw).ok_or_else(|| ImportError::InvalidRow {
                    row: line,
                    detail: format!("unknown approval status '{raw}'"),
                })?,
            };

            jobs.push(JobPosting {
                id: JobId(row.job_id),
                job_description: row.description.unwrap_or_default(),
                eligibility_criteria: row.eligibility_criteria,
                application_deadline,
                approval_status,
            });
        }

        Ok(jobs)
    }

    pub fn students_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<StudentSeed>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::students_from_reader(file)
    }

    pub fn students_from_reader<R: Read>(reader: R) -> Result<Vec<StudentSeed>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut students = Vec::new();

        for (index, record) in csv_reader.deserialize::<StudentRow>().enumerate() {
            let row = record?;
            let placed = match row.placed.as_deref() {
                None => false,
                Some(raw) => parse_flag(raw).ok_or_else(|| ImportError::InvalidRow {
                    row: index + 2,
                    detail: format!("placed flag '{raw}' is not yes/no"),
                })?,
            };

            students.push(StudentSeed {
                id: StudentId(row.student_id),
                placed,
                academic_record: row.academic_record.map(RawAcademicRecord::Encoded),
            });
        }

        Ok(students)
    }
}

#[derive(Debug, Deserialize)]
struct JobRow {
    #[serde(rename = "Job ID")]
    job_id: String,
    #[serde(rename = "Description", default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(
        rename = "Eligibility Criteria",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    eligibility_criteria: Option<String>,
    #[serde(rename = "Deadline")]
    deadline: String,
    #[serde(
        rename = "Approval Status",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    approval_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StudentRow {
    #[serde(rename = "Student ID")]
    student_id: String,
    #[serde(rename = "Placed", default, deserialize_with = "empty_string_as_none")]
    placed: Option<String>,
    #[serde(
        rename = "Academic Record",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    academic_record: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_deadline(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    // A bare date stays open until the end of that day.
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|naive| naive.and_utc())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "placed" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::placement::domain::AcademicRecord;
    use chrono::{Datelike, Timelike};
    use std::io::Cursor;

    const JOBS: &str = "Job ID,Description,Eligibility Criteria,Deadline,Approval Status\n\
job-1,(SDE) Salary: 6 LPA,Degree: B.Tech; MinCGPA: 7,2030-01-15,approved\n\
job-2,,,2030-02-01T10:00:00Z,\n";

    #[test]
    fn imports_jobs_with_defaults() {
        let jobs = PlacementDataImporter::jobs_from_reader(Cursor::new(JOBS)).expect("jobs parse");

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, JobId("job-1".to_string()));
        assert_eq!(jobs[0].approval_status, ApprovalStatus::Approved);
        assert_eq!(jobs[0].title().as_deref(), Some("SDE"));
        assert_eq!(jobs[0].application_deadline.day(), 15);
        assert_eq!(jobs[0].application_deadline.hour(), 23);

        assert_eq!(jobs[1].approval_status, ApprovalStatus::Pending);
        assert!(jobs[1].eligibility_criteria.is_none());
        assert!(jobs[1].job_description.is_empty());
    }

    #[test]
    fn reports_bad_deadline_with_row_number() {
        let csv = "Job ID,Description,Eligibility Criteria,Deadline,Approval Status\n\
job-1,Desc,,next week,APPROVED\n";

        match PlacementDataImporter::jobs_from_reader(Cursor::new(csv)) {
            Err(ImportError::InvalidRow { row, detail }) => {
                assert_eq!(row, 2);
                assert!(detail.contains("next week"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn imports_students_with_encoded_records() {
        let csv = "Student ID,Placed,Academic Record\n\
stu-1,yes,\"{\"\"courseEnrolled\"\": \"\"B.Tech CSE\"\", \"\"currentCGPA\"\": \"\"8.2\"\"}\"\n\
stu-2,,\n";

        let students =
            PlacementDataImporter::students_from_reader(Cursor::new(csv)).expect("students parse");

        assert_eq!(students.len(), 2);
        assert!(students[0].placed);
        let record = AcademicRecord::from_raw(students[0].academic_record.clone());
        assert_eq!(record.course_enrolled.as_deref(), Some("B.Tech CSE"));
        assert_eq!(record.current_cgpa, Some(8.2));

        assert!(!students[1].placed);
        assert!(students[1].academic_record.is_none());
    }
}
