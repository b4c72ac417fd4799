use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, JobId, JobPosting, RawAcademicRecord, StudentId,
};

/// Read access to job postings.
pub trait JobRepository: Send + Sync {
    fn find_by_id(&self, job_id: &JobId) -> Result<Option<JobPosting>, RepositoryError>;
}

/// Read access to student records.
pub trait StudentRepository: Send + Sync {
    fn find_academic_record(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<RawAcademicRecord>, RepositoryError>;

    /// Terminal PLACED marker kept on the student profile.
    fn is_placed(&self, student_id: &StudentId) -> Result<bool, RepositoryError>;
}

/// Storage for applications. Implementations must enforce one application per
/// (student, job) and report a violation as [`RepositoryError::Conflict`].
pub trait ApplicationRepository: Send + Sync {
    fn find_by_student_and_job(
        &self,
        student_id: &StudentId,
        job_id: &JobId,
    ) -> Result<Option<Application>, RepositoryError>;

    fn find_hired_by_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<Application>, RepositoryError>;

    fn insert(
        &self,
        student_id: &StudentId,
        job_id: &JobId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError>;

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hook (toast feed, e-mail, etc.).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub template: String,
    pub student_id: StudentId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
