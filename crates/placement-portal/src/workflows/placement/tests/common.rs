use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

use crate::workflows::placement::domain::{
    AcademicRecord, ApplicantContext, Application, ApplicationId, ApplicationStatus,
    ApprovalStatus, JobId, JobPosting, RawAcademicRecord, StudentId,
};
use crate::workflows::placement::repository::{
    ApplicationRepository, JobRepository, Notification, NotificationError, NotificationPublisher,
    RepositoryError, StudentRepository,
};
use crate::workflows::placement::{application_router, PlacementApplicationService, SalaryGate};

pub(super) const SCENARIO_CRITERIA: &str =
    "Degree: B.Tech in Computer Science; MinCGPA: 8.0; ClassX: 90; ClassXII: 85";

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 3, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn student_id() -> StudentId {
    StudentId("stu-101".to_string())
}

pub(super) fn record(value: Value) -> AcademicRecord {
    match value {
        Value::Object(map) => AcademicRecord::from_object(&map),
        other => panic!("record fixture must be an object, got {other}"),
    }
}

pub(super) fn cs_record() -> Value {
    json!({
        "courseEnrolled": "B.Tech in Computer Science",
        "currentCGPA": 8.5,
        "classXPercentage": 90,
        "classXIIPercentage": 85,
    })
}

pub(super) fn applicant(record_value: Value, already_hired: bool) -> ApplicantContext {
    ApplicantContext {
        student_id: student_id(),
        record: record(record_value),
        already_hired,
    }
}

/// Approved job open for another two weeks relative to [`now`].
pub(super) fn open_job(id: &str, criteria: &str, description: &str) -> JobPosting {
    JobPosting {
        id: JobId(id.to_string()),
        job_description: description.to_string(),
        eligibility_criteria: Some(criteria.to_string()),
        application_deadline: now() + Duration::days(14),
        approval_status: ApprovalStatus::Approved,
    }
}

/// Same as [`open_job`] but anchored to the wall clock for service and route tests.
pub(super) fn live_job(id: &str, criteria: &str, description: &str) -> JobPosting {
    JobPosting {
        application_deadline: Utc::now() + Duration::days(14),
        ..open_job(id, criteria, description)
    }
}

pub(super) fn application(
    student: &StudentId,
    job: &JobId,
    status: ApplicationStatus,
) -> Application {
    Application {
        id: ApplicationId(format!("app-{}-{}", student.0, job.0)),
        student_id: student.clone(),
        job_id: job.clone(),
        status,
        applied_at: now() - Duration::days(3),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryJobs {
    pub(super) jobs: Arc<Mutex<HashMap<JobId, JobPosting>>>,
}

impl MemoryJobs {
    pub(super) fn with(jobs: Vec<JobPosting>) -> Self {
        let repository = Self::default();
        {
            let mut guard = repository.jobs.lock().expect("jobs mutex poisoned");
            for job in jobs {
                guard.insert(job.id.clone(), job);
            }
        }
        repository
    }
}

impl JobRepository for MemoryJobs {
    fn find_by_id(&self, job_id: &JobId) -> Result<Option<JobPosting>, RepositoryError> {
        let guard = self.jobs.lock().expect("jobs mutex poisoned");
        Ok(guard.get(job_id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStudents {
    pub(super) records: Arc<Mutex<HashMap<StudentId, (bool, Option<RawAcademicRecord>)>>>,
}

impl MemoryStudents {
    pub(super) fn with(
        student: StudentId,
        placed: bool,
        record: Option<RawAcademicRecord>,
    ) -> Self {
        let repository = Self::default();
        repository
            .records
            .lock()
            .expect("students mutex poisoned")
            .insert(student, (placed, record));
        repository
    }
}

impl StudentRepository for MemoryStudents {
    fn find_academic_record(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<RawAcademicRecord>, RepositoryError> {
        let guard = self.records.lock().expect("students mutex poisoned");
        Ok(guard
            .get(student_id)
            .and_then(|(_, record)| record.clone()))
    }

    fn is_placed(&self, student_id: &StudentId) -> Result<bool, RepositoryError> {
        let guard = self.records.lock().expect("students mutex poisoned");
        Ok(guard
            .get(student_id)
            .map(|(placed, _)| *placed)
            .unwrap_or(false))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplications {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
    sequence: Arc<AtomicU64>,
}

impl MemoryApplications {
    pub(super) fn seed(&self, application: Application) {
        self.records
            .lock()
            .expect("applications mutex poisoned")
            .insert(application.id.clone(), application);
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("applications mutex poisoned").len()
    }
}

impl ApplicationRepository for MemoryApplications {
    fn find_by_student_and_job(
        &self,
        student_id: &StudentId,
        job_id: &JobId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("applications mutex poisoned");
        Ok(guard
            .values()
            .find(|application| application.concerns(student_id, job_id))
            .cloned())
    }

    fn find_hired_by_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("applications mutex poisoned");
        Ok(guard
            .values()
            .find(|application| {
                &application.student_id == student_id
                    && application.status == ApplicationStatus::Hired
            })
            .cloned())
    }

    fn insert(
        &self,
        student_id: &StudentId,
        job_id: &JobId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("applications mutex poisoned");
        if guard
            .values()
            .any(|application| application.concerns(student_id, job_id))
        {
            return Err(RepositoryError::Conflict);
        }
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let application = Application {
            id: ApplicationId(format!("app-{id:06}")),
            student_id: student_id.clone(),
            job_id: job_id.clone(),
            status,
            applied_at: Utc::now(),
        };
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("applications mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("applications mutex poisoned");
        let application = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        application.status = status;
        Ok(application.clone())
    }
}

/// Lookup misses the existing row, so only the insert-time constraint sees the duplicate.
pub(super) struct RacingApplications;

impl ApplicationRepository for RacingApplications {
    fn find_by_student_and_job(
        &self,
        _student_id: &StudentId,
        _job_id: &JobId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(None)
    }

    fn find_hired_by_student(
        &self,
        _student_id: &StudentId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(None)
    }

    fn insert(
        &self,
        _student_id: &StudentId,
        _job_id: &JobId,
        _status: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(None)
    }

    fn update_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        Err(RepositoryError::NotFound)
    }
}

pub(super) struct UnavailableJobs;

impl JobRepository for UnavailableJobs {
    fn find_by_id(&self, _job_id: &JobId) -> Result<Option<JobPosting>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct UnavailableStudents;

impl StudentRepository for UnavailableStudents {
    fn find_academic_record(
        &self,
        _student_id: &StudentId,
    ) -> Result<Option<RawAcademicRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("profile store offline".to_string()))
    }

    fn is_placed(&self, _student_id: &StudentId) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("profile store offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }
}

impl NotificationPublisher for MemoryNotifications {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct FailingNotifications;

impl NotificationPublisher for FailingNotifications {
    fn publish(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay down".to_string()))
    }
}

pub(super) type MemoryService = PlacementApplicationService<
    MemoryJobs,
    MemoryStudents,
    MemoryApplications,
    MemoryNotifications,
>;

pub(super) struct Harness {
    pub(super) service: MemoryService,
    pub(super) applications: Arc<MemoryApplications>,
    pub(super) notifications: Arc<MemoryNotifications>,
}

pub(super) fn build_service(
    jobs: Vec<JobPosting>,
    placed: bool,
    record: Option<RawAcademicRecord>,
) -> Harness {
    let applications = Arc::new(MemoryApplications::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = PlacementApplicationService::new(
        Arc::new(MemoryJobs::with(jobs)),
        Arc::new(MemoryStudents::with(student_id(), placed, record)),
        applications.clone(),
        notifications.clone(),
        SalaryGate::default(),
    );
    Harness {
        service,
        applications,
        notifications,
    }
}

pub(super) fn raw(value: Value) -> Option<RawAcademicRecord> {
    match value {
        Value::Object(map) => Some(RawAcademicRecord::Object(map)),
        Value::String(encoded) => Some(RawAcademicRecord::Encoded(encoded)),
        other => Some(RawAcademicRecord::Encoded(other.to_string())),
    }
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    application_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
