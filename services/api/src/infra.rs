use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use placement_portal::config::PlacementConfig;
use placement_portal::error::AppError;
use placement_portal::workflows::placement::{
    Application, ApplicationId, ApplicationRepository, ApplicationStatus, JobId, JobPosting,
    JobRepository, Notification, NotificationError, NotificationPublisher, PlacementDataImporter,
    RawAcademicRecord, RepositoryError, StudentId, StudentRepository, StudentSeed,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryJobRepository {
    jobs: Arc<Mutex<HashMap<JobId, JobPosting>>>,
}

impl InMemoryJobRepository {
    pub(crate) fn from_postings(postings: Vec<JobPosting>) -> Self {
        let jobs = postings
            .into_iter()
            .map(|posting| (posting.id.clone(), posting))
            .collect();
        Self {
            jobs: Arc::new(Mutex::new(jobs)),
        }
    }
}

impl JobRepository for InMemoryJobRepository {
    fn find_by_id(&self, job_id: &JobId) -> Result<Option<JobPosting>, RepositoryError> {
        Ok(lock(&self.jobs)?.get(job_id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryStudentRepository {
    students: Arc<Mutex<HashMap<StudentId, StudentSeed>>>,
}

impl InMemoryStudentRepository {
    pub(crate) fn from_seeds(seeds: Vec<StudentSeed>) -> Self {
        let students = seeds
            .into_iter()
            .map(|seed| (seed.id.clone(), seed))
            .collect();
        Self {
            students: Arc::new(Mutex::new(students)),
        }
    }
}

impl StudentRepository for InMemoryStudentRepository {
    fn find_academic_record(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<RawAcademicRecord>, RepositoryError> {
        Ok(lock(&self.students)?
            .get(student_id)
            .and_then(|seed| seed.academic_record.clone()))
    }

    fn is_placed(&self, student_id: &StudentId) -> Result<bool, RepositoryError> {
        Ok(lock(&self.students)?
            .get(student_id)
            .is_some_and(|seed| seed.placed))
    }
}

/// Holds the (student, job) uniqueness check and the insert under one lock.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
    sequence: Arc<AtomicU64>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn find_by_student_and_job(
        &self,
        student_id: &StudentId,
        job_id: &JobId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(lock(&self.records)?
            .values()
            .find(|application| application.concerns(student_id, job_id))
            .cloned())
    }

    fn find_hired_by_student(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(lock(&self.records)?
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
        let mut guard = lock(&self.records)?;
        if guard
            .values()
            .any(|application| application.concerns(student_id, job_id))
        {
            return Err(RepositoryError::Conflict);
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let application = Application {
            id: ApplicationId(format!("app-{sequence:06}")),
            student_id: student_id.clone(),
            job_id: job_id.clone(),
            status,
            applied_at: Utc::now(),
        };
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let application = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        application.status = status;
        Ok(application.clone())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        info!(
            template = %notification.template,
            student = %notification.student_id.0,
            "notification queued"
        );
        self.events
            .lock()
            .map_err(|_| NotificationError::Transport("notification mutex poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}

#[cfg(test)]
impl InMemoryNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }
}

/// Load the optional CSV seeds named in the configuration.
pub(crate) fn seed_repositories(
    config: &PlacementConfig,
) -> Result<(InMemoryJobRepository, InMemoryStudentRepository), AppError> {
    let postings = match &config.jobs_csv {
        Some(path) => PlacementDataImporter::jobs_from_path(path)?,
        None => Vec::new(),
    };
    let seeds = match &config.students_csv {
        Some(path) => PlacementDataImporter::students_from_path(path)?,
        None => Vec::new(),
    };

    info!(
        jobs = postings.len(),
        students = seeds.len(),
        "placement seed data loaded"
    );

    Ok((
        InMemoryJobRepository::from_postings(postings),
        InMemoryStudentRepository::from_seeds(seeds),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> StudentId {
        StudentId("stu-7".to_string())
    }

    fn job() -> JobId {
        JobId("job-7".to_string())
    }

    #[test]
    fn application_repository_rejects_second_insert_for_same_pair() {
        let repository = InMemoryApplicationRepository::default();

        let first = repository
            .insert(&student(), &job(), ApplicationStatus::Applied)
            .expect("first insert");
        assert_eq!(first.id, ApplicationId("app-000001".to_string()));

        match repository.insert(&student(), &job(), ApplicationStatus::Applied) {
            Err(RepositoryError::Conflict) => {}
            other => panic!("expected conflict, got {other:?}"),
        }

        repository
            .insert(&student(), &JobId("job-8".to_string()), ApplicationStatus::Applied)
            .expect("different job is allowed");
    }

    #[test]
    fn hired_lookup_only_returns_hired_rows() {
        let repository = InMemoryApplicationRepository::default();
        let application = repository
            .insert(&student(), &job(), ApplicationStatus::Applied)
            .expect("insert");
        assert!(repository
            .find_hired_by_student(&student())
            .expect("lookup")
            .is_none());

        repository
            .update_status(&application.id, ApplicationStatus::Hired)
            .expect("update");
        assert!(repository
            .find_hired_by_student(&student())
            .expect("lookup")
            .is_some());
    }

    #[test]
    fn student_repository_exposes_seed_fields() {
        let repository = InMemoryStudentRepository::from_seeds(vec![StudentSeed {
            id: student(),
            placed: true,
            academic_record: Some(RawAcademicRecord::Encoded("{\"currentCGPA\": 8}".to_string())),
        }]);

        assert!(repository.is_placed(&student()).expect("lookup"));
        assert!(!repository
            .is_placed(&StudentId("unknown".to_string()))
            .expect("lookup"));
        assert!(repository
            .find_academic_record(&student())
            .expect("lookup")
            .is_some());
    }

    #[test]
    fn seeding_without_paths_yields_empty_repositories() {
        let (jobs, students) =
            seed_repositories(&PlacementConfig::default()).expect("empty seed");

        assert!(jobs.find_by_id(&job()).expect("lookup").is_none());
        assert!(!students.is_placed(&student()).expect("lookup"));
    }

    #[test]
    fn seeding_reports_missing_files() {
        let config = PlacementConfig {
            jobs_csv: Some("/nonexistent/placement/jobs.csv".into()),
            ..PlacementConfig::default()
        };

        assert!(matches!(
            seed_repositories(&config),
            Err(AppError::Import(_))
        ));
    }
}
