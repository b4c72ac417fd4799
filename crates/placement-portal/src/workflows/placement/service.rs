use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::authorizer::{ApplicationAuthorizer, ApplicationDecision, RejectionReason};
use super::domain::{
    AcademicRecord, ApplicantContext, Application, ApplicationId, ApplicationStatus, JobId,
    StudentId,
};
use super::eligibility::{self, DegreeMatch, EligibilityCriteria, EligibilityVerdict};
use super::money::job_salary;
use super::repository::{
    ApplicationRepository, JobRepository, Notification, NotificationPublisher,
    RepositoryError, StudentRepository,
};
use super::salary::SalaryGate;

/// Service composing the repositories with the application authorizer.
pub struct PlacementApplicationService<J, S, A, N> {
    jobs: Arc<J>,
    students: Arc<S>,
    applications: Arc<A>,
    notifications: Arc<N>,
    authorizer: ApplicationAuthorizer,
}

/// Result of a submission attempt that reached a decision.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Accepted(Application),
    Rejected(RejectionReason),
}

/// Read-only eligibility check for the job page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityPreview {
    pub job_id: JobId,
    pub student_id: StudentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub criteria: EligibilityCriteria,
    pub verdict: EligibilityVerdict,
    /// Looser degree comparison; informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_salary: Option<f64>,
    pub salary_gate_allowed: bool,
    pub already_applied: bool,
}

impl<J, S, A, N> PlacementApplicationService<J, S, A, N>
where
    J: JobRepository + 'static,
    S: StudentRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(
        jobs: Arc<J>,
        students: Arc<S>,
        applications: Arc<A>,
        notifications: Arc<N>,
        salary_gate: SalaryGate,
    ) -> Self {
        Self {
            jobs,
            students,
            applications,
            notifications,
            authorizer: ApplicationAuthorizer::new(salary_gate),
        }
    }

    pub fn authorizer(&self) -> &ApplicationAuthorizer {
        &self.authorizer
    }

    /// Submit an application using the current time for the deadline gate.
    pub fn apply(
        &self,
        student_id: &StudentId,
        job_id: &JobId,
    ) -> Result<SubmissionOutcome, PlacementServiceError> {
        self.apply_at(student_id, job_id, Utc::now())
    }

    pub fn apply_at(
        &self,
        student_id: &StudentId,
        job_id: &JobId,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, PlacementServiceError> {
        let Some(job) = self.jobs.find_by_id(job_id)? else {
            info!(student = %student_id.0, job = %job_id.0, "application for unknown job");
            return Ok(SubmissionOutcome::Rejected(RejectionReason::JobNotFound));
        };
        let applicant = self.applicant_context(student_id)?;
        let prior: Vec<Application> = self
            .applications
            .find_by_student_and_job(student_id, job_id)?
            .into_iter()
            .collect();

        let decision = self
            .authorizer
            .authorize(Some(&job), &applicant, &prior, now);

        if let ApplicationDecision::Reject(reason) = decision {
            info!(
                student = %student_id.0,
                job = %job_id.0,
                reason = reason.code().label(),
                "application rejected"
            );
            return Ok(SubmissionOutcome::Rejected(reason));
        }

        let application =
            match self
                .applications
                .insert(student_id, job_id, ApplicationStatus::Applied)
            {
                Ok(application) => application,
                Err(RepositoryError::Conflict) => {
                    info!(
                        student = %student_id.0,
                        job = %job_id.0,
                        "duplicate application caught at insert"
                    );
                    return Ok(SubmissionOutcome::Rejected(RejectionReason::Duplicate));
                }
                Err(other) => return Err(other.into()),
            };

        info!(
            application = %application.id.0,
            student = %student_id.0,
            job = %job_id.0,
            "application accepted"
        );

        let mut details = BTreeMap::new();
        details.insert("application_id".to_string(), application.id.0.clone());
        details.insert("job_id".to_string(), job_id.0.clone());
        self.notify("application_submitted", student_id, details);

        Ok(SubmissionOutcome::Accepted(application))
    }

    /// Evaluate eligibility without submitting. Uses the same engine as [`Self::apply`].
    pub fn preview(
        &self,
        student_id: &StudentId,
        job_id: &JobId,
    ) -> Result<EligibilityPreview, PlacementServiceError> {
        let job = self
            .jobs
            .find_by_id(job_id)?
            .ok_or(RepositoryError::NotFound)?;
        let applicant = self.applicant_context(student_id)?;
        let already_applied = self
            .applications
            .find_by_student_and_job(student_id, job_id)?
            .is_some();

        let criteria = eligibility::parse(job.eligibility_criteria.as_deref());
        let verdict = self
            .authorizer
            .evaluator()
            .evaluate(&criteria, &applicant.record);
        debug!(
            student = %student_id.0,
            job = %job_id.0,
            constrained = criteria.has_requirements(),
            unmet = ?verdict.unmet_fields(),
            "eligibility preview"
        );
        let degree_hint = criteria.degree.as_deref().map(|required| {
            DegreeMatch::Bucket.matches(required, applicant.record.course_enrolled.as_deref())
        });
        let offered = job_salary(&job.job_description);
        let salary_gate_allowed = self.authorizer.salary_gate().check(
            applicant.already_hired,
            applicant.record.current_ctc,
            offered,
        );

        Ok(EligibilityPreview {
            title: job.title(),
            job_id: job.id,
            student_id: student_id.clone(),
            criteria,
            verdict,
            degree_hint,
            job_salary: offered,
            salary_gate_allowed,
            already_applied,
        })
    }

    /// Recruiter-driven status change, validated against the application lifecycle.
    pub fn update_status(
        &self,
        application_id: &ApplicationId,
        next: ApplicationStatus,
    ) -> Result<Application, PlacementServiceError> {
        let current = self.get(application_id)?;
        if !current.status.can_transition_to(next) {
            return Err(PlacementServiceError::InvalidTransition {
                from: current.status,
                to: next,
            });
        }

        let updated = self.applications.update_status(application_id, next)?;
        info!(
            application = %application_id.0,
            from = current.status.label(),
            to = next.label(),
            "application status changed"
        );

        let mut details = BTreeMap::new();
        details.insert("application_id".to_string(), updated.id.0.clone());
        details.insert("status".to_string(), next.label().to_string());
        self.notify("application_status_changed", &updated.student_id, details);

        Ok(updated)
    }

    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Application, PlacementServiceError> {
        let application = self
            .applications
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    fn applicant_context(
        &self,
        student_id: &StudentId,
    ) -> Result<ApplicantContext, PlacementServiceError> {
        let record = AcademicRecord::from_raw(self.students.find_academic_record(student_id)?);
        let already_hired = self.students.is_placed(student_id)?
            || self
                .applications
                .find_hired_by_student(student_id)?
                .is_some();

        Ok(ApplicantContext {
            student_id: student_id.clone(),
            record,
            already_hired,
        })
    }

    // Delivery failures never undo a persisted change.
    fn notify(&self, template: &str, student_id: &StudentId, details: BTreeMap<String, String>) {
        let notification = Notification {
            template: template.to_string(),
            student_id: student_id.clone(),
            details,
        };
        if let Err(err) = self.notifications.publish(notification) {
            warn!(student = %student_id.0, template, error = %err, "notification not delivered");
        }
    }
}

/// Error raised by the placement application service.
#[derive(Debug, thiserror::Error)]
pub enum PlacementServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("cannot move application from {} to {}", from.label(), to.label())]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
}
