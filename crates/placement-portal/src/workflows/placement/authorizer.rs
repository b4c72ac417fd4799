use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicantContext, Application, ApprovalStatus, JobPosting};
use super::eligibility::{EligibilityEvaluator, UnmetCriterion};
use super::money::job_salary;
use super::salary::SalaryGate;

/// Machine-readable rejection codes surfaced to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    NotFound,
    JobNotApproved,
    DeadlinePassed,
    Duplicate,
    SalaryCapExceeded,
    EligibilityNotMet,
}

impl ReasonCode {
    pub const fn label(self) -> &'static str {
        match self {
            ReasonCode::NotFound => "NOT_FOUND",
            ReasonCode::JobNotApproved => "JOB_NOT_APPROVED",
            ReasonCode::DeadlinePassed => "DEADLINE_PASSED",
            ReasonCode::Duplicate => "DUPLICATE",
            ReasonCode::SalaryCapExceeded => "SALARY_CAP_EXCEEDED",
            ReasonCode::EligibilityNotMet => "ELIGIBILITY_NOT_MET",
        }
    }
}

/// Why a submission attempt was turned away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RejectionReason {
    JobNotFound,
    JobNotApproved {
        status: ApprovalStatus,
    },
    DeadlinePassed {
        deadline: DateTime<Utc>,
    },
    Duplicate,
    SalaryCapExceeded {
        job_salary: f64,
        cap: f64,
    },
    EligibilityNotMet {
        unmet: Vec<UnmetCriterion>,
    },
}

impl RejectionReason {
    pub fn code(&self) -> ReasonCode {
        match self {
            RejectionReason::JobNotFound => ReasonCode::NotFound,
            RejectionReason::JobNotApproved { .. } => ReasonCode::JobNotApproved,
            RejectionReason::DeadlinePassed { .. } => ReasonCode::DeadlinePassed,
            RejectionReason::Duplicate => ReasonCode::Duplicate,
            RejectionReason::SalaryCapExceeded { .. } => ReasonCode::SalaryCapExceeded,
            RejectionReason::EligibilityNotMet { .. } => ReasonCode::EligibilityNotMet,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            RejectionReason::JobNotFound => "job not found".to_string(),
            RejectionReason::JobNotApproved { status } => format!(
                "job is not open for applications (approval status {})",
                status.label()
            ),
            RejectionReason::DeadlinePassed { deadline } => format!(
                "application deadline passed on {}",
                deadline.format("%Y-%m-%d %H:%M UTC")
            ),
            RejectionReason::Duplicate => "already applied to this job".to_string(),
            RejectionReason::SalaryCapExceeded { job_salary, cap } => format!(
                "job salary {job_salary:.0} exceeds the {cap:.0} allowed for placed students"
            ),
            RejectionReason::EligibilityNotMet { unmet } => {
                let reasons: Vec<String> = unmet.iter().map(UnmetCriterion::summary).collect();
                format!("eligibility criteria not met: {}", reasons.join("; "))
            }
        }
    }

    pub fn unmet_criteria(&self) -> Option<&[UnmetCriterion]> {
        match self {
            RejectionReason::EligibilityNotMet { unmet } => Some(unmet),
            _ => None,
        }
    }
}

/// Outcome of a submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplicationDecision {
    Accept,
    Reject(RejectionReason),
}

impl ApplicationDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ApplicationDecision::Accept)
    }

    pub fn reason_code(&self) -> Option<ReasonCode> {
        match self {
            ApplicationDecision::Accept => None,
            ApplicationDecision::Reject(reason) => Some(reason.code()),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            ApplicationDecision::Accept => "application accepted".to_string(),
            ApplicationDecision::Reject(reason) => reason.summary(),
        }
    }

    pub fn view(&self) -> DecisionView {
        match self {
            ApplicationDecision::Accept => DecisionView {
                decision: DecisionKind::Accept,
                reason_code: None,
                unmet_criteria: None,
            },
            ApplicationDecision::Reject(reason) => DecisionView {
                decision: DecisionKind::Reject,
                reason_code: Some(reason.code()),
                unmet_criteria: reason.unmet_criteria().map(<[UnmetCriterion]>::to_vec),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionKind {
    Accept,
    Reject,
}

/// Wire shape of a decision: `{decision, reasonCode, unmetCriteria?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionView {
    pub decision: DecisionKind,
    pub reason_code: Option<ReasonCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmet_criteria: Option<Vec<UnmetCriterion>>,
}

/// Ordered gate sequence deciding whether a student may apply to a job.
#[derive(Debug, Clone, Default)]
pub struct ApplicationAuthorizer {
    evaluator: EligibilityEvaluator,
    salary_gate: SalaryGate,
}

impl ApplicationAuthorizer {
    pub fn new(salary_gate: SalaryGate) -> Self {
        Self {
            evaluator: EligibilityEvaluator::authoritative(),
            salary_gate,
        }
    }

    pub fn salary_gate(&self) -> &SalaryGate {
        &self.salary_gate
    }

    pub fn evaluator(&self) -> &EligibilityEvaluator {
        &self.evaluator
    }

    /// Gates run in order and the first failure wins.
    pub fn authorize(
        &self,
        job: Option<&JobPosting>,
        applicant: &ApplicantContext,
        prior_applications: &[Application],
        now: DateTime<Utc>,
    ) -> ApplicationDecision {
        let Some(job) = job else {
            return ApplicationDecision::Reject(RejectionReason::JobNotFound);
        };

        if job.approval_status != ApprovalStatus::Approved {
            return ApplicationDecision::Reject(RejectionReason::JobNotApproved {
                status: job.approval_status,
            });
        }

        if job.application_deadline <= now {
            return ApplicationDecision::Reject(RejectionReason::DeadlinePassed {
                deadline: job.application_deadline,
            });
        }

        if prior_applications
            .iter()
            .any(|application| application.concerns(&applicant.student_id, &job.id))
        {
            return ApplicationDecision::Reject(RejectionReason::Duplicate);
        }

        let offered = job_salary(&job.job_description);
        if !self.salary_gate.check(
            applicant.already_hired,
            applicant.record.current_ctc,
            offered,
        ) {
            return ApplicationDecision::Reject(RejectionReason::SalaryCapExceeded {
                job_salary: offered.unwrap_or_default(),
                cap: self
                    .salary_gate
                    .cap_for(applicant.record.current_ctc)
                    .unwrap_or_default(),
            });
        }

        let verdict = self
            .evaluator
            .evaluate_text(job.eligibility_criteria.as_deref(), &applicant.record);
        if !verdict.ok {
            return ApplicationDecision::Reject(RejectionReason::EligibilityNotMet {
                unmet: verdict.unmet,
            });
        }

        ApplicationDecision::Accept
    }
}
