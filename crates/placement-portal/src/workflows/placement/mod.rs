//! Campus placement applications: eligibility matching, salary gating and submission
//! authorization, plus the repository seams and HTTP routes around them.

pub mod authorizer;
pub mod domain;
pub mod eligibility;
pub mod import;
pub mod money;
pub mod repository;
pub mod router;
pub mod salary;
pub mod service;

#[cfg(test)]
mod tests;

pub use authorizer::{
    ApplicationAuthorizer, ApplicationDecision, DecisionKind, DecisionView, ReasonCode,
    RejectionReason,
};
pub use domain::{
    AcademicRecord, ApplicantContext, Application, ApplicationId, ApplicationStatus,
    ApprovalStatus, JobId, JobPosting, RawAcademicRecord, StudentId,
};
pub use eligibility::{
    CriterionField, CriterionValue, DegreeMatch, EligibilityCriteria, EligibilityEvaluator,
    EligibilityVerdict, UnmetCriterion,
};
pub use import::{ImportError, PlacementDataImporter, StudentSeed};
pub use repository::{
    ApplicationRepository, JobRepository, Notification, NotificationError,
    NotificationPublisher, RepositoryError, StudentRepository,
};
pub use router::application_router;
pub use salary::SalaryGate;
pub use service::{
    EligibilityPreview, PlacementApplicationService, PlacementServiceError, SubmissionOutcome,
};
