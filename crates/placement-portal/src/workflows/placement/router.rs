use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::authorizer::{ApplicationDecision, DecisionView, ReasonCode, RejectionReason};
use super::domain::{ApplicationId, ApplicationStatus, JobId, StudentId};
use super::repository::{
    ApplicationRepository, JobRepository, NotificationPublisher, RepositoryError,
    StudentRepository,
};
use super::service::{PlacementApplicationService, PlacementServiceError, SubmissionOutcome};

type SharedService<J, S, A, N> = Arc<PlacementApplicationService<J, S, A, N>>;

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyRequest {
    pub student_id: StudentId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ApplicationStatus,
}

/// Router builder exposing application submission, preview and status endpoints.
pub fn application_router<J, S, A, N>(service: SharedService<J, S, A, N>) -> Router
where
    J: JobRepository + 'static,
    S: StudentRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs/:job_id/applications",
            post(apply_handler::<J, S, A, N>),
        )
        .route(
            "/api/v1/jobs/:job_id/eligibility/:student_id",
            get(preview_handler::<J, S, A, N>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<J, S, A, N>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            patch(update_status_handler::<J, S, A, N>),
        )
        .with_state(service)
}

pub(crate) fn rejection_status(code: ReasonCode) -> StatusCode {
    match code {
        ReasonCode::NotFound => StatusCode::NOT_FOUND,
        ReasonCode::JobNotApproved
        | ReasonCode::DeadlinePassed
        | ReasonCode::Duplicate
        | ReasonCode::SalaryCapExceeded
        | ReasonCode::EligibilityNotMet => StatusCode::BAD_REQUEST,
    }
}

/// Decision view plus a human-readable message.
#[derive(Debug, Serialize)]
struct RejectionBody {
    error: String,
    #[serde(flatten)]
    decision: DecisionView,
}

fn rejection_response(reason: RejectionReason) -> Response {
    let status = rejection_status(reason.code());
    let body = RejectionBody {
        error: reason.summary(),
        decision: ApplicationDecision::Reject(reason).view(),
    };
    (status, axum::Json(body)).into_response()
}

fn error_response(error: PlacementServiceError) -> Response {
    let status = match &error {
        PlacementServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PlacementServiceError::Repository(RepositoryError::Conflict)
        | PlacementServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
        PlacementServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn apply_handler<J, S, A, N>(
    State(service): State<SharedService<J, S, A, N>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<ApplyRequest>,
) -> Response
where
    J: JobRepository + 'static,
    S: StudentRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.apply(&request.student_id, &JobId(job_id)) {
        Ok(SubmissionOutcome::Accepted(application)) => {
            (StatusCode::CREATED, axum::Json(application)).into_response()
        }
        Ok(SubmissionOutcome::Rejected(reason)) => rejection_response(reason),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn preview_handler<J, S, A, N>(
    State(service): State<SharedService<J, S, A, N>>,
    Path((job_id, student_id)): Path<(String, String)>,
) -> Response
where
    J: JobRepository + 'static,
    S: StudentRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.preview(&StudentId(student_id), &JobId(job_id)) {
        Ok(preview) => (StatusCode::OK, axum::Json(preview)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<J, S, A, N>(
    State(service): State<SharedService<J, S, A, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    S: StudentRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_status_handler<J, S, A, N>(
    State(service): State<SharedService<J, S, A, N>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<StatusUpdateRequest>,
) -> Response
where
    J: JobRepository + 'static,
    S: StudentRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.update_status(&ApplicationId(application_id), request.status) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}
