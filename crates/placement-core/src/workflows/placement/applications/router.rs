use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    Actor, ApplicationId, ApplicationPatch, ApplicationStatus, NewApplication, Role,
};
use super::machine::TransitionError;
use super::service::{ApplicationService, ApplicationServiceError};
use super::store::{ApplicationStore, CompanyDirectory, StoreError, StudentDirectory};

/// Router builder exposing the application lifecycle endpoints.
///
/// Auth happens upstream; the gateway forwards the resolved identity in the
/// `x-actor-id` / `x-actor-role` headers, which the [`Actor`] extractor
/// consumes. Responses use the portal envelope
/// `{"success": bool, "data": ..., "message": ...}`.
pub fn application_router<S, D, C>(service: Arc<ApplicationService<S, D, C>>) -> Router
where
    S: ApplicationStore + 'static,
    D: StudentDirectory + 'static,
    C: CompanyDirectory + 'static,
{
    Router::new()
        .route(
            "/api/applications",
            get(list_handler::<S, D, C>).post(create_handler::<S, D, C>),
        )
        .route(
            "/api/applications/:application_id",
            get(get_handler::<S, D, C>)
                .put(update_handler::<S, D, C>)
                .delete(delete_handler::<S, D, C>),
        )
        .route("/api/stats", get(stats_handler::<S, D, C>))
        .with_state(service)
}

const ACTOR_ID_HEADER: &str = "x-actor-id";
const ACTOR_ROLE_HEADER: &str = "x-actor-role";

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let role = parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(Role::parse);

        match (id, role) {
            (Some(id), Some(role)) => Ok(Actor {
                id: id.to_string(),
                role,
            }),
            _ => Err(failure(
                StatusCode::UNAUTHORIZED,
                "Authentication required",
            )),
        }
    }
}

/// Wire shape for `PUT /api/applications/:id`. The status arrives as a free
/// string and is validated against the closed enum before anything runs.
#[derive(Debug, Deserialize)]
pub(crate) struct UpdateApplicationRequest {
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) remarks: Option<String>,
    #[serde(default)]
    pub(crate) resume_url: Option<String>,
    #[serde(default)]
    pub(crate) cover_letter: Option<String>,
}

impl UpdateApplicationRequest {
    fn into_patch(self) -> Result<ApplicationPatch, ApplicationServiceError> {
        let status = match self.status {
            Some(raw) => Some(ApplicationStatus::parse(&raw).ok_or_else(|| {
                ApplicationServiceError::Validation(format!(
                    "status must be one of pending, under_review, approved, rejected (got '{raw}')"
                ))
            })?),
            None => None,
        };

        Ok(ApplicationPatch {
            status,
            remarks: self.remarks,
            resume_url: self.resume_url,
            cover_letter: self.cover_letter,
        })
    }
}

pub(crate) async fn list_handler<S, D, C>(
    State(service): State<Arc<ApplicationService<S, D, C>>>,
    actor: Actor,
) -> Response
where
    S: ApplicationStore + 'static,
    D: StudentDirectory + 'static,
    C: CompanyDirectory + 'static,
{
    match service.list(&actor) {
        Ok(views) => success(StatusCode::OK, views),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<S, D, C>(
    State(service): State<Arc<ApplicationService<S, D, C>>>,
    Path(application_id): Path<String>,
    actor: Actor,
) -> Response
where
    S: ApplicationStore + 'static,
    D: StudentDirectory + 'static,
    C: CompanyDirectory + 'static,
{
    match service.get(&ApplicationId(application_id), &actor) {
        Ok(view) => success(StatusCode::OK, view),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<S, D, C>(
    State(service): State<Arc<ApplicationService<S, D, C>>>,
    actor: Actor,
    axum::Json(request): axum::Json<NewApplication>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: StudentDirectory + 'static,
    C: CompanyDirectory + 'static,
{
    match service.create(&actor, request) {
        Ok(view) => success(StatusCode::CREATED, view),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<S, D, C>(
    State(service): State<Arc<ApplicationService<S, D, C>>>,
    Path(application_id): Path<String>,
    actor: Actor,
    axum::Json(request): axum::Json<UpdateApplicationRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    D: StudentDirectory + 'static,
    C: CompanyDirectory + 'static,
{
    let patch = match request.into_patch() {
        Ok(patch) => patch,
        Err(error) => return error_response(error),
    };

    match service.update(&ApplicationId(application_id), &actor, patch) {
        Ok(report) if report.rejected_siblings > 0 => {
            let message = format!(
                "Student placed; {} other application(s) were automatically rejected",
                report.rejected_siblings
            );
            (
                StatusCode::OK,
                axum::Json(json!({
                    "success": true,
                    "data": report.application,
                    "message": message,
                })),
            )
                .into_response()
        }
        Ok(report) => success(StatusCode::OK, report.application),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<S, D, C>(
    State(service): State<Arc<ApplicationService<S, D, C>>>,
    Path(application_id): Path<String>,
    actor: Actor,
) -> Response
where
    S: ApplicationStore + 'static,
    D: StudentDirectory + 'static,
    C: CompanyDirectory + 'static,
{
    match service.delete(&ApplicationId(application_id), &actor) {
        Ok(()) => success(StatusCode::OK, json!({})),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stats_handler<S, D, C>(
    State(service): State<Arc<ApplicationService<S, D, C>>>,
    actor: Actor,
) -> Response
where
    S: ApplicationStore + 'static,
    D: StudentDirectory + 'static,
    C: CompanyDirectory + 'static,
{
    match service.stats(&actor) {
        Ok(stats) => success(StatusCode::OK, stats),
        Err(error) => error_response(error),
    }
}

fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        axum::Json(json!({ "success": true, "data": data })),
    )
        .into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        axum::Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

fn error_response(error: ApplicationServiceError) -> Response {
    match error {
        ApplicationServiceError::Forbidden => failure(StatusCode::FORBIDDEN, "Not authorized"),
        ApplicationServiceError::AlreadyPlaced => failure(
            StatusCode::BAD_REQUEST,
            "You are already placed and cannot apply to other companies",
        ),
        ApplicationServiceError::Ineligible { .. } => {
            failure(StatusCode::BAD_REQUEST, &error.to_string())
        }
        ApplicationServiceError::UnknownStudent => {
            failure(StatusCode::NOT_FOUND, "Student record not found")
        }
        ApplicationServiceError::Validation(message) => {
            failure(StatusCode::BAD_REQUEST, &message)
        }
        ApplicationServiceError::Transition(error) => transition_response(error),
        ApplicationServiceError::Store(error) => store_response(error),
    }
}

fn transition_response(error: TransitionError) -> Response {
    match error {
        TransitionError::Forbidden => failure(StatusCode::FORBIDDEN, "Not authorized"),
        TransitionError::PlacementLocked => failure(
            StatusCode::BAD_REQUEST,
            "Student is already placed in another company. Status cannot be changed.",
        ),
        TransitionError::ConcurrencyConflict => failure(
            StatusCode::BAD_REQUEST,
            "Student was placed by a concurrent approval",
        ),
        TransitionError::UnknownStudent => {
            failure(StatusCode::NOT_FOUND, "Student record not found")
        }
        TransitionError::Store(error) => store_response(error),
    }
}

fn store_response(error: StoreError) -> Response {
    match error {
        StoreError::Duplicate => failure(
            StatusCode::BAD_REQUEST,
            "You have already applied to this company",
        ),
        StoreError::NotFound => failure(StatusCode::NOT_FOUND, "Application not found"),
        StoreError::Unavailable(detail) => {
            tracing::error!(%detail, "application store unavailable");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
        }
    }
}
