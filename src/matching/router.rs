use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use uuid::Uuid;

use super::domain::{CandidateFormData, CandidateId};
use super::ranker::ShortlistRanker;
use super::repository::{CandidateStore, MatchStore};
use super::service::{MatchingError, MatchingService};

/// Router builder exposing the matching API.
pub fn matching_router<S, K>(service: Arc<MatchingService<S, K>>) -> Router
where
    S: CandidateStore + MatchStore + 'static,
    K: ShortlistRanker + 'static,
{
    Router::new()
        .route("/api/skills", get(skills_handler::<S, K>))
        .route("/api/locations", get(locations_handler::<S, K>))
        .route("/api/matches", post(submit_handler::<S, K>))
        .route("/api/matches/:candidate_id", get(history_handler::<S, K>))
        .with_state(service)
}

pub(crate) async fn skills_handler<S, K>(
    State(service): State<Arc<MatchingService<S, K>>>,
) -> Response
where
    S: CandidateStore + MatchStore + 'static,
    K: ShortlistRanker + 'static,
{
    let payload = json!({ "skills": service.skills() });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn locations_handler<S, K>(
    State(service): State<Arc<MatchingService<S, K>>>,
) -> Response
where
    S: CandidateStore + MatchStore + 'static,
    K: ShortlistRanker + 'static,
{
    let payload = json!({ "locations": service.locations() });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn submit_handler<S, K>(
    State(service): State<Arc<MatchingService<S, K>>>,
    axum::Json(form): axum::Json<CandidateFormData>,
) -> Response
where
    S: CandidateStore + MatchStore + 'static,
    K: ShortlistRanker + 'static,
{
    match service.submit(form).await {
        Ok(outcome) => {
            let payload = json!({
                "matches": outcome.matches,
                "candidateId": outcome.candidate_id,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(MatchingError::Validation(error)) => {
            let payload = json!({ "message": error.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "message": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn history_handler<S, K>(
    State(service): State<Arc<MatchingService<S, K>>>,
    Path(candidate_id): Path<Uuid>,
) -> Response
where
    S: CandidateStore + MatchStore + 'static,
    K: ShortlistRanker + 'static,
{
    match service.history(&CandidateId(candidate_id)) {
        Ok(matches) => {
            let payload = json!({ "matches": matches });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "message": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
