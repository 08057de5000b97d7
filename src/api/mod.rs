use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::{error::PodcastError, models::Coordinate, podcast::PodcastService};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratePodcastRequest {
    pub location: ApiLocation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratePodcastResponse {
    /// Base64-encoded MP3
    pub audio: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Maps pipeline errors to status codes with a JSON body
pub struct ApiError(PodcastError);

impl From<PodcastError> for ApiError {
    fn from(err: PodcastError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(PodcastError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if self.0.is_timeout() {
            StatusCode::GATEWAY_TIMEOUT
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        if status.is_server_error() {
            tracing::error!("Podcast generation failed: {}", self.0);
        }
        let body = ApiErrorBody {
            error: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl TryFrom<ApiLocation> for Coordinate {
    type Error = PodcastError;

    fn try_from(location: ApiLocation) -> Result<Self, Self::Error> {
        Coordinate::new(location.latitude, location.longitude)
    }
}

#[derive(Clone)]
struct ApiState {
    service: Arc<PodcastService>,
    deadline: Duration,
}

/// API routes. A pipeline run longer than `deadline` is answered with 504.
pub fn router(service: Arc<PodcastService>, deadline: Duration) -> Router {
    Router::new()
        .route("/generate-podcast", post(generate_podcast))
        .with_state(ApiState { service, deadline })
}

async fn generate_podcast(
    State(state): State<ApiState>,
    payload: Result<Json<GeneratePodcastRequest>, JsonRejection>,
) -> Result<Json<GeneratePodcastResponse>, ApiError> {
    let Json(request) = payload?;
    let coordinate = Coordinate::try_from(request.location)?;

    let episode = tokio::time::timeout(state.deadline, state.service.generate(&coordinate))
        .await
        .map_err(|_| PodcastError::timeout(state.deadline))??;
    Ok(Json(GeneratePodcastResponse {
        audio: episode.audio,
    }))
}
