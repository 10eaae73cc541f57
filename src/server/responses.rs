use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::error::ProjectError;
use crate::models::Project;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectsResponse {
    pub projects: Vec<Project>,
}

/// `{"id"?, "status", "reason"?}` body returned by every mutating endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StatusResponse {
    pub fn ok(id: Option<i64>) -> Self {
        Self {
            id,
            status: "ok".to_string(),
            reason: None,
        }
    }
}

/// A `ProjectError` on its way out of a handler, tagged with the path id when
/// the endpoint echoes one.
#[derive(Debug)]
pub struct ApiError {
    pub id: Option<i64>,
    pub error: ProjectError,
}

impl ApiError {
    pub fn with_id(id: i64, error: ProjectError) -> Self {
        Self { id: Some(id), error }
    }

    /// Failures on our side rather than in the request.
    fn is_server_fault(&self) -> bool {
        matches!(self.error, ProjectError::Io { .. } | ProjectError::Store(_))
    }
}

impl From<ProjectError> for ApiError {
    fn from(error: ProjectError) -> Self {
        Self { id: None, error }
    }
}

/// Always 200: clients read the outcome from `status` and `reason`.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_server_fault() {
            error!("Request failed: {}", self.error);
        } else {
            warn!("Request rejected: {}", self.error);
        }

        let body = StatusResponse {
            id: self.id,
            status: self.error.status().to_string(),
            reason: Some(self.error.reason().to_string()),
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

/// 302 redirect, matching what browsers and the existing front-end expect.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
