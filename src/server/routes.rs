use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, Path, State},
    response::{Json, Response},
    Form,
};
use log::debug;
use serde::Deserialize;

use super::responses::{found, ApiError, ProjectsResponse, StatusResponse};
use crate::context::AppContext;
use crate::error::ProjectError;
use crate::services::ProjectService;

#[derive(Debug, Default, Deserialize)]
pub struct CreateProjectRequest {
    pub proj_name: Option<String>,
    pub pl_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenameProjectForm {
    pub proj_name: Option<String>,
}

fn parse_proj_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ProjectError::InvalidId(raw.to_string()).into())
}

/// `GET /`
pub async fn list_projects(
    State(ctx): State<AppContext>,
) -> Result<Json<ProjectsResponse>, ApiError> {
    let projects = ProjectService::list_projects(&ctx).await?;
    Ok(Json(ProjectsResponse { projects }))
}

/// `GET /create`
pub async fn create_form() -> Response {
    found("/")
}

/// `POST /create`
pub async fn create_project(
    State(ctx): State<AppContext>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Unreadable create body: {}", rejection);
            CreateProjectRequest::default()
        }
    };

    ProjectService::create_project(&ctx, request.proj_name, request.pl_type).await?;
    Ok(Json(StatusResponse::ok(None)))
}

/// `DELETE /proj/:proj_id`
pub async fn delete_project(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let proj_id = parse_proj_id(&raw_id)?;
    ProjectService::delete_project(&ctx, proj_id)
        .await
        .map_err(|e| ApiError::with_id(proj_id, e))?;
    Ok(Json(StatusResponse::ok(Some(proj_id))))
}

/// `PUT /proj/:proj_id` with form field `proj_name`
pub async fn rename_project(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
    form: Result<Form<RenameProjectForm>, FormRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let proj_id = parse_proj_id(&raw_id)?;
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!("Unreadable rename form: {}", rejection);
            RenameProjectForm::default()
        }
    };

    ProjectService::rename_project(&ctx, proj_id, form.proj_name)
        .await
        .map_err(|e| ApiError::with_id(proj_id, e))?;
    Ok(Json(StatusResponse::ok(Some(proj_id))))
}

/// `GET /open/:proj_id`
pub async fn open_project(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let proj_id = parse_proj_id(&raw_id)?;
    let url = ProjectService::open_url(&ctx, proj_id).await?;
    Ok(found(url.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_proj_id() {
        assert_eq!(parse_proj_id("12").unwrap(), 12);
        assert_eq!(parse_proj_id(" 3 ").unwrap(), 3);

        let err = parse_proj_id("abc").unwrap_err();
        assert!(matches!(err.error, ProjectError::InvalidId(_)));
        assert_eq!(err.id, None);
    }
}
