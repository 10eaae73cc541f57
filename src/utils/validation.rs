use crate::error::{ProjectError, ProjectResult};
use crate::utils::paths::is_safe_dir_name;

/// Presence check for a project name, plus the minimum needed for it to be a
/// directory name under the projects root.
pub fn validate_proj_name(name: Option<&str>) -> ProjectResult<String> {
    let name = match name {
        Some(n) if !n.trim().is_empty() => n,
        _ => return Err(ProjectError::MissingField("proj_name")),
    };

    if !is_safe_dir_name(name) {
        return Err(ProjectError::InvalidName {
            name: name.to_string(),
            reason: "must be a single directory name".to_string(),
        });
    }

    Ok(name.to_string())
}

/// Empty or blank `pl_type` falls back to the default.
pub fn normalize_pl_type(pl_type: Option<String>) -> Option<String> {
    pl_type.filter(|p| !p.trim().is_empty())
}
