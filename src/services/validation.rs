// ABOUTME: Shape validation for servers and agents against the entity invariants
// ABOUTME: Pure functions; services call these before touching a repository

use crate::models::{Agent, Server, Visibility};
use registry_core::constants::rating::{MAX_RATING, MIN_RATING};
use registry_core::{AppError, AppResult};

/// `path` must be `/foo` or `/foo/bar` shaped: leading slash, no `//`, no
/// trailing slash beyond the root.
pub fn validate_path(path: &str) -> AppResult<()> {
    if !path.starts_with('/') {
        return Err(AppError::validation(format!("path '{path}' must start with '/'")));
    }
    if path.contains("//") {
        return Err(AppError::validation(format!("path '{path}' must not contain '//'")));
    }
    if path.len() > 1 && path.ends_with('/') {
        return Err(AppError::validation(format!("path '{path}' must not end with '/'")));
    }
    Ok(())
}

pub fn validate_server(server: &Server) -> AppResult<()> {
    validate_path(&server.path)?;
    if server.server_name.trim().is_empty() {
        return Err(AppError::validation("server_name must not be empty"));
    }
    if server.proxy_pass_url.trim().is_empty() {
        return Err(AppError::validation("proxy_pass_url must not be empty"));
    }
    Ok(())
}

pub fn validate_agent(agent: &Agent) -> AppResult<()> {
    validate_path(&agent.path)?;
    if agent.name.trim().is_empty() {
        return Err(AppError::validation("agent name must not be empty"));
    }
    if !(agent.url.starts_with("http://") || agent.url.starts_with("https://")) {
        return Err(AppError::validation("agent url must be http or https"));
    }
    if agent.visibility == Visibility::GroupRestricted && agent.allowed_groups.is_empty() {
        return Err(AppError::validation(
            "group-restricted agent must have a non-empty allowed_groups",
        ));
    }
    for skill in &agent.skills {
        if skill.id.trim().is_empty() {
            return Err(AppError::validation("skill id must not be empty"));
        }
    }
    let mut seen_skill_ids = std::collections::BTreeSet::new();
    for skill in &agent.skills {
        if !seen_skill_ids.insert(skill.id.as_str()) {
            return Err(AppError::validation(format!("duplicate skill id '{}'", skill.id)));
        }
    }
    if agent.has_dangling_security_refs() {
        return Err(AppError::validation(
            "security requirement references an undeclared security scheme",
        ));
    }
    Ok(())
}

pub fn validate_rating(rating: u8) -> AppResult<()> {
    if rating < MIN_RATING || rating > MAX_RATING {
        return Err(AppError::validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_paths() {
        assert!(validate_path("/foo").is_ok());
        assert!(validate_path("/foo/bar").is_ok());
    }

    #[test]
    fn rejects_missing_leading_slash() {
        assert!(validate_path("foo").is_err());
    }

    #[test]
    fn rejects_double_slash() {
        assert!(validate_path("/foo//bar").is_err());
    }

    #[test]
    fn rejects_trailing_slash() {
        assert!(validate_path("/foo/").is_err());
    }

    #[test]
    fn rejects_rating_out_of_range() {
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(3).is_ok());
    }
}
