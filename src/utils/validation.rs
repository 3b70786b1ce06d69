use crate::utils::error::{NodeTypeError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(NodeTypeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(NodeTypeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Repository paths are absolute, `/`-separated and have no empty segments
/// (a single trailing slash is tolerated).
pub fn validate_repository_path(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    if !path.starts_with('/') {
        return Err(NodeTypeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Repository path must be absolute".to_string(),
        });
    }

    if path.trim_end_matches('/').contains("//") {
        return Err(NodeTypeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Repository path contains an empty segment".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| NodeTypeError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(NodeTypeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(NodeTypeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Unsupported value. Valid values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_repository_path() {
        assert!(validate_repository_path("root_path", "/jcr:system/jcr:nodeTypes").is_ok());
        assert!(validate_repository_path("root_path", "/").is_ok());
        assert!(validate_repository_path("root_path", "/jcr:system/").is_ok());
        assert!(validate_repository_path("root_path", "").is_err());
        assert!(validate_repository_path("root_path", "jcr:system").is_err());
        assert!(validate_repository_path("root_path", "/jcr:system//jcr:nodeTypes").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("nodetypes.json".to_string());
        let missing: Option<String> = None;
        assert_eq!(
            validate_required_field("repository.source", &present).unwrap(),
            "nodetypes.json"
        );
        assert!(matches!(
            validate_required_field("repository.source", &missing),
            Err(NodeTypeError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_one_of() {
        assert!(validate_one_of("logging.format", "json", &["compact", "json"]).is_ok());
        assert!(validate_one_of("logging.format", "xml", &["compact", "json"]).is_err());
        assert!(validate_non_empty_string("source", "   ").is_err());
    }
}
