use crate::utils::error::{OrchestratorError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(OrchestratorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(OrchestratorError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(OrchestratorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(OrchestratorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(OrchestratorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(OrchestratorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 驗證埠號區間（含端點）
pub fn validate_port_range(field_name: &str, start: u16, end: u16) -> Result<()> {
    if start > end {
        return Err(OrchestratorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{}-{}", start, end),
            reason: "Range start must not exceed range end".to_string(),
        });
    }
    if start < 1024 {
        return Err(OrchestratorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{}-{}", start, end),
            reason: "Well-known ports (below 1024) cannot be managed".to_string(),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| OrchestratorError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OrchestratorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("health_check_url", "https://example.com").is_ok());
        assert!(validate_url("health_check_url", "http://localhost:8001/health").is_ok());
        assert!(validate_url("health_check_url", "").is_err());
        assert!(validate_url("health_check_url", "invalid-url").is_err());
        assert!(validate_url("health_check_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_port_range() {
        assert!(validate_port_range("ranges.frontend", 3000, 3099).is_ok());
        assert!(validate_port_range("ranges.frontend", 3099, 3000).is_err());
        assert!(validate_port_range("ranges.frontend", 80, 99).is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("probe.retries", 3, 1).is_ok());
        assert!(validate_positive_number("probe.retries", 0, 1).is_err());
    }
}
