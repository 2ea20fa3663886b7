use crate::utils::error::{AppHostError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

const MAX_SERVICE_NAME_LEN: usize = 64;

/// Resource names: ASCII letters, digits and hyphens, starting with a letter,
/// with no trailing or consecutive hyphens.
pub fn validate_service_name(field_name: &str, name: &str) -> Result<()> {
    let invalid = |reason: &str| AppHostError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("Service name cannot be empty"));
    }
    if name.len() > MAX_SERVICE_NAME_LEN {
        return Err(invalid("Service name must be at most 64 characters"));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(invalid("Service name must start with an ASCII letter"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid(
            "Service name may only contain ASCII letters, digits and hyphens",
        ));
    }
    if name.ends_with('-') {
        return Err(invalid("Service name cannot end with a hyphen"));
    }
    if name.contains("--") {
        return Err(invalid("Service name cannot contain consecutive hyphens"));
    }

    Ok(())
}

pub fn validate_host(field_name: &str, host: &str) -> Result<()> {
    validate_non_empty_string(field_name, host)?;

    match Url::parse(&format!("http://{}", host)) {
        Ok(url) if url.host_str().is_some() && url.port().is_none() && url.path() == "/" => {
            Ok(())
        }
        Ok(_) => Err(AppHostError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: host.to_string(),
            reason: "Expected a bare host name without port or path".to_string(),
        }),
        Err(e) => Err(AppHostError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: host.to_string(),
            reason: format!("Invalid host: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppHostError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AppHostError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
