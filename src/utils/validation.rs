use crate::utils::error::{Result, ScheduleError};
use chrono::FixedOffset;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ScheduleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ScheduleError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ScheduleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| ScheduleError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScheduleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Provider ids end up as a URL path segment.
pub fn validate_path_segment(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;
    if value.contains('/') || value.contains('?') || value.contains('#') {
        return Err(ScheduleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot contain '/', '?' or '#'".to_string(),
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
        return Err(ScheduleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Parses an offset such as "-03:00" or "+0530".
pub fn parse_utc_offset(field_name: &str, value: &str) -> Result<FixedOffset> {
    value
        .trim()
        .parse::<FixedOffset>()
        .map_err(|e| ScheduleError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Not a UTC offset: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api.base_url", "https://example.com").is_ok());
        assert!(validate_url("api.base_url", "http://localhost:3333").is_ok());
        assert!(validate_url("api.base_url", "").is_err());
        assert!(validate_url("api.base_url", "invalid-url").is_err());
        assert!(validate_url("api.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_path_segment() {
        assert!(validate_path_segment("provider_id", "b6f0c2a1").is_ok());
        assert!(validate_path_segment("provider_id", "  ").is_err());
        assert!(validate_path_segment("provider_id", "a/b").is_err());
    }

    #[test]
    fn test_parse_utc_offset() {
        let offset = parse_utc_offset("calendar.utc_offset", "-03:00").unwrap();
        assert_eq!(offset.local_minus_utc(), -3 * 3600);
        assert!(parse_utc_offset("calendar.utc_offset", "America/Sao_Paulo").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some(5u64);
        let missing: Option<u64> = None;
        assert_eq!(*validate_required_field("timeout", &present).unwrap(), 5);
        assert!(matches!(
            validate_required_field("timeout", &missing),
            Err(ScheduleError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("api.timeout_seconds", 10, 1, 300).is_ok());
        assert!(validate_range("api.timeout_seconds", 0, 1, 300).is_err());
        assert!(validate_range("api.timeout_seconds", 301, 1, 300).is_err());
    }
}
