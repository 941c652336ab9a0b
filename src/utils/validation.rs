use crate::utils::error::{BridgeError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(BridgeError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    let extension = std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if allowed_set.contains(ext.as_str()) => Ok(()),
        Some(ext) => Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                ext,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| BridgeError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 值會被放進 HTTP header，不能含控制字元
pub fn validate_header_safe(field_name: &str, value: &str) -> Result<()> {
    if value.chars().any(|c| c.is_control() || !c.is_ascii()) {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "<redacted>".to_string(),
            reason: "Value contains characters not allowed in an HTTP header".to_string(),
        });
    }
    Ok(())
}

/// 拒絕還留著 `${VAR}` 的值，代表環境變數沒有被替換
pub fn validate_no_placeholder(field_name: &str, value: &str) -> Result<()> {
    let unresolved = value
        .find("${")
        .map(|start| value[start + 2..].contains('}'))
        .unwrap_or(false);

    if unresolved {
        return Err(BridgeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "<redacted>".to_string(),
            reason: "Value still contains an unresolved ${...} placeholder".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("endpoint", "https://example.com").is_ok());
        assert!(validate_url("endpoint", "http://example.com").is_ok());
        assert!(validate_url("endpoint", "").is_err());
        assert!(validate_url("endpoint", "invalid-url").is_err());
        assert!(validate_url("endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("limit", 5, 1).is_ok());
        assert!(validate_positive_number("limit", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        let allowed = ["xlsx", "csv"];
        assert!(validate_file_extension("parent_data_path", "data.xlsx", &allowed).is_ok());
        assert!(validate_file_extension("parent_data_path", "DATA.CSV", &allowed).is_ok());
        assert!(validate_file_extension("parent_data_path", "data.txt", &allowed).is_err());
        assert!(validate_file_extension("parent_data_path", "data", &allowed).is_err());
    }

    #[test]
    fn test_validate_header_safe() {
        assert!(validate_header_safe("api_token", "abc123").is_ok());
        assert!(validate_header_safe("api_token", "abc\n123").is_err());
    }

    #[test]
    fn test_validate_no_placeholder() {
        assert!(validate_no_placeholder("api_token", "abc123").is_ok());
        assert!(validate_no_placeholder("api_token", "price$5{x").is_ok());
        assert!(validate_no_placeholder("api_token", "${KOBO_API_TOKEN}").is_err());
        assert!(validate_no_placeholder("api_token", "pre-${X}-post").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("x".to_string());
        let absent: Option<String> = None;
        assert_eq!(validate_required_field("api_token", &present).unwrap(), "x");
        assert!(matches!(
            validate_required_field("api_token", &absent),
            Err(BridgeError::MissingConfigError { .. })
        ));
    }
}
