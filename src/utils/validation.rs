use crate::utils::error::{AuditError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[&str],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension) => {}
            Some(extension) => {
                return Err(AuditError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(AuditError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AuditError::InvalidConfigValueError {
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
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 欄位索引設定（0 起算）的合理範圍
pub fn validate_column_index(field_name: &str, column: Option<usize>) -> Result<()> {
    match column {
        Some(index) => validate_range(field_name, index, 0, 64),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output.path", "./reports").is_ok());
        assert!(validate_path("output.path", "").is_err());
        assert!(validate_path("output.path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("output.report_file", "report.json").is_ok());
        assert!(validate_non_empty_string("output.report_file", "   ").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("parser.name_column", 3, 0, 64).is_ok());
        assert!(validate_range("parser.name_column", 65, 0, 64).is_err());
    }

    #[test]
    fn test_validate_column_index() {
        assert!(validate_column_index("parser.credit_column", None).is_ok());
        assert!(validate_column_index("parser.credit_column", Some(2)).is_ok());
        assert!(validate_column_index("parser.credit_column", Some(100)).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        assert!(validate_file_extensions("input", &["mustlist.json", "grades.json"], &["json"]).is_ok());
        assert!(validate_file_extensions("input", &["mustlist.csv"], &["json"]).is_err());
        assert!(validate_file_extensions("input", &["mustlist"], &["json"]).is_err());
    }
}
