use crate::core::curriculum::ParserOptions;
use crate::core::ConfigProvider;
use crate::utils::error::{AuditError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub audit: AuditSection,
    pub input: InputConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSection {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_base_path")]
    pub base_path: String,
    pub curriculum: String,
    pub transcript: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    pub name_column: Option<usize>,
    pub credit_column: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    #[serde(default = "default_report_file")]
    pub report_file: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub json: bool,
}

fn default_base_path() -> String {
    ".".to_string()
}

fn default_report_file() -> String {
    "audit_report.json".to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AuditError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AuditError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})；未設定的保留原字串
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("audit.name", &self.audit.name)?;
        validation::validate_path("input.base_path", &self.input.base_path)?;
        validation::validate_path("input.curriculum", &self.input.curriculum)?;
        validation::validate_path("input.transcript", &self.input.transcript)?;
        validation::validate_file_extensions(
            "input",
            &[self.input.curriculum.as_str(), self.input.transcript.as_str()],
            &["json"],
        )?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_non_empty_string("output.report_file", &self.output.report_file)?;
        validation::validate_column_index("parser.name_column", self.parser.name_column)?;
        validation::validate_column_index("parser.credit_column", self.parser.credit_column)?;

        if let (Some(name), Some(credit)) = (self.parser.name_column, self.parser.credit_column) {
            if name == credit {
                return Err(AuditError::InvalidConfigValueError {
                    field: "parser.credit_column".to_string(),
                    value: credit.to_string(),
                    reason: "Credit column must differ from name column".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn verbose(&self) -> bool {
        self.logging.as_ref().map(|l| l.verbose).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().map(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_base_path(&self) -> &str {
        &self.input.base_path
    }

    fn curriculum_file(&self) -> &str {
        &self.input.curriculum
    }

    fn transcript_file(&self) -> &str {
        &self.input.transcript
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn report_file(&self) -> &str {
        &self.output.report_file
    }

    fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            name_column: self.parser.name_column,
            credit_column: self.parser.credit_column,
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[audit]
name = "cs-master-113"
description = "資工所 113 學年度入學"

[input]
base_path = "./data"
curriculum = "curriculum.json"
transcript = "transcript.json"

[parser]
credit_column = 2

[output]
path = "./reports"
report_file = "audit_{timestamp}.json"

[logging]
verbose = true
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.audit.name, "cs-master-113");
        assert_eq!(config.input_base_path(), "./data");
        assert_eq!(config.curriculum_file(), "curriculum.json");
        assert_eq!(config.report_file(), "audit_{timestamp}.json");
        assert_eq!(
            config.parser_options(),
            ParserOptions {
                name_column: None,
                credit_column: Some(2)
            }
        );
        assert!(config.verbose());
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let config = TomlConfig::from_toml_str(
            r#"
[audit]
name = "minimal"

[input]
curriculum = "c.json"
transcript = "t.json"

[output]
path = "./out"
"#,
        )
        .unwrap();

        assert_eq!(config.input_base_path(), ".");
        assert_eq!(config.report_file(), "audit_report.json");
        assert_eq!(config.parser_options(), ParserOptions::default());
        assert!(!config.verbose());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DEGREE_AUDIT_TEST_DATA_DIR", "/srv/audit");

        let toml_content = BASIC.replace("./data", "${DEGREE_AUDIT_TEST_DATA_DIR}");
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert_eq!(config.input.base_path, "/srv/audit");

        std::env::remove_var("DEGREE_AUDIT_TEST_DATA_DIR");

        let untouched = TomlConfig::from_toml_str(
            &BASIC.replace("./data", "${DEGREE_AUDIT_UNSET_VARIABLE}"),
        )
        .unwrap();
        assert_eq!(untouched.input.base_path, "${DEGREE_AUDIT_UNSET_VARIABLE}");
    }

    #[test]
    fn test_config_validation() {
        let wrong_extension = TomlConfig::from_toml_str(&BASIC.replace("transcript.json", "transcript.csv")).unwrap();
        assert!(matches!(
            wrong_extension.validate(),
            Err(AuditError::InvalidConfigValueError { .. })
        ));

        let same_columns = TomlConfig::from_toml_str(&BASIC.replace("credit_column = 2", "credit_column = 1\nname_column = 1")).unwrap();
        assert!(same_columns.validate().is_err());

        let out_of_range = TomlConfig::from_toml_str(&BASIC.replace("credit_column = 2", "credit_column = 500")).unwrap();
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[audit\nname = 1").unwrap_err();
        assert!(matches!(err, AuditError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.audit.name, "cs-master-113");
    }
}
