use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// 必修區段標題不存在，或標題之後沒有任何可辨識的課程列
    #[error("Curriculum structure error: {message}")]
    StructuralParse { message: String },

    #[error("Transcript table is missing headings: {}", missing.join(", "))]
    TranscriptLayout { missing: Vec<String> },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Io,
    Serialization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl AuditError {
    pub fn structural(message: impl Into<String>) -> Self {
        AuditError::StructuralParse {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AuditError::StructuralParse { .. }
            | AuditError::TranscriptLayout { .. } => ErrorCategory::Input,
            AuditError::ConfigValidationError { .. }
            | AuditError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            AuditError::IoError(_) => ErrorCategory::Io,
            AuditError::SerializationError(_) => ErrorCategory::Serialization,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 資料形狀不符，重試無效
            AuditError::StructuralParse { .. } | AuditError::TranscriptLayout { .. } => {
                ErrorSeverity::High
            }
            AuditError::ConfigValidationError { .. }
            | AuditError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            AuditError::SerializationError(_) => ErrorSeverity::Medium,
            AuditError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AuditError::StructuralParse { .. } => {
                "Re-acquire the curriculum table or review it manually; the layout does not match the expected required-course section"
            }
            AuditError::TranscriptLayout { .. } => {
                "Make sure the transcript table includes 學年度, 學期, 選課代號, 科目名稱, 學分 and GPA columns"
            }
            AuditError::IoError(_) => "Check that the input files exist and the output directory is writable",
            AuditError::SerializationError(_) => {
                "Check that the input documents are valid JSON in the expected shape"
            }
            AuditError::ConfigValidationError { .. } | AuditError::InvalidConfigValueError { .. } => {
                "Review the configuration file or command-line arguments"
            }
        }
    }

    /// 依嚴重程度決定命令列的結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AuditError::StructuralParse { message } => format!("無法解析必修科目表：{}", message),
            AuditError::TranscriptLayout { missing } => {
                format!("歷年成績表格缺少欄位：{}", missing.join("、"))
            }
            AuditError::IoError(e) => format!("檔案讀寫失敗：{}", e),
            AuditError::SerializationError(e) => format!("JSON 格式錯誤：{}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
