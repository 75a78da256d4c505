use crate::core::curriculum::{parse_curriculum_with, select_curriculum_matrix};
use crate::core::matrix::build_matrix;
use crate::core::reconcile::reconcile;
use crate::core::transcript::transcript_from_matrix;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    AuditInput, AuditOutput, CurriculumDocument, Matrix, TranscriptDocument,
};
use crate::utils::error::{AuditError, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

/// 報表檔名中的 `{timestamp}` 以執行時間取代
pub fn render_report_file(template: &str, now: DateTime<Utc>) -> String {
    template.replace("{timestamp}", &now.format("%Y%m%d_%H%M%S").to_string())
}

pub struct AuditPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> AuditPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn input_path(&self, file: &str) -> String {
        Path::new(self.config.input_base_path())
            .join(file)
            .to_string_lossy()
            .into_owned()
    }

    async fn read_json<T: serde::de::DeserializeOwned + Send>(&self, file: &str) -> Result<T> {
        let path = self.input_path(file);
        tracing::debug!("Reading {}", path);
        let bytes = self.storage.read_file(&path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AuditPipeline<S, C> {
    async fn extract(&self) -> Result<AuditInput> {
        let curriculum = self
            .read_json::<CurriculumDocument>(self.config.curriculum_file())
            .await?
            .into_grids();

        let transcript = match self
            .read_json::<TranscriptDocument>(self.config.transcript_file())
            .await?
        {
            TranscriptDocument::Records(records) => records,
            TranscriptDocument::Table(grid) => transcript_from_matrix(&build_matrix(&grid))?,
        };

        tracing::debug!(
            "Extracted {} curriculum table(s) and {} transcript record(s)",
            curriculum.len(),
            transcript.len()
        );
        Ok(AuditInput {
            curriculum,
            transcript,
        })
    }

    async fn transform(&self, input: AuditInput) -> Result<AuditOutput> {
        let candidates: Vec<Matrix> = input.curriculum.iter().map(build_matrix).collect();
        let selected = select_curriculum_matrix(&candidates)
            .ok_or_else(|| AuditError::structural("curriculum document contains no tables"))?;
        tracing::debug!("Using curriculum table {} of {}", selected + 1, candidates.len());

        let curriculum = parse_curriculum_with(&candidates[selected], &self.config.parser_options())?;
        let report = reconcile(&curriculum, &input.transcript);

        Ok(AuditOutput {
            generated_at: Utc::now().to_rfc3339(),
            curriculum,
            report,
        })
    }

    async fn load(&self, output: AuditOutput) -> Result<String> {
        let file_name = render_report_file(self.config.report_file(), Utc::now());
        let output_path = Path::new(self.config.output_path())
            .join(file_name)
            .to_string_lossy()
            .into_owned();

        let json = serde_json::to_vec_pretty(&output)?;
        tracing::debug!("Writing report ({} bytes) to storage", json.len());
        self.storage.write_file(&output_path, &json).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::curriculum::ParserOptions;
    use crate::domain::model::TranscriptRecord;
    use bigdecimal::BigDecimal;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, value: serde_json::Value) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), serde_json::to_vec(&value).unwrap());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                AuditError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        options: ParserOptions,
        report_file: String,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                options: ParserOptions::default(),
                report_file: "report.json".to_string(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_base_path(&self) -> &str {
            "in"
        }

        fn curriculum_file(&self) -> &str {
            "curriculum.json"
        }

        fn transcript_file(&self) -> &str {
            "transcript.json"
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn report_file(&self) -> &str {
            &self.report_file
        }

        fn parser_options(&self) -> ParserOptions {
            self.options
        }
    }

    fn curriculum_json() -> serde_json::Value {
        serde_json::json!([
            {"rows": [[{"text": "最新消息"}], [{"text": "無"}]]},
            {"rows": [
                [{"text": "類別"}, {"text": "科目"}, {"text": "學分"}],
                [{"text": "必修 Department Required Courses", "rowspan": 3},
                 {"text": "30001-演算法 (Algorithms)"}, {"text": "3"}],
                [{"text": "10001-大一國文(一)"}, {"text": "2"}],
                [{"text": "30002-作業系統"}, {"text": "3"}],
                [{"text": "必修學分數 Required Credits", "colspan": 2}, {"text": "8"}],
                [{"text": "畢業學分數 Graduation Credits", "colspan": 2}, {"text": "20"}]
            ]}
        ])
    }

    fn transcript_json() -> serde_json::Value {
        serde_json::json!([
            {"year": "112", "term": "1", "code": "A1", "name": "演算法", "credit": "3", "grade": "B"},
            {"year": "112", "term": "1", "code": "C1", "name": "中國語文", "credit": "2", "grade": "A"},
            {"year": "112", "term": "2", "code": "M1", "name": "機器學習", "credit": "3", "grade": "A-"}
        ])
    }

    async fn seeded_storage() -> MockStorage {
        let storage = MockStorage::new();
        storage.put("in/curriculum.json", curriculum_json()).await;
        storage.put("in/transcript.json", transcript_json()).await;
        storage
    }

    #[tokio::test]
    async fn test_extract_reads_both_documents() {
        let pipeline = AuditPipeline::new(seeded_storage().await, MockConfig::new());

        let input = pipeline.extract().await.unwrap();
        assert_eq!(input.curriculum.len(), 2);
        assert_eq!(input.transcript.len(), 3);
        assert_eq!(input.transcript[1].grade, "A");
    }

    #[tokio::test]
    async fn test_extract_converts_transcript_table() {
        let storage = seeded_storage().await;
        storage
            .put(
                "in/transcript.json",
                serde_json::json!({"rows": [
                    [{"text": "學年度"}, {"text": "學期"}, {"text": "選課代號"},
                     {"text": "科目名稱"}, {"text": "學分"}, {"text": "GPA"}],
                    [{"text": "113"}, {"text": "1"}, {"text": "A1"},
                     {"text": "演算法"}, {"text": "3"}, {"text": "A"}]
                ]}),
            )
            .await;
        let pipeline = AuditPipeline::new(storage, MockConfig::new());

        let input = pipeline.extract().await.unwrap();
        assert_eq!(
            input.transcript,
            vec![TranscriptRecord::new("113", "1", "A1", "演算法", "3", "A")]
        );
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_io_error() {
        let pipeline = AuditPipeline::new(MockStorage::new(), MockConfig::new());
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, AuditError::IoError(_)));
    }

    #[tokio::test]
    async fn test_transform_selects_curriculum_and_reconciles() {
        let pipeline = AuditPipeline::new(seeded_storage().await, MockConfig::new());
        let input = pipeline.extract().await.unwrap();

        let output = pipeline.transform(input).await.unwrap();
        let keys: Vec<&str> = output
            .curriculum
            .records()
            .iter()
            .map(|r| r.key.as_str())
            .collect();
        assert_eq!(keys, vec!["演算法", "中文", "作業系統"]);

        let summary = &output.report.summary;
        assert_eq!(summary.earned_total_credits, BigDecimal::from(8));
        assert_eq!(summary.earned_required_credits, BigDecimal::from(5));
        assert_eq!(summary.missing_required_credits, BigDecimal::from(3));
        assert_eq!(summary.remaining_to_graduate, Some(BigDecimal::from(12)));
        assert_eq!(output.report.missing_required[0].name, "30002-作業系統");
        assert_eq!(output.report.unmatched_passed[0].name, "機器學習");
    }

    #[tokio::test]
    async fn test_transform_without_header_fails() {
        let pipeline = AuditPipeline::new(MockStorage::new(), MockConfig::new());
        let input = AuditInput {
            curriculum: vec![serde_json::from_value(serde_json::json!({"rows": [[{"text": "無"}]]})).unwrap()],
            transcript: vec![],
        };
        let err = pipeline.transform(input).await.unwrap_err();
        assert!(matches!(err, AuditError::StructuralParse { .. }));

        let empty = AuditInput {
            curriculum: vec![],
            transcript: vec![],
        };
        assert!(pipeline.transform(empty).await.is_err());
    }

    #[tokio::test]
    async fn test_load_writes_pretty_json() {
        let storage = seeded_storage().await;
        let mut config = MockConfig::new();
        config.report_file = "audit_{timestamp}.json".to_string();
        let pipeline = AuditPipeline::new(storage.clone(), config);

        let input = pipeline.extract().await.unwrap();
        let output = pipeline.transform(input).await.unwrap();
        let path = pipeline.load(output).await.unwrap();

        assert!(path.starts_with("out/audit_"));
        assert!(!path.contains("{timestamp}"));
        let written = storage.get_file(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&written).unwrap();
        assert!(value["generated_at"].is_string());
        assert_eq!(value["report"]["passed_required"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_render_report_file() {
        let now = Utc.with_ymd_and_hms(2024, 9, 1, 8, 30, 0).unwrap();
        assert_eq!(render_report_file("audit_{timestamp}.json", now), "audit_20240901_083000.json");
        assert_eq!(render_report_file("report.json", now), "report.json");
    }
}
