use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct AuditEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> AuditEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting degree audit...");

        // Extract
        let input = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} curriculum table(s), {} transcript record(s)",
            input.curriculum.len(),
            input.transcript.len()
        );

        // Transform
        let output = self.pipeline.transform(input).await?;
        let summary = &output.report.summary;
        tracing::info!(
            "Matched {} required course(s), {} missing, {} passed course(s) outside the requirement list",
            output.report.passed_required.len(),
            output.report.missing_required.len(),
            output.report.unmatched_passed.len()
        );
        tracing::info!(
            "Credits earned {} (required {} / {}, missing {})",
            summary.earned_total_credits,
            summary.earned_required_credits,
            summary.must_total_credits,
            summary.missing_required_credits
        );
        if output.report.all_required_passed() {
            tracing::info!("All required courses passed");
        }

        // Load
        let output_path = self.pipeline.load(output).await?;
        tracing::info!("Report saved to: {}", output_path);

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        AuditInput, AuditOutput, Grid, ReconciliationReport, ReportSummary, RequirementSet,
        TranscriptRecord,
    };
    use crate::utils::error::AuditError;
    use bigdecimal::BigDecimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubPipeline {
        fail_transform: bool,
        loads: AtomicUsize,
    }

    impl StubPipeline {
        fn new(fail_transform: bool) -> Self {
            Self {
                fail_transform,
                loads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<AuditInput> {
            Ok(AuditInput {
                curriculum: vec![Grid::default()],
                transcript: vec![TranscriptRecord::new("113", "1", "A1", "演算法", "3", "A")],
            })
        }

        async fn transform(&self, _input: AuditInput) -> Result<AuditOutput> {
            if self.fail_transform {
                return Err(AuditError::structural("no header"));
            }
            let zero = BigDecimal::from(0);
            Ok(AuditOutput {
                generated_at: "2024-09-01T00:00:00+00:00".to_string(),
                curriculum: RequirementSet::new(zero.clone()),
                report: ReconciliationReport {
                    summary: ReportSummary {
                        earned_total_credits: zero.clone(),
                        must_total_credits: zero.clone(),
                        earned_required_credits: zero.clone(),
                        missing_required_credits: zero.clone(),
                        elective_credits_target: None,
                        earned_elective_credits: zero,
                        graduate_credits_target: None,
                        remaining_to_graduate: None,
                    },
                    passed_required: vec![],
                    missing_required: vec![],
                    unmatched_passed: vec![],
                },
            })
        }

        async fn load(&self, _output: AuditOutput) -> Result<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok("out/report.json".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_returns_output_path() {
        let engine = AuditEngine::new(StubPipeline::new(false));
        let path = engine.run().await.unwrap();
        assert_eq!(path, "out/report.json");
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transform_error_stops_before_load() {
        let engine = AuditEngine::new(StubPipeline::new(true));
        let err = tokio_test::block_on(engine.run()).unwrap_err();
        assert!(matches!(err, AuditError::StructuralParse { .. }));
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }
}
