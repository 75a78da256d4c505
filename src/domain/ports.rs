use crate::core::curriculum::ParserOptions;
use crate::domain::model::{AuditInput, AuditOutput};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// 輸入檔案的根目錄，curriculum / transcript 路徑相對於此
    fn input_base_path(&self) -> &str;
    fn curriculum_file(&self) -> &str;
    fn transcript_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn report_file(&self) -> &str;
    fn parser_options(&self) -> ParserOptions;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<AuditInput>;
    async fn transform(&self, input: AuditInput) -> Result<AuditOutput>;
    async fn load(&self, output: AuditOutput) -> Result<String>;
}
