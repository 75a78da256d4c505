pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use crate::core::curriculum::ParserOptions;
    use crate::core::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "degree-audit")]
    #[command(about = "Reconcile a transcript against a curriculum requirement table")]
    pub struct CliConfig {
        #[arg(long, help = "Curriculum table JSON (one grid or an array of grids)")]
        pub curriculum: String,

        #[arg(long, help = "Transcript JSON (records or the transcript grid)")]
        pub transcript: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, default_value = "audit_report.json")]
        pub report_file: String,

        #[arg(long, help = "Override the detected course-name column (0-based)")]
        pub name_column: Option<usize>,

        #[arg(long, help = "Override the detected credit column (0-based)")]
        pub credit_column: Option<usize>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub log_json: bool,
    }

    impl ConfigProvider for CliConfig {
        // 命令列路徑已是完整路徑
        fn input_base_path(&self) -> &str {
            ""
        }

        fn curriculum_file(&self) -> &str {
            &self.curriculum
        }

        fn transcript_file(&self) -> &str {
            &self.transcript
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn report_file(&self) -> &str {
            &self.report_file
        }

        fn parser_options(&self) -> ParserOptions {
            ParserOptions {
                name_column: self.name_column,
                credit_column: self.credit_column,
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_path("curriculum", &self.curriculum)?;
            validation::validate_path("transcript", &self.transcript)?;
            validation::validate_file_extensions(
                "input",
                &[self.curriculum.as_str(), self.transcript.as_str()],
                &["json"],
            )?;
            validation::validate_path("output_path", &self.output_path)?;
            validation::validate_non_empty_string("report_file", &self.report_file)?;
            validation::validate_column_index("name_column", self.name_column)?;
            validation::validate_column_index("credit_column", self.credit_column)?;
            Ok(())
        }
    }

}
