pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{
    bucket::{bucketize, requirement_key},
    canonical::canonicalize,
    curriculum::{detect_columns, parse_curriculum, parse_curriculum_with, select_curriculum_matrix, ParserOptions},
    etl::AuditEngine,
    grade::classify_grade,
    matrix::build_matrix,
    pipeline::AuditPipeline,
    reconcile::reconcile,
    term::compare_terms,
    transcript::transcript_from_matrix,
};
pub use domain::model::{
    Grid, GridCell, Matrix, ReconciliationReport, RequirementRecord, RequirementSet,
    TranscriptRecord,
};
pub use utils::error::{AuditError, Result};
