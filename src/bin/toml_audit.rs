use clap::Parser;
use degree_audit::config::toml_config::TomlConfig;
use degree_audit::core::ConfigProvider;
use degree_audit::domain::model::{CurriculumDocument, TranscriptDocument};
use degree_audit::utils::{logger, validation::Validate};
use degree_audit::{build_matrix, select_curriculum_matrix, AuditEngine, AuditPipeline, LocalStorage};
use std::path::Path;

#[derive(Parser)]
#[command(name = "toml-audit")]
#[command(about = "Degree audit driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "audit-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Check the configuration and inputs without writing a report
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose || config.verbose());
    }
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no report will be written");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let storage = LocalStorage::new(".".to_string());
    let pipeline = AuditPipeline::new(storage, config);
    let engine = AuditEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Audit completed");
            println!("📁 Report saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Audit failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Audit: {}", config.audit.name);
    if !config.audit.description.is_empty() {
        println!("  Description: {}", config.audit.description);
    }
    println!("  Curriculum: {}", config.curriculum_file());
    println!("  Transcript: {}", config.transcript_file());
    println!("  Output: {}/{}", config.output_path(), config.report_file());

    let options = config.parser_options();
    if let Some(col) = options.name_column {
        println!("  Name column: {}", col);
    }
    if let Some(col) = options.credit_column {
        println!("  Credit column: {}", col);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

/// 只讀取並檢查輸入檔，不做比對也不寫報表
fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let base = Path::new(config.input_base_path());

    let curriculum: CurriculumDocument =
        serde_json::from_slice(&std::fs::read(base.join(config.curriculum_file()))?)?;
    let matrices: Vec<_> = curriculum.into_grids().iter().map(build_matrix).collect();
    println!("🔍 Dry Run Analysis:");
    println!("  Curriculum tables: {}", matrices.len());
    match select_curriculum_matrix(&matrices) {
        Some(index) => println!(
            "  Selected table: #{} ({} rows)",
            index + 1,
            matrices[index].len()
        ),
        None => println!("  ⚠️ No curriculum table found"),
    }

    let transcript: TranscriptDocument =
        serde_json::from_slice(&std::fs::read(base.join(config.transcript_file()))?)?;
    match transcript {
        TranscriptDocument::Records(records) => {
            println!("  Transcript records: {}", records.len())
        }
        TranscriptDocument::Table(grid) => {
            println!("  Transcript table rows: {}", grid.rows.len())
        }
    }

    println!();
    println!("✅ Dry run complete.");
    Ok(())
}
