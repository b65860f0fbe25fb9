//! Command implementations.

use std::path::Path;

use anyhow::Context;
use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};
use tracing::info;

use crate::cli::args::{
    AnalyzeArgs, InitConfigArgs, OutputFormat, ScanCommitsArgs, ValidateConfigArgs,
};
use crate::cli::config_layer::{build_analysis_config, load_configuration};
use crate::cli::output::{
    display_commit_warnings, display_report, display_rewrite_preview, display_summary,
};
use commentary_rs::core::config::{CommentaryConfig, POLICY_OPTIONS};
use commentary_rs::io::commits::scan_commits;
use commentary_rs::lang::registry::{registered_languages, LanguageStability};
use commentary_rs::CommentaryEngine;

/// Run the analysis pipeline and emit the report.
pub async fn analyze_command(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = build_analysis_config(&args)?;
    let include_kept = config.output.include_kept;
    let configured_format = config.output.format;
    let engine = CommentaryEngine::new(config)?;

    let outcome = engine.analyze_paths(&args.paths).await?;
    let report = outcome.report(include_kept);

    if args.dry_run {
        display_summary(&report);
        if args.apply {
            display_rewrite_preview(&outcome.rewrite()?);
        }
        return Ok(());
    }

    let format = args.format.unwrap_or(match &args.out {
        Some(_) => OutputFormat::from(configured_format),
        None => OutputFormat::Pretty,
    });

    match (&args.out, format.report_format()) {
        (Some(path), Some(report_format)) => {
            report.write_to(path, report_format)?;
            println!(
                "{} {}",
                "📁 Report saved to:".bold(),
                path.display().to_string().cyan()
            );
        }
        (Some(path), None) => {
            anyhow::bail!(
                "pretty output cannot be written to {}; choose json, yaml or text",
                path.display()
            );
        }
        (None, Some(report_format)) => {
            println!("{}", report.render(report_format)?);
        }
        (None, None) => display_report(&report),
    }

    if args.apply {
        let written = engine.write_rewrites(&outcome).await?;
        info!("Applied rewrites to {} files", written);
        if format == OutputFormat::Pretty {
            println!(
                "{} {}",
                "✏️  Rewrote".bright_green().bold(),
                format!("{} files", written).bold()
            );
        }
    }

    Ok(())
}

/// Scan recent commits and print the suspicious ones.
pub async fn scan_commits_command(args: ScanCommitsArgs) -> anyhow::Result<()> {
    let path = args.path.clone();
    let count = args.commits;
    let warnings = tokio::task::spawn_blocking(move || scan_commits(&path, count))
        .await
        .context("Commit scan task failed")?
        .with_context(|| format!("Failed to scan commits in {}", args.path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&warnings)?);
    } else {
        println!("Scanning last {} commits...", count);
        println!();
        display_commit_warnings(&warnings, count);
    }
    Ok(())
}

/// Print default configuration in YAML format
pub async fn print_default_config() -> anyhow::Result<()> {
    println!("# Default commentary configuration");
    println!("# Save as .commentary.yml and customize as needed");
    println!();
    let config = CommentaryConfig::default();
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

/// Write a default configuration file.
pub async fn init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        eprintln!(
            "{} {}",
            "❌ Configuration file already exists:".red(),
            args.output.display()
        );
        eprintln!("   Use --force to overwrite or choose a different name with --output");
        std::process::exit(1);
    }

    CommentaryConfig::default()
        .to_yaml_file(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "{} {}",
        "✅ Configuration saved to:".bright_green().bold(),
        args.output.display().to_string().cyan()
    );
    println!();
    println!("{}", "📝 Next steps:".bright_blue().bold());
    println!("   1. Edit the policy section to choose what gets deleted");
    println!(
        "   2. Run analysis with: {}",
        format!("commentary analyze --config {} <paths>", args.output.display()).cyan()
    );
    println!();

    #[derive(Tabled)]
    struct PolicyRow {
        option: String,
        alias: String,
    }

    let rows: Vec<PolicyRow> = POLICY_OPTIONS
        .iter()
        .map(|(option, alias)| PolicyRow {
            option: format!("policy.{}", option),
            alias: alias.to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{}", table);

    Ok(())
}

/// Validate a configuration file.
pub async fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "🔍 Validating configuration:".bright_blue().bold(),
        args.config.display().to_string().cyan()
    );
    println!();

    let config = match load_configuration(Some(&args.config)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {:#}", "❌ Configuration validation failed:".red(), err);
            std::process::exit(1);
        }
    };
    println!("{}", "✅ Configuration file is valid!".bright_green().bold());

    if args.detailed {
        println!();
        print_config_details(&config, &args.config);
    }
    Ok(())
}

fn print_config_details(config: &CommentaryConfig, path: &Path) {
    #[derive(Tabled)]
    struct SettingRow {
        setting: String,
        value: String,
    }

    let policy = &config.policy;
    let rows = vec![
        SettingRow {
            setting: "file".to_string(),
            value: path.display().to_string(),
        },
        SettingRow {
            setting: "analysis.max_concurrency".to_string(),
            value: config.analysis.effective_concurrency().to_string(),
        },
        SettingRow {
            setting: "analysis.total_timeout_seconds".to_string(),
            value: config
                .analysis
                .total_timeout_seconds
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string()),
        },
        SettingRow {
            setting: "drift.enabled".to_string(),
            value: config.drift.enabled.to_string(),
        },
        SettingRow {
            setting: "drift.code_similarity_threshold".to_string(),
            value: format!("{:.2}", config.drift.code_similarity_threshold),
        },
        SettingRow {
            setting: "drift.comment_similarity_threshold".to_string(),
            value: format!("{:.2}", config.drift.comment_similarity_threshold),
        },
        SettingRow {
            setting: "policy.delete_filler".to_string(),
            value: policy.delete_filler.to_string(),
        },
        SettingRow {
            setting: "policy.delete_redundant".to_string(),
            value: policy.delete_redundant.to_string(),
        },
        SettingRow {
            setting: "policy.delete_placeholder".to_string(),
            value: policy.delete_placeholder.to_string(),
        },
        SettingRow {
            setting: "policy.flag_drift".to_string(),
            value: policy.flag_drift.to_string(),
        },
        SettingRow {
            setting: "policy.fix_typos".to_string(),
            value: policy.fix_typos.to_string(),
        },
    ];

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{}", table);
}

/// List supported programming languages
pub async fn list_languages() -> anyhow::Result<()> {
    let languages = registered_languages();
    println!("{}", "🔤 Supported Programming Languages".bright_blue().bold());
    println!("   Found {} supported languages", languages.len());
    println!();

    #[derive(Tabled)]
    struct LanguageRow {
        language: String,
        extension: String,
        status: String,
        comments: String,
    }

    let rows: Vec<LanguageRow> = languages
        .iter()
        .map(|info| LanguageRow {
            language: info.name.to_string(),
            extension: info
                .extensions
                .iter()
                .map(|ext| format!(".{}", ext))
                .collect::<Vec<_>>()
                .join(", "),
            status: match info.status {
                LanguageStability::Stable => "✅ Stable".to_string(),
                LanguageStability::Beta => "🚧 Beta".to_string(),
            },
            comments: info.notes.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{}", table);
    Ok(())
}
