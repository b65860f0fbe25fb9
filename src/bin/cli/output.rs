//! Terminal rendering of reports and scan results.

use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use commentary_rs::core::model::{Action, DriftKind};
use commentary_rs::io::commits::CommitWarning;
use commentary_rs::{AnalysisReport, RewrittenFile};

/// Run-level counters as a table.
pub fn display_summary(report: &AnalysisReport) {
    if report.partial {
        println!(
            "{}",
            "⚠️  Analysis timed out; results are partial".yellow().bold()
        );
    } else {
        println!("{}", "✅ Analysis Complete".bright_green().bold());
    }
    println!();

    #[derive(Tabled)]
    struct StatsRow {
        metric: String,
        value: String,
    }

    let summary = &report.summary;
    let mut rows = vec![
        StatsRow {
            metric: "Files analyzed".to_string(),
            value: summary.files_analyzed.to_string(),
        },
        StatsRow {
            metric: "Files failed".to_string(),
            value: summary.files_failed.to_string(),
        },
        StatsRow {
            metric: "Comments".to_string(),
            value: summary.comments.to_string(),
        },
        StatsRow {
            metric: "Drift findings".to_string(),
            value: summary.drift_findings.to_string(),
        },
    ];
    rows.extend(summary.categories.iter().map(|(category, count)| StatsRow {
        metric: format!("  {}", category),
        value: count.to_string(),
    }));
    rows.extend(summary.actions.iter().map(|(action, count)| StatsRow {
        metric: format!("  {} actions", action),
        value: count.to_string(),
    }));

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{}", table);
    println!();
}

/// Per-action table followed by drift findings and failures.
pub fn display_report(report: &AnalysisReport) {
    display_summary(report);

    #[derive(Tabled)]
    struct ActionRow {
        location: String,
        action: String,
        category: String,
        reason: String,
    }

    let rows: Vec<ActionRow> = report
        .files
        .iter()
        .flat_map(|file| {
            file.actions.iter().map(move |action| ActionRow {
                location: format!("{}:{}", file.file_id, action.line),
                action: colored_action(action.action),
                category: action
                    .category
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "mixed".to_string()),
                reason: action.reason.clone(),
            })
        })
        .collect();

    if rows.is_empty() {
        println!("{}", "No comments need attention.".bright_green());
    } else {
        println!("{}", "📝 Planned actions".bright_blue().bold());
        let mut table = Table::new(rows);
        table.with(TableStyle::rounded());
        println!("{}", table);
    }
    println!();

    if !report.drift_findings.is_empty() {
        println!("{}", "🔀 Comment drift".bright_blue().bold());
        for finding in &report.drift_findings {
            let kind = match finding.kind {
                DriftKind::Stale => "stale".yellow().to_string(),
                DriftKind::Inconsistent => "inconsistent".red().to_string(),
            };
            println!(
                "   {} {} <> {} (code {:.2}, comment {:.2})",
                kind,
                finding.span_a.to_string().cyan(),
                finding.span_b.to_string().cyan(),
                finding.code_similarity,
                finding.comment_similarity
            );
        }
        println!();
    }

    let failures: Vec<_> = report.files.iter().filter(|f| f.error.is_some()).collect();
    if !failures.is_empty() {
        println!("{}", "❌ Files not analyzed".red().bold());
        for file in failures {
            println!(
                "   {}: {}",
                file.file_id,
                file.error.as_deref().unwrap_or_default()
            );
        }
        println!();
    }

    let warnings = report
        .warnings
        .iter()
        .chain(report.files.iter().flat_map(|f| f.warnings.iter()));
    for warning in warnings {
        println!("{} {}", "warning:".yellow(), warning);
    }
}

/// Files `--apply` would change.
pub fn display_rewrite_preview(files: &[RewrittenFile]) {
    let changed: Vec<&RewrittenFile> = files.iter().filter(|f| f.changed).collect();
    if changed.is_empty() {
        println!("{}", "No files would change.".bright_green());
        return;
    }
    println!(
        "{} {}",
        "🔍 Dry run:".bright_blue().bold(),
        format!("{} files would be rewritten", changed.len()).bold()
    );
    for file in changed {
        println!("   {}", file.file_id.cyan());
    }
}

/// Suspicious commits, one block per commit.
pub fn display_commit_warnings(warnings: &[CommitWarning], scanned: usize) {
    if warnings.is_empty() {
        println!(
            "{}",
            format!("No issues found in the last {} commits.", scanned).bright_green()
        );
        return;
    }

    println!(
        "{}",
        format!("Found {} suspicious commits:", warnings.len())
            .yellow()
            .bold()
    );
    println!();
    for warning in warnings {
        println!("  {} {}", warning.hash.yellow(), warning.subject);
        for reason in &warning.reasons {
            println!("    - {}", reason);
        }
        println!();
    }
    println!("Consider rewording these commits with: git rebase -i");
}

fn colored_action(action: Action) -> String {
    match action {
        Action::Delete => action.to_string().red().to_string(),
        Action::Rewrite => action.to_string().cyan().to_string(),
        Action::Flag => action.to_string().yellow().to_string(),
        Action::Keep => action.to_string().dimmed().to_string(),
    }
}
