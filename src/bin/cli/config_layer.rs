//! Configuration layering: defaults, then the configuration file, then CLI flags.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::cli::args::{AnalyzeArgs, AnalysisControlArgs, PolicyArgs, DEFAULT_CONFIG_FILE};
use commentary_rs::core::config::CommentaryConfig;

/// Merge a configuration layer into this one, the other taking priority
pub trait ConfigMerge<T> {
    fn merge_with(&mut self, other: T);
}

impl ConfigMerge<&PolicyArgs> for CommentaryConfig {
    fn merge_with(&mut self, args: &PolicyArgs) {
        let policy = &mut self.policy;
        policy.delete_filler |= args.delete_filler || args.aggressive;
        policy.delete_redundant |= args.delete_redundant || args.aggressive;
        policy.delete_placeholder |= args.delete_placeholder || args.aggressive;
        policy.fix_typos |= args.fix_typos;
        if args.no_flag_drift {
            policy.flag_drift = false;
        }
    }
}

impl ConfigMerge<&AnalysisControlArgs> for CommentaryConfig {
    fn merge_with(&mut self, args: &AnalysisControlArgs) {
        if let Some(max_concurrency) = args.max_concurrency {
            self.analysis.max_concurrency = Some(max_concurrency);
        }
        if let Some(timeout) = args.timeout {
            self.analysis.total_timeout_seconds = Some(timeout);
        }
        if args.no_drift {
            self.drift.enabled = false;
        }
    }
}

/// Load a configuration file, or the default file when it exists, or defaults.
pub fn load_configuration(config_path: Option<&Path>) -> anyhow::Result<CommentaryConfig> {
    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|path| path.exists()),
    };

    match path {
        Some(path) => CommentaryConfig::from_yaml_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(CommentaryConfig::default()),
    }
}

/// Build the effective configuration for `analyze`.
pub fn build_analysis_config(args: &AnalyzeArgs) -> anyhow::Result<CommentaryConfig> {
    let mut config = load_configuration(args.config.as_deref())?;
    config.merge_with(&args.policy);
    config.merge_with(&args.analysis_control);
    if args.include_kept {
        config.output.include_kept = true;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
