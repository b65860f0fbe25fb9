//! # commentary-rs: Comment Quality Analysis
//!
//! Classifies every comment in a set of source files by informational value,
//! cross-checks comments on structurally similar code for drift, and plans
//! rewrites that remove or flag low-value comments without touching code.
//!
//! - **Classification**: placeholder, filler, redundant, misleading,
//!   typo noise or informative, with the rules that fired as evidence
//! - **Drift detection**: divergent comments on near-duplicate code across files
//! - **Rewrite planning**: policy-driven, non-overlapping edit plans
//! - **Multi-language Support**: Python, JavaScript, TypeScript, Rust, Go, C++
//!
//! ## Architecture
//!
//! ```text
//! source text ─► Extractor ─► Classifier ─► (barrier) ─► Drift Detector
//!                                                              │
//!                     rewritten text ◄─ Applier ◄─ Planner ◄───┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use commentary_rs::{CommentaryConfig, CommentaryEngine, SourceFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = CommentaryEngine::new(CommentaryConfig::default())?;
//!     let outcome = engine
//!         .analyze_sources(vec![SourceFile::new("a.js", "// XXX\nrun();\n", "js")])
//!         .await?;
//!
//!     println!("{} comments classified", outcome.results.comment_count());
//!     Ok(())
//! }
//! ```

#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "mimalloc")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

// Core data model, configuration and pipeline
pub mod core {
    //! Core data structures, text utilities and the analysis pipeline.

    pub mod config;
    pub mod dictionary;
    pub mod errors;
    pub mod model;
    pub mod pipeline;
    pub mod text;
}

// Comment analysis
pub mod detectors {
    //! Comment classification and drift detection.

    pub mod classifier;
    pub mod drift;
}

// Language-specific comment extraction
pub mod lang {
    //! Tree-sitter language registry and comment extraction.

    pub mod extractor;
    pub mod registry;
}

pub mod rewrite;

// Reporting and repository scans
pub mod io {
    //! Report rendering and git commit scanning.

    pub mod commits;
    pub mod reports;
}

// Public API and engine interface
pub mod api {
    //! High-level engine interface.

    pub mod engine;
}

// Re-export primary types for convenience
pub use api::engine::{AnalysisOutcome, CommentaryEngine, RewrittenFile};
pub use core::config::{CommentaryConfig, Policy};
pub use core::errors::{CommentaryError, Result};
pub use core::model::{
    Action, Category, Classification, CommentSpan, DriftFinding, DriftKind, PatchAction,
    RewritePlan,
};
pub use core::pipeline::SourceFile;
pub use io::reports::AnalysisReport;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
