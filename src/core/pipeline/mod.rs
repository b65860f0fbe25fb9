//! Analysis pipeline.
//!
//! ## Stages
//!
//! 1. **File discovery**: walk the requested roots for supported files
//! 2. **Per-file stage**: extract and classify comments, concurrently and
//!    bounded by `analysis.max_concurrency`
//! 3. **Barrier**: drift detection over the snapshot of every finished file
//! 4. **Planning**: one rewrite plan per file, in parallel
//!
//! ## Usage
//!
//! ```ignore
//! use commentary_rs::core::config::CommentaryConfig;
//! use commentary_rs::core::pipeline::{CommentPipeline, SourceFile};
//!
//! let pipeline = CommentPipeline::new(CommentaryConfig::default())?;
//! let results = pipeline
//!     .run(vec![SourceFile::new("a.js", "// XXX\nrun();\n", "js")])
//!     .await?;
//! println!("{} comments", results.comment_count());
//! ```

pub mod file_discovery;
pub mod pipeline_executor;
pub mod pipeline_results;

pub use file_discovery::{discover_files, file_id_for, FileFilter};
pub use pipeline_executor::CommentPipeline;
pub use pipeline_results::{FileResult, PipelineResults, SourceFile};
