//! Rewrite planning and application.

pub mod applier;
pub mod planner;

pub use applier::apply;
pub use planner::{correct_typos, RewritePlanner};
