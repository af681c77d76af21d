//! Subcommand implementations

pub mod deploys;
pub mod nodes;
pub mod pods;
pub mod recommend;
pub mod report;
