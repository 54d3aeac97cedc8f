//! Subcommand implementations.

pub mod build;
pub mod info;
pub mod install;
pub mod list;
pub mod remove;
pub mod serve;
