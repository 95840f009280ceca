//! Subcommands.

pub mod backends;
pub mod generate;
