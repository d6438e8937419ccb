//! Travel planner CLI library.
//!
//! Subcommand handlers and output formatting for the `travelplanner-cli`
//! binary.

pub mod commands;
pub mod output;
