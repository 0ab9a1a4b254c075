//! CLI subcommand implementations for the Metalens binary.

pub mod fetch_cmd;
pub mod output;
pub mod serve_cmd;
