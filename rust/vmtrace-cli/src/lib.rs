//! Library surface of the `vmtrace` command-line tool.

pub mod commands;
pub mod config;
