//! CLI module for wtplan - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for inventory
//! initialization, link planning, and preset/repo workspace management.

pub mod commands;

pub use commands::Cli;
