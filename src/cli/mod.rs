//! CLI module
//!
//! Command-line front end over the pagers.
//!
//! # Commands
//!
//! - `browse` - Page through a remote collection without caching
//! - `sync` - Refresh the local cache and append further pages
//! - `cache` - Show cached rows
//! - `clear` - Remove every cached row
//! - `delete` - Remove one cached row

mod commands;
mod runner;

pub use commands::{CatalogKind, Cli, Commands, OutputFormat};
pub use runner::Runner;
