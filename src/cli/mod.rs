//! CLI module for Taskgate
//!
//! - `serve`: initialize storage, bootstrap the admin key, run the HTTP server
//! - `bootstrap`: initialize storage and the admin key, then exit

pub mod bootstrap;
pub mod serve;

use clap::{Parser, Subcommand};

/// Taskgate - task tracking behind API-key permissions
#[derive(Parser)]
#[command(name = "taskgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Create the schema and the admin key without serving
    Bootstrap,
}
