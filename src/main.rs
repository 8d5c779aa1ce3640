use clap::Parser;
use taskgate::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Bootstrap => cli::bootstrap::run().await,
    }
}
