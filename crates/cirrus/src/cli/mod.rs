mod migrate;
mod verify;

pub use migrate::MigrateCommand;
pub use verify::VerifyCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Cirrus - control-plane API database schema management.
#[derive(Parser)]
#[command(name = "cirrus")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage schema versions.
    Migrate(MigrateCommand),

    /// Verify the live schema matches the declared model.
    Verify(VerifyCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Migrate(cmd) => cmd.execute().await,
            Commands::Verify(cmd) => cmd.execute().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_migrate_up() {
        let cli = Cli::try_parse_from(["cirrus", "migrate", "up"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_parse_migrate_up_to_version() {
        let cli = Cli::try_parse_from(["cirrus", "migrate", "up", "--version", "44"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::try_parse_from(["cirrus", "migrate", "status"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_parse_verify() {
        let cli = Cli::try_parse_from(["cirrus", "verify"]);
        assert!(cli.is_ok());
    }
}
