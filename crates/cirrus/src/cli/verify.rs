use anyhow::Result;
use clap::Parser;
use console::style;

use cirrus_core::error::CirrusError;
use cirrus_db::{check_model_sync, Database, MigrationRunner};

use super::migrate::load_config;

/// Verify the live schema matches the declared model.
#[derive(Parser)]
pub struct VerifyCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "cirrus.toml")]
    pub config: String,
}

impl VerifyCommand {
    pub async fn execute(self) -> Result<()> {
        dotenvy::dotenv().ok();

        let config = load_config(&self.config)?;
        let db = Database::from_config(&config.database).await?;

        println!();
        println!(
            "  {} Model/schema verification for {}",
            style("cirrus").bold().cyan(),
            style(&config.project.name).bold()
        );
        println!();

        let current = MigrationRunner::new(db.pool().clone())
            .current_version()
            .await?;
        println!(
            "  {} Schema at version {}",
            style("ℹ").blue(),
            current.map_or_else(|| "none".to_string(), |v| v.to_string())
        );

        match check_model_sync(db.pool()).await {
            Ok(()) => {
                println!("  {} Schema matches the model", style("✓").green());
                println!();
                db.close().await;
                Ok(())
            }
            Err(CirrusError::SyncMismatch(report)) => {
                println!("  {} Schema does not match the model:", style("✗").red());
                for line in report.lines() {
                    println!("  {}", style(line.trim_start()).red());
                }
                println!();
                db.close().await;
                anyhow::bail!("schema verification failed");
            }
            Err(e) => {
                db.close().await;
                Err(e.into())
            }
        }
    }
}
