use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;

use cirrus_core::config::CirrusConfig;
use cirrus_db::{catalog, Database, MigrationRunner};

/// Manage schema versions.
#[derive(Parser)]
pub struct MigrateCommand {
    #[command(subcommand)]
    pub action: MigrateAction,

    /// Configuration file path.
    #[arg(short, long, default_value = "cirrus.toml", global = true)]
    pub config: String,
}

#[derive(Subcommand)]
pub enum MigrateAction {
    /// Apply pending schema versions.
    Up {
        /// Stop after this version instead of going to head.
        #[arg(long)]
        version: Option<u32>,
    },

    /// Show applied and pending versions.
    Status,
}

impl MigrateCommand {
    pub async fn execute(self) -> Result<()> {
        dotenvy::dotenv().ok();

        let config = load_config(&self.config)?;
        let db = Database::from_config(&config.database).await?;
        let runner = MigrationRunner::new(db.pool().clone());

        match self.action {
            MigrateAction::Up { version } => {
                let target = version.unwrap_or(catalog::HEAD_VERSION);

                println!();
                println!(
                    "  {} Schema versions for {}",
                    style("cirrus").bold().cyan(),
                    style(&config.project.name).bold()
                );
                println!();

                println!(
                    "  {} Applying versions up to {}...",
                    style("→").dim(),
                    target
                );
                runner.run_to(target).await?;

                let current = runner.current_version().await?;
                println!(
                    "  {} Schema at version {}",
                    style("✓").green(),
                    current.map_or_else(|| "none".to_string(), |v| v.to_string())
                );
                println!();
            }

            MigrateAction::Status => {
                let status = runner.status().await?;

                println!();
                println!(
                    "  {} Schema status for {}",
                    style("cirrus").bold().cyan(),
                    style(&config.project.name).bold()
                );
                println!();

                if !status.applied.is_empty() {
                    println!("  {} Applied:", style("✓").green());
                    for m in &status.applied {
                        println!(
                            "    {} {} {} ({})",
                            style(m.version).bold(),
                            style(&m.name).cyan(),
                            style("at").dim(),
                            m.applied_at.format("%Y-%m-%d %H:%M:%S")
                        );
                    }
                }

                let pending: Vec<_> = status
                    .pending
                    .iter()
                    .filter(|m| !m.is_placeholder())
                    .collect();

                if !pending.is_empty() {
                    if !status.applied.is_empty() {
                        println!();
                    }
                    println!("  {} Pending:", style("○").yellow());
                    for m in &pending {
                        println!(
                            "    {} {} {}",
                            style("→").dim(),
                            style(m.version).bold(),
                            style(&m.name).yellow()
                        );
                    }
                }

                println!();
                println!(
                    "  {} {} applied, {} pending, head is {}",
                    style("ℹ").blue(),
                    status.applied.len(),
                    status.pending.len(),
                    catalog::HEAD_VERSION
                );
                println!();
            }
        }

        db.close().await;
        Ok(())
    }
}

/// Load configuration from the given file, falling back to DATABASE_URL when
/// the file does not exist.
pub(crate) fn load_config(path: &str) -> Result<CirrusConfig> {
    if Path::new(path).exists() {
        Ok(CirrusConfig::from_file(path)?)
    } else if let Ok(url) = std::env::var("DATABASE_URL") {
        Ok(CirrusConfig::from_database_url(&url))
    } else {
        anyhow::bail!(
            "Configuration file not found: {}\nProvide it or set DATABASE_URL.",
            path
        );
    }
}
