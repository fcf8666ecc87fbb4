//! Migrate command - applies or reverts the key schema

use clap::Args;
use tracing::info;

use crate::infrastructure::storage::{Migrator, PostgresMigrator};

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Revert the latest applied migration instead of applying
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let pool = config.database.to_postgres_config().connect().await?;
    let migrator = PostgresMigrator::for_keys(pool);

    if args.revert {
        migrator.revert().await?;
    } else {
        migrator.run().await?;
    }

    info!(version = ?migrator.version().await?, "Schema is up to date");
    Ok(())
}
