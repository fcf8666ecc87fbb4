//! Keys command - key lifecycle operations against PostgreSQL

use std::time::Duration;

use clap::{Args, Subcommand};

use crate::domain::{Actor, RequestContext};
use crate::infrastructure::key::AddKeyRequest;

#[derive(Args, Debug)]
pub struct KeysArgs {
    /// Project key owning the application
    #[arg(long)]
    pub project: String,

    /// Application name
    #[arg(long)]
    pub app: String,

    /// Username recorded as the actor of lifecycle events
    #[arg(long, default_value = "cli")]
    pub actor: String,

    /// Abort the operation after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub action: KeysAction,
}

#[derive(Subcommand, Debug)]
pub enum KeysAction {
    /// Print every key of the application
    List,

    /// Generate and store a new key
    Add {
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        key_type: String,
    },

    /// Delete a key by name
    Delete {
        #[arg(long)]
        name: String,
    },
}

pub async fn run(args: KeysArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let service = crate::create_key_service(&config).await?;

    let mut ctx = RequestContext::new(Actor::new(args.actor));
    if let Some(secs) = args.timeout_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    match args.action {
        KeysAction::List => {
            let keys = service.list_keys(&ctx, &args.project, &args.app).await?;
            println!("{}", serde_json::to_string_pretty(&keys)?);
        }
        KeysAction::Add { name, key_type } => {
            let key = service
                .add_key(
                    &ctx,
                    &args.project,
                    &args.app,
                    AddKeyRequest::new(name, key_type),
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&key)?);
        }
        KeysAction::Delete { name } => {
            service
                .delete_key(&ctx, &args.project, &args.app, &name)
                .await?;
        }
    }

    Ok(())
}
