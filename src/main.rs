use application_keys::cli::{self, Cli, Command};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Migrate(args) => cli::migrate::run(args).await,
        Command::Generate(args) => cli::generate::run(args).await,
        Command::Keys(args) => cli::keys::run(args).await,
    }
}
