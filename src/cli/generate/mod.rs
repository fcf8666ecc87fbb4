//! Generate command - creates a key pair without touching storage

use clap::Args;
use serde_json::json;

use crate::domain::key::normalize_and_validate;
use crate::infrastructure::key::KeyGeneratorRegistry;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Key type: ssh or pgp
    #[arg(long = "type")]
    pub key_type: String,

    /// Key name; the `app-` prefix is added when missing
    #[arg(long)]
    pub name: String,
}

pub async fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let registry =
        KeyGeneratorRegistry::with_rsa_bits(config.keys.ssh_rsa_bits, config.keys.pgp_rsa_bits);

    let name = normalize_and_validate(&args.name)?;
    let generator = registry.resolve(&args.key_type)?;

    let material = {
        let name = name.clone();
        tokio::task::spawn_blocking(move || generator.generate(&name)).await??
    };

    let output = json!({
        "name": name,
        "type": material.key_type(),
        "public": material.public(),
        "private": material.private(),
        "keyID": material.key_id(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
