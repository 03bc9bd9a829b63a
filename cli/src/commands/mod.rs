pub mod health;
pub mod items;

use clap::Subcommand;
use serde::de::DeserializeOwned;

use crate::client::{ApiClient, ApiResponse};
use crate::config::CliConfig;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check API health status
    Health,

    /// Call the hello endpoint
    Hello,

    /// Create and manage items
    #[command(subcommand)]
    Items(items::ItemsCommand),
}

pub async fn run(command: Command, config: &CliConfig) -> anyhow::Result<()> {
    let client = ApiClient::new(config)?;
    match command {
        Command::Health => health::health(&client, config).await,
        Command::Hello => health::hello(&client, config).await,
        Command::Items(cmd) => items::run(cmd, &client, config).await,
    }
}

/// Prints a response in the configured format. Non-2xx responses become errors.
pub(crate) fn render<T, F>(
    config: &CliConfig,
    response: &ApiResponse,
    action: &str,
    pretty: F,
) -> anyhow::Result<()>
where
    T: DeserializeOwned,
    F: FnOnce(T) -> String,
{
    if !config.is_pretty() {
        println!("{}", response.body);
    }

    if !response.is_success() {
        if config.is_pretty() {
            println!("{}", crate::output::failure(action, response));
        }
        anyhow::bail!("failed to {action} (status: {})", response.status);
    }

    if config.is_pretty() {
        let value = response.json::<T>()?;
        println!("{}", pretty(value));
    }
    Ok(())
}
