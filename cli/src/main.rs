mod client;
mod commands;
mod config;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::client::ClientError;
use crate::commands::Command;
use crate::config::{CliConfig, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "items-cli")]
#[command(about = "Command-line client for the item service", long_about = None)]
struct Cli {
    /// API server URL
    #[arg(long, global = true, env = "ITEMS_API_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = CliConfig::new(&cli.url, cli.format, cli.verbose);
    init_tracing(&config);

    if let Err(err) = commands::run(cli.command, &config).await {
        if let Some(ClientError::Unreachable { .. }) = err.downcast_ref::<ClientError>() {
            eprintln!("❌ {err}");
            if config.verbose {
                eprintln!("Error: {err:#}");
            }
            eprintln!("💡 Make sure the server is running");
        } else {
            eprintln!("Error: {err:#}");
        }
        std::process::exit(1);
    }
}

fn init_tracing(config: &CliConfig) {
    let directive = if config.verbose {
        format!("{}=debug", env!("CARGO_CRATE_NAME"))
    } else {
        "warn".to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::items::ItemsCommand;
    use uuid::Uuid;

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "items-cli",
            "items",
            "list",
            "--limit",
            "5",
            "--format",
            "json",
            "--url",
            "http://api:9000",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.url, "http://api:9000");
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::Items(ItemsCommand::List {
                limit: Some(5),
                offset: None
            })
        ));
    }

    #[test]
    fn list_passes_negative_pagination_through() {
        let cli = Cli::try_parse_from([
            "items-cli", "items", "list", "--limit", "-1", "--offset", "-3",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Items(ItemsCommand::List {
                limit: Some(-1),
                offset: Some(-3)
            })
        ));
    }

    #[test]
    fn create_requires_name() {
        assert!(Cli::try_parse_from(["items-cli", "items", "create"]).is_err());
        let cli = Cli::try_parse_from(["items-cli", "items", "create", "--name", "Widget"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Items(ItemsCommand::Create { ref name, description: None }) if name == "Widget"
        ));
    }

    #[test]
    fn update_rejects_conflicting_description_flags() {
        let id = Uuid::new_v4().to_string();
        assert!(Cli::try_parse_from([
            "items-cli",
            "items",
            "update",
            &id,
            "--description",
            "x",
            "--clear-description",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["items-cli", "items", "get", "not-a-uuid"]).is_err());
    }
}
