use shared::{HealthResponse, HelloResponse};

use super::render;
use crate::client::ApiClient;
use crate::config::CliConfig;

pub async fn health(client: &ApiClient, config: &CliConfig) -> anyhow::Result<()> {
    let response = client.health().await?;
    render(config, &response, "check health", |h: HealthResponse| {
        format!("✅ API is healthy (status: {})", h.status)
    })
}

pub async fn hello(client: &ApiClient, config: &CliConfig) -> anyhow::Result<()> {
    let response = client.hello().await?;
    render(config, &response, "call hello", |h: HelloResponse| {
        format!("👋 {}", h.message)
    })
}
