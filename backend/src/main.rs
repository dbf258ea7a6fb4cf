//! Service entry point: tracing, configuration, storage adapter selection,
//! and the HTTP listener.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::ports::UserRepository;
use backend::outbound::persistence::{DynamoDbUserRepository, JsonFileUserRepository};
use backend::server::{self, AppConfig, StoreConfig};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let users = build_user_store(&config.store).await;

    let bind_addr = config.bind_addr;
    let server = server::create_server(users, config)?;
    info!(%bind_addr, "user roster service listening");
    server.await
}

/// Pick the storage adapter the routes run against.
async fn build_user_store(store: &StoreConfig) -> Arc<dyn UserRepository> {
    match store {
        StoreConfig::JsonFile { path } => {
            info!(path = %path.display(), "using flat-file user store");
            Arc::new(JsonFileUserRepository::new(path.clone()))
        }
        StoreConfig::DynamoDb { table, endpoint } => {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
            if let Some(endpoint) = endpoint {
                loader = loader.endpoint_url(endpoint.clone());
            }
            let sdk_config = loader.load().await;
            info!(%table, "using DynamoDB user store");
            Arc::new(DynamoDbUserRepository::new(
                aws_sdk_dynamodb::Client::new(&sdk_config),
                table.clone(),
            ))
        }
    }
}
