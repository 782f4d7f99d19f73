use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{app, AppState};
use directory_core::{core_config_from_env_values, BackendMode};
use directory_registry::{registry_url_from_env_value, NpiRegistryClient, ProviderLookup};

/// Main entry point for the provider directory server
///
/// Serves the REST API (registry lookup proxy, health, Swagger UI).
///
/// # Environment Variables
/// - `DIRECTORY_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `NPI_REGISTRY_URL`: registry base URL (default: the public NPI registry)
/// - `DATASTORE_URL`, `DATASTORE_ACCESS_KEY`: remote datastore; only reported here, the
///   directory itself is driven through the `directory` CLI
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("directory=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("DIRECTORY_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let registry_url = registry_url_from_env_value(std::env::var("NPI_REGISTRY_URL").ok());

    let core_cfg = core_config_from_env_values(
        std::env::var("DATASTORE_URL").ok(),
        std::env::var("DATASTORE_ACCESS_KEY").ok(),
    );
    let mode = if core_cfg.datastore().is_some() {
        BackendMode::Remote
    } else {
        BackendMode::Local
    };

    let registry = NpiRegistryClient::new(registry_url)?;
    tracing::info!(registry = registry.base_url(), datastore = %mode, "++ Starting provider directory REST on {}", rest_addr);

    let rest_app = app(AppState::new(ProviderLookup::new(Arc::new(registry))));

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, rest_app).await?;

    Ok(())
}
