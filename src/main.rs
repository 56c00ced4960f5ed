//! Main RxGate server binary.
//!
//! Wires the prescription service from the environment and runs the REST API.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the RxGate application
///
/// Starts the REST server (default port 3000) with OpenAPI/Swagger UI.
///
/// # Environment Variables
/// - `RXGATE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `RXGATE_DATA_DIR`: Root directory for records and documents (default: "rx_data")
/// - `RXGATE_REGISTRY_FILE`: Prescriber registry YAML (default: `<data_dir>/prescribers.yaml`)
/// - `RXGATE_VALIDITY_DAYS`: Prescription validity window in days (default: 30)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rxgate=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("RXGATE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("++ Starting RxGate REST on {}", rest_addr);

    let state = api_rest::bootstrap()?;
    let app = api_rest::router(state);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
