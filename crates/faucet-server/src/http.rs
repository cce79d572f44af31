//! HTTP server and API endpoints for the faucet server.

use crate::{
    chain::{ChainCmd, CliRunner},
    coin::Coin,
    config::{compile, FaucetConfig},
    engine::{Faucet, FaucetInfo},
    error::{FaucetError, FaucetResult},
};
use axum::{extract::{rejection::JsonRejection, State}, response::Json, routing::get, Router};
use faucet_version::{BuildInfoCollector, ReleaseRegistry, VersionReport, VersionTag};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Request to credit an account
#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub address: String,
    /// Coins such as `"10uatom"`; empty means every configured coin
    #[serde(default)]
    pub coins: Vec<String>,
}

/// Response after a successful transfer
#[derive(Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    pub txhash: String,
}

/// Create the faucet router, mounted at the root path
pub fn create_router(faucet: Arc<Faucet>) -> Router {
    Router::new()
        .route("/", get(info).post(transfer))
        .route("/info", get(info))
        .with_state(faucet)
}

impl Faucet {
    /// This faucet's API, see [`create_router`].
    pub fn router(self: Arc<Self>) -> Router {
        create_router(self)
    }
}

/// Wrap a router with the request tracing and CORS layers.
pub fn with_layers(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

#[derive(Clone)]
struct VersionState {
    registry: Arc<dyn ReleaseRegistry>,
    collector: BuildInfoCollector,
}

/// Router serving the build report at `/version`
pub fn version_router(registry: Arc<dyn ReleaseRegistry>, collector: BuildInfoCollector) -> Router {
    Router::new()
        .route("/version", get(version))
        .with_state(VersionState {
            registry,
            collector,
        })
}

async fn version(State(state): State<VersionState>) -> FaucetResult<Json<VersionReport>> {
    let report = VersionReport::collect(
        state.registry.as_ref(),
        &state.collector,
        &VersionTag::current(),
    )
    .await?;
    Ok(Json(report))
}

async fn info(State(faucet): State<Arc<Faucet>>) -> Json<FaucetInfo> {
    Json(faucet.info())
}

async fn transfer(
    State(faucet): State<Arc<Faucet>>,
    request: Result<Json<TransferRequest>, JsonRejection>,
) -> FaucetResult<Json<TransferResponse>> {
    let Json(request) = request.map_err(|e| FaucetError::InvalidRequest(e.body_text()))?;
    info!("Transfer request for {}: {:?}", request.address, request.coins);

    let coins = request
        .coins
        .iter()
        .map(|coin| coin.parse::<Coin>())
        .collect::<Result<Vec<_>, _>>()?;

    let txhash = faucet.transfer(&request.address, coins).await?;
    Ok(Json(TransferResponse { txhash }))
}

/// Compile the configuration, set up the faucet account and serve it.
///
/// Everything before binding is configuration; any failure there aborts
/// before a listener exists.
pub async fn start_server(
    config: &FaucetConfig,
    registry: Arc<dyn ReleaseRegistry>,
) -> FaucetResult<()> {
    info!("Starting faucet server...");

    let compiled = compile(config)?;
    let runner = CliRunner::new(ChainCmd::new(&compiled.cli_name, compiled.chain_options));
    let faucet = Arc::new(Faucet::new(Arc::new(runner), compiled.options).await?);

    // Periodically forget expired credit windows
    let cleanup_faucet = faucet.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60 * 60));
        loop {
            interval.tick().await;
            cleanup_faucet.ledger().cleanup();
        }
    });

    let app = faucet
        .router()
        .merge(version_router(registry, BuildInfoCollector::default()));
    serve(app, compiled.port).await
}

/// Bind `0.0.0.0:port` and serve `app` until the process stops.
pub async fn serve(app: Router, port: u16) -> FaucetResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| FaucetError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    info!("listening on :{}", port);

    axum::serve(listener, with_layers(app))
        .await
        .map_err(|e| FaucetError::Internal(anyhow::anyhow!("Server error: {}", e)))?;

    Ok(())
}
