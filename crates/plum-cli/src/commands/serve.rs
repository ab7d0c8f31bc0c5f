//! Serve command: wires the handlers to routes and runs the gateway

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use clap::Args;
use plum_auth::UploadSecret;
use plum_blob::{S3BlobStore, S3Config};
use plum_images::{ImagesApiDoc, ImagesState};
use serde::Serialize;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;

/// Bound on how long producing a response may take, so a stalled client
/// cannot hold a handler indefinitely.
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0:3621", env = "PLUM_ADDRESS")]
    pub address: String,

    /// Shared secret required in the Authorization header of uploads
    #[arg(long, env = "PLUM_UPLOAD_KEY")]
    pub upload_key: String,

    /// S3 region
    #[arg(long, default_value = "us-east-1", env = "PLUM_S3_REGION")]
    pub s3_region: String,

    /// Custom S3 endpoint, for MinIO and other S3-compatible stores
    #[arg(long, env = "PLUM_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Bucket holding all stored objects
    #[arg(long, default_value = "plum-images", env = "PLUM_S3_BUCKET")]
    pub s3_bucket: String,

    /// S3 access key ID
    #[arg(long, env = "PLUM_S3_ACCESS_KEY")]
    pub s3_access_key: String,

    /// S3 secret access key
    #[arg(long, env = "PLUM_S3_SECRET_KEY")]
    pub s3_secret_key: String,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        // An empty secret would either lock everyone out or, worse, wave
        // everyone through. Refuse to start instead.
        let upload_secret =
            UploadSecret::new(self.upload_key).context("invalid PLUM_UPLOAD_KEY")?;

        let config = S3Config {
            region: self.s3_region,
            endpoint: self.s3_endpoint,
            bucket: self.s3_bucket,
            access_key: self.s3_access_key,
            secret_key: self.s3_secret_key,
        };

        info!("connecting to object store (bucket '{}')", config.bucket);
        let store = S3BlobStore::connect(&config)
            .await
            .context("failed to connect to object store")?;

        let state = ImagesState {
            store: Arc::new(store),
            upload_secret,
        };

        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind(&self.address)
            .await
            .with_context(|| format!("failed to bind {}", self.address))?;
        info!("listening on {}", self.address);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server closed");
        Ok(())
    }
}

fn build_router(state: ImagesState) -> Router {
    Router::new()
        .merge(index_routes())
        .nest("/images", plum_images::configure_routes().with_state(state))
        .layer(TimeoutLayer::new(WRITE_TIMEOUT))
        .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
struct IndexResponse {
    hi: &'static str,
}

#[derive(Serialize)]
struct VersionResponse {
    version: &'static str,
    commit_sha: &'static str,
    build_date: &'static str,
}

fn index_routes() -> Router {
    Router::new()
        .route("/", get(|| async { Json(IndexResponse { hi: "world" }) }))
        .route(
            "/version",
            get(|| async {
                Json(VersionResponse {
                    version: env!("PLUM_VERSION"),
                    commit_sha: env!("PLUM_COMMIT_SHA"),
                    build_date: env!("PLUM_BUILD_DATE"),
                })
            }),
        )
        .route("/health", get(|| async { "OK" }))
        .route(
            "/openapi.json",
            get(|| async { Json(ImagesApiDoc::openapi()) }),
        )
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c signal");
    info!("received ctrl-c, shutting down");
}
