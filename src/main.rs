use anyhow::Result;
use axum::Router;
use pixelstore::{
    config::AppConfig,
    routes,
    services::{
        queue_service::GenerationQueue,
        storage_service::{ObjectStore, THUMBNAIL_SUBDIR},
        thumbnail_service::ThumbnailWorker,
    },
    state::AppState,
};
use std::{fs, io::ErrorKind, path::Path};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;
    tracing::info!("Starting pixelstore with config: {:?}", cfg);

    // --- Ensure storage areas exist ---
    let thumbnail_dir = Path::new(&cfg.storage_dir).join(THUMBNAIL_SUBDIR);
    if !thumbnail_dir.exists() {
        fs::create_dir_all(&thumbnail_dir)?;
        tracing::info!("Created storage areas under {}", cfg.storage_dir);
    }

    // --- Initialize store, queue, and the generation worker ---
    let store = ObjectStore::new(&cfg.storage_dir);
    let (queue, queue_rx) = GenerationQueue::channel();
    tokio::spawn(ThumbnailWorker::new(store.clone(), queue_rx).run());

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(AppState { store, queue });

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
