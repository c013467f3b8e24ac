#![forbid(unsafe_code)]

//! Axum server speaking the addon protocol on top of the `rsstube` resolvers.
//!
//! Routes follow the host's conventions: `/manifest.json` for discovery and
//! `/{resource}/{type}/{id}.json` (optionally with a trailing extra-args
//! segment) for catalog, meta and stream requests.

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Path as AxumPath, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use clap::Parser;
use rsstube::addon::Addon;
use rsstube::config::{RuntimeOverrides, resolve_runtime_config};
use rsstube::fetch::{HttpFetch, UreqFetcher};
use rsstube::manifest::Manifest;
use rsstube::models::{CatalogResponse, MetaResponse, StreamResponse};
use rsstube::registry::ChannelRegistry;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const JSON_SUFFIX: &str = ".json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve YouTube channel feeds as a media-center addon", long_about = None)]
struct Args {
    /// Address to listen on (default: RSSTUBE_HOST or 0.0.0.0)
    #[arg(long, value_parser = parse_host_arg)]
    host: Option<IpAddr>,

    /// Port to listen on (default: PORT or 7000)
    #[arg(long)]
    port: Option<u16>,

    /// dotenv-style file read before the process environment
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// TOML file with `[[groups]]` of channels (default: built-in list)
    #[arg(long)]
    channels: Option<PathBuf>,

    /// Videos listed per channel catalog, capped at 50 (default: 20)
    #[arg(long)]
    videos_per_channel: Option<usize>,
}

impl Args {
    fn overrides(&self) -> RuntimeOverrides {
        RuntimeOverrides {
            host: self.host.map(|host| host.to_string()),
            port: self.port,
            channels_file: self.channels.clone(),
            videos_per_channel: self.videos_per_channel,
            env_path: self.env_file.clone(),
        }
    }
}

fn parse_host_arg(value: &str) -> Result<IpAddr> {
    value
        .trim()
        .parse::<IpAddr>()
        .context("expected a valid IPv4 or IPv6 address for --host/RSSTUBE_HOST")
}

struct AppState<F> {
    addon: Arc<Addon<F>>,
    manifest: Arc<Manifest>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            addon: self.addon.clone(),
            manifest: self.manifest.clone(),
        }
    }
}

impl<F: HttpFetch> AppState<F> {
    fn new(addon: Addon<F>) -> Self {
        let manifest = Manifest::for_registry(addon.registry());
        Self {
            addon: Arc::new(addon),
            manifest: Arc::new(manifest),
        }
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Creates a 404 error with the provided message.
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, headers, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = resolve_runtime_config(args.overrides())?;
    let host = parse_host_arg(&config.host)?;

    let registry = match &config.channels_file {
        Some(path) => ChannelRegistry::load(path)?,
        None => ChannelRegistry::default(),
    };
    let fetcher = UreqFetcher::new(&config.settings);
    let state = AppState::new(Addon::new(registry, config.settings.clone(), fetcher));
    tracing::info!(
        catalogs = state.manifest.catalogs.len(),
        videos_per_channel = config.settings.videos_per_channel,
        "channel registry loaded"
    );

    let app = build_router(state);

    let addr = SocketAddr::new(host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;
    tracing::info!("addon manifest at http://{}/manifest.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running addon server")?;

    Ok(())
}

fn build_router<F: HttpFetch + 'static>(state: AppState<F>) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::temporary("/manifest.json") }))
        .route("/manifest.json", get(get_manifest::<F>))
        .route("/{resource}/{kind}/{id}", get(get_resource::<F>))
        .route(
            "/{resource}/{kind}/{id}/{extra}",
            get(get_resource_with_extra::<F>),
        )
        .fallback(|| async { ApiError::not_found("endpoint not found") })
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    // Only affects graceful shutdown; Ctrl+C still terminates the process.
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {}", err);
    }
}

async fn get_manifest<F: HttpFetch>(State(state): State<AppState<F>>) -> Json<Manifest> {
    Json((*state.manifest).clone())
}

async fn get_resource<F: HttpFetch>(
    State(state): State<AppState<F>>,
    AxumPath((resource, kind, id)): AxumPath<(String, String, String)>,
) -> ApiResult<Response> {
    dispatch(&state, &resource, &kind, strip_json_suffix(&id)).await
}

/// Extra args (search, skip, genre) are accepted but ignored: every catalog
/// is a single feed page.
async fn get_resource_with_extra<F: HttpFetch>(
    State(state): State<AppState<F>>,
    AxumPath((resource, kind, id, _extra)): AxumPath<(String, String, String, String)>,
) -> ApiResult<Response> {
    dispatch(&state, &resource, &kind, strip_json_suffix(&id)).await
}

async fn dispatch<F: HttpFetch>(
    state: &AppState<F>,
    resource: &str,
    kind: &str,
    id: &str,
) -> ApiResult<Response> {
    tracing::debug!(resource, kind, id, "addon request");
    let response = match resource {
        "catalog" => Json(CatalogResponse {
            metas: state.addon.resolve_catalog(id).await,
        })
        .into_response(),
        "meta" => Json(MetaResponse {
            meta: state.addon.resolve_item(id).await,
        })
        .into_response(),
        "stream" => Json(StreamResponse {
            streams: state.addon.resolve_stream(id),
        })
        .into_response(),
        other => return Err(ApiError::not_found(format!("unsupported resource {other}"))),
    };
    Ok(response)
}

fn strip_json_suffix(id: &str) -> &str {
    id.strip_suffix(JSON_SUFFIX).unwrap_or(id)
}
