use std::{net::SocketAddr, path::PathBuf, process::exit};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use xfin_rs::{
    AppState, TokenSecrets, build_router, get_local_offset, graceful_shutdown, logging_middleware,
};

/// The REST API server for xfin.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH")]
    db_path: PathBuf,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// The directory uploaded images are saved to and served from.
    #[arg(long, env = "UPLOADS_DIR", default_value = "uploads")]
    uploads_dir: PathBuf,

    /// The canonical name of the timezone used for "today", e.g. "America/Sao_Paulo".
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// The secret used to sign access tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// The secret used to sign refresh tokens.
    #[arg(long, env = "JWT_REFRESH_SECRET", hide_env_values = true)]
    jwt_refresh_secret: String,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    if get_local_offset(&args.timezone).is_none() {
        tracing::error!("Invalid timezone {}", args.timezone);
        exit(1);
    }

    if let Err(error) = tokio::fs::create_dir_all(&args.uploads_dir).await {
        tracing::error!(
            "Could not create the uploads directory {:?}: {error}",
            args.uploads_dir
        );
        exit(1);
    }

    let conn = match Connection::open(&args.db_path) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!("Could not open database at {:?}: {error}", args.db_path);
            exit(1);
        }
    };

    let state = match AppState::new(
        conn,
        &TokenSecrets {
            access: args.jwt_secret,
            refresh: args.jwt_refresh_secret,
        },
        &args.timezone,
        args.uploads_dir,
    ) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the application: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they happen, so skip the default 5xx logging.
        .on_failure(());

    router.layer(tracing_layer)
}
