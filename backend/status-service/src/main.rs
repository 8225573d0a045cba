use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Context};
use redis::aio::ConnectionManager;
use status_service::config::Config;
use status_service::context::Stores;
use status_service::db::{self, PgPostRepository};
use status_service::handlers;
use status_service::identity::HttpIdentityProvider;
use status_service::metrics::serve_metrics;
use status_service::middleware::{MetricsMiddleware, SessionMiddleware, SessionVerifier};
use status_service::rate_limit::RedisSlidingWindowLimiter;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const HEALTHCHECK_URL_ENV: &str = "STATUS_SERVICE_HEALTHCHECK_URL";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// `status-service healthcheck` probes the local health endpoint for container checks.
async fn run_healthcheck() -> anyhow::Result<()> {
    let url = std::env::var(HEALTHCHECK_URL_ENV)
        .unwrap_or_else(|_| "http://127.0.0.1:8080/api/v1/health".to_string());
    let resp = reqwest::Client::new()
        .get(&url)
        .send()
        .await
        .with_context(|| format!("healthcheck request to {} failed", url))?;

    if resp.status().is_success() {
        Ok(())
    } else {
        Err(anyhow!("healthcheck HTTP status: {}", resp.status()))
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Status Service
///
/// # Routes
///
/// - `/api/v1/posts*`, `/api/v1/profile/*` - remote procedures (session gate applied)
/// - `/api/v1/health*` - health probes
/// - `/metrics` - Prometheus metrics
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().nth(1).as_deref() == Some("healthcheck") {
        return run_healthcheck().await;
    }

    // A missing .env file is normal outside development.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::from_env().map_err(|e| {
        error!("Configuration loading failed: {}", e);
        anyhow!("failed to load configuration: {}", e)
    })?;

    info!("Starting status-service v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);

    let session_verifier = Arc::new(
        SessionVerifier::from_config(&config.session)
            .map_err(|e| anyhow!("failed to initialize session verification: {}", e))?,
    );

    let db_pool = db::init_pool(&config.database)
        .await
        .context("failed to initialize PostgreSQL")?;
    info!("Connected to database");

    let redis_client =
        redis::Client::open(config.redis.url.as_str()).context("invalid REDIS_URL")?;
    let redis_manager = ConnectionManager::new(redis_client)
        .await
        .context("failed to initialize Redis connection manager")?;
    info!("Connected to Redis");

    let identity = HttpIdentityProvider::new(&config.identity)
        .map_err(|e| anyhow!("failed to initialize identity client: {}", e))?;

    let stores = web::Data::new(Stores::new(
        Arc::new(PgPostRepository::new(db_pool)),
        Arc::new(identity),
        Arc::new(RedisSlidingWindowLimiter::new(
            redis_manager,
            config.rate_limit.clone(),
        )),
        config.feed.clone(),
    ));

    info!(
        max_requests = config.rate_limit.max_requests,
        window_seconds = config.rate_limit.window_seconds,
        "Post rate limit configured"
    );

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(stores.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(serve_metrics))
            .service(
                web::scope("/api/v1")
                    .configure(handlers::health::configure)
                    .service(
                        web::scope("")
                            .wrap(SessionMiddleware::new(session_verifier.clone()))
                            .wrap(MetricsMiddleware)
                            .configure(handlers::configure),
                    ),
            )
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .workers(config.app.workers)
    .run();

    let server_handle = server.handle();
    let mut server_task = tokio::spawn(server);

    tokio::select! {
        result = &mut server_task => {
            match result {
                Ok(Ok(())) => info!("HTTP server stopped"),
                Ok(Err(e)) => return Err(anyhow!(e).context("HTTP server failed")),
                Err(e) => return Err(anyhow!("HTTP server task panicked: {}", e)),
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            server_handle.stop(true).await;
        }
    }

    info!("status-service shut down");
    Ok(())
}
