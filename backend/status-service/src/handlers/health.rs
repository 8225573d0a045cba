/// Health endpoints for orchestrator probes
use crate::context::Stores;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    latency_ms: u64,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

pub async fn health_summary() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "status-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

fn component_check<E: std::fmt::Display>(
    name: &str,
    result: Result<(), E>,
    start: Instant,
) -> ComponentCheck {
    let latency_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(()) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: format!("{} reachable", name),
            latency_ms,
        },
        Err(e) => ComponentCheck {
            status: ComponentStatus::Unhealthy,
            message: format!("{} check failed: {}", name, e),
            latency_ms,
        },
    }
}

/// Readiness: PostgreSQL and the rate limiter backend must both answer.
/// The identity provider is external and not probed.
pub async fn readiness_summary(stores: web::Data<Stores>) -> HttpResponse {
    let mut checks = HashMap::new();

    let start = Instant::now();
    let pg = stores.posts.ping().await;
    checks.insert("postgresql".to_string(), component_check("PostgreSQL", pg, start));

    let start = Instant::now();
    let redis = stores.limiter.ping().await;
    checks.insert("redis".to_string(), component_check("Redis", redis, start));

    let ready = checks
        .values()
        .all(|c| c.status == ComponentStatus::Healthy);
    let response = ReadinessResponse {
        ready,
        status: if ready {
            ComponentStatus::Healthy
        } else {
            ComponentStatus::Unhealthy
        },
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Register health routes under the current scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_summary))
        .route("/health/ready", web::get().to(readiness_summary))
        .route("/health/live", web::get().to(liveness_check));
}
