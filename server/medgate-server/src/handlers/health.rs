use crate::server::MedGateServer;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub checks: BTreeMap<&'static str, &'static str>,
}

fn check(healthy: bool) -> &'static str {
    if healthy {
        "healthy"
    } else {
        "unhealthy"
    }
}

/// GET /health: liveness plus store reachability
pub async fn health_check(State(server): State<MedGateServer>) -> (StatusCode, Json<HealthResponse>) {
    let identity_store = server.auth.store().is_healthy().await;
    let credential_registry = server.verification.registry().is_healthy().await;

    let mut checks = BTreeMap::new();
    checks.insert("identity_store", check(identity_store));
    checks.insert("credential_registry", check(credential_registry));
    if let Some(database) = &server.database {
        checks.insert("database", check(database.is_healthy().await));
    }

    let healthy = checks.values().all(|status| *status == "healthy");
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "degraded" },
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs: server.uptime().as_secs(),
            checks,
        }),
    )
}
