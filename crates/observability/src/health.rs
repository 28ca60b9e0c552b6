//! Health-Check-Endpunkt
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Dienstname, Version, Uptime und den
//! Verbindungszustaenden der Kollaborateure. `503` wenn ungesund.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Name des Dienstes in der Health-Antwort
pub const DIENST_NAME: &str = "Voice Channels";

/// Status des Health-Checks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Einzelzustaende, aus denen sich der Gesamtstatus ergibt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HealthKomponenten {
    pub registry_initialisiert: bool,
    pub persistenz_verbunden: bool,
    pub event_bus_verbunden: bool,
}

impl HealthKomponenten {
    /// Gesund nur wenn alle Komponenten bereit sind
    pub fn ist_gesund(&self) -> bool {
        self.registry_initialisiert && self.persistenz_verbunden && self.event_bus_verbunden
    }
}

/// Liefert den aktuellen Zustand der Komponenten
pub trait HealthQuelle: Send + Sync + 'static {
    fn pruefen(&self) -> HealthKomponenten;
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub persistence_connected: bool,
    pub event_bus_connected: bool,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
pub struct HealthState {
    pub start_time: Arc<Instant>,
    quelle: Arc<dyn HealthQuelle>,
}

impl HealthState {
    pub fn neu(quelle: Arc<dyn HealthQuelle>) -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            quelle,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn antwort(&self) -> HealthResponse {
        let komponenten = self.quelle.pruefen();
        let status = if komponenten.ist_gesund() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        HealthResponse {
            status,
            service: DIENST_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            persistence_connected: komponenten.persistenz_verbunden,
            event_bus_connected: komponenten.event_bus_verbunden,
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let response = state.antwort();
    let http_status = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => {
            tracing::warn!(
                persistenz = response.persistence_connected,
                event_bus = response.event_bus_connected,
                "Health-Check: ungesund"
            );
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (http_status, Json(response))
}
