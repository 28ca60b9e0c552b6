//! HTTP-API des Voice-Dienstes
//!
//! Endpunkte:
//! - `GET /health`       – Health-Check (503 wenn ungesund)
//! - `GET /channels`     – Liste aller lebenden Kanaele
//! - `GET /channels/:id` – Statistik und Teilnehmer eines Kanals
//! - `GET /metrics`      – Prometheus

use crate::service::VoiceService;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use stimmraum_core::{ChannelId, StimmraumError, UserId};
use stimmraum_observability::{
    health_router, metrics_router, request_timing_layer, timing_middleware, HealthState,
    VoiceMetriken,
};
use stimmraum_signaling::SignalingZustand;
use stimmraum_voice::{KanalStatistik, VoiceChannel};
use tower_http::cors::CorsLayer;

#[derive(Debug, Serialize)]
pub struct KanalUebersicht {
    pub id: ChannelId,
    pub server_id: String,
    pub participants: usize,
}

#[derive(Debug, Serialize)]
pub struct TeilnehmerAnsicht {
    pub user_id: UserId,
    pub display_name: String,
    pub stream_id: u32,
    pub speaking: bool,
    pub muted: bool,
    pub deafened: bool,
    pub joined_at: DateTime<Utc>,
    /// None solange kein Offer eingegangen ist
    pub signaling: Option<SignalingZustand>,
}

#[derive(Debug, Serialize)]
pub struct KanalDetail {
    pub id: ChannelId,
    pub server_id: String,
    pub stats: KanalStatistik,
    pub participants: Vec<TeilnehmerAnsicht>,
}

fn uebersicht(kanal: &VoiceChannel) -> KanalUebersicht {
    KanalUebersicht {
        id: kanal.kanal_id().clone(),
        server_id: kanal.server_id().to_string(),
        participants: kanal.anzahl(),
    }
}

fn fehler_antwort(e: &StimmraumError) -> Response {
    let status = StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

/// `GET /channels`
async fn kanaele_auflisten(State(service): State<VoiceService>) -> Json<Vec<KanalUebersicht>> {
    let kanaele = service
        .registry()
        .kanaele()
        .iter()
        .map(|k| uebersicht(k))
        .collect();
    Json(kanaele)
}

/// `GET /channels/:id`
async fn kanal_details(State(service): State<VoiceService>, Path(id): Path<String>) -> Response {
    let kanal_id = ChannelId::new(id);
    let Some(kanal) = service.registry().holen(kanal_id.as_str()) else {
        return fehler_antwort(&StimmraumError::KanalNichtGefunden(kanal_id.to_string()));
    };

    let zustaende = service.signaling().kanal_zustaende(&kanal_id);
    let participants = kanal
        .teilnehmer_auflisten()
        .into_iter()
        .map(|t| {
            let signaling = zustaende
                .iter()
                .find(|(u, _)| *u == t.user_id)
                .map(|(_, z)| *z);
            TeilnehmerAnsicht {
                user_id: t.user_id,
                display_name: t.anzeigename,
                stream_id: t.stream_id,
                speaking: t.spricht,
                muted: t.stumm,
                deafened: t.taub,
                joined_at: t.beigetreten_am,
                signaling,
            }
        })
        .collect();

    let detail = KanalDetail {
        id: kanal_id,
        server_id: kanal.server_id().to_string(),
        stats: kanal.statistik(),
        participants,
    };
    (StatusCode::OK, Json(detail)).into_response()
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

/// Baut den vollstaendigen Router
pub fn router(service: VoiceService, metriken: VoiceMetriken, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/channels", get(kanaele_auflisten))
        .route("/channels/:id", get(kanal_details))
        .with_state(service.clone());

    Router::new()
        .merge(api)
        .merge(health_router(HealthState::neu(Arc::new(service.clone()))))
        .merge(metrics_router(metriken.clone(), Arc::new(service)))
        .route_layer(axum::middleware::from_fn_with_state(metriken, timing_middleware))
        .layer(request_timing_layer())
        .layer(cors_layer(cors_origins))
}
