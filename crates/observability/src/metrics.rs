//! Prometheus-kompatible Metriken fuer Stimmraum
//!
//! Registrierte Metriken:
//! - `stimmraum_voice_channels_active` – Gauge: Aktive Voice-Kanaele
//! - `stimmraum_voice_participants` – Gauge: Teilnehmer ueber alle Kanaele
//! - `stimmraum_voice_speakers` – Gauge: Aktive Sprecher
//! - `stimmraum_voice_packets_sent` / `_received` – Gauge: Pakete lebender Kanaele
//! - `stimmraum_voice_bytes_sent` / `_received` – Gauge: Bytes lebender Kanaele
//! - `stimmraum_http_requests_total` – Counter: HTTP-Anfragen (method, path, status)
//! - `stimmraum_http_request_duration_seconds` – Histogram: HTTP-Antwortzeit
//!
//! Die Voice-Gauges werden bei jedem Scrape aus einer [`MetrikQuelle`]
//! neu gesetzt; entfernte Kanaele fallen damit aus den Summen heraus.

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Momentaufnahme ueber alle lebenden Kanaele
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetrikSchnappschuss {
    pub kanaele: u64,
    pub teilnehmer: u64,
    pub sprecher: u64,
    pub pakete_gesendet: u64,
    pub pakete_empfangen: u64,
    pub bytes_gesendet: u64,
    pub bytes_empfangen: u64,
}

pub trait MetrikQuelle: Send + Sync + 'static {
    fn schnappschuss(&self) -> MetrikSchnappschuss;
}

/// Alle Stimmraum-Prometheus-Metriken
#[derive(Clone)]
pub struct VoiceMetriken {
    pub registry: Arc<Registry>,

    // Voice-Metriken
    pub kanaele_aktiv: IntGauge,
    pub teilnehmer: IntGauge,
    pub sprecher: IntGauge,
    pub pakete_gesendet: IntGauge,
    pub pakete_empfangen: IntGauge,
    pub bytes_gesendet: IntGauge,
    pub bytes_empfangen: IntGauge,

    // HTTP-Metriken
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
}

fn gauge(registry: &Registry, name: &str, hilfe: &str) -> Result<IntGauge> {
    let gauge = IntGauge::with_opts(Opts::new(name, hilfe))?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

/// u64 → i64 ohne Ueberlauf
fn als_i64(wert: u64) -> i64 {
    i64::try_from(wert).unwrap_or(i64::MAX)
}

impl VoiceMetriken {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        // --- Voice-Metriken ---
        let kanaele_aktiv = gauge(
            &registry,
            "stimmraum_voice_channels_active",
            "Anzahl aktiver Voice-Kanaele",
        )?;
        let teilnehmer = gauge(
            &registry,
            "stimmraum_voice_participants",
            "Teilnehmer ueber alle Voice-Kanaele",
        )?;
        let sprecher = gauge(
            &registry,
            "stimmraum_voice_speakers",
            "Teilnehmer die gerade sprechen",
        )?;
        let pakete_gesendet = gauge(
            &registry,
            "stimmraum_voice_packets_sent",
            "Zugestellte Audio-Pakete lebender Kanaele",
        )?;
        let pakete_empfangen = gauge(
            &registry,
            "stimmraum_voice_packets_received",
            "Empfangene Audio-Pakete lebender Kanaele",
        )?;
        let bytes_gesendet = gauge(
            &registry,
            "stimmraum_voice_bytes_sent",
            "Zugestellte Audio-Bytes lebender Kanaele",
        )?;
        let bytes_empfangen = gauge(
            &registry,
            "stimmraum_voice_bytes_received",
            "Empfangene Audio-Bytes lebender Kanaele",
        )?;

        // --- HTTP-Metriken ---
        let http_requests_total = IntCounterVec::new(
            Opts::new("stimmraum_http_requests_total", "Gesamtanzahl HTTP-Anfragen"),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "stimmraum_http_request_duration_seconds",
                "HTTP-Antwortzeit in Sekunden",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
            &["method", "path"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            kanaele_aktiv,
            teilnehmer,
            sprecher,
            pakete_gesendet,
            pakete_empfangen,
            bytes_gesendet,
            bytes_empfangen,
            http_requests_total,
            http_request_duration_seconds,
        })
    }

    /// Setzt alle Voice-Gauges auf die Momentaufnahme
    pub fn aktualisieren(&self, s: &MetrikSchnappschuss) {
        self.kanaele_aktiv.set(als_i64(s.kanaele));
        self.teilnehmer.set(als_i64(s.teilnehmer));
        self.sprecher.set(als_i64(s.sprecher));
        self.pakete_gesendet.set(als_i64(s.pakete_gesendet));
        self.pakete_empfangen.set(als_i64(s.pakete_empfangen));
        self.bytes_gesendet.set(als_i64(s.bytes_gesendet));
        self.bytes_empfangen.set(als_i64(s.bytes_empfangen));
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[derive(Clone)]
struct MetrikState {
    metriken: VoiceMetriken,
    quelle: Arc<dyn MetrikQuelle>,
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: VoiceMetriken, quelle: Arc<dyn MetrikQuelle>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(MetrikState { metriken, quelle })
}

async fn metrics_handler(State(state): State<MetrikState>) -> impl IntoResponse {
    state.metriken.aktualisieren(&state.quelle.schnappschuss());

    match state.metriken.exportieren() {
        Ok(text) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct FesteQuelle(MetrikSchnappschuss);

    impl MetrikQuelle for FesteQuelle {
        fn schnappschuss(&self) -> MetrikSchnappschuss {
            self.0
        }
    }

    #[test]
    fn aktualisieren_setzt_gauges() {
        let metriken = VoiceMetriken::neu().unwrap();
        metriken.aktualisieren(&MetrikSchnappschuss {
            kanaele: 2,
            teilnehmer: 5,
            sprecher: 1,
            pakete_gesendet: 40,
            ..Default::default()
        });

        assert_eq!(metriken.kanaele_aktiv.get(), 2);
        assert_eq!(metriken.teilnehmer.get(), 5);
        assert_eq!(metriken.sprecher.get(), 1);
        assert_eq!(metriken.pakete_gesendet.get(), 40);
        assert_eq!(metriken.bytes_empfangen.get(), 0);

        // Ein spaeterer Scrape ohne Kanaele setzt zurueck
        metriken.aktualisieren(&MetrikSchnappschuss::default());
        assert_eq!(metriken.kanaele_aktiv.get(), 0);
    }

    #[test]
    fn ueberlauf_wird_gekappt() {
        assert_eq!(als_i64(u64::MAX), i64::MAX);
        assert_eq!(als_i64(7), 7);
    }

    #[test]
    fn export_prometheus_format() {
        let metriken = VoiceMetriken::neu().unwrap();
        metriken.kanaele_aktiv.set(3);

        let output = metriken.exportieren().unwrap();
        assert!(output.contains("stimmraum_voice_channels_active 3"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[tokio::test]
    async fn endpunkt_liest_quelle_beim_scrape() {
        let quelle = Arc::new(FesteQuelle(MetrikSchnappschuss {
            kanaele: 1,
            teilnehmer: 3,
            ..Default::default()
        }));
        let app = metrics_router(VoiceMetriken::neu().unwrap(), quelle);

        let antwort = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(antwort.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(antwort.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("stimmraum_voice_participants 3"));
    }
}
