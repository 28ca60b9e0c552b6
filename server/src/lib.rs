//! stimmraum-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod bus;
pub mod config;
pub mod http;
pub mod service;
pub mod store;

use anyhow::Result;
use bus::BroadcastEventBus;
use config::ServerConfig;
use service::VoiceService;
use std::sync::Arc;
use stimmraum_core::{ChannelId, ServerId};
use stimmraum_observability::VoiceMetriken;
use stimmraum_signaling::{NullTransport, SignalingCoordinator};
use stimmraum_voice::{ChannelRegistry, ReaperLoop};
use store::SpeicherStore;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Baut den VoiceService mit In-Memory-Store und lokalem Event-Bus
    pub fn service_aufbauen(&self) -> Result<VoiceService> {
        let registry = ChannelRegistry::neu(self.config.registry_config()?)?;
        let store = Arc::new(SpeicherStore::neu());
        let bus = Arc::new(BroadcastEventBus::neu(self.config.event_bus.puffer));

        tracing::info!(
            persistenz = %self.config.persistenz.url,
            event_bus = %self.config.event_bus.url,
            "Store und Event-Bus laufen prozess-lokal"
        );

        Ok(VoiceService::neu(
            registry,
            SignalingCoordinator::neu(Arc::new(NullTransport)),
            store,
            bus,
            ServerId::new(self.config.server.id.clone()),
        ))
    }

    /// Bindet die HTTP-Adresse und laeuft bis Ctrl-C / SIGTERM
    pub async fn starten(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.http_bind_adresse()).await?;

        let abbruch = CancellationToken::new();
        let signal_token = abbruch.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            signal_token.cancel();
        });

        self.laufen(listener, abbruch).await
    }

    /// Startet Reaper und HTTP-Server und laeuft bis der Token ausgeloest wird
    ///
    /// Reihenfolge beim Shutdown:
    /// 1. HTTP-Server nimmt keine neuen Verbindungen mehr an
    /// 2. Reaper und Aufraeum-Task enden an ihrer naechsten Warte-Grenze
    /// 3. Alle Kanaele und Signaling-Sitzungen werden geschlossen
    pub async fn laufen(self, listener: TcpListener, abbruch: CancellationToken) -> Result<()> {
        let service = self.service_aufbauen()?;
        let metriken = VoiceMetriken::neu()?;

        let reaper = ReaperLoop::neu(service.registry().clone(), abbruch.clone());
        let entfernt_rx = reaper.abonnieren();
        let reaper_handle = reaper.starten();
        let aufraeumer = tokio::spawn(entfernte_kanaele_melden(
            service.clone(),
            entfernt_rx,
            abbruch.clone(),
        ));

        let app = http::router(service.clone(), metriken, &self.config.netzwerk.cors_origins);
        let adresse = listener.local_addr()?;

        tracing::info!(
            server_name = %self.config.server.name,
            http = %adresse,
            rtc_port = self.config.netzwerk.rtc_port,
            stun = %self.config.netzwerk.stun_server,
            "Voice-Server gestartet"
        );

        let http_token = abbruch.clone();
        let ergebnis = axum::serve(listener, app)
            .with_graceful_shutdown(async move { http_token.cancelled().await })
            .await;

        // Falls der HTTP-Server aus anderem Grund endet
        abbruch.cancel();
        if let Err(e) = reaper_handle.await {
            tracing::error!("Reaper-Task abgebrochen: {e}");
        }
        if let Err(e) = aufraeumer.await {
            tracing::error!("Aufraeum-Task abgebrochen: {e}");
        }
        service.herunterfahren();

        tracing::info!("Server beendet");
        ergebnis?;
        Ok(())
    }
}

/// Schliesst die Signaling-Sitzungen vom Reaper entfernter Kanaele und
/// veroeffentlicht `KanalEntfernt`
pub async fn entfernte_kanaele_melden(
    service: VoiceService,
    mut entfernt_rx: broadcast::Receiver<ChannelId>,
    abbruch: CancellationToken,
) {
    loop {
        tokio::select! {
            ergebnis = entfernt_rx.recv() => match ergebnis {
                Ok(kanal_id) => service.kanal_entfernt(&kanal_id).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(verpasst = n, "Aufraeum-Task hinkt dem Reaper hinterher");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = abbruch.cancelled() => break,
        }
    }
}

/// Wartet auf Ctrl-C oder SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("SIGINT empfangen, Server wird beendet"),
            Err(e) => tracing::error!("SIGINT kann nicht abgehoert werden: {e}"),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("SIGTERM empfangen, Server wird beendet");
            }
            Err(e) => {
                tracing::error!("SIGTERM kann nicht abgehoert werden: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
