//! Reaper – entfernt leere Kanaele periodisch
//!
//! Pro Tick wird eine Momentaufnahme der Kanal-IDs genommen und jeder leere
//! Kanal ueber `entfernen_falls_leer` geloescht. Die Leer-Pruefung wird dort
//! im selben kritischen Abschnitt wiederholt, der loescht; ein Beitritt
//! zwischen Momentaufnahme und Loeschen haelt den Kanal am Leben.
//!
//! # Graceful Shutdown
//!
//! Die Loop beobachtet einen `CancellationToken` an jeder Warte-Grenze und
//! endet, sobald er ausgeloest wird.

use crate::registry::ChannelRegistry;
use stimmraum_core::ChannelId;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Groesse des Broadcast-Kanals fuer entfernte Kanal-IDs
const ENTFERNT_KANAL_GROESSE: usize = 256;

pub struct ReaperLoop {
    registry: ChannelRegistry,
    intervall: Duration,
    abbruch: CancellationToken,
    entfernt_tx: broadcast::Sender<ChannelId>,
}

impl ReaperLoop {
    /// Erstellt den Reaper mit der Periode aus der Registry-Konfiguration
    pub fn neu(registry: ChannelRegistry, abbruch: CancellationToken) -> Self {
        let intervall = registry.config().reaper_intervall;
        let (entfernt_tx, _) = broadcast::channel(ENTFERNT_KANAL_GROESSE);
        Self {
            registry,
            intervall,
            abbruch,
            entfernt_tx,
        }
    }

    /// Abonniert die IDs entfernter Kanaele
    pub fn abonnieren(&self) -> broadcast::Receiver<ChannelId> {
        self.entfernt_tx.subscribe()
    }

    pub fn intervall(&self) -> Duration {
        self.intervall
    }

    /// Ein einzelner Durchlauf; gibt die entfernten Kanal-IDs zurueck
    pub fn durchlauf(&self) -> Vec<ChannelId> {
        let mut entfernt = Vec::new();

        for kanal_id in self.registry.kanal_ids() {
            let leer = self
                .registry
                .holen(kanal_id.as_str())
                .map(|k| k.ist_leer())
                .unwrap_or(false);

            if leer && self.registry.entfernen_falls_leer(kanal_id.as_str()) {
                tracing::info!(kanal_id = %kanal_id, "Leeren Kanal aufgeraeumt");
                // Fehler nur wenn niemand abonniert hat
                let _ = self.entfernt_tx.send(kanal_id.clone());
                entfernt.push(kanal_id);
            }
        }

        entfernt
    }

    /// Laeuft bis der Token ausgeloest wird
    pub async fn laufen(self) {
        tracing::info!(intervall_sek = self.intervall.as_secs(), "Reaper gestartet");

        let mut ticker = tokio::time::interval(self.intervall);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // Ersten Tick ueberspringen

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let entfernt = self.durchlauf();
                    if !entfernt.is_empty() {
                        tracing::debug!(anzahl = entfernt.len(), "Reaper-Durchlauf abgeschlossen");
                    }
                }
                _ = self.abbruch.cancelled() => {
                    tracing::info!("Reaper: Shutdown-Signal empfangen");
                    break;
                }
            }
        }

        tracing::info!("Reaper gestoppt");
    }

    /// Startet die Loop als tokio-Task
    pub fn starten(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.laufen())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
