//! Prozess-lokaler Event-Bus auf Basis von `tokio::sync::broadcast`
//!
//! Abonnenten erhalten jede Nachricht, die nach ihrem Abonnement
//! veroeffentlicht wurde. Langsame Abonnenten verlieren aeltere Nachrichten
//! (`RecvError::Lagged`), der Veroeffentlicher blockiert nie.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use stimmraum_core::event::EventBus;
use stimmraum_core::{Result, StimmraumError};
use tokio::sync::broadcast;

/// Eine Nachricht auf dem Bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusNachricht {
    pub thema: String,
    pub nachricht: String,
}

pub struct BroadcastEventBus {
    tx: broadcast::Sender<BusNachricht>,
    verbunden: AtomicBool,
}

impl BroadcastEventBus {
    pub fn neu(puffer: usize) -> Self {
        let (tx, _) = broadcast::channel(puffer.max(1));
        Self {
            tx,
            verbunden: AtomicBool::new(true),
        }
    }

    pub fn abonnieren(&self) -> broadcast::Receiver<BusNachricht> {
        self.tx.subscribe()
    }

    pub fn verbindung_setzen(&self, verbunden: bool) {
        self.verbunden.store(verbunden, Ordering::Relaxed);
    }
}

#[async_trait]
impl EventBus for BroadcastEventBus {
    async fn veroeffentlichen(&self, thema: &str, nachricht: &str) -> Result<()> {
        if !self.ist_verbunden() {
            return Err(StimmraumError::EventBus("Bus nicht verbunden".into()));
        }

        let empfaenger = self
            .tx
            .send(BusNachricht {
                thema: thema.to_string(),
                nachricht: nachricht.to_string(),
            })
            // Ohne Abonnenten geht die Nachricht verloren; das ist kein Fehler
            .unwrap_or(0);

        tracing::trace!(thema = thema, empfaenger = empfaenger, "Event veroeffentlicht");
        Ok(())
    }

    fn ist_verbunden(&self) -> bool {
        self.verbunden.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn abonnent_erhaelt_nachricht() {
        let bus = BroadcastEventBus::neu(16);
        let mut rx = bus.abonnieren();

        bus.veroeffentlichen("voice.general", "{}").await.unwrap();

        let empfangen = rx.recv().await.unwrap();
        assert_eq!(empfangen.thema, "voice.general");
        assert_eq!(empfangen.nachricht, "{}");
    }

    #[tokio::test]
    async fn ohne_abonnenten_kein_fehler() {
        let bus = BroadcastEventBus::neu(16);
        assert!(bus.veroeffentlichen("voice.general", "{}").await.is_ok());
    }

    #[tokio::test]
    async fn getrennter_bus_meldet_fehler() {
        let bus = BroadcastEventBus::neu(16);
        bus.verbindung_setzen(false);
        assert!(matches!(
            bus.veroeffentlichen("voice.general", "{}").await,
            Err(StimmraumError::EventBus(_))
        ));
    }
}
