//! Audio-Sink – Zustell-Schnittstelle zum Media-Transport
//!
//! Der Transport registriert genau einen Sink pro Kanal. Der Kanal ruft
//! `zustellen` pro Empfaenger (Broadcast) und `weiterleiten` fuer Pakete an
//! den Transport selbst auf, immer ausserhalb seines Teilnehmer-Locks.
//!
//! Varianten:
//! - [`QueueSink`] – pro Empfaenger eine begrenzte tokio-mpsc-Queue, aus der
//!   der Sende-Task des Transports liest, plus eine Ausgangs-Queue fuer den
//!   Transport-Konsumenten
//! - [`NullSink`] – verwirft alles (Tests, Kanaele ohne Transport)

use crate::packet::AudioPaket;
use parking_lot::RwLock;
use stimmraum_core::UserId;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Groesse der Send-Queue pro Empfaenger (Pakete)
pub const SEND_QUEUE_GROESSE: usize = 128;

/// Zustellung eines Pakets an einen Empfaenger oder an den Transport
pub trait AudioSink: Send + Sync {
    /// Gibt true zurueck wenn das Paket angenommen wurde
    fn zustellen(&self, empfaenger: &UserId, paket: &AudioPaket) -> bool;

    /// Uebergibt ein Paket an den einzigen Konsumenten des Transports;
    /// kein Teilnehmer erhaelt es
    fn weiterleiten(&self, paket: &AudioPaket) -> bool;
}

// ---------------------------------------------------------------------------
// NullSink
// ---------------------------------------------------------------------------

/// Nimmt jedes Paket an und verwirft es
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn zustellen(&self, _empfaenger: &UserId, _paket: &AudioPaket) -> bool {
        true
    }

    fn weiterleiten(&self, _paket: &AudioPaket) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// QueueSink
// ---------------------------------------------------------------------------

/// Sink mit einer Send-Queue pro Empfaenger
///
/// Nicht-blockierend: bei voller Queue wird das Paket verworfen (UDP-Semantik).
#[derive(Default)]
pub struct QueueSink {
    queues: RwLock<HashMap<UserId, mpsc::Sender<AudioPaket>>>,
    ausgang: RwLock<Option<mpsc::Sender<AudioPaket>>>,
}

impl QueueSink {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Legt die Queue eines Empfaengers an und gibt deren Empfangsseite zurueck
    ///
    /// Eine bestehende Queue desselben Empfaengers wird ersetzt.
    pub fn registrieren(&self, user_id: UserId) -> mpsc::Receiver<AudioPaket> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        self.queues.write().insert(user_id, tx);
        rx
    }

    /// Legt die Ausgangs-Queue des Transports an (ersetzt eine bestehende)
    pub fn ausgang_registrieren(&self) -> mpsc::Receiver<AudioPaket> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        *self.ausgang.write() = Some(tx);
        rx
    }

    pub fn abmelden(&self, user_id: &UserId) -> bool {
        self.queues.write().remove(user_id).is_some()
    }

    pub fn anzahl(&self) -> usize {
        self.queues.read().len()
    }
}

impl AudioSink for QueueSink {
    fn zustellen(&self, empfaenger: &UserId, paket: &AudioPaket) -> bool {
        let Some(tx) = self.queues.read().get(empfaenger).cloned() else {
            tracing::debug!(empfaenger = %empfaenger, "Keine Send-Queue registriert");
            return false;
        };
        einreihen(&tx, paket, empfaenger.as_str())
    }

    fn weiterleiten(&self, paket: &AudioPaket) -> bool {
        let Some(tx) = self.ausgang.read().clone() else {
            tracing::debug!(absender = %paket.user_id, "Keine Ausgangs-Queue registriert");
            return false;
        };
        einreihen(&tx, paket, "ausgang")
    }
}

fn einreihen(tx: &mpsc::Sender<AudioPaket>, paket: &AudioPaket, ziel: &str) -> bool {
    match tx.try_send(paket.clone()) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!(ziel, "Send-Queue voll, Paket verworfen");
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::debug!(ziel, "Send-Queue geschlossen");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paket(seq: u16) -> AudioPaket {
        AudioPaket::opus(UserId::from("sender"), 1000, seq, seq as u32 * 960, vec![0xAB; 20])
    }

    #[test]
    fn queue_sink_stellt_registrierten_empfaengern_zu() {
        let sink = QueueSink::neu();
        let mut rx = sink.registrieren(UserId::from("bob"));

        assert!(sink.zustellen(&UserId::from("bob"), &paket(1)));
        assert!(!sink.zustellen(&UserId::from("carol"), &paket(1)));

        let empfangen = rx.try_recv().expect("bob sollte das Paket erhalten");
        assert_eq!(empfangen.sequenz, 1);
    }

    #[test]
    fn volle_queue_verwirft() {
        let sink = QueueSink::neu();
        let _rx = sink.registrieren(UserId::from("bob"));
        let bob = UserId::from("bob");

        for seq in 0..SEND_QUEUE_GROESSE as u16 {
            assert!(sink.zustellen(&bob, &paket(seq)));
        }
        assert!(!sink.zustellen(&bob, &paket(999)));
    }

    #[test]
    fn geschlossene_queue_meldet_fehler() {
        let sink = QueueSink::neu();
        let rx = sink.registrieren(UserId::from("bob"));
        drop(rx);
        assert!(!sink.zustellen(&UserId::from("bob"), &paket(1)));

        assert!(sink.abmelden(&UserId::from("bob")));
        assert_eq!(sink.anzahl(), 0);
    }

    #[test]
    fn weiterleiten_geht_nur_an_den_ausgang() {
        let sink = QueueSink::neu();
        let mut rx_sender = sink.registrieren(UserId::from("sender"));
        assert!(!sink.weiterleiten(&paket(1)), "ohne Ausgang kein Ziel");

        let mut ausgang = sink.ausgang_registrieren();
        assert!(sink.weiterleiten(&paket(2)));

        assert_eq!(ausgang.try_recv().unwrap().sequenz, 2);
        assert!(rx_sender.try_recv().is_err());
    }
}
