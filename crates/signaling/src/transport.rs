//! Media-Transport-Grenze
//!
//! Der Coordinator meldet jeden erfolgreichen Uebergang an den Transport,
//! waehrend er den Sitzungs-Lock haelt. Fuer einen Schluessel kommen die
//! Aufrufe damit genau in der Reihenfolge der Uebergaenge an, und nach
//! `sitzung_geschlossen` folgt nur noch ein `offer_erhalten` einer neuen
//! Sitzung. Zwischen verschiedenen Schluesseln gibt es keine Ordnung.
//!
//! Implementierungen duerfen deshalb nicht blockieren und den Coordinator
//! nicht zurueckrufen. Alle Methoden haben leere Standard-Implementierungen.

use std::fmt;
use stimmraum_core::{ChannelId, UserId};
use tokio::sync::mpsc;

/// Schluessel einer Signaling-Sitzung
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SitzungsSchluessel {
    pub kanal_id: ChannelId,
    pub user_id: UserId,
}

impl SitzungsSchluessel {
    pub fn neu(kanal_id: &ChannelId, user_id: &UserId) -> Self {
        Self {
            kanal_id: kanal_id.clone(),
            user_id: user_id.clone(),
        }
    }
}

impl fmt::Display for SitzungsSchluessel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kanal_id, self.user_id)
    }
}

pub trait MediaTransport: Send + Sync {
    fn offer_erhalten(&self, _schluessel: &SitzungsSchluessel, _sdp: &str) {}

    fn answer_gesendet(&self, _schluessel: &SitzungsSchluessel, _sdp: &str) {}

    fn kandidat_erhalten(&self, _schluessel: &SitzungsSchluessel, _kandidat: &str) {}

    fn sitzung_geschlossen(&self, _schluessel: &SitzungsSchluessel) {}
}

/// Transport ohne Wirkung (Tests, Betrieb ohne Media-Server)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl MediaTransport for NullTransport {}

// ---------------------------------------------------------------------------
// QueueTransport
// ---------------------------------------------------------------------------

/// Befehl an den Media-Server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportBefehl {
    Offer {
        schluessel: SitzungsSchluessel,
        sdp: String,
    },
    Answer {
        schluessel: SitzungsSchluessel,
        sdp: String,
    },
    IceKandidat {
        schluessel: SitzungsSchluessel,
        kandidat: String,
    },
    Schliessen {
        schluessel: SitzungsSchluessel,
    },
}

/// Groesse der Befehls-Queue
pub const BEFEHL_QUEUE_GROESSE: usize = 256;

/// Reicht Uebergaenge als [`TransportBefehl`] an einen Media-Task weiter
///
/// Nicht-blockierend: bei voller oder geschlossener Queue wird der Befehl
/// verworfen und geloggt.
#[derive(Debug, Clone)]
pub struct QueueTransport {
    tx: mpsc::Sender<TransportBefehl>,
}

impl QueueTransport {
    pub fn neu() -> (Self, mpsc::Receiver<TransportBefehl>) {
        let (tx, rx) = mpsc::channel(BEFEHL_QUEUE_GROESSE);
        (Self { tx }, rx)
    }

    fn senden(&self, befehl: TransportBefehl) {
        if let Err(e) = self.tx.try_send(befehl) {
            tracing::warn!("Transport-Befehl verworfen: {}", e);
        }
    }
}

impl MediaTransport for QueueTransport {
    fn offer_erhalten(&self, schluessel: &SitzungsSchluessel, sdp: &str) {
        self.senden(TransportBefehl::Offer {
            schluessel: schluessel.clone(),
            sdp: sdp.to_string(),
        });
    }

    fn answer_gesendet(&self, schluessel: &SitzungsSchluessel, sdp: &str) {
        self.senden(TransportBefehl::Answer {
            schluessel: schluessel.clone(),
            sdp: sdp.to_string(),
        });
    }

    fn kandidat_erhalten(&self, schluessel: &SitzungsSchluessel, kandidat: &str) {
        self.senden(TransportBefehl::IceKandidat {
            schluessel: schluessel.clone(),
            kandidat: kandidat.to_string(),
        });
    }

    fn sitzung_geschlossen(&self, schluessel: &SitzungsSchluessel) {
        self.senden(TransportBefehl::Schliessen {
            schluessel: schluessel.clone(),
        });
    }
}
