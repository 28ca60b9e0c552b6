//! Fehlertypen fuer Stimmraum
//!
//! Abwesenheit, Duplikate und volle Kanaele sind im nebenlaeufigen Betrieb
//! Routine und werden als Werte zurueckgegeben, nie als Panic.

use thiserror::Error;

/// Globaler Result-Alias fuer Stimmraum
pub type Result<T> = std::result::Result<T, StimmraumError>;

/// Alle Fehlerzustaende des Voice-Kerns und seiner Huelle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StimmraumError {
    // --- NotFound ---
    #[error("Kanal nicht gefunden: {0}")]
    KanalNichtGefunden(String),

    #[error("Teilnehmer nicht gefunden: {0}")]
    TeilnehmerNichtGefunden(String),

    #[error("Signaling-Sitzung nicht gefunden: {0}")]
    SitzungNichtGefunden(String),

    // --- AlreadyExists ---
    #[error("Teilnehmer bereits im Kanal: {0}")]
    BereitsVorhanden(String),

    // --- CapacityExceeded ---
    #[error("Kanal ist voll: Kapazitaet {kapazitaet} erreicht")]
    KapazitaetErreicht { kapazitaet: usize },

    // --- InvalidTransition ---
    #[error("Ungueltiger Signaling-Uebergang: '{ereignis}' im Zustand {zustand}")]
    UngueltigerUebergang { zustand: String, ereignis: String },

    // --- ResourceExhausted ---
    #[error("Ressource erschoepft: {0}")]
    RessourcenErschoepft(String),

    // --- Konfiguration & Kollaborateure ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    #[error("Persistenzfehler: {0}")]
    Persistenz(String),

    #[error("Event-Bus-Fehler: {0}")]
    EventBus(String),
}

impl StimmraumError {
    /// Erstellt einen Konfigurationsfehler
    pub fn konfiguration(msg: impl Into<String>) -> Self {
        Self::Konfiguration(msg.into())
    }

    /// Erstellt einen InvalidTransition-Fehler
    pub fn uebergang(zustand: impl std::fmt::Display, ereignis: impl Into<String>) -> Self {
        Self::UngueltigerUebergang {
            zustand: zustand.to_string(),
            ereignis: ereignis.into(),
        }
    }

    /// true fuer alle NotFound-Varianten (Kanal, Teilnehmer, Sitzung)
    pub fn ist_nicht_gefunden(&self) -> bool {
        matches!(
            self,
            Self::KanalNichtGefunden(_)
                | Self::TeilnehmerNichtGefunden(_)
                | Self::SitzungNichtGefunden(_)
        )
    }

    /// HTTP-Statuscode fuer API-Antworten
    pub fn http_status(&self) -> u16 {
        match self {
            Self::KanalNichtGefunden(_)
            | Self::TeilnehmerNichtGefunden(_)
            | Self::SitzungNichtGefunden(_) => 404,
            Self::BereitsVorhanden(_)
            | Self::KapazitaetErreicht { .. }
            | Self::UngueltigerUebergang { .. } => 409,
            Self::RessourcenErschoepft(_) => 503,
            Self::Persistenz(_) | Self::EventBus(_) => 502,
            Self::Konfiguration(_) => 500,
        }
    }

    /// true wenn ein Beitritt abgelehnt wurde und der Grund dem Client
    /// gemeldet werden soll (voll / doppelt)
    pub fn ist_beitritt_abgelehnt(&self) -> bool {
        matches!(
            self,
            Self::KapazitaetErreicht { .. } | Self::BereitsVorhanden(_)
        )
    }
}
