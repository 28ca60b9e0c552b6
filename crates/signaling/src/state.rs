//! Signaling-Sitzung – Zustandsmaschine pro (Kanal, Teilnehmer)
//!
//! ## State Machine
//! ```text
//! Idle -> OfferErhalten -> AnswerGesendet -> Verbunden -> Geschlossen
//!              ^                                 |
//!              +------------ offer --------------+   (Neuverhandlung)
//!
//! Fehlgeschlagen  <- ungueltiges Ereignis in jedem nicht-terminalen Zustand
//! Geschlossen     <- close aus jedem Zustand (terminal)
//! ```
//!
//! SDP-Blobs werden nicht geparst. ICE-Kandidaten werden in
//! Ankunftsreihenfolge gesammelt.

use chrono::{DateTime, Utc};
use serde::Serialize;
use stimmraum_core::{ChannelId, Result, StimmraumError, UserId};
use std::fmt;

// ---------------------------------------------------------------------------
// Zustand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalingZustand {
    /// Angelegt, noch kein Offer
    Idle,
    OfferErhalten,
    AnswerGesendet,
    /// Media-Transport hat die Verbindung gemeldet
    Verbunden,
    /// Terminal
    Geschlossen,
    /// Protokollfehler; nur ein frisches Offer oder close fuehren heraus
    Fehlgeschlagen,
}

impl SignalingZustand {
    pub fn ist_terminal(self) -> bool {
        self == Self::Geschlossen
    }

    /// Zustaende in denen ICE-Kandidaten angenommen werden
    fn nimmt_kandidaten_an(self) -> bool {
        matches!(
            self,
            Self::OfferErhalten | Self::AnswerGesendet | Self::Verbunden
        )
    }
}

impl fmt::Display for SignalingZustand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::OfferErhalten => "OfferErhalten",
            Self::AnswerGesendet => "AnswerGesendet",
            Self::Verbunden => "Verbunden",
            Self::Geschlossen => "Geschlossen",
            Self::Fehlgeschlagen => "Fehlgeschlagen",
        };
        f.write_str(name)
    }
}

/// Eingehende Signaling-Ereignisse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingEreignis {
    Offer,
    Answer,
    IceKandidat,
    TransportVerbunden,
    Schliessen,
}

impl SignalingEreignis {
    pub fn name(self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Answer => "answer",
            Self::IceKandidat => "ice_kandidat",
            Self::TransportVerbunden => "transport_verbunden",
            Self::Schliessen => "close",
        }
    }
}

// ---------------------------------------------------------------------------
// SignalingSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SignalingSession {
    pub kanal_id: ChannelId,
    pub user_id: UserId,
    zustand: SignalingZustand,
    offer_sdp: Option<String>,
    answer_sdp: Option<String>,
    kandidaten: Vec<String>,
    pub erstellt_am: DateTime<Utc>,
    pub aktualisiert_am: DateTime<Utc>,
}

impl SignalingSession {
    pub fn neu(kanal_id: ChannelId, user_id: UserId) -> Self {
        let jetzt = Utc::now();
        Self {
            kanal_id,
            user_id,
            zustand: SignalingZustand::Idle,
            offer_sdp: None,
            answer_sdp: None,
            kandidaten: Vec::new(),
            erstellt_am: jetzt,
            aktualisiert_am: jetzt,
        }
    }

    pub fn zustand(&self) -> SignalingZustand {
        self.zustand
    }

    pub fn offer_sdp(&self) -> Option<&str> {
        self.offer_sdp.as_deref()
    }

    pub fn answer_sdp(&self) -> Option<&str> {
        self.answer_sdp.as_deref()
    }

    pub fn kandidaten(&self) -> &[String] {
        &self.kandidaten
    }

    /// Entnimmt alle gesammelten Kandidaten (Reihenfolge bleibt erhalten)
    pub fn kandidaten_abholen(&mut self) -> Vec<String> {
        std::mem::take(&mut self.kandidaten)
    }

    /// `Idle | Verbunden | Fehlgeschlagen --offer--> OfferErhalten`
    ///
    /// Bei Neuverhandlung aus `Verbunden` bleiben die Kandidaten erhalten,
    /// aus `Fehlgeschlagen` beginnt die Aushandlung von vorn.
    pub fn offer_empfangen(&mut self, sdp: impl Into<String>) -> Result<()> {
        match self.zustand {
            SignalingZustand::Idle | SignalingZustand::Verbunden => {}
            SignalingZustand::Fehlgeschlagen => self.kandidaten.clear(),
            _ => return Err(self.abweisen(SignalingEreignis::Offer)),
        }
        self.offer_sdp = Some(sdp.into());
        self.answer_sdp = None;
        self.uebergehen(SignalingZustand::OfferErhalten);
        Ok(())
    }

    /// `OfferErhalten --answer--> AnswerGesendet`
    pub fn answer_senden(&mut self, sdp: impl Into<String>) -> Result<()> {
        if self.zustand != SignalingZustand::OfferErhalten || self.offer_sdp.is_none() {
            return Err(self.abweisen(SignalingEreignis::Answer));
        }
        self.answer_sdp = Some(sdp.into());
        self.uebergehen(SignalingZustand::AnswerGesendet);
        Ok(())
    }

    /// Haengt einen Kandidaten an; der Zustand bleibt unveraendert
    pub fn kandidat_hinzufuegen(&mut self, kandidat: impl Into<String>) -> Result<()> {
        if !self.zustand.nimmt_kandidaten_an() {
            return Err(self.abweisen(SignalingEreignis::IceKandidat));
        }
        self.kandidaten.push(kandidat.into());
        self.aktualisiert_am = Utc::now();
        Ok(())
    }

    /// `AnswerGesendet --transport_verbunden--> Verbunden`
    pub fn transport_verbunden(&mut self) -> Result<()> {
        if self.zustand != SignalingZustand::AnswerGesendet {
            return Err(self.abweisen(SignalingEreignis::TransportVerbunden));
        }
        self.uebergehen(SignalingZustand::Verbunden);
        Ok(())
    }

    /// Jeder Zustand ausser `Geschlossen` → `Geschlossen`
    pub fn schliessen(&mut self) -> Result<()> {
        if self.zustand.ist_terminal() {
            return Err(self.abweisen(SignalingEreignis::Schliessen));
        }
        self.uebergehen(SignalingZustand::Geschlossen);
        Ok(())
    }

    fn uebergehen(&mut self, neu: SignalingZustand) {
        tracing::trace!(
            kanal_id = %self.kanal_id,
            user_id = %self.user_id,
            von = %self.zustand,
            nach = %neu,
            "Signaling-Uebergang"
        );
        self.zustand = neu;
        self.aktualisiert_am = Utc::now();
    }

    /// Baut den Fehler mit dem Zustand vor dem Ereignis und markiert eine
    /// noch lebende Sitzung als fehlgeschlagen
    fn abweisen(&mut self, ereignis: SignalingEreignis) -> StimmraumError {
        let fehler = StimmraumError::uebergang(self.zustand, ereignis.name());
        tracing::debug!(
            kanal_id = %self.kanal_id,
            user_id = %self.user_id,
            zustand = %self.zustand,
            ereignis = ereignis.name(),
            "Ungueltiger Signaling-Uebergang"
        );
        if !self.zustand.ist_terminal() {
            self.uebergehen(SignalingZustand::Fehlgeschlagen);
        }
        fehler
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
