//! Voice-Ereignisse und Event-Bus-Schnittstelle
//!
//! Der Kern ruft den Event-Bus nie selbst auf. Die Huelle um den Kern
//! (VoiceService im Server-Crate) veroeffentlicht Join/Leave/Speaking-Events,
//! damit andere Prozesse (Text-Channels, Gateway) davon erfahren.

use crate::types::{ChannelId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Alle Voice-Ereignisse, die ueber den Event-Bus angekuendigt werden
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "typ", rename_all = "snake_case")]
pub enum VoiceEreignis {
    /// Ein Benutzer ist einem Kanal beigetreten
    Beigetreten {
        kanal_id: ChannelId,
        user_id: UserId,
        stream_id: u32,
    },
    /// Ein Benutzer hat einen Kanal verlassen
    Verlassen { kanal_id: ChannelId, user_id: UserId },
    /// Sprachaktivitaet hat sich geaendert
    Spricht {
        kanal_id: ChannelId,
        user_id: UserId,
        spricht: bool,
    },
    /// Mikrofon stumm geschaltet / freigegeben
    Stumm {
        kanal_id: ChannelId,
        user_id: UserId,
        stumm: bool,
    },
    /// Ausgabe taub geschaltet / freigegeben
    Taub {
        kanal_id: ChannelId,
        user_id: UserId,
        taub: bool,
    },
    /// Kanal wurde entfernt (explizit oder durch den Reaper)
    KanalEntfernt { kanal_id: ChannelId },
}

impl VoiceEreignis {
    /// Kanal, auf den sich das Ereignis bezieht
    pub fn kanal_id(&self) -> &ChannelId {
        match self {
            Self::Beigetreten { kanal_id, .. }
            | Self::Verlassen { kanal_id, .. }
            | Self::Spricht { kanal_id, .. }
            | Self::Stumm { kanal_id, .. }
            | Self::Taub { kanal_id, .. }
            | Self::KanalEntfernt { kanal_id } => kanal_id,
        }
    }

    /// Topic, unter dem das Ereignis veroeffentlicht wird: `voice.<kanal>`
    pub fn thema(&self) -> String {
        format!("voice.{}", self.kanal_id())
    }

    /// Serialisiert das Ereignis als JSON-Nachricht
    pub fn als_nachricht(&self) -> String {
        // Serialisierung eines Enums aus Strings/Zahlen kann nicht fehlschlagen
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Prozessuebergreifender Pub/Sub-Bus (z.B. Redis)
#[async_trait]
pub trait EventBus: Send + Sync + 'static {
    /// Veroeffentlicht eine Nachricht unter einem Topic
    async fn veroeffentlichen(&self, thema: &str, nachricht: &str) -> crate::Result<()>;

    /// Verbindungsstatus fuer den Health-Check
    fn ist_verbunden(&self) -> bool;
}
