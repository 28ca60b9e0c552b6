//! Transientes Audio-Paket
//!
//! Wird vom Transport-Layer pro eingehendem Frame erzeugt und vom Kanal
//! sofort verteilt. Nie persistiert. Die Nutzdaten sind bereits kodiert und
//! fuer den Kern undurchsichtig; `Bytes` macht das Klonen beim Fan-out billig.

use bytes::Bytes;
use stimmraum_core::UserId;

/// Codec-Kennung der Nutzdaten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Opus,
    /// Unkomprimiertes PCM (nur Tests / Loopback)
    Pcm,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioPaket {
    /// Absender
    pub user_id: UserId,
    pub nutzdaten: Bytes,
    /// RTP-Zeitstempel (48 kHz-Ticks)
    pub zeitstempel: u32,
    pub sequenz: u16,
    pub stream_id: u32,
    pub codec: Codec,
}

impl AudioPaket {
    /// Erstellt ein Opus-Paket
    pub fn opus(
        user_id: UserId,
        stream_id: u32,
        sequenz: u16,
        zeitstempel: u32,
        nutzdaten: impl Into<Bytes>,
    ) -> Self {
        Self {
            user_id,
            nutzdaten: nutzdaten.into(),
            zeitstempel,
            sequenz,
            stream_id,
            codec: Codec::Opus,
        }
    }

    /// Laenge der Nutzdaten in Bytes (fuer die Kanal-Zaehler)
    pub fn laenge(&self) -> u64 {
        self.nutzdaten.len() as u64
    }
}
