//! Persistenz-Schnittstelle fuer Kanal-Mitgliedschaften
//!
//! Dauerhafte Aufzeichnung von Join/Leave fuer Audit und Wiederanlauf.
//! Der In-Memory-Zustand des Kerns bleibt massgeblich fuer das Routing und
//! muss nicht synchron mit dem Store uebereinstimmen.

use crate::types::{ChannelId, UserId};
use async_trait::async_trait;

/// Store fuer Kanal-Teilnahmen (z.B. MongoDB)
#[async_trait]
pub trait TeilnehmerStore: Send + Sync + 'static {
    /// Zeichnet einen Beitritt auf
    async fn beitritt_aufzeichnen(&self, kanal_id: &ChannelId, user_id: &UserId)
        -> crate::Result<()>;

    /// Zeichnet einen Austritt auf
    async fn austritt_aufzeichnen(&self, kanal_id: &ChannelId, user_id: &UserId)
        -> crate::Result<()>;

    /// Gibt die gespeicherten Teilnehmer eines Kanals zurueck
    async fn teilnehmer_auflisten(&self, kanal_id: &ChannelId) -> crate::Result<Vec<UserId>>;

    /// Verbindungsstatus fuer den Health-Check
    fn ist_verbunden(&self) -> bool;
}
