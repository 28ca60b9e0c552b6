//! In-Memory-Teilnehmer-Store
//!
//! Haelt pro Kanal die aufgezeichneten Teilnehmer in Beitrittsreihenfolge.
//! Der Verbindungsstatus ist umschaltbar, damit der Health-Check einen
//! ausgefallenen Store abbilden kann.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use stimmraum_core::store::TeilnehmerStore;
use stimmraum_core::{ChannelId, Result, StimmraumError, UserId};

pub struct SpeicherStore {
    eintraege: DashMap<ChannelId, Vec<UserId>>,
    verbunden: AtomicBool,
}

impl SpeicherStore {
    pub fn neu() -> Self {
        Self {
            eintraege: DashMap::new(),
            verbunden: AtomicBool::new(true),
        }
    }

    pub fn verbindung_setzen(&self, verbunden: bool) {
        self.verbunden.store(verbunden, Ordering::Relaxed);
    }

    fn pruefen(&self) -> Result<()> {
        if self.ist_verbunden() {
            Ok(())
        } else {
            Err(StimmraumError::Persistenz("Store nicht verbunden".into()))
        }
    }
}

impl Default for SpeicherStore {
    fn default() -> Self {
        Self::neu()
    }
}

#[async_trait]
impl TeilnehmerStore for SpeicherStore {
    async fn beitritt_aufzeichnen(&self, kanal_id: &ChannelId, user_id: &UserId) -> Result<()> {
        self.pruefen()?;
        let mut liste = self.eintraege.entry(kanal_id.clone()).or_default();
        if !liste.contains(user_id) {
            liste.push(user_id.clone());
        }
        Ok(())
    }

    async fn austritt_aufzeichnen(&self, kanal_id: &ChannelId, user_id: &UserId) -> Result<()> {
        self.pruefen()?;
        // Leere Listen entfernen, damit entfernte Kanaele keinen Eintrag behalten
        self.eintraege
            .remove_if_mut(kanal_id, |_, liste| {
                liste.retain(|u| u != user_id);
                liste.is_empty()
            });
        Ok(())
    }

    async fn teilnehmer_auflisten(&self, kanal_id: &ChannelId) -> Result<Vec<UserId>> {
        self.pruefen()?;
        Ok(self
            .eintraege
            .get(kanal_id)
            .map(|liste| liste.clone())
            .unwrap_or_default())
    }

    fn ist_verbunden(&self) -> bool {
        self.verbunden.load(Ordering::Relaxed)
    }
}
