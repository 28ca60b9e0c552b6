//! Channel-Registry – prozessweite Zuordnung Kanal-ID -> VoiceChannel
//!
//! Ein einziger Lock schuetzt nur die Map (Einfuegen/Entfernen). Er wird nie
//! waehrend Kanal-Operationen gehalten, mit einer Ausnahme: beim Entfernen
//! wird der Kanal unter dem Registry-Lock geschlossen, damit Entfernen und
//! Leer-Pruefung atomar sind. Lock-Reihenfolge ist immer Registry -> Kanal.
//!
//! Thread-safe und `Clone`-faehig (innerer Arc).

use crate::channel::VoiceChannel;
use crate::participant::STANDARD_STREAM_ID_BASIS;
use parking_lot::Mutex;
use stimmraum_core::{ChannelId, Result, ServerId, StimmraumError, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Standard-Kapazitaet neuer Kanaele
pub const STANDARD_KAPAZITAET: usize = 50;

/// Standard-Periode des Reapers
pub const STANDARD_REAPER_INTERVALL: Duration = Duration::from_secs(30);

/// Wie oft ein Beitritt neu aufgeloest wird, wenn der Kanal zwischen
/// Nachschlagen und Beitritt entfernt wurde
const MAX_BEITRITTS_VERSUCHE: usize = 3;

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Konfiguration der Registry, nach der Konstruktion unveraenderlich
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub standard_kapazitaet: usize,
    pub reaper_intervall: Duration,
    pub stream_id_basis: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            standard_kapazitaet: STANDARD_KAPAZITAET,
            reaper_intervall: STANDARD_REAPER_INTERVALL,
            stream_id_basis: STANDARD_STREAM_ID_BASIS,
        }
    }
}

impl RegistryConfig {
    /// Prueft die Konfiguration; Fehler sind Programmierfehler und brechen
    /// die Konstruktion ab
    pub fn validieren(&self) -> Result<()> {
        if self.standard_kapazitaet == 0 {
            return Err(StimmraumError::konfiguration(
                "standard_kapazitaet muss positiv sein",
            ));
        }
        if self.reaper_intervall.is_zero() {
            return Err(StimmraumError::konfiguration(
                "reaper_intervall muss groesser als 0 sein",
            ));
        }
        // 0 ist der "nicht gefunden"-Wert fuer Stream-IDs
        if self.stream_id_basis == 0 {
            return Err(StimmraumError::konfiguration(
                "stream_id_basis darf nicht 0 sein",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ChannelRegistry
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ChannelRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    config: RegistryConfig,
    kanaele: Mutex<HashMap<ChannelId, Arc<VoiceChannel>>>,
}

impl ChannelRegistry {
    /// Erstellt eine leere Registry; schlaegt nur bei ungueltiger Konfiguration fehl
    pub fn neu(config: RegistryConfig) -> Result<Self> {
        config.validieren()?;
        tracing::debug!(
            kapazitaet = config.standard_kapazitaet,
            reaper_sek = config.reaper_intervall.as_secs(),
            stream_id_basis = config.stream_id_basis,
            "Channel-Registry initialisiert"
        );
        Ok(Self {
            inner: Arc::new(RegistryInner {
                config,
                kanaele: Mutex::new(HashMap::new()),
            }),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Gibt den Kanal zurueck oder legt ihn atomar an
    ///
    /// Idempotent: ein vorhandener Kanal wird unveraendert zurueckgegeben,
    /// `server_id` wird dann ignoriert.
    pub fn erstellen_oder_holen(
        &self,
        kanal_id: impl Into<ChannelId>,
        server_id: impl Into<ServerId>,
    ) -> Arc<VoiceChannel> {
        let kanal_id = kanal_id.into();
        let mut kanaele = self.inner.kanaele.lock();

        if let Some(kanal) = kanaele.get(&kanal_id) {
            return Arc::clone(kanal);
        }

        let server_id = server_id.into();
        let kanal = Arc::new(VoiceChannel::neu(
            kanal_id.clone(),
            server_id.clone(),
            self.inner.config.standard_kapazitaet,
            self.inner.config.stream_id_basis,
        ));
        kanaele.insert(kanal_id.clone(), Arc::clone(&kanal));
        drop(kanaele);

        tracing::info!(kanal_id = %kanal_id, server_id = %server_id, "Voice-Kanal erstellt");
        kanal
    }

    /// Reines Nachschlagen, legt nichts an
    pub fn holen(&self, kanal_id: &str) -> Option<Arc<VoiceChannel>> {
        self.inner.kanaele.lock().get(kanal_id).cloned()
    }

    /// Entfernt einen Kanal falls vorhanden
    ///
    /// Der Kanal wird geschlossen: Aufrufer, die noch ein Handle halten,
    /// koennen keine Teilnehmer mehr hinzufuegen.
    pub fn entfernen(&self, kanal_id: &str) -> bool {
        let mut kanaele = self.inner.kanaele.lock();
        match kanaele.remove(kanal_id) {
            Some(kanal) => {
                kanal.schliessen();
                drop(kanaele);
                tracing::info!(kanal_id = %kanal_id, "Voice-Kanal entfernt");
                true
            }
            None => false,
        }
    }

    /// Entfernt einen Kanal nur wenn er leer ist
    ///
    /// Leer-Pruefung und Loeschen passieren im selben kritischen Abschnitt;
    /// ein Beitritt, der vorher landet, haelt den Kanal am Leben.
    pub fn entfernen_falls_leer(&self, kanal_id: &str) -> bool {
        let mut kanaele = self.inner.kanaele.lock();
        let Some(kanal) = kanaele.get(kanal_id) else {
            return false;
        };
        if !kanal.schliessen_falls_leer() {
            return false;
        }
        kanaele.remove(kanal_id);
        drop(kanaele);

        tracing::debug!(kanal_id = %kanal_id, "Leerer Kanal entfernt");
        true
    }

    /// Tritt einem Kanal bei und legt ihn bei Bedarf an
    ///
    /// Wurde der Kanal zwischen Nachschlagen und Beitritt entfernt, wird er
    /// neu aufgeloest. Gibt Kanal und Stream-ID zurueck.
    pub fn beitreten(
        &self,
        kanal_id: &ChannelId,
        server_id: &ServerId,
        user_id: &UserId,
        anzeigename: Option<String>,
    ) -> Result<(Arc<VoiceChannel>, u32)> {
        for _ in 0..MAX_BEITRITTS_VERSUCHE {
            let kanal = self.erstellen_oder_holen(kanal_id.clone(), server_id.clone());
            match kanal.teilnehmer_hinzufuegen(user_id.clone(), anzeigename.clone()) {
                Ok(stream_id) => return Ok((kanal, stream_id)),
                Err(StimmraumError::KanalNichtGefunden(_)) if kanal.ist_geschlossen() => {
                    tracing::debug!(kanal_id = %kanal_id, "Kanal waehrend Beitritt entfernt, neuer Versuch");
                }
                Err(e) => return Err(e),
            }
        }
        Err(StimmraumError::KanalNichtGefunden(kanal_id.to_string()))
    }

    /// Momentaufnahme aller Kanal-IDs
    pub fn kanal_ids(&self) -> Vec<ChannelId> {
        self.inner.kanaele.lock().keys().cloned().collect()
    }

    /// Momentaufnahme aller Kanaele, sortiert nach ID
    pub fn kanaele(&self) -> Vec<Arc<VoiceChannel>> {
        let mut kanaele: Vec<_> = self.inner.kanaele.lock().values().cloned().collect();
        kanaele.sort_by(|a, b| a.kanal_id().cmp(b.kanal_id()));
        kanaele
    }

    pub fn anzahl(&self) -> usize {
        self.inner.kanaele.lock().len()
    }

    /// Schliesst und entfernt alle Kanaele (Shutdown)
    pub fn leeren(&self) -> usize {
        let entfernt: Vec<_> = self.inner.kanaele.lock().drain().collect();
        for (_, kanal) in &entfernt {
            kanal.schliessen();
        }
        entfernt.len()
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                config: RegistryConfig::default(),
                kanaele: Mutex::new(HashMap::new()),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
