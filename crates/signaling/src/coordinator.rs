//! SignalingCoordinator – verwaltet alle Signaling-Sitzungen
//!
//! Sitzungen liegen in einer `DashMap`, jede hinter ihrem eigenen Mutex.
//! Uebergaenge auf demselben Schluessel sind damit linearisierbar,
//! verschiedene Schluessel teilen sich keinen Lock.
//!
//! Lock-Disziplin: die DashMap-Referenz wird freigegeben bevor der
//! Sitzungs-Mutex genommen wird. Der Transport wird unter dem Sitzungs-Mutex
//! benachrichtigt, damit er die Befehle eines Schluessels in der Reihenfolge
//! der Uebergaenge sieht. Entfernte Sitzungen stehen immer auf `Geschlossen`,
//! ein verspaeteter Aufruf auf einem alten Handle wird also abgewiesen.

use crate::state::{SignalingEreignis, SignalingSession, SignalingZustand};
use crate::transport::{MediaTransport, NullTransport, SitzungsSchluessel};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use stimmraum_core::{ChannelId, Result, StimmraumError, UserId};

type SitzungsHandle = Arc<Mutex<SignalingSession>>;

#[derive(Clone)]
pub struct SignalingCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    sitzungen: DashMap<SitzungsSchluessel, SitzungsHandle>,
    transport: Arc<dyn MediaTransport>,
}

impl SignalingCoordinator {
    pub fn neu(transport: Arc<dyn MediaTransport>) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                sitzungen: DashMap::new(),
                transport,
            }),
        }
    }

    fn sitzung_holen(&self, schluessel: &SitzungsSchluessel) -> Option<SitzungsHandle> {
        self.inner
            .sitzungen
            .get(schluessel)
            .map(|eintrag| Arc::clone(eintrag.value()))
    }

    /// Wendet ein Ereignis auf eine bestehende Sitzung an
    ///
    /// Ohne Sitzung gilt der Teilnehmer als `Idle`; es wird keine Sitzung
    /// angelegt.
    fn anwenden(
        &self,
        schluessel: &SitzungsSchluessel,
        ereignis: SignalingEreignis,
        f: impl FnOnce(&mut SignalingSession) -> Result<()>,
        melden: impl FnOnce(&dyn MediaTransport),
    ) -> Result<SignalingZustand> {
        let sitzung = self.sitzung_holen(schluessel).ok_or_else(|| {
            tracing::debug!(sitzung = %schluessel, ereignis = ereignis.name(), "Ereignis ohne Sitzung");
            StimmraumError::uebergang(SignalingZustand::Idle, ereignis.name())
        })?;

        let mut s = sitzung.lock();
        f(&mut s)?;
        melden(self.inner.transport.as_ref());
        Ok(s.zustand())
    }

    // -----------------------------------------------------------------------
    // Uebergaenge
    // -----------------------------------------------------------------------

    /// Legt die Sitzung beim ersten Offer an
    pub fn offer(&self, kanal_id: &ChannelId, user_id: &UserId, sdp: &str) -> Result<SignalingZustand> {
        let schluessel = SitzungsSchluessel::neu(kanal_id, user_id);
        let sitzung = {
            let eintrag = self
                .inner
                .sitzungen
                .entry(schluessel.clone())
                .or_insert_with(|| {
                    Arc::new(Mutex::new(SignalingSession::neu(
                        kanal_id.clone(),
                        user_id.clone(),
                    )))
                });
            Arc::clone(eintrag.value())
        };

        let mut s = sitzung.lock();
        s.offer_empfangen(sdp)?;
        self.inner.transport.offer_erhalten(&schluessel, sdp);

        tracing::debug!(sitzung = %schluessel, "Offer erhalten");
        Ok(s.zustand())
    }

    pub fn answer(&self, kanal_id: &ChannelId, user_id: &UserId, sdp: &str) -> Result<SignalingZustand> {
        let schluessel = SitzungsSchluessel::neu(kanal_id, user_id);
        let zustand = self.anwenden(
            &schluessel,
            SignalingEreignis::Answer,
            |s| s.answer_senden(sdp),
            |t| t.answer_gesendet(&schluessel, sdp),
        )?;

        tracing::debug!(sitzung = %schluessel, "Answer gesendet");
        Ok(zustand)
    }

    pub fn ice_kandidat(
        &self,
        kanal_id: &ChannelId,
        user_id: &UserId,
        kandidat: &str,
    ) -> Result<SignalingZustand> {
        let schluessel = SitzungsSchluessel::neu(kanal_id, user_id);
        self.anwenden(
            &schluessel,
            SignalingEreignis::IceKandidat,
            |s| s.kandidat_hinzufuegen(kandidat),
            |t| t.kandidat_erhalten(&schluessel, kandidat),
        )
    }

    /// Vom Media-Transport ausgeloest, sobald die Verbindung steht
    pub fn transport_verbunden(&self, kanal_id: &ChannelId, user_id: &UserId) -> Result<SignalingZustand> {
        let schluessel = SitzungsSchluessel::neu(kanal_id, user_id);
        let zustand = self.anwenden(
            &schluessel,
            SignalingEreignis::TransportVerbunden,
            |s| s.transport_verbunden(),
            |_| {},
        )?;

        tracing::info!(sitzung = %schluessel, "Media-Transport verbunden");
        Ok(zustand)
    }

    /// Schliesst die Sitzung; sie bleibt als `Geschlossen` stehen bis der
    /// Teilnehmer den Kanal verlaesst
    pub fn schliessen(&self, kanal_id: &ChannelId, user_id: &UserId) -> Result<()> {
        let schluessel = SitzungsSchluessel::neu(kanal_id, user_id);
        let sitzung = self
            .sitzung_holen(&schluessel)
            .ok_or_else(|| StimmraumError::SitzungNichtGefunden(schluessel.to_string()))?;

        let mut s = sitzung.lock();
        let vorher = s.zustand();
        s.schliessen()?;
        if vorher != SignalingZustand::Idle {
            self.inner.transport.sitzung_geschlossen(&schluessel);
        }

        tracing::debug!(sitzung = %schluessel, "Sitzung geschlossen");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lebenszyklus
    // -----------------------------------------------------------------------

    /// Entfernt die Sitzung vollstaendig (Teilnehmer hat den Kanal verlassen)
    ///
    /// Eine noch offene Sitzung wird vorher geschlossen. Gibt true zurueck
    /// wenn eine Sitzung existierte.
    pub fn sitzung_entfernen(&self, kanal_id: &ChannelId, user_id: &UserId) -> bool {
        self.entfernen_falls(&SitzungsSchluessel::neu(kanal_id, user_id), || true)
    }

    /// Entfernt die Sitzung nur wenn `verwaist` true liefert
    ///
    /// `verwaist` laeuft unter dem Schreib-Lock der Map: ein gleichzeitiges
    /// `offer` auf denselben Schluessel wartet, bis entschieden ist.
    pub fn sitzung_entfernen_falls(
        &self,
        kanal_id: &ChannelId,
        user_id: &UserId,
        verwaist: impl FnOnce() -> bool,
    ) -> bool {
        self.entfernen_falls(&SitzungsSchluessel::neu(kanal_id, user_id), verwaist)
    }

    fn entfernen_falls(&self, schluessel: &SitzungsSchluessel, verwaist: impl FnOnce() -> bool) -> bool {
        let Some((_, sitzung)) = self.inner.sitzungen.remove_if(schluessel, |_, _| verwaist()) else {
            return false;
        };

        // Eine noch leere Sitzung hat der Transport nie gesehen
        let mut s = sitzung.lock();
        let vorher = s.zustand();
        if !vorher.ist_terminal() && s.schliessen().is_ok() && vorher != SignalingZustand::Idle {
            self.inner.transport.sitzung_geschlossen(schluessel);
        }
        drop(s);

        tracing::debug!(sitzung = %schluessel, "Sitzung entfernt");
        true
    }

    /// Entfernt alle Sitzungen eines Kanals; gibt die Anzahl zurueck
    pub fn kanal_sitzungen_schliessen(&self, kanal_id: &ChannelId) -> usize {
        self.kanal_sitzungen_schliessen_falls(kanal_id, |_| true)
    }

    /// Entfernt die Sitzungen eines Kanals, fuer deren User `verwaist` true
    /// liefert; gibt die Anzahl zurueck
    pub fn kanal_sitzungen_schliessen_falls(
        &self,
        kanal_id: &ChannelId,
        verwaist: impl Fn(&UserId) -> bool,
    ) -> usize {
        let schluessel: Vec<SitzungsSchluessel> = self
            .inner
            .sitzungen
            .iter()
            .filter(|eintrag| &eintrag.key().kanal_id == kanal_id)
            .map(|eintrag| eintrag.key().clone())
            .collect();

        schluessel
            .iter()
            .filter(|s| self.entfernen_falls(s, || verwaist(&s.user_id)))
            .count()
    }

    // -----------------------------------------------------------------------
    // Abfragen
    // -----------------------------------------------------------------------

    pub fn zustand(&self, kanal_id: &ChannelId, user_id: &UserId) -> Option<SignalingZustand> {
        self.sitzung_holen(&SitzungsSchluessel::neu(kanal_id, user_id))
            .map(|s| s.lock().zustand())
    }

    /// Kopie der Sitzung
    pub fn sitzung(&self, kanal_id: &ChannelId, user_id: &UserId) -> Option<SignalingSession> {
        self.sitzung_holen(&SitzungsSchluessel::neu(kanal_id, user_id))
            .map(|s| s.lock().clone())
    }

    /// Entnimmt die gesammelten ICE-Kandidaten einer Sitzung
    pub fn kandidaten_abholen(&self, kanal_id: &ChannelId, user_id: &UserId) -> Result<Vec<String>> {
        let schluessel = SitzungsSchluessel::neu(kanal_id, user_id);
        let sitzung = self
            .sitzung_holen(&schluessel)
            .ok_or_else(|| StimmraumError::SitzungNichtGefunden(schluessel.to_string()))?;
        let kandidaten = sitzung.lock().kandidaten_abholen();
        Ok(kandidaten)
    }

    /// Zustaende aller Sitzungen eines Kanals, nach User-ID sortiert
    pub fn kanal_zustaende(&self, kanal_id: &ChannelId) -> Vec<(UserId, SignalingZustand)> {
        let handles: Vec<(UserId, SitzungsHandle)> = self
            .inner
            .sitzungen
            .iter()
            .filter(|eintrag| &eintrag.key().kanal_id == kanal_id)
            .map(|eintrag| (eintrag.key().user_id.clone(), Arc::clone(eintrag.value())))
            .collect();

        let mut zustaende: Vec<_> = handles
            .into_iter()
            .map(|(user_id, s)| (user_id, s.lock().zustand()))
            .collect();
        zustaende.sort_by(|a, b| a.0.cmp(&b.0));
        zustaende
    }

    pub fn anzahl(&self) -> usize {
        self.inner.sitzungen.len()
    }

    pub fn ist_leer(&self) -> bool {
        self.inner.sitzungen.is_empty()
    }
}

impl Default for SignalingCoordinator {
    fn default() -> Self {
        Self::neu(Arc::new(NullTransport))
    }
}

impl std::fmt::Debug for SignalingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalingCoordinator")
            .field("sitzungen", &self.anzahl())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
