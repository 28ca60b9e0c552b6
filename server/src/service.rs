//! VoiceService – Huelle um den Voice-Kern
//!
//! Verbindet Registry, Signaling, Teilnehmer-Store und Event-Bus. Der
//! In-Memory-Kern ist massgeblich: Fehler von Store oder Bus werden geloggt,
//! lassen die Operation aber nicht scheitern.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stimmraum_core::event::{EventBus, VoiceEreignis};
use stimmraum_core::store::TeilnehmerStore;
use stimmraum_core::{ChannelId, Result, ServerId, StimmraumError, UserId};
use stimmraum_observability::{HealthKomponenten, HealthQuelle, MetrikQuelle, MetrikSchnappschuss};
use stimmraum_signaling::{SignalingCoordinator, SignalingZustand};
use stimmraum_voice::{ChannelRegistry, VoiceChannel};

#[derive(Clone)]
pub struct VoiceService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    registry: ChannelRegistry,
    signaling: SignalingCoordinator,
    store: Arc<dyn TeilnehmerStore>,
    bus: Arc<dyn EventBus>,
    standard_server: ServerId,
    initialisiert: AtomicBool,
}

impl VoiceService {
    pub fn neu(
        registry: ChannelRegistry,
        signaling: SignalingCoordinator,
        store: Arc<dyn TeilnehmerStore>,
        bus: Arc<dyn EventBus>,
        standard_server: ServerId,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                registry,
                signaling,
                store,
                bus,
                standard_server,
                initialisiert: AtomicBool::new(true),
            }),
        }
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.inner.registry
    }

    pub fn signaling(&self) -> &SignalingCoordinator {
        &self.inner.signaling
    }

    pub fn standard_server(&self) -> &ServerId {
        &self.inner.standard_server
    }

    /// Veroeffentlicht ein Ereignis; Fehler werden nur geloggt
    async fn veroeffentlichen(&self, ereignis: VoiceEreignis) {
        let thema = ereignis.thema();
        if let Err(e) = self
            .inner
            .bus
            .veroeffentlichen(&thema, &ereignis.als_nachricht())
            .await
        {
            tracing::warn!(thema = %thema, fehler = %e, "Event konnte nicht veroeffentlicht werden");
        }
    }

    /// Ob der User im aktuell lebenden Kanal dieser ID sitzt
    fn anwesend(&self, kanal_id: &ChannelId, user_id: &UserId) -> bool {
        self.inner
            .registry
            .holen(kanal_id.as_str())
            .is_some_and(|k| k.hat_teilnehmer(user_id.as_str()))
    }

    fn kanal(&self, kanal_id: &ChannelId) -> Result<Arc<VoiceChannel>> {
        self.inner
            .registry
            .holen(kanal_id.as_str())
            .ok_or_else(|| StimmraumError::KanalNichtGefunden(kanal_id.to_string()))
    }

    // -----------------------------------------------------------------------
    // Kanaele
    // -----------------------------------------------------------------------

    /// Legt einen Kanal an oder gibt den bestehenden zurueck
    pub fn kanal_erstellen(&self, kanal_id: &ChannelId, server_id: Option<&ServerId>) -> Arc<VoiceChannel> {
        let server_id = server_id.unwrap_or(&self.inner.standard_server);
        self.inner
            .registry
            .erstellen_oder_holen(kanal_id.clone(), server_id.clone())
    }

    /// Entfernt einen Kanal samt aller Signaling-Sitzungen
    pub async fn kanal_entfernen(&self, kanal_id: &ChannelId) -> bool {
        if !self.inner.registry.entfernen(kanal_id.as_str()) {
            return false;
        }
        self.kanal_entfernt(kanal_id).await;
        true
    }

    /// Aufraeumen nach dem Entfernen eines Kanals (explizit oder Reaper)
    ///
    /// Wurde unter derselben ID inzwischen ein neuer Kanal angelegt, bleiben
    /// die Sitzungen seiner Teilnehmer bestehen.
    pub async fn kanal_entfernt(&self, kanal_id: &ChannelId) {
        let sitzungen = self
            .inner
            .signaling
            .kanal_sitzungen_schliessen_falls(kanal_id, |user_id| !self.anwesend(kanal_id, user_id));
        if sitzungen > 0 {
            tracing::debug!(kanal_id = %kanal_id, sitzungen, "Signaling-Sitzungen geschlossen");
        }
        self.veroeffentlichen(VoiceEreignis::KanalEntfernt {
            kanal_id: kanal_id.clone(),
        })
        .await;
    }

    // -----------------------------------------------------------------------
    // Teilnehmer
    // -----------------------------------------------------------------------

    /// Tritt einem Kanal bei (legt ihn bei Bedarf an) und gibt die Stream-ID zurueck
    pub async fn beitreten(
        &self,
        kanal_id: &ChannelId,
        server_id: Option<&ServerId>,
        user_id: &UserId,
        anzeigename: Option<String>,
    ) -> Result<u32> {
        let server_id = server_id.unwrap_or(&self.inner.standard_server);
        let (_, stream_id) = self
            .inner
            .registry
            .beitreten(kanal_id, server_id, user_id, anzeigename)?;

        if let Err(e) = self.inner.store.beitritt_aufzeichnen(kanal_id, user_id).await {
            tracing::warn!(kanal_id = %kanal_id, user_id = %user_id, fehler = %e, "Beitritt nicht persistiert");
        }
        self.veroeffentlichen(VoiceEreignis::Beigetreten {
            kanal_id: kanal_id.clone(),
            user_id: user_id.clone(),
            stream_id,
        })
        .await;

        Ok(stream_id)
    }

    /// Verlaesst einen Kanal; der Kanal selbst bleibt bestehen bis zum Reaper
    pub async fn verlassen(&self, kanal_id: &ChannelId, user_id: &UserId) -> Result<()> {
        let kanal = self.kanal(kanal_id)?;
        kanal.teilnehmer_entfernen(user_id.as_str())?;
        // Ein sofortiger Wiederbeitritt behaelt seine neue Sitzung
        self.inner
            .signaling
            .sitzung_entfernen_falls(kanal_id, user_id, || !self.anwesend(kanal_id, user_id));

        if let Err(e) = self.inner.store.austritt_aufzeichnen(kanal_id, user_id).await {
            tracing::warn!(kanal_id = %kanal_id, user_id = %user_id, fehler = %e, "Austritt nicht persistiert");
        }
        self.veroeffentlichen(VoiceEreignis::Verlassen {
            kanal_id: kanal_id.clone(),
            user_id: user_id.clone(),
        })
        .await;

        Ok(())
    }

    /// User-IDs eines Kanals; leer wenn der Kanal unbekannt ist
    pub fn teilnehmer_ids(&self, kanal_id: &ChannelId) -> Vec<UserId> {
        self.inner
            .registry
            .holen(kanal_id.as_str())
            .map(|k| k.teilnehmer_auflisten().into_iter().map(|t| t.user_id).collect())
            .unwrap_or_default()
    }

    /// Gespeicherte Teilnehmer laut Store (kann vom Kern abweichen)
    pub async fn gespeicherte_teilnehmer(&self, kanal_id: &ChannelId) -> Result<Vec<UserId>> {
        self.inner.store.teilnehmer_auflisten(kanal_id).await
    }

    // -----------------------------------------------------------------------
    // Sprachaktivitaet – false wenn Kanal oder Teilnehmer fehlen
    // -----------------------------------------------------------------------

    pub async fn sprechen_setzen(&self, kanal_id: &ChannelId, user_id: &UserId, spricht: bool) -> bool {
        let gesetzt = self
            .inner
            .registry
            .holen(kanal_id.as_str())
            .is_some_and(|k| k.spricht_setzen(user_id.as_str(), spricht));
        if gesetzt {
            self.veroeffentlichen(VoiceEreignis::Spricht {
                kanal_id: kanal_id.clone(),
                user_id: user_id.clone(),
                spricht,
            })
            .await;
        }
        gesetzt
    }

    pub async fn stumm_setzen(&self, kanal_id: &ChannelId, user_id: &UserId, stumm: bool) -> bool {
        let gesetzt = self
            .inner
            .registry
            .holen(kanal_id.as_str())
            .is_some_and(|k| k.stumm_setzen(user_id.as_str(), stumm));
        if gesetzt {
            self.veroeffentlichen(VoiceEreignis::Stumm {
                kanal_id: kanal_id.clone(),
                user_id: user_id.clone(),
                stumm,
            })
            .await;
        }
        gesetzt
    }

    pub async fn taub_setzen(&self, kanal_id: &ChannelId, user_id: &UserId, taub: bool) -> bool {
        let gesetzt = self
            .inner
            .registry
            .holen(kanal_id.as_str())
            .is_some_and(|k| k.taub_setzen(user_id.as_str(), taub));
        if gesetzt {
            self.veroeffentlichen(VoiceEreignis::Taub {
                kanal_id: kanal_id.clone(),
                user_id: user_id.clone(),
                taub,
            })
            .await;
        }
        gesetzt
    }

    // -----------------------------------------------------------------------
    // Signaling
    // -----------------------------------------------------------------------

    /// Offer eines Teilnehmers; er muss sich im Kanal befinden
    pub fn offer(&self, kanal_id: &ChannelId, user_id: &UserId, sdp: &str) -> Result<SignalingZustand> {
        let kanal = self.kanal(kanal_id)?;
        if !kanal.hat_teilnehmer(user_id.as_str()) {
            return Err(StimmraumError::TeilnehmerNichtGefunden(user_id.to_string()));
        }
        let zustand = self.inner.signaling.offer(kanal_id, user_id, sdp)?;

        // Hat der Teilnehmer den Kanal zwischen Pruefung und Offer verlassen,
        // darf keine verwaiste Sitzung zurueckbleiben
        if self
            .inner
            .signaling
            .sitzung_entfernen_falls(kanal_id, user_id, || !self.anwesend(kanal_id, user_id))
        {
            tracing::debug!(kanal_id = %kanal_id, user_id = %user_id, "Offer nach Austritt verworfen");
            return Err(StimmraumError::TeilnehmerNichtGefunden(user_id.to_string()));
        }
        Ok(zustand)
    }

    pub fn answer(&self, kanal_id: &ChannelId, user_id: &UserId, sdp: &str) -> Result<SignalingZustand> {
        self.inner.signaling.answer(kanal_id, user_id, sdp)
    }

    pub fn ice_kandidat(
        &self,
        kanal_id: &ChannelId,
        user_id: &UserId,
        kandidat: &str,
    ) -> Result<SignalingZustand> {
        self.inner.signaling.ice_kandidat(kanal_id, user_id, kandidat)
    }

    pub fn transport_verbunden(&self, kanal_id: &ChannelId, user_id: &UserId) -> Result<SignalingZustand> {
        self.inner.signaling.transport_verbunden(kanal_id, user_id)
    }

    pub fn sitzung_schliessen(&self, kanal_id: &ChannelId, user_id: &UserId) -> Result<()> {
        self.inner.signaling.schliessen(kanal_id, user_id)
    }

    // -----------------------------------------------------------------------
    // Betrieb
    // -----------------------------------------------------------------------

    pub fn ist_gesund(&self) -> bool {
        self.pruefen().ist_gesund()
    }

    /// Schliesst alle Kanaele und Sitzungen; danach meldet der Health-Check
    /// ungesund. Gibt die Anzahl entfernter Kanaele zurueck.
    pub fn herunterfahren(&self) -> usize {
        self.inner.initialisiert.store(false, Ordering::Relaxed);
        for kanal_id in self.inner.registry.kanal_ids() {
            self.inner.signaling.kanal_sitzungen_schliessen(&kanal_id);
        }
        let entfernt = self.inner.registry.leeren();
        tracing::info!(kanaele = entfernt, "Voice-Kanaele beim Shutdown geschlossen");
        entfernt
    }
}

impl HealthQuelle for VoiceService {
    fn pruefen(&self) -> HealthKomponenten {
        HealthKomponenten {
            registry_initialisiert: self.inner.initialisiert.load(Ordering::Relaxed),
            persistenz_verbunden: self.inner.store.ist_verbunden(),
            event_bus_verbunden: self.inner.bus.ist_verbunden(),
        }
    }
}

impl MetrikQuelle for VoiceService {
    fn schnappschuss(&self) -> MetrikSchnappschuss {
        self.inner
            .registry
            .kanaele()
            .iter()
            .map(|k| k.statistik())
            .fold(MetrikSchnappschuss::default(), |mut s, st| {
                s.kanaele += 1;
                s.teilnehmer += st.teilnehmer_anzahl as u64;
                s.sprecher += st.aktive_sprecher as u64;
                s.pakete_gesendet += st.pakete_gesendet;
                s.pakete_empfangen += st.pakete_empfangen;
                s.bytes_gesendet += st.bytes_gesendet;
                s.bytes_empfangen += st.bytes_empfangen;
                s
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BroadcastEventBus;
    use crate::store::SpeicherStore;
    use stimmraum_signaling::{MediaTransport, QueueTransport, SitzungsSchluessel, TransportBefehl};
    use stimmraum_voice::{ReaperLoop, RegistryConfig};
    use tokio_util::sync::CancellationToken;

    fn service_mit(kapazitaet: usize) -> (VoiceService, Arc<SpeicherStore>, Arc<BroadcastEventBus>) {
        service_mit_transport(kapazitaet, SignalingCoordinator::default())
    }

    fn service_mit_transport(
        kapazitaet: usize,
        signaling: SignalingCoordinator,
    ) -> (VoiceService, Arc<SpeicherStore>, Arc<BroadcastEventBus>) {
        let registry = ChannelRegistry::neu(RegistryConfig {
            standard_kapazitaet: kapazitaet,
            ..RegistryConfig::default()
        })
        .unwrap();
        let store = Arc::new(SpeicherStore::neu());
        let bus = Arc::new(BroadcastEventBus::neu(64));
        let service = VoiceService::neu(
            registry,
            signaling,
            store.clone(),
            bus.clone(),
            ServerId::from("srv"),
        );
        (service, store, bus)
    }

    #[tokio::test]
    async fn beitritt_persistiert_und_veroeffentlicht() {
        let (service, store, bus) = service_mit(50);
        let mut rx = bus.abonnieren();
        let kanal = ChannelId::from("general");
        let alice = UserId::from("alice");

        assert_eq!(service.beitreten(&kanal, None, &alice, None).await.unwrap(), 1000);

        assert_eq!(service.teilnehmer_ids(&kanal), vec![alice.clone()]);
        assert_eq!(service.gespeicherte_teilnehmer(&kanal).await.unwrap(), vec![alice]);
        assert_eq!(
            service.registry().holen("general").unwrap().server_id(),
            &ServerId::from("srv")
        );

        let nachricht = rx.recv().await.unwrap();
        assert_eq!(nachricht.thema, "voice.general");
        assert!(nachricht.nachricht.contains("\"typ\":\"beigetreten\""));
        assert!(nachricht.nachricht.contains("\"stream_id\":1000"));
    }

    #[tokio::test]
    async fn abgelehnter_beitritt_nennt_grund() {
        let (service, _, _) = service_mit(1);
        let kanal = ChannelId::from("general");

        service.beitreten(&kanal, None, &UserId::from("alice"), None).await.unwrap();
        let voll = service
            .beitreten(&kanal, None, &UserId::from("bob"), None)
            .await
            .unwrap_err();
        let doppelt = service
            .beitreten(&kanal, None, &UserId::from("alice"), None)
            .await
            .unwrap_err();

        assert_eq!(voll, StimmraumError::KapazitaetErreicht { kapazitaet: 1 });
        assert!(matches!(doppelt, StimmraumError::BereitsVorhanden(_)));
        assert!(voll.ist_beitritt_abgelehnt() && doppelt.ist_beitritt_abgelehnt());
    }

    #[tokio::test]
    async fn store_ausfall_laesst_beitritt_gelingen() {
        let (service, store, _) = service_mit(50);
        store.verbindung_setzen(false);

        let kanal = ChannelId::from("general");
        assert!(service
            .beitreten(&kanal, None, &UserId::from("alice"), None)
            .await
            .is_ok());
        assert_eq!(service.teilnehmer_ids(&kanal).len(), 1);
        assert!(!service.ist_gesund());
    }

    #[tokio::test]
    async fn verlassen_entfernt_sitzung_aber_nicht_den_kanal() {
        let (service, store, _) = service_mit(50);
        let kanal = ChannelId::from("general");
        let alice = UserId::from("alice");

        service.beitreten(&kanal, None, &alice, None).await.unwrap();
        service.offer(&kanal, &alice, "v=0").unwrap();
        assert_eq!(service.signaling().anzahl(), 1);

        service.verlassen(&kanal, &alice).await.unwrap();
        assert_eq!(service.signaling().anzahl(), 0);
        assert!(service.registry().holen("general").is_some());
        assert!(store.teilnehmer_auflisten(&kanal).await.unwrap().is_empty());

        let fehler = service.verlassen(&kanal, &alice).await.unwrap_err();
        assert!(fehler.ist_nicht_gefunden());
    }

    #[tokio::test]
    async fn offer_nur_fuer_anwesende_teilnehmer() {
        let (service, _, _) = service_mit(50);
        let kanal = ChannelId::from("general");
        let alice = UserId::from("alice");

        assert!(matches!(
            service.offer(&kanal, &alice, "v=0"),
            Err(StimmraumError::KanalNichtGefunden(_))
        ));

        service.kanal_erstellen(&kanal, None);
        assert!(matches!(
            service.offer(&kanal, &alice, "v=0"),
            Err(StimmraumError::TeilnehmerNichtGefunden(_))
        ));

        service.beitreten(&kanal, None, &alice, None).await.unwrap();
        assert_eq!(
            service.offer(&kanal, &alice, "v=0").unwrap(),
            SignalingZustand::OfferErhalten
        );
        assert_eq!(
            service.answer(&kanal, &alice, "v=0 answer").unwrap(),
            SignalingZustand::AnswerGesendet
        );
        assert_eq!(
            service.ice_kandidat(&kanal, &alice, "candidate:1").unwrap(),
            SignalingZustand::AnswerGesendet
        );
        assert_eq!(
            service.transport_verbunden(&kanal, &alice).unwrap(),
            SignalingZustand::Verbunden
        );
        service.sitzung_schliessen(&kanal, &alice).unwrap();
        assert!(service.offer(&kanal, &alice, "v=0").is_err());
    }

    #[tokio::test]
    async fn flags_fuer_abwesende_sind_noop() {
        let (service, _, bus) = service_mit(50);
        let mut rx = bus.abonnieren();
        let kanal = ChannelId::from("general");
        let alice = UserId::from("alice");

        assert!(!service.sprechen_setzen(&kanal, &alice, true).await);
        service.beitreten(&kanal, None, &alice, None).await.unwrap();
        assert!(service.sprechen_setzen(&kanal, &alice, true).await);
        assert!(service.stumm_setzen(&kanal, &alice, true).await);
        assert!(service.taub_setzen(&kanal, &alice, true).await);

        let t = service.registry().holen("general").unwrap().teilnehmer("alice").unwrap();
        assert!(t.spricht && t.stumm && t.taub);

        let typen: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|n| n.nachricht)
            .collect();
        assert_eq!(typen.len(), 4);
        assert!(typen[1].contains("\"typ\":\"spricht\""));
    }

    #[tokio::test]
    async fn kanal_entfernen_schliesst_sitzungen() {
        let (service, _, bus) = service_mit(50);
        let kanal = ChannelId::from("general");
        let alice = UserId::from("alice");
        service.beitreten(&kanal, None, &alice, None).await.unwrap();
        service.offer(&kanal, &alice, "v=0").unwrap();
        let mut rx = bus.abonnieren();

        assert!(service.kanal_entfernen(&kanal).await);
        assert!(!service.kanal_entfernen(&kanal).await);
        assert!(service.signaling().ist_leer());
        assert!(service.teilnehmer_ids(&kanal).is_empty());

        let nachricht = rx.recv().await.unwrap();
        assert!(nachricht.nachricht.contains("\"typ\":\"kanal_entfernt\""));
    }

    #[tokio::test]
    async fn spaetes_aufraeumen_verschont_neu_angelegten_kanal() {
        let (service, _, _) = service_mit(50);
        let kanal = ChannelId::from("c1");
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");

        service.kanal_erstellen(&kanal, None);
        let reaper = ReaperLoop::neu(service.registry().clone(), CancellationToken::new());
        let mut entfernt_rx = reaper.abonnieren();
        assert_eq!(reaper.durchlauf(), vec![kanal.clone()]);

        // Verwaiste Sitzung des alten Kanals
        service.signaling().offer(&kanal, &bob, "v=0").unwrap();
        // Neuer Kanal unter derselben ID, bevor das Aufraeumen laeuft
        service.beitreten(&kanal, None, &alice, None).await.unwrap();
        service.offer(&kanal, &alice, "v=0").unwrap();

        let entfernt = entfernt_rx.recv().await.unwrap();
        service.kanal_entfernt(&entfernt).await;

        assert!(service.registry().holen("c1").unwrap().hat_teilnehmer("alice"));
        assert_eq!(
            service.signaling().zustand(&kanal, &alice),
            Some(SignalingZustand::OfferErhalten)
        );
        assert_eq!(service.signaling().zustand(&kanal, &bob), None);
    }

    /// Transport, der beim Offer den Teilnehmer austreten laesst, als liefe
    /// `verlassen` zwischen Anwesenheitspruefung und Offer
    struct AustrittBeimOffer {
        registry: ChannelRegistry,
    }

    impl MediaTransport for AustrittBeimOffer {
        fn offer_erhalten(&self, schluessel: &SitzungsSchluessel, _sdp: &str) {
            if let Some(kanal) = self.registry.holen(schluessel.kanal_id.as_str()) {
                let _ = kanal.teilnehmer_entfernen(schluessel.user_id.as_str());
            }
        }
    }

    #[tokio::test]
    async fn offer_waehrend_austritt_hinterlaesst_keine_sitzung() {
        let registry = ChannelRegistry::default();
        let signaling = SignalingCoordinator::neu(Arc::new(AustrittBeimOffer {
            registry: registry.clone(),
        }));
        let service = VoiceService::neu(
            registry,
            signaling,
            Arc::new(SpeicherStore::neu()),
            Arc::new(BroadcastEventBus::neu(16)),
            ServerId::from("srv"),
        );
        let kanal = ChannelId::from("general");
        let alice = UserId::from("alice");
        service.beitreten(&kanal, None, &alice, None).await.unwrap();

        let fehler = service.offer(&kanal, &alice, "v=0").unwrap_err();

        assert!(matches!(fehler, StimmraumError::TeilnehmerNichtGefunden(_)));
        assert_eq!(service.signaling().zustand(&kanal, &alice), None);
        assert!(service.signaling().ist_leer());
    }

    #[tokio::test]
    async fn verlassen_meldet_schliessen_an_transport() {
        let (transport, mut befehle) = QueueTransport::neu();
        let (service, _, _) = service_mit_transport(50, SignalingCoordinator::neu(Arc::new(transport)));
        let kanal = ChannelId::from("general");
        let alice = UserId::from("alice");

        service.beitreten(&kanal, None, &alice, None).await.unwrap();
        service.offer(&kanal, &alice, "v=0").unwrap();
        service.verlassen(&kanal, &alice).await.unwrap();

        let arten: Vec<_> = std::iter::from_fn(|| befehle.try_recv().ok()).collect();
        assert!(matches!(
            arten.as_slice(),
            [TransportBefehl::Offer { .. }, TransportBefehl::Schliessen { .. }]
        ));
    }

    #[tokio::test]
    async fn schnappschuss_summiert_kanaele() {
        let (service, _, _) = service_mit(50);
        for (kanal, user) in [("a", "u1"), ("a", "u2"), ("b", "u3")] {
            service
                .beitreten(&ChannelId::from(kanal), None, &UserId::from(user), None)
                .await
                .unwrap();
        }
        service
            .sprechen_setzen(&ChannelId::from("b"), &UserId::from("u3"), true)
            .await;

        let s = service.schnappschuss();
        assert_eq!(s.kanaele, 2);
        assert_eq!(s.teilnehmer, 3);
        assert_eq!(s.sprecher, 1);
    }

    #[tokio::test]
    async fn herunterfahren_leert_registry() {
        let (service, _, _) = service_mit(50);
        service
            .beitreten(&ChannelId::from("a"), None, &UserId::from("u1"), None)
            .await
            .unwrap();
        assert!(service.ist_gesund());

        assert_eq!(service.herunterfahren(), 1);
        assert_eq!(service.registry().anzahl(), 0);
        assert!(!service.ist_gesund());
    }
}
