//! VoiceChannel – Teilnehmer, Kapazitaet, Statistik und Audio-Fan-out
//!
//! Jeder Kanal besitzt seine Teilnehmer exklusiv. Alle Mutationen laufen
//! ueber die Methoden dieses Typs; nach aussen gehen nur Kopien.
//!
//! ## Design-Entscheidungen
//! - Ein `parking_lot::Mutex` schuetzt Teilnehmer-Tabelle und Stream-Index
//!   gemeinsam, damit Join/Leave jeweils ein einziger kritischer Abschnitt ist
//! - Paket-/Byte-Zaehler sind Atomics und brauchen keinen Lock
//! - Der Sink wird nie unter dem Teilnehmer-Lock aufgerufen: Empfaenger werden
//!   unter Lock kopiert, zugestellt wird danach

use crate::packet::AudioPaket;
use crate::participant::{Teilnehmer, TeilnehmerTabelle};
use crate::sink::AudioSink;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use stimmraum_core::{ChannelId, Result, ServerId, StimmraumError, UserId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// KanalStatistik
// ---------------------------------------------------------------------------

/// Abgeleitete Kanal-Statistik, bei jedem Aufruf frisch berechnet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KanalStatistik {
    pub teilnehmer_anzahl: usize,
    pub aktive_sprecher: usize,
    pub kapazitaet: usize,
    pub pakete_gesendet: u64,
    pub pakete_empfangen: u64,
    pub bytes_gesendet: u64,
    pub bytes_empfangen: u64,
}

// ---------------------------------------------------------------------------
// VoiceChannel
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct KanalZustand {
    tabelle: TeilnehmerTabelle,
    /// Gesetzt wenn der Kanal aus der Registry entfernt wurde; danach sind
    /// keine Beitritte mehr moeglich
    geschlossen: bool,
}

/// Ein aktiver Voice-Kanal
pub struct VoiceChannel {
    kanal_id: ChannelId,
    server_id: ServerId,
    zustand: Mutex<KanalZustand>,
    sink: RwLock<Option<Arc<dyn AudioSink>>>,

    pakete_gesendet: AtomicU64,
    pakete_empfangen: AtomicU64,
    bytes_gesendet: AtomicU64,
    bytes_empfangen: AtomicU64,
}

impl std::fmt::Debug for VoiceChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceChannel")
            .field("kanal_id", &self.kanal_id)
            .field("server_id", &self.server_id)
            .field("teilnehmer", &self.anzahl())
            .finish()
    }
}

impl VoiceChannel {
    pub fn neu(
        kanal_id: ChannelId,
        server_id: ServerId,
        kapazitaet: usize,
        stream_id_basis: u32,
    ) -> Self {
        Self {
            kanal_id,
            server_id,
            zustand: Mutex::new(KanalZustand {
                tabelle: TeilnehmerTabelle::neu(kapazitaet, stream_id_basis),
                geschlossen: false,
            }),
            sink: RwLock::new(None),
            pakete_gesendet: AtomicU64::new(0),
            pakete_empfangen: AtomicU64::new(0),
            bytes_gesendet: AtomicU64::new(0),
            bytes_empfangen: AtomicU64::new(0),
        }
    }

    pub fn kanal_id(&self) -> &ChannelId {
        &self.kanal_id
    }

    pub fn server_id(&self) -> &ServerId {
        &self.server_id
    }

    // -----------------------------------------------------------------------
    // Teilnehmer-Verwaltung
    // -----------------------------------------------------------------------

    /// Fuegt einen Teilnehmer hinzu und gibt seine Stream-ID zurueck
    ///
    /// Fehler: `BereitsVorhanden`, `KapazitaetErreicht`, `RessourcenErschoepft`,
    /// `KanalNichtGefunden` wenn der Kanal inzwischen aus der Registry entfernt wurde.
    pub fn teilnehmer_hinzufuegen(
        &self,
        user_id: impl Into<UserId>,
        anzeigename: Option<String>,
    ) -> Result<u32> {
        let user_id = user_id.into();
        let mut zustand = self.zustand.lock();
        if zustand.geschlossen {
            return Err(StimmraumError::KanalNichtGefunden(self.kanal_id.to_string()));
        }

        let stream_id = zustand.tabelle.einfuegen(user_id.clone(), anzeigename)?;
        let anzahl = zustand.tabelle.anzahl();
        drop(zustand);

        tracing::info!(
            kanal_id = %self.kanal_id,
            user_id = %user_id,
            stream_id,
            teilnehmer = anzahl,
            "Teilnehmer beigetreten"
        );
        Ok(stream_id)
    }

    /// Entfernt einen Teilnehmer; der Kanal selbst bleibt bestehen
    pub fn teilnehmer_entfernen(&self, user_id: &str) -> Result<Teilnehmer> {
        let entfernt = self.zustand.lock().tabelle.entfernen(user_id);
        match entfernt {
            Some(teilnehmer) => {
                tracing::info!(
                    kanal_id = %self.kanal_id,
                    user_id = %user_id,
                    stream_id = teilnehmer.stream_id,
                    "Teilnehmer verlassen"
                );
                Ok(teilnehmer)
            }
            None => Err(StimmraumError::TeilnehmerNichtGefunden(user_id.to_string())),
        }
    }

    pub fn hat_teilnehmer(&self, user_id: &str) -> bool {
        self.zustand.lock().tabelle.enthaelt(user_id)
    }

    /// Kopie eines Teilnehmers
    pub fn teilnehmer(&self, user_id: &str) -> Option<Teilnehmer> {
        self.zustand.lock().tabelle.get(user_id).cloned()
    }

    /// Kopie aller Teilnehmer in Beitrittsreihenfolge
    pub fn teilnehmer_auflisten(&self) -> Vec<Teilnehmer> {
        self.zustand.lock().tabelle.schnappschuss()
    }

    pub fn anzahl(&self) -> usize {
        self.zustand.lock().tabelle.anzahl()
    }

    pub fn ist_leer(&self) -> bool {
        self.zustand.lock().tabelle.ist_leer()
    }

    // -----------------------------------------------------------------------
    // Sprachaktivitaet
    //
    // Events koennen mit einem Leave kollidieren; fehlende Teilnehmer werden
    // still ignoriert. Rueckgabe: ob der Teilnehmer gefunden wurde.
    // -----------------------------------------------------------------------

    pub fn spricht_setzen(&self, user_id: &str, spricht: bool) -> bool {
        self.zustand
            .lock()
            .tabelle
            .aktualisieren(user_id, |t| t.spricht = spricht)
    }

    pub fn stumm_setzen(&self, user_id: &str, stumm: bool) -> bool {
        self.zustand
            .lock()
            .tabelle
            .aktualisieren(user_id, |t| t.stumm = stumm)
    }

    pub fn taub_setzen(&self, user_id: &str, taub: bool) -> bool {
        self.zustand
            .lock()
            .tabelle
            .aktualisieren(user_id, |t| t.taub = taub)
    }

    // -----------------------------------------------------------------------
    // Stream-IDs (0 = nicht gefunden)
    // -----------------------------------------------------------------------

    /// Gibt die beim Beitritt vergebene Stream-ID zurueck
    ///
    /// Vergibt keine zweite ID: ein Teilnehmer hat genau eine Stream-ID,
    /// solange er im Kanal ist.
    pub fn stream_id_zuweisen(&self, user_id: &str) -> u32 {
        self.stream_id(user_id)
    }

    pub fn stream_id(&self, user_id: &str) -> u32 {
        self.zustand.lock().tabelle.stream_id(user_id).unwrap_or(0)
    }

    pub fn user_von_stream_id(&self, stream_id: u32) -> Option<UserId> {
        self.zustand
            .lock()
            .tabelle
            .user_von_stream_id(stream_id)
            .cloned()
    }

    // -----------------------------------------------------------------------
    // Kapazitaet
    // -----------------------------------------------------------------------

    /// Aendert die Kapazitaet; wirkt nur auf kuenftige Beitritte
    pub fn kapazitaet_setzen(&self, kapazitaet: usize) {
        self.zustand.lock().tabelle.kapazitaet_setzen(kapazitaet);
        tracing::debug!(kanal_id = %self.kanal_id, kapazitaet, "Kapazitaet geaendert");
    }

    pub fn kapazitaet(&self) -> usize {
        self.zustand.lock().tabelle.kapazitaet()
    }

    // -----------------------------------------------------------------------
    // Audio
    // -----------------------------------------------------------------------

    /// Registriert den Sink des Transport-Layers (ersetzt einen vorhandenen)
    pub fn sink_setzen(&self, sink: Arc<dyn AudioSink>) {
        *self.sink.write() = Some(sink);
    }

    pub fn sink_entfernen(&self) {
        *self.sink.write() = None;
    }

    fn aktueller_sink(&self) -> Option<Arc<dyn AudioSink>> {
        self.sink.read().clone()
    }

    /// Uebergibt ein Paket an den Transport-Konsumenten des Sinks
    ///
    /// Kein Teilnehmer, auch nicht der Absender, erhaelt das Paket. Gibt
    /// false zurueck wenn kein Sink registriert ist oder er ablehnt.
    pub fn audio_senden(&self, paket: &AudioPaket) -> bool {
        let Some(sink) = self.aktueller_sink() else {
            tracing::trace!(kanal_id = %self.kanal_id, "Kein Sink registriert");
            return false;
        };

        let zugestellt = sink.weiterleiten(paket);
        if zugestellt {
            self.gesendet_zaehlen(paket);
        }
        zugestellt
    }

    /// Verteilt ein Paket an alle Teilnehmer ausser `ausser`
    ///
    /// Synchron und best-effort: jeder Empfaenger wird hoechstens einmal
    /// versucht, Fehler einzelner Empfaenger brechen die Verteilung nicht ab.
    /// Gibt die Anzahl erfolgreicher Zustellungen zurueck.
    pub fn audio_broadcasten(&self, paket: &AudioPaket, ausser: Option<&str>) -> usize {
        self.pakete_empfangen.fetch_add(1, Ordering::Relaxed);
        self.bytes_empfangen
            .fetch_add(paket.laenge(), Ordering::Relaxed);

        let Some(sink) = self.aktueller_sink() else {
            tracing::trace!(kanal_id = %self.kanal_id, "Kein Sink registriert");
            return 0;
        };

        let empfaenger = self.zustand.lock().tabelle.empfaenger(ausser);

        let mut zugestellt = 0usize;
        for user_id in &empfaenger {
            if sink.zustellen(user_id, paket) {
                self.gesendet_zaehlen(paket);
                zugestellt += 1;
            } else {
                tracing::debug!(
                    kanal_id = %self.kanal_id,
                    empfaenger = %user_id,
                    "Zustellung fehlgeschlagen"
                );
            }
        }

        tracing::trace!(
            kanal_id = %self.kanal_id,
            absender = %paket.user_id,
            empfaenger = empfaenger.len(),
            zugestellt,
            "Paket verteilt"
        );
        zugestellt
    }

    fn gesendet_zaehlen(&self, paket: &AudioPaket) {
        self.pakete_gesendet.fetch_add(1, Ordering::Relaxed);
        self.bytes_gesendet
            .fetch_add(paket.laenge(), Ordering::Relaxed);
    }

    // -----------------------------------------------------------------------
    // Statistik
    // -----------------------------------------------------------------------

    pub fn statistik(&self) -> KanalStatistik {
        let (teilnehmer_anzahl, aktive_sprecher, kapazitaet) = {
            let zustand = self.zustand.lock();
            (
                zustand.tabelle.anzahl(),
                zustand.tabelle.sprecher_anzahl(),
                zustand.tabelle.kapazitaet(),
            )
        };

        KanalStatistik {
            teilnehmer_anzahl,
            aktive_sprecher,
            kapazitaet,
            pakete_gesendet: self.pakete_gesendet.load(Ordering::Relaxed),
            pakete_empfangen: self.pakete_empfangen.load(Ordering::Relaxed),
            bytes_gesendet: self.bytes_gesendet.load(Ordering::Relaxed),
            bytes_empfangen: self.bytes_empfangen.load(Ordering::Relaxed),
        }
    }

    // -----------------------------------------------------------------------
    // Lebenszyklus (nur Registry)
    // -----------------------------------------------------------------------

    /// Schliesst den Kanal nur wenn er leer ist; Pruefung und Schliessen
    /// bilden einen kritischen Abschnitt
    pub(crate) fn schliessen_falls_leer(&self) -> bool {
        let mut zustand = self.zustand.lock();
        if zustand.tabelle.ist_leer() {
            zustand.geschlossen = true;
            true
        } else {
            false
        }
    }

    pub(crate) fn schliessen(&self) {
        self.zustand.lock().geschlossen = true;
    }

    /// true nachdem der Kanal aus der Registry entfernt wurde
    pub fn ist_geschlossen(&self) -> bool {
        self.zustand.lock().geschlossen
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::STANDARD_STREAM_ID_BASIS;
    use crate::sink::QueueSink;
    use std::collections::HashSet;
    use std::sync::{OnceLock, Weak};

    fn kanal(kapazitaet: usize) -> VoiceChannel {
        VoiceChannel::neu(
            ChannelId::from("general"),
            ServerId::from("srv"),
            kapazitaet,
            STANDARD_STREAM_ID_BASIS,
        )
    }

    fn paket(absender: &str) -> AudioPaket {
        AudioPaket::opus(UserId::from(absender), 1000, 1, 960, vec![0u8; 40])
    }

    /// Sink, der bestimmte Empfaenger ablehnt und alle Versuche protokolliert
    #[derive(Default)]
    struct ProtokollSink {
        ablehnen: HashSet<String>,
        versuche: Mutex<Vec<String>>,
    }

    impl AudioSink for ProtokollSink {
        fn zustellen(&self, empfaenger: &UserId, _paket: &AudioPaket) -> bool {
            self.versuche.lock().push(empfaenger.to_string());
            !self.ablehnen.contains(empfaenger.as_str())
        }

        fn weiterleiten(&self, _paket: &AudioPaket) -> bool {
            self.versuche.lock().push("<transport>".to_string());
            true
        }
    }

    #[test]
    fn beispiel_szenario_general() {
        let k = kanal(2);

        assert_eq!(k.teilnehmer_hinzufuegen("alice", None).unwrap(), 1000);
        assert_eq!(k.teilnehmer_hinzufuegen("bob", None).unwrap(), 1001);
        assert_eq!(
            k.teilnehmer_hinzufuegen("carol", None),
            Err(StimmraumError::KapazitaetErreicht { kapazitaet: 2 })
        );

        assert!(k.teilnehmer_entfernen("alice").is_ok());
        assert_eq!(k.user_von_stream_id(1000), None);

        // 1000 wird nie wiederverwendet
        assert_eq!(k.teilnehmer_hinzufuegen("carol", None).unwrap(), 1002);
        assert_eq!(k.user_von_stream_id(1002), Some(UserId::from("carol")));
    }

    #[test]
    fn doppelter_beitritt_abgelehnt() {
        let k = kanal(5);
        k.teilnehmer_hinzufuegen("alice", None).unwrap();
        let err = k.teilnehmer_hinzufuegen("alice", None).unwrap_err();
        assert!(err.ist_beitritt_abgelehnt());
        assert_eq!(k.anzahl(), 1);
    }

    #[test]
    fn entfernen_eines_unbekannten_aendert_nichts() {
        let k = kanal(5);
        k.teilnehmer_hinzufuegen("alice", None).unwrap();

        let err = k.teilnehmer_entfernen("ghost").unwrap_err();
        assert!(err.ist_nicht_gefunden());
        assert_eq!(k.teilnehmer_auflisten().len(), 1);
        assert!(k.hat_teilnehmer("alice"));
    }

    #[test]
    fn stream_id_lookups_sind_inverse() {
        let k = kanal(5);
        k.teilnehmer_hinzufuegen("alice", None).unwrap();
        k.teilnehmer_hinzufuegen("bob", None).unwrap();

        let sid = k.stream_id_zuweisen("bob");
        assert_eq!(k.user_von_stream_id(sid), Some(UserId::from("bob")));
        assert_eq!(k.stream_id("bob"), sid);

        // Sentinel-Werte
        assert_eq!(k.stream_id_zuweisen("ghost"), 0);
        assert_eq!(k.stream_id("ghost"), 0);
        assert_eq!(k.user_von_stream_id(4242), None);

        k.teilnehmer_entfernen("bob").unwrap();
        assert_eq!(k.user_von_stream_id(sid), None);
    }

    #[test]
    fn flags_fuer_fehlende_teilnehmer_sind_noop() {
        let k = kanal(5);
        k.teilnehmer_hinzufuegen("alice", None).unwrap();

        assert!(!k.spricht_setzen("ghost", true));
        assert!(k.spricht_setzen("alice", true));
        assert!(k.stumm_setzen("alice", true));
        assert!(k.taub_setzen("alice", true));

        let alice = k.teilnehmer("alice").unwrap();
        assert!(alice.spricht && alice.stumm && alice.taub);
        assert_eq!(k.statistik().aktive_sprecher, 1);
    }

    #[test]
    fn auflisten_liefert_kopie() {
        let k = kanal(5);
        k.teilnehmer_hinzufuegen("alice", None).unwrap();
        let mut liste = k.teilnehmer_auflisten();
        liste[0].spricht = true;
        k.teilnehmer_hinzufuegen("bob", None).unwrap();

        assert_eq!(liste.len(), 1);
        assert!(!k.teilnehmer("alice").unwrap().spricht);
    }

    #[test]
    fn kapazitaet_senken_verdraengt_niemanden() {
        let k = kanal(5);
        for uid in ["a", "b", "c"] {
            k.teilnehmer_hinzufuegen(uid, None).unwrap();
        }
        k.kapazitaet_setzen(2);
        assert_eq!(k.anzahl(), 3);
        assert!(k.teilnehmer_hinzufuegen("d", None).is_err());

        k.teilnehmer_entfernen("a").unwrap();
        k.teilnehmer_entfernen("b").unwrap();
        assert!(k.teilnehmer_hinzufuegen("d", None).is_ok());
    }

    #[test]
    fn senden_ohne_sink_liefert_false() {
        let k = kanal(5);
        assert!(!k.audio_senden(&paket("alice")));
        assert_eq!(k.statistik().pakete_gesendet, 0);
    }

    #[test]
    fn senden_zaehlt_pakete_und_bytes() {
        let k = kanal(5);
        k.sink_setzen(Arc::new(ProtokollSink::default()));

        assert!(k.audio_senden(&paket("alice")));
        assert!(k.audio_senden(&paket("alice")));

        let stats = k.statistik();
        assert_eq!(stats.pakete_gesendet, 2);
        assert_eq!(stats.bytes_gesendet, 80);

        k.sink_entfernen();
        assert!(!k.audio_senden(&paket("alice")));
    }

    #[test]
    fn senden_ohne_echo_an_teilnehmer() {
        let k = kanal(5);
        let sink = Arc::new(QueueSink::neu());
        let mut rx_alice = sink.registrieren(UserId::from("alice"));
        let mut rx_bob = sink.registrieren(UserId::from("bob"));
        let mut ausgang = sink.ausgang_registrieren();
        k.teilnehmer_hinzufuegen("alice", None).unwrap();
        k.teilnehmer_hinzufuegen("bob", None).unwrap();
        k.sink_setzen(sink);

        assert!(k.audio_senden(&paket("alice")));
        assert!(rx_alice.try_recv().is_err(), "Absender darf kein Echo empfangen");
        assert!(rx_bob.try_recv().is_err());
        assert_eq!(ausgang.try_recv().unwrap().user_id, UserId::from("alice"));
    }

    #[test]
    fn broadcast_ohne_absender_und_trotz_fehlern() {
        let k = kanal(10);
        for uid in ["u1", "u2", "u3", "u4"] {
            k.teilnehmer_hinzufuegen(uid, None).unwrap();
        }
        let sink = Arc::new(ProtokollSink {
            ablehnen: HashSet::from(["u2".to_string()]),
            ..Default::default()
        });
        k.sink_setzen(sink.clone());

        let zugestellt = k.audio_broadcasten(&paket("u1"), Some("u1"));
        assert_eq!(zugestellt, 2);

        let mut versuche = sink.versuche.lock().clone();
        versuche.sort();
        assert_eq!(versuche, vec!["u2", "u3", "u4"]);

        let stats = k.statistik();
        assert_eq!(stats.pakete_empfangen, 1);
        assert_eq!(stats.bytes_empfangen, 40);
        assert_eq!(stats.pakete_gesendet, 2);
    }

    #[tokio::test]
    async fn broadcast_ueber_queue_sink() {
        let k = kanal(10);
        let sink = Arc::new(QueueSink::neu());
        let mut rx1 = sink.registrieren(UserId::from("u1"));
        let mut rx2 = sink.registrieren(UserId::from("u2"));
        k.teilnehmer_hinzufuegen("u1", None).unwrap();
        k.teilnehmer_hinzufuegen("u2", None).unwrap();
        k.sink_setzen(sink);

        assert_eq!(k.audio_broadcasten(&paket("u1"), Some("u1")), 1);
        assert!(rx1.try_recv().is_err(), "Absender darf kein Echo empfangen");
        assert_eq!(rx2.recv().await.unwrap().user_id, UserId::from("u1"));
    }

    /// Sink, der waehrend der Zustellung den Kanal abfragt
    struct RueckfrageSink {
        kanal: OnceLock<Weak<VoiceChannel>>,
    }

    impl AudioSink for RueckfrageSink {
        fn zustellen(&self, _empfaenger: &UserId, _paket: &AudioPaket) -> bool {
            // Wuerde deadlocken, wenn der Teilnehmer-Lock noch gehalten wird
            let kanal = self.kanal.get().and_then(Weak::upgrade);
            kanal.map(|k| k.anzahl() > 0).unwrap_or(false)
        }

        fn weiterleiten(&self, paket: &AudioPaket) -> bool {
            self.zustellen(&paket.user_id, paket)
        }
    }

    #[test]
    fn sink_laeuft_ausserhalb_des_locks() {
        let k = Arc::new(kanal(10));
        k.teilnehmer_hinzufuegen("u1", None).unwrap();
        k.teilnehmer_hinzufuegen("u2", None).unwrap();

        let sink = Arc::new(RueckfrageSink {
            kanal: OnceLock::new(),
        });
        let _ = sink.kanal.set(Arc::downgrade(&k));
        k.sink_setzen(sink);

        assert_eq!(k.audio_broadcasten(&paket("u1"), Some("u1")), 1);
        assert!(k.audio_senden(&paket("u1")));
    }

    #[test]
    fn nebenlaeufige_beitritte_bekommen_eindeutige_stream_ids() {
        let k = Arc::new(kanal(256));

        let ids: Vec<u32> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let k = Arc::clone(&k);
                    s.spawn(move || {
                        (0..32)
                            .map(|i| {
                                k.teilnehmer_hinzufuegen(format!("u{t}-{i}"), None)
                                    .unwrap()
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let eindeutig: HashSet<u32> = ids.iter().copied().collect();
        assert_eq!(eindeutig.len(), 256);
        assert_eq!(k.anzahl(), 256);
        for sid in ids {
            let uid = k.user_von_stream_id(sid).unwrap();
            assert_eq!(k.stream_id(uid.as_str()), sid);
        }
    }

    #[test]
    fn nebenlaeufige_beitritte_ueberschreiten_kapazitaet_nie() {
        let k = Arc::new(kanal(10));

        let erfolge: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let k = Arc::clone(&k);
                    s.spawn(move || {
                        (0..10)
                            .filter(|i| {
                                k.teilnehmer_hinzufuegen(format!("u{t}-{i}"), None).is_ok()
                            })
                            .count()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(erfolge, 10);
        assert_eq!(k.anzahl(), 10);
    }

    #[test]
    fn geschlossener_kanal_nimmt_keine_beitritte_an() {
        let k = kanal(5);
        k.teilnehmer_hinzufuegen("alice", None).unwrap();
        assert!(!k.schliessen_falls_leer());

        k.teilnehmer_entfernen("alice").unwrap();
        assert!(k.schliessen_falls_leer());
        assert!(k.ist_geschlossen());

        let err = k.teilnehmer_hinzufuegen("bob", None).unwrap_err();
        assert!(matches!(err, StimmraumError::KanalNichtGefunden(_)));
    }
}
