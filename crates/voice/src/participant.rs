//! Teilnehmer-Tabelle – Teilnehmer eines Kanals und Stream-ID-Index
//!
//! Eine einzige besitzende Tabelle (UserId -> Teilnehmer). Der Stream-Index
//! haelt nur die UserId, nie eine zweite Referenz auf den Teilnehmer. Entfernen
//! ist damit ein Loeschen ueber zwei Schluessel in derselben Struktur.
//!
//! Die Tabelle selbst ist nicht synchronisiert; sie lebt hinter dem Lock des
//! besitzenden [`VoiceChannel`](crate::VoiceChannel).

use chrono::{DateTime, Utc};
use serde::Serialize;
use stimmraum_core::{Result, StimmraumError, UserId};
use std::collections::HashMap;

/// Erste Stream-ID eines neuen Kanals
pub const STANDARD_STREAM_ID_BASIS: u32 = 1000;

// ---------------------------------------------------------------------------
// Teilnehmer
// ---------------------------------------------------------------------------

/// Mitgliedschaft eines Benutzers in einem Kanal
///
/// Nach aussen werden nur Kopien herausgegeben.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Teilnehmer {
    pub user_id: UserId,
    pub anzeigename: String,
    pub spricht: bool,
    pub stumm: bool,
    pub taub: bool,
    pub beigetreten_am: DateTime<Utc>,
    /// Stream-ID (SSRC), innerhalb des Kanals eindeutig
    pub stream_id: u32,
}

// ---------------------------------------------------------------------------
// TeilnehmerTabelle
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct TeilnehmerTabelle {
    teilnehmer: HashMap<UserId, Teilnehmer>,
    /// Stream-ID -> UserId (Umkehrindex)
    stream_index: HashMap<u32, UserId>,
    /// `None` sobald der u32-Raum aufgebraucht ist
    naechste_stream_id: Option<u32>,
    kapazitaet: usize,
}

impl TeilnehmerTabelle {
    pub fn neu(kapazitaet: usize, stream_id_basis: u32) -> Self {
        Self {
            teilnehmer: HashMap::new(),
            stream_index: HashMap::new(),
            naechste_stream_id: Some(stream_id_basis),
            kapazitaet: kapazitaet.max(1),
        }
    }

    /// Fuegt einen Teilnehmer ein und vergibt eine frische Stream-ID
    ///
    /// Reihenfolge der Pruefungen: Duplikat, Kapazitaet, Stream-ID-Raum.
    /// Stream-IDs werden nie wiederverwendet, auch nicht fuer dieselbe UserId.
    pub fn einfuegen(&mut self, user_id: UserId, anzeigename: Option<String>) -> Result<u32> {
        if self.teilnehmer.contains_key(&user_id) {
            return Err(StimmraumError::BereitsVorhanden(user_id.to_string()));
        }
        if self.teilnehmer.len() >= self.kapazitaet {
            return Err(StimmraumError::KapazitaetErreicht {
                kapazitaet: self.kapazitaet,
            });
        }

        let stream_id = self.stream_id_vergeben()?;
        let anzeigename = anzeigename.unwrap_or_else(|| user_id.to_string());

        self.stream_index.insert(stream_id, user_id.clone());
        self.teilnehmer.insert(
            user_id.clone(),
            Teilnehmer {
                user_id,
                anzeigename,
                spricht: false,
                stumm: false,
                taub: false,
                beigetreten_am: Utc::now(),
                stream_id,
            },
        );

        Ok(stream_id)
    }

    fn stream_id_vergeben(&mut self) -> Result<u32> {
        let stream_id = self.naechste_stream_id.ok_or_else(|| {
            StimmraumError::RessourcenErschoepft("Stream-ID-Raum aufgebraucht".into())
        })?;
        self.naechste_stream_id = stream_id.checked_add(1);
        Ok(stream_id)
    }

    /// Entfernt einen Teilnehmer samt Stream-Index-Eintrag
    pub fn entfernen(&mut self, user_id: &str) -> Option<Teilnehmer> {
        let teilnehmer = self.teilnehmer.remove(user_id)?;
        self.stream_index.remove(&teilnehmer.stream_id);
        Some(teilnehmer)
    }

    pub fn get(&self, user_id: &str) -> Option<&Teilnehmer> {
        self.teilnehmer.get(user_id)
    }

    pub fn enthaelt(&self, user_id: &str) -> bool {
        self.teilnehmer.contains_key(user_id)
    }

    /// Wendet eine Aenderung an; false wenn der Teilnehmer fehlt
    pub fn aktualisieren<F>(&mut self, user_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Teilnehmer),
    {
        match self.teilnehmer.get_mut(user_id) {
            Some(t) => {
                f(t);
                true
            }
            None => false,
        }
    }

    pub fn stream_id(&self, user_id: &str) -> Option<u32> {
        self.teilnehmer.get(user_id).map(|t| t.stream_id)
    }

    pub fn user_von_stream_id(&self, stream_id: u32) -> Option<&UserId> {
        self.stream_index.get(&stream_id)
    }

    /// Kopie aller Teilnehmer, sortiert nach Stream-ID (= Beitrittsreihenfolge)
    pub fn schnappschuss(&self) -> Vec<Teilnehmer> {
        let mut alle: Vec<Teilnehmer> = self.teilnehmer.values().cloned().collect();
        alle.sort_by_key(|t| t.stream_id);
        alle
    }

    /// Alle UserIds ausser `ausser`
    pub fn empfaenger(&self, ausser: Option<&str>) -> Vec<UserId> {
        self.teilnehmer
            .keys()
            .filter(|uid| Some(uid.as_str()) != ausser)
            .cloned()
            .collect()
    }

    pub fn anzahl(&self) -> usize {
        self.teilnehmer.len()
    }

    pub fn ist_leer(&self) -> bool {
        self.teilnehmer.is_empty()
    }

    pub fn sprecher_anzahl(&self) -> usize {
        self.teilnehmer.values().filter(|t| t.spricht).count()
    }

    pub fn kapazitaet(&self) -> usize {
        self.kapazitaet
    }

    /// Setzt die Kapazitaet (mindestens 1); verdraengt keine Teilnehmer
    pub fn kapazitaet_setzen(&mut self, kapazitaet: usize) {
        self.kapazitaet = kapazitaet.max(1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn tabelle(kapazitaet: usize) -> TeilnehmerTabelle {
        TeilnehmerTabelle::neu(kapazitaet, STANDARD_STREAM_ID_BASIS)
    }

    #[test]
    fn stream_ids_starten_bei_basis_und_steigen() {
        let mut t = tabelle(10);
        assert_eq!(t.einfuegen("a".into(), None).unwrap(), 1000);
        assert_eq!(t.einfuegen("b".into(), None).unwrap(), 1001);
        assert_eq!(t.user_von_stream_id(1001), Some(&UserId::from("b")));
        assert_eq!(t.stream_id("a"), Some(1000));
    }

    #[test]
    fn wiederbeitritt_bekommt_neue_stream_id() {
        let mut t = tabelle(10);
        t.einfuegen("a".into(), None).unwrap();
        t.entfernen("a").unwrap();
        assert!(t.user_von_stream_id(1000).is_none());
        assert_eq!(t.einfuegen("a".into(), None).unwrap(), 1001);
    }

    #[test]
    fn duplikat_vor_kapazitaet() {
        let mut t = tabelle(1);
        t.einfuegen("a".into(), None).unwrap();
        assert_eq!(
            t.einfuegen("a".into(), None),
            Err(StimmraumError::BereitsVorhanden("a".into()))
        );
        assert_eq!(
            t.einfuegen("b".into(), None),
            Err(StimmraumError::KapazitaetErreicht { kapazitaet: 1 })
        );
        assert_eq!(t.anzahl(), 1);
    }

    #[test]
    fn stream_id_raum_erschoepft() {
        let mut t = TeilnehmerTabelle::neu(10, u32::MAX);
        assert_eq!(t.einfuegen("a".into(), None).unwrap(), u32::MAX);
        let err = t.einfuegen("b".into(), None).unwrap_err();
        assert!(matches!(err, StimmraumError::RessourcenErschoepft(_)));
        assert!(!t.enthaelt("b"));
    }

    #[test]
    fn anzeigename_faellt_auf_user_id_zurueck() {
        let mut t = tabelle(10);
        t.einfuegen("alice".into(), Some("Alice".into())).unwrap();
        t.einfuegen("bob".into(), None).unwrap();
        assert_eq!(t.get("alice").unwrap().anzeigename, "Alice");
        assert_eq!(t.get("bob").unwrap().anzeigename, "bob");
    }

    #[test]
    fn empfaenger_ohne_absender() {
        let mut t = tabelle(10);
        for uid in ["u1", "u2", "u3"] {
            t.einfuegen(uid.into(), None).unwrap();
        }
        let mut empfaenger = t.empfaenger(Some("u1"));
        empfaenger.sort();
        assert_eq!(empfaenger, vec![UserId::from("u2"), UserId::from("u3")]);
        assert_eq!(t.empfaenger(None).len(), 3);
    }

    #[test]
    fn kapazitaet_null_wird_eins() {
        let mut t = tabelle(0);
        assert_eq!(t.kapazitaet(), 1);
        t.kapazitaet_setzen(0);
        assert_eq!(t.kapazitaet(), 1);
    }
}
