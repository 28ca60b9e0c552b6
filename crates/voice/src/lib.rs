//! stimmraum-voice – Voice-Kern
//!
//! Verwaltet, wer in welchem Voice-Kanal ist, vergibt Stream-IDs (SSRC) und
//! verteilt eingehende Audio-Pakete an die richtigen Empfaenger.
//!
//! ## Module
//! - [`participant`] – Teilnehmer-Tabelle mit Stream-ID-Vergabe
//! - [`channel`] – Ein Voice-Kanal: Teilnehmer, Kapazitaet, Statistik, Fan-out
//! - [`registry`] – Prozessweite Zuordnung Kanal-ID -> Kanal
//! - [`sink`] – Zustell-Schnittstelle zum Media-Transport
//! - [`packet`] – Transientes Audio-Paket
//! - [`reaper`] – Periodisches Entfernen leerer Kanaele
//!
//! ## Lock-Disziplin
//! Registry-Lock schuetzt nur die Kanal-Map. Jeder Kanal hat einen eigenen
//! Lock fuer Teilnehmer und Stream-Index; er wird nie waehrend eines
//! Sink-Aufrufs gehalten. Reihenfolge (falls beide): Registry -> Kanal.

pub mod channel;
pub mod packet;
pub mod participant;
pub mod reaper;
pub mod registry;
pub mod sink;

pub use channel::{KanalStatistik, VoiceChannel};
pub use packet::{AudioPaket, Codec};
pub use participant::{Teilnehmer, TeilnehmerTabelle, STANDARD_STREAM_ID_BASIS};
pub use reaper::ReaperLoop;
pub use registry::{ChannelRegistry, RegistryConfig};
pub use sink::{AudioSink, NullSink, QueueSink};
