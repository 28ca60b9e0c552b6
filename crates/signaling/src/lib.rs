//! stimmraum-signaling – Offer/Answer/ICE-Aushandlung pro Teilnehmer
//!
//! ## Architektur
//!
//! ```text
//! VoiceService / API
//!     |
//!     v
//! SignalingCoordinator   DashMap<(Kanal, User), Mutex<SignalingSession>>
//!     |
//!     v
//! MediaTransport         QueueTransport | NullTransport
//! ```
//!
//! Jede Sitzung durchlaeuft unabhaengig von den anderen die Zustaende aus
//! [`state`]. Ein Kanal haelt nie einen Sitzungs- oder Map-Lock. Die
//! Praedikate der `*_falls`-Methoden duerfen Registry und Kanal abfragen;
//! Reihenfolge: Map -> Registry -> Kanal.

pub mod coordinator;
pub mod state;
pub mod transport;

pub use coordinator::SignalingCoordinator;
pub use state::{SignalingEreignis, SignalingSession, SignalingZustand};
pub use transport::{MediaTransport, NullTransport, QueueTransport, SitzungsSchluessel, TransportBefehl};
