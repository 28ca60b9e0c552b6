//! stimmraum-core – Gemeinsame Typen, Fehlertypen und Schnittstellen
//!
//! Dieses Crate stellt die Bausteine bereit, die von Voice-, Signaling- und
//! Server-Crate gemeinsam genutzt werden. Externe Kollaborateure (Event-Bus,
//! Persistenz, Audio-Filter) sind hier nur als Traits beschrieben.

pub mod error;
pub mod event;
pub mod filter;
pub mod store;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{Result, StimmraumError};
pub use types::{ChannelId, ServerId, UserId};
