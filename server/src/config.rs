//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen und danach von
//! Umgebungsvariablen ueberschrieben. Alle Felder haben sinnvolle
//! Standardwerte, sodass der Server ohne Konfigurationsdatei lauffaehig ist.
//!
//! Umgebungsvariablen:
//! - `VOICE_HTTP_PORT`, `VOICE_RTC_PORT`, `VOICE_MAX_PARTICIPANTS`
//! - `MONGO_URI`, `REDIS_URL`, `API_GATEWAY_URL`

use serde::{Deserialize, Serialize};
use std::time::Duration;
use stimmraum_core::{Result, StimmraumError};
use stimmraum_voice::RegistryConfig;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Voice-Kern (Kapazitaet, Reaper, Stream-IDs)
    pub voice: VoiceEinstellungen,
    /// Teilnehmer-Store
    pub persistenz: PersistenzEinstellungen,
    /// Event-Bus
    pub event_bus: EventBusEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Server, dem neu angelegte Kanaele zugeordnet werden
    pub id: String,
    /// Anzeigename des Servers
    pub name: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            id: "default".into(),
            name: "Stimmraum Voice".into(),
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    pub bind_adresse: String,
    /// Port fuer die HTTP-API (Health, Kanaele, Metriken)
    pub http_port: u16,
    /// Port des Media-Transports (WebRTC)
    pub rtc_port: u16,
    /// STUN-Server, der Clients fuer die ICE-Aushandlung genannt wird
    pub stun_server: String,
    pub api_gateway_url: String,
    /// Erlaubte CORS-Origins (leer = alle erlaubt)
    pub cors_origins: Vec<String>,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            http_port: 9090,
            rtc_port: 3478,
            stun_server: "stun:stun.l.google.com:19302".into(),
            api_gateway_url: "http://localhost:8080".into(),
            cors_origins: vec![],
        }
    }
}

/// Voice-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceEinstellungen {
    /// Kapazitaet neu angelegter Kanaele
    pub max_teilnehmer: usize,
    /// Periode des Reapers in Sekunden
    pub reaper_intervall_sek: u64,
    /// Erste Stream-ID jedes Kanals
    pub stream_id_basis: u32,
}

impl Default for VoiceEinstellungen {
    fn default() -> Self {
        Self {
            max_teilnehmer: 50,
            reaper_intervall_sek: 30,
            stream_id_basis: 1000,
        }
    }
}

/// Persistenz-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenzEinstellungen {
    /// Verbindungs-URL des Teilnehmer-Stores
    pub url: String,
}

impl Default for PersistenzEinstellungen {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017/stimmraum".into(),
        }
    }
}

/// Event-Bus-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusEinstellungen {
    pub url: String,
    /// Puffer des lokalen Broadcast-Busses (Nachrichten)
    pub puffer: usize,
}

impl Default for EventBusEinstellungen {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".into(),
            puffer: 1024,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei und wendet die
    /// Umgebungsvariablen an.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let mut config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };

        config.umgebung_anwenden(|name| std::env::var(name).ok())?;
        config.validieren()?;
        Ok(config)
    }

    /// Ueberschreibt Felder aus der Umgebung; `lesen` liefert den Wert einer
    /// Variable falls gesetzt
    pub fn umgebung_anwenden<F>(&mut self, lesen: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn zahl<T: std::str::FromStr>(name: &str, wert: &str) -> anyhow::Result<T> {
            wert.trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("{name}: '{wert}' ist keine gueltige Zahl"))
        }

        if let Some(wert) = lesen("MONGO_URI") {
            self.persistenz.url = wert;
        }
        if let Some(wert) = lesen("REDIS_URL") {
            self.event_bus.url = wert;
        }
        if let Some(wert) = lesen("API_GATEWAY_URL") {
            self.netzwerk.api_gateway_url = wert;
        }
        if let Some(wert) = lesen("VOICE_HTTP_PORT") {
            self.netzwerk.http_port = zahl("VOICE_HTTP_PORT", &wert)?;
        }
        if let Some(wert) = lesen("VOICE_RTC_PORT") {
            self.netzwerk.rtc_port = zahl("VOICE_RTC_PORT", &wert)?;
        }
        if let Some(wert) = lesen("VOICE_MAX_PARTICIPANTS") {
            self.voice.max_teilnehmer = zahl("VOICE_MAX_PARTICIPANTS", &wert)?;
        }
        Ok(())
    }

    /// Prueft die Werte, die der Voice-Kern und das Logging erwarten
    pub fn validieren(&self) -> Result<()> {
        self.registry_config()?;
        if !stimmraum_observability::logging::log_format_gueltig(&self.logging.format) {
            return Err(StimmraumError::konfiguration(format!(
                "logging.format muss 'text' oder 'json' sein, nicht '{}'",
                self.logging.format
            )));
        }
        if self.server.id.trim().is_empty() {
            return Err(StimmraumError::konfiguration("server.id darf nicht leer sein"));
        }
        Ok(())
    }

    /// Registry-Konfiguration aus dem `[voice]`-Abschnitt
    pub fn registry_config(&self) -> Result<RegistryConfig> {
        let config = RegistryConfig {
            standard_kapazitaet: self.voice.max_teilnehmer,
            reaper_intervall: Duration::from_secs(self.voice.reaper_intervall_sek),
            stream_id_basis: self.voice.stream_id_basis,
        };
        config.validieren()?;
        Ok(config)
    }

    /// Gibt die Bind-Adresse fuer die HTTP-API zurueck
    pub fn http_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.http_port)
    }
}
