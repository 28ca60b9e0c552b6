//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `STIMMRAUM_LOG_LEVEL`: Filter-Direktive (z.B. `info` oder
//!   `stimmraum_voice=debug,info`), ueberschreibt die Konfiguration
//! - `STIMMRAUM_LOG_FORMAT`: Format (text/json), ueberschreibt die Konfiguration

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "STIMMRAUM_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "STIMMRAUM_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// `level` und `format` stammen aus der Konfiguration und werden von den
/// Umgebungsvariablen ueberschrieben. Faellt auf `info` / `text` zurueck.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(ENV_LOG_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = format_waehlen(std::env::var(ENV_LOG_FORMAT).ok().as_deref(), format);

    // try_init: in Tests darf mehrfach initialisiert werden
    let ergebnis = if format == "json" {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_current_span(true)
            .try_init()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init()
    };

    if ergebnis.is_err() {
        tracing::debug!("Logging war bereits initialisiert");
    }
}

/// Umgebung vor Konfiguration; ungueltige Werte fallen auf `text`
fn format_waehlen(aus_env: Option<&str>, aus_config: &str) -> &'static str {
    match aus_env.unwrap_or(aus_config) {
        "json" => "json",
        _ => "text",
    }
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
