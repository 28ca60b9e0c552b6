//! Audio-Filter-Kette
//!
//! Echo-Unterdrueckung, Rauschminderung und Verstaerkung sind fuer den Kern
//! undurchsichtige Funktionen `samples -> samples`. Der Aufrufer wendet die
//! Kette vor bzw. nach dem Routing an; der Kern transportiert nur bereits
//! kodierte Nutzdaten.

/// Ein einzelner Filter mit fester Signatur
pub trait AudioFilter: Send + Sync {
    /// Name fuer Logging
    fn name(&self) -> &str;

    /// Transformiert einen Frame
    fn transformieren(&self, samples: Vec<f32>) -> Vec<f32>;
}

/// Verstaerkung um einen festen Faktor, begrenzt auf [-1.0, 1.0]
#[derive(Debug, Clone)]
pub struct Verstaerkung {
    pub faktor: f32,
}

impl AudioFilter for Verstaerkung {
    fn name(&self) -> &str {
        "gain"
    }

    fn transformieren(&self, samples: Vec<f32>) -> Vec<f32> {
        samples
            .into_iter()
            .map(|s| (s * self.faktor).clamp(-1.0, 1.0))
            .collect()
    }
}

/// Geordnete Filter-Kette
#[derive(Default)]
pub struct FilterKette {
    filter: Vec<Box<dyn AudioFilter>>,
}

impl FilterKette {
    /// Leere Kette (gibt Frames unveraendert zurueck)
    pub fn neu() -> Self {
        Self::default()
    }

    /// Haengt einen Filter ans Ende der Kette
    pub fn mit(mut self, filter: impl AudioFilter + 'static) -> Self {
        self.filter.push(Box::new(filter));
        self
    }

    /// Wendet alle Filter in Reihenfolge an
    pub fn anwenden(&self, samples: Vec<f32>) -> Vec<f32> {
        self.filter
            .iter()
            .fold(samples, |frame, f| f.transformieren(frame))
    }

    /// Namen der Filter in Reihenfolge
    pub fn namen(&self) -> Vec<&str> {
        self.filter.iter().map(|f| f.name()).collect()
    }

    pub fn ist_leer(&self) -> bool {
        self.filter.is_empty()
    }
}
