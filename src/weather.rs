//! Weather and climate value types.
//!
//! Weather is a memoryless four-state process: each draw maps one uniform
//! value in [0, 1) onto fixed bands, with no dependence on the previous
//! event. The climate readout is a display-only random walk.

use rand::Rng;
use serde::Serialize;

use crate::config::WeatherConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    Drought,
    Rainfall,
    Storm,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Deltas applied once, atomically, when an event becomes current.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeatherEffect {
    pub water_availability: f64,
    pub ndvi: f64,
    pub herd_health: f64,
}

impl WeatherKind {
    pub const ALL: [WeatherKind; 4] = [
        WeatherKind::Drought,
        WeatherKind::Rainfall,
        WeatherKind::Storm,
        WeatherKind::Normal,
    ];

    pub fn severity(self) -> Severity {
        match self {
            WeatherKind::Drought | WeatherKind::Storm => Severity::High,
            WeatherKind::Rainfall => Severity::Medium,
            WeatherKind::Normal => Severity::Low,
        }
    }

    pub fn effect(self) -> WeatherEffect {
        match self {
            WeatherKind::Drought => WeatherEffect {
                water_availability: -15.0,
                ndvi: -0.05,
                herd_health: 0.0,
            },
            WeatherKind::Rainfall => WeatherEffect {
                water_availability: 20.0,
                ndvi: 0.08,
                herd_health: 0.0,
            },
            WeatherKind::Storm => WeatherEffect {
                herd_health: -10.0,
                ..WeatherEffect::default()
            },
            WeatherKind::Normal => WeatherEffect::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherEvent {
    pub kind: WeatherKind,
    pub severity: Severity,
    /// Time unit the event began on. 0 for the calm a session opens with.
    pub since: u64,
}

impl WeatherEvent {
    pub fn new(kind: WeatherKind, since: u64) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            since,
        }
    }

    pub fn calm() -> Self {
        Self::new(WeatherKind::Normal, 0)
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            WeatherKind::Drought => "Drought Conditions",
            WeatherKind::Rainfall => "Heavy Rainfall",
            WeatherKind::Storm => "Storm Warning",
            WeatherKind::Normal => "Normal Conditions",
        }
    }

    pub fn cause(&self) -> &'static str {
        match self.kind {
            WeatherKind::Drought => {
                "Extended dry spell: precipitation well below the seasonal average."
            }
            WeatherKind::Rainfall => "A slow-moving front is bringing sustained heavy rain.",
            WeatherKind::Storm => "A severe storm system with high winds is crossing the farm.",
            WeatherKind::Normal => "Temperature and precipitation are within seasonal norms.",
        }
    }

    pub fn impact(&self) -> &'static str {
        match self.kind {
            WeatherKind::Drought => "Water resources depleting faster. Pasture growth reduced.",
            WeatherKind::Rainfall => "Water resources replenishing. Good for pasture growth.",
            WeatherKind::Storm => "Livestock stress increased. Move animals to shelter.",
            WeatherKind::Normal => "Optimal conditions for sustainable farming.",
        }
    }

    pub fn water_impact_label(&self) -> &'static str {
        match self.kind {
            WeatherKind::Drought => "-15%",
            WeatherKind::Rainfall => "+20%",
            WeatherKind::Storm | WeatherKind::Normal => "0%",
        }
    }

    pub fn pasture_impact_label(&self) -> &'static str {
        match self.kind {
            WeatherKind::Drought => "-10%",
            WeatherKind::Rainfall => "+15%",
            WeatherKind::Storm | WeatherKind::Normal => "0%",
        }
    }
}

/// Fixed partition of [0, 1), evaluated in `WeatherKind::ALL` order.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherBands {
    upper_bounds: [(WeatherKind, f64); 4],
}

impl WeatherBands {
    pub fn from_config(config: &WeatherConfig) -> Self {
        let widths = [config.drought, config.rainfall, config.storm, config.normal];
        let mut cumulative = 0.0;
        let mut upper_bounds = [(WeatherKind::Normal, 1.0); 4];
        for (slot, (kind, width)) in upper_bounds
            .iter_mut()
            .zip(WeatherKind::ALL.into_iter().zip(widths))
        {
            cumulative += width;
            *slot = (kind, cumulative);
        }
        // Rounding in the running sum must never leave a gap below 1.
        upper_bounds[3].1 = 1.0;
        Self { upper_bounds }
    }

    pub fn classify(&self, roll: f64) -> WeatherKind {
        self.upper_bounds
            .iter()
            .find(|(_, upper)| roll < *upper)
            .map(|(kind, _)| *kind)
            .unwrap_or(WeatherKind::Normal)
    }
}

impl Default for WeatherBands {
    fn default() -> Self {
        Self::from_config(&WeatherConfig::default())
    }
}

/// Synthetic climate gauges shown beside the farm.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateReadout {
    pub temperature_f: f64,
    pub humidity_pct: f64,
    pub wind_speed_mph: f64,
    pub precipitation_pct: f64,
}

impl Default for ClimateReadout {
    fn default() -> Self {
        Self {
            temperature_f: 72.0,
            humidity_pct: 65.0,
            wind_speed_mph: 12.0,
            precipitation_pct: 15.0,
        }
    }
}

impl ClimateReadout {
    pub fn drift<R: Rng>(&mut self, rng: &mut R) {
        self.temperature_f = walk(rng, self.temperature_f, 1.0, 60.0, 85.0);
        self.humidity_pct = walk(rng, self.humidity_pct, 1.5, 40.0, 90.0);
        self.wind_speed_mph = walk(rng, self.wind_speed_mph, 1.0, 5.0, 25.0);
        self.precipitation_pct = walk(rng, self.precipitation_pct, 1.5, 0.0, 30.0);
    }
}

fn walk<R: Rng>(rng: &mut R, value: f64, step: f64, min: f64, max: f64) -> f64 {
    (value + rng.gen_range(-step..=step)).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn default_bands_follow_reference_split() {
        let bands = WeatherBands::default();
        assert_eq!(bands.classify(0.0), WeatherKind::Drought);
        assert_eq!(bands.classify(0.149), WeatherKind::Drought);
        assert_eq!(bands.classify(0.15), WeatherKind::Rainfall);
        assert_eq!(bands.classify(0.29), WeatherKind::Rainfall);
        assert_eq!(bands.classify(0.35), WeatherKind::Storm);
        assert_eq!(bands.classify(0.41), WeatherKind::Normal);
        assert_eq!(bands.classify(0.999_999), WeatherKind::Normal);
    }

    #[test]
    fn empty_band_is_skipped() {
        let config = WeatherConfig {
            drought: 0.0,
            rainfall: 0.5,
            storm: 0.0,
            normal: 0.5,
        };
        let bands = WeatherBands::from_config(&config);
        assert_eq!(bands.classify(0.0), WeatherKind::Rainfall);
        assert_eq!(bands.classify(0.5), WeatherKind::Normal);
    }

    #[test]
    fn each_kind_has_fixed_severity() {
        assert_eq!(WeatherEvent::new(WeatherKind::Drought, 15).severity, Severity::High);
        assert_eq!(WeatherEvent::new(WeatherKind::Rainfall, 15).severity, Severity::Medium);
        assert_eq!(WeatherEvent::new(WeatherKind::Storm, 15).severity, Severity::High);
        assert_eq!(WeatherEvent::calm().severity, Severity::Low);
    }

    #[test]
    fn climate_drift_stays_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut climate = ClimateReadout::default();
        for _ in 0..2_000 {
            climate.drift(&mut rng);
            assert!((60.0..=85.0).contains(&climate.temperature_f));
            assert!((40.0..=90.0).contains(&climate.humidity_pct));
            assert!((5.0..=25.0).contains(&climate.wind_speed_mph));
            assert!((0.0..=30.0).contains(&climate.precipitation_pct));
        }
    }
}
