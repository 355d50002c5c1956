use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const PROBABILITY_EPS: f64 = 1e-9;

fn default_name() -> String {
    "homestead".to_string()
}

fn default_decay_every() -> u64 {
    2
}

fn default_economy_every() -> u64 {
    3
}

fn default_weather_every() -> u64 {
    15
}

fn default_climate_every() -> u64 {
    5
}

fn default_time_unit_ms() -> u64 {
    1_000
}

fn default_starting_credits() -> u32 {
    100
}

fn default_credit_cap() -> u32 {
    200
}

fn default_regen_amount() -> u32 {
    5
}

fn default_plots() -> usize {
    12
}

fn default_pastures() -> usize {
    9
}

fn default_plot_health() -> f64 {
    50.0
}

fn default_plot_water() -> f64 {
    50.0
}

fn default_pasture_ndvi() -> f64 {
    0.6
}

fn default_pasture_health() -> f64 {
    80.0
}

fn default_herd_health() -> f64 {
    100.0
}

fn default_herd_feed() -> f64 {
    70.0
}

fn default_herd_water() -> f64 {
    70.0
}

fn default_drought() -> f64 {
    0.15
}

fn default_rainfall() -> f64 {
    0.15
}

fn default_storm() -> f64 {
    0.10
}

fn default_normal() -> f64 {
    0.60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Fixed seed for every random stream. `None` draws one from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub cadence: CadenceConfig,
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub farm: FarmConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
}

/// Periods are expressed in time units; the session maps one unit to `time_unit_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadenceConfig {
    #[serde(default = "default_decay_every")]
    pub decay_every: u64,
    #[serde(default = "default_economy_every")]
    pub economy_every: u64,
    #[serde(default = "default_weather_every")]
    pub weather_every: u64,
    #[serde(default = "default_climate_every")]
    pub climate_every: u64,
    #[serde(default = "default_time_unit_ms")]
    pub time_unit_ms: u64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            decay_every: default_decay_every(),
            economy_every: default_economy_every(),
            weather_every: default_weather_every(),
            climate_every: default_climate_every(),
            time_unit_ms: default_time_unit_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyConfig {
    #[serde(default = "default_starting_credits")]
    pub starting_credits: u32,
    #[serde(default = "default_credit_cap")]
    pub credit_cap: u32,
    #[serde(default = "default_regen_amount")]
    pub regen_amount: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_credits: default_starting_credits(),
            credit_cap: default_credit_cap(),
            regen_amount: default_regen_amount(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmConfig {
    #[serde(default = "default_plots")]
    pub plots: usize,
    #[serde(default = "default_pastures")]
    pub pastures: usize,
    #[serde(default = "default_plot_health")]
    pub plot_health: f64,
    #[serde(default = "default_plot_water")]
    pub plot_water: f64,
    #[serde(default = "default_pasture_ndvi")]
    pub pasture_ndvi: f64,
    #[serde(default = "default_pasture_health")]
    pub pasture_health: f64,
    #[serde(default = "default_herd_health")]
    pub herd_health: f64,
    #[serde(default = "default_herd_feed")]
    pub herd_feed: f64,
    #[serde(default = "default_herd_water")]
    pub herd_water: f64,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            plots: default_plots(),
            pastures: default_pastures(),
            plot_health: default_plot_health(),
            plot_water: default_plot_water(),
            pasture_ndvi: default_pasture_ndvi(),
            pasture_health: default_pasture_health(),
            herd_health: default_herd_health(),
            herd_feed: default_herd_feed(),
            herd_water: default_herd_water(),
        }
    }
}

/// Band widths of the weather draw. Bands are laid out over [0, 1) in the
/// order drought, rainfall, storm, normal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_drought")]
    pub drought: f64,
    #[serde(default = "default_rainfall")]
    pub rainfall: f64,
    #[serde(default = "default_storm")]
    pub storm: f64,
    #[serde(default = "default_normal")]
    pub normal: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            drought: default_drought(),
            rainfall: default_rainfall(),
            storm: default_storm(),
            normal: default_normal(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed: None,
            cadence: CadenceConfig::default(),
            economy: EconomyConfig::default(),
            farm: FarmConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("cadence `{name}` must fire at least every unit, got period 0")]
    ZeroCadence { name: &'static str },
    #[error("time unit must be at least 1ms")]
    ZeroTimeUnit,
    #[error("farm must have at least one {what}")]
    EmptyCollection { what: &'static str },
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("starting credits {starting} exceed the credit cap {cap}")]
    StartingCreditsAboveCap { starting: u32, cap: u32 },
    #[error("weather band probabilities sum to {sum}, expected 1")]
    WeatherBandsSum { sum: f64 },
}

impl SimulationConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cadences = [
            ("decay_every", self.cadence.decay_every),
            ("economy_every", self.cadence.economy_every),
            ("weather_every", self.cadence.weather_every),
            ("climate_every", self.cadence.climate_every),
        ];
        for (name, period) in cadences {
            if period == 0 {
                return Err(ConfigError::ZeroCadence { name });
            }
        }
        if self.cadence.time_unit_ms == 0 {
            return Err(ConfigError::ZeroTimeUnit);
        }

        if self.farm.plots == 0 {
            return Err(ConfigError::EmptyCollection { what: "plot" });
        }
        if self.farm.pastures == 0 {
            return Err(ConfigError::EmptyCollection { what: "pasture" });
        }

        let percentages = [
            ("farm.plot_health", self.farm.plot_health),
            ("farm.plot_water", self.farm.plot_water),
            ("farm.pasture_health", self.farm.pasture_health),
            ("farm.herd_health", self.farm.herd_health),
            ("farm.herd_feed", self.farm.herd_feed),
            ("farm.herd_water", self.farm.herd_water),
        ];
        for (field, value) in percentages {
            check_range(field, value, 0.0, 100.0)?;
        }
        check_range("farm.pasture_ndvi", self.farm.pasture_ndvi, 0.1, 1.0)?;

        if self.economy.starting_credits > self.economy.credit_cap {
            return Err(ConfigError::StartingCreditsAboveCap {
                starting: self.economy.starting_credits,
                cap: self.economy.credit_cap,
            });
        }

        let bands = [
            ("weather.drought", self.weather.drought),
            ("weather.rainfall", self.weather.rainfall),
            ("weather.storm", self.weather.storm),
            ("weather.normal", self.weather.normal),
        ];
        for (field, value) in bands {
            check_range(field, value, 0.0, 1.0)?;
        }
        let sum: f64 = bands.iter().map(|(_, value)| value).sum();
        if (sum - 1.0).abs() > PROBABILITY_EPS {
            return Err(ConfigError::WeatherBandsSum { sum });
        }

        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<SimulationConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SimulationConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }
}
