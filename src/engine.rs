use anyhow::Result;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    actions::{self, Action, ActionError, ActionReceipt},
    config::{ConfigError, SimulationConfig},
    metrics::MetricsSnapshot,
    rng::{RngManager, SystemRng},
    snapshot::FarmSnapshot,
    systems::{ClimateSystem, DecaySystem, EconomySystem, WeatherSystem},
    weather::{WeatherBands, WeatherEvent},
    world::Farm,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("session is not running")]
    Inactive,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("system `{name}` failed: {message}")]
    System { name: String, message: String },
}

pub struct SystemContext {
    /// The time unit being processed, starting at 1 for the first advance.
    pub time_unit: u64,
}

pub trait System: Send {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        farm: &mut Farm,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}

/// Fires on every time unit that is a multiple of `every`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    every: u64,
}

impl Cadence {
    pub fn every(units: u64) -> Self {
        Self {
            every: units.max(1),
        }
    }

    pub fn is_due(&self, time_unit: u64) -> bool {
        time_unit % self.every == 0
    }
}

struct ScheduledSystem {
    system: Box<dyn System>,
    cadence: Cadence,
}

pub struct EngineSettings {
    pub name: String,
    pub seed: Option<u64>,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<ScheduledSystem>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    /// Systems due on the same time unit run in registration order.
    pub fn with_system(mut self, system: impl System + 'static, cadence: Cadence) -> Self {
        self.push_system(system, cadence);
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static, cadence: Cadence) {
        self.systems.push(ScheduledSystem {
            system: Box::new(system),
            cadence,
        });
    }

    pub fn build(self, farm: Farm) -> Engine {
        let rng = match self.settings.seed {
            Some(seed) => RngManager::new(seed),
            None => RngManager::from_entropy(),
        };
        Engine {
            name: self.settings.name,
            farm,
            rng,
            systems: self.systems,
            time_unit: 0,
            active: false,
            started_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TickSummary {
    pub time_unit: u64,
    pub fired: Vec<String>,
    /// Set when a weather event began on this unit, even if it repeats the last one.
    pub weather: Option<WeatherEvent>,
    pub metrics: MetricsSnapshot,
}

/// Owns one session's farm and drives its cadences off a single time-unit
/// counter. Inert until [`Engine::start`].
pub struct Engine {
    name: String,
    farm: Farm,
    rng: RngManager,
    systems: Vec<ScheduledSystem>,
    time_unit: u64,
    active: bool,
    started_at: Option<DateTime<Utc>>,
}

impl Engine {
    /// Builds the reference engine: decay, economy, weather, then climate.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let cadence = &config.cadence;
        let settings = EngineSettings {
            name: config.name.clone(),
            seed: config.seed,
        };
        Ok(EngineBuilder::new(settings)
            .with_system(DecaySystem::new(), Cadence::every(cadence.decay_every))
            .with_system(EconomySystem::new(), Cadence::every(cadence.economy_every))
            .with_system(
                WeatherSystem::new(WeatherBands::from_config(&config.weather)),
                Cadence::every(cadence.weather_every),
            )
            .with_system(ClimateSystem::new(), Cadence::every(cadence.climate_every))
            .build(Farm::from_config(config)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn start(&mut self) {
        if !self.active {
            self.active = true;
            self.started_at = Some(Utc::now());
            info!(session = %self.name, unit = self.time_unit, "session started");
        }
    }

    pub fn stop(&mut self) {
        if self.active {
            self.active = false;
            info!(session = %self.name, unit = self.time_unit, "session stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn time_unit(&self) -> u64 {
        self.time_unit
    }

    /// Advances one time unit and runs every system due on it. All entity
    /// mutation for the unit completes before metrics are computed.
    pub fn advance(&mut self) -> Result<TickSummary, EngineError> {
        if !self.active {
            return Err(EngineError::Inactive);
        }
        self.time_unit += 1;
        let ctx = SystemContext {
            time_unit: self.time_unit,
        };

        let mut fired = Vec::new();
        for scheduled in &mut self.systems {
            if !scheduled.cadence.is_due(ctx.time_unit) {
                continue;
            }
            let name = scheduled.system.name().to_string();
            let mut stream = self.rng.stream(&name);
            scheduled
                .system
                .run(&ctx, &mut self.farm, &mut stream)
                .map_err(|err| EngineError::System {
                    name: name.clone(),
                    message: format!("{err:#}"),
                })?;
            fired.push(name);
        }
        let weather = (self.farm.weather.since == ctx.time_unit).then_some(self.farm.weather);
        if !fired.is_empty() {
            debug!(unit = ctx.time_unit, fired = ?fired, "cadences fired");
        }

        Ok(TickSummary {
            time_unit: ctx.time_unit,
            fired,
            weather,
            metrics: self.metrics(),
        })
    }

    pub fn dispatch(&mut self, action: Action) -> Result<ActionReceipt, ActionError> {
        match actions::apply(&mut self.farm, action) {
            Ok(receipt) => {
                debug!(
                    action = action.name(),
                    cost = receipt.cost,
                    credits = receipt.credits_remaining,
                    "action applied"
                );
                Ok(receipt)
            }
            Err(err) if err.is_validation() => {
                debug!(action = action.name(), reason = %err, "action rejected");
                Err(err)
            }
            Err(err) => {
                warn!(action = action.name(), error = %err, "action violates farm invariants");
                Err(err)
            }
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::compute(&self.farm)
    }

    pub fn snapshot(&self) -> FarmSnapshot {
        FarmSnapshot::capture(self)
    }

    pub fn farm(&self) -> &Farm {
        &self.farm
    }

    pub fn farm_mut(&mut self) -> &mut Farm {
        &mut self.farm
    }
}
