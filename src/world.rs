use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    config::SimulationConfig,
    ledger::Ledger,
    weather::{ClimateReadout, WeatherEvent},
};

pub const PERCENT_MIN: f64 = 0.0;
pub const PERCENT_MAX: f64 = 100.0;
pub const NDVI_MIN: f64 = 0.1;
pub const NDVI_MAX: f64 = 1.0;

pub(crate) fn clamp_percent(value: f64) -> f64 {
    value.clamp(PERCENT_MIN, PERCENT_MAX)
}

pub(crate) fn clamp_ndvi(value: f64) -> f64 {
    value.clamp(NDVI_MIN, NDVI_MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlotId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PastureId(pub usize);

impl fmt::Display for PlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plot {}", self.0)
    }
}

impl fmt::Display for PastureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pasture {}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
    id: PlotId,
    health: f64,
    water_level: f64,
    fertilized: bool,
}

impl Plot {
    fn new(id: PlotId, health: f64, water_level: f64) -> Self {
        Self {
            id,
            health: clamp_percent(health),
            water_level: clamp_percent(water_level),
            fertilized: false,
        }
    }

    pub fn id(&self) -> PlotId {
        self.id
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn water_level(&self) -> f64 {
        self.water_level
    }

    pub fn is_fertilized(&self) -> bool {
        self.fertilized
    }

    pub fn set_health(&mut self, value: f64) {
        self.health = clamp_percent(value);
    }

    pub fn set_water_level(&mut self, value: f64) {
        self.water_level = clamp_percent(value);
    }

    pub(crate) fn adjust_health(&mut self, delta: f64) {
        self.set_health(self.health + delta);
    }

    pub(crate) fn adjust_water(&mut self, delta: f64) {
        self.set_water_level(self.water_level + delta);
    }

    pub(crate) fn mark_fertilized(&mut self) {
        self.fertilized = true;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pasture {
    id: PastureId,
    ndvi: f64,
    grazing_load: u32,
    health: f64,
}

impl Pasture {
    fn new(id: PastureId, ndvi: f64, health: f64) -> Self {
        Self {
            id,
            ndvi: clamp_ndvi(ndvi),
            grazing_load: 0,
            health: clamp_percent(health),
        }
    }

    pub fn id(&self) -> PastureId {
        self.id
    }

    pub fn ndvi(&self) -> f64 {
        self.ndvi
    }

    pub fn grazing_load(&self) -> u32 {
        self.grazing_load
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn set_ndvi(&mut self, value: f64) {
        self.ndvi = clamp_ndvi(value);
    }

    pub fn set_health(&mut self, value: f64) {
        self.health = clamp_percent(value);
    }

    pub(crate) fn adjust_ndvi(&mut self, delta: f64) {
        self.set_ndvi(self.ndvi + delta);
    }

    pub(crate) fn adjust_health(&mut self, delta: f64) {
        self.set_health(self.health + delta);
    }

    pub(crate) fn add_animal(&mut self) {
        self.grazing_load += 1;
    }

    /// Returns false when the pasture carried no animals.
    pub(crate) fn remove_animal(&mut self) -> bool {
        if self.grazing_load == 0 {
            return false;
        }
        self.grazing_load -= 1;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Herd {
    size: u32,
    health: f64,
    feed_level: f64,
    water_availability: f64,
}

impl Herd {
    fn new(health: f64, feed_level: f64, water_availability: f64) -> Self {
        Self {
            size: 0,
            health: clamp_percent(health),
            feed_level: clamp_percent(feed_level),
            water_availability: clamp_percent(water_availability),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn feed_level(&self) -> f64 {
        self.feed_level
    }

    pub fn water_availability(&self) -> f64 {
        self.water_availability
    }

    pub fn set_health(&mut self, value: f64) {
        self.health = clamp_percent(value);
    }

    pub fn set_feed_level(&mut self, value: f64) {
        self.feed_level = clamp_percent(value);
    }

    pub fn set_water_availability(&mut self, value: f64) {
        self.water_availability = clamp_percent(value);
    }

    pub(crate) fn adjust_health(&mut self, delta: f64) {
        self.set_health(self.health + delta);
    }

    pub(crate) fn adjust_feed(&mut self, delta: f64) {
        self.set_feed_level(self.feed_level + delta);
    }

    pub(crate) fn adjust_water(&mut self, delta: f64) {
        self.set_water_availability(self.water_availability + delta);
    }

    pub(crate) fn grow(&mut self) {
        self.size += 1;
    }

    pub(crate) fn shrink(&mut self) {
        self.size = self.size.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub plot: Option<PlotId>,
    pub pasture: Option<PastureId>,
}

/// The whole mutable entity graph of one session. Plot and pasture counts are
/// fixed at construction; entities are only ever mutated, never added or removed.
pub struct Farm {
    pub(crate) plots: Vec<Plot>,
    pub(crate) pastures: Vec<Pasture>,
    pub(crate) herd: Herd,
    pub(crate) ledger: Ledger,
    pub(crate) weather: WeatherEvent,
    pub(crate) climate: ClimateReadout,
    pub(crate) selection: Selection,
}

impl Farm {
    pub fn from_config(config: &SimulationConfig) -> Self {
        let farm = &config.farm;
        let plots = (0..farm.plots)
            .map(|index| Plot::new(PlotId(index), farm.plot_health, farm.plot_water))
            .collect();
        let pastures = (0..farm.pastures)
            .map(|index| Pasture::new(PastureId(index), farm.pasture_ndvi, farm.pasture_health))
            .collect();
        Self {
            plots,
            pastures,
            herd: Herd::new(farm.herd_health, farm.herd_feed, farm.herd_water),
            ledger: Ledger::new(
                config.economy.starting_credits,
                config.economy.credit_cap,
                config.economy.regen_amount,
            ),
            weather: WeatherEvent::calm(),
            climate: ClimateReadout::default(),
            selection: Selection::default(),
        }
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn pastures(&self) -> &[Pasture] {
        &self.pastures
    }

    pub fn plot(&self, id: PlotId) -> Option<&Plot> {
        self.plots.get(id.0)
    }

    pub fn plot_mut(&mut self, id: PlotId) -> Option<&mut Plot> {
        self.plots.get_mut(id.0)
    }

    pub fn pasture(&self, id: PastureId) -> Option<&Pasture> {
        self.pastures.get(id.0)
    }

    pub fn pasture_mut(&mut self, id: PastureId) -> Option<&mut Pasture> {
        self.pastures.get_mut(id.0)
    }

    pub fn herd(&self) -> &Herd {
        &self.herd
    }

    pub fn herd_mut(&mut self) -> &mut Herd {
        &mut self.herd
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn weather(&self) -> &WeatherEvent {
        &self.weather
    }

    pub fn climate(&self) -> &ClimateReadout {
        &self.climate
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn total_grazing_load(&self) -> u32 {
        self.pastures.iter().map(Pasture::grazing_load).sum()
    }
}
