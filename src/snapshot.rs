use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    engine::Engine,
    metrics::{MetricsSnapshot, ScoreBand, VegetationClass},
    weather::{ClimateReadout, Severity, WeatherKind},
    world::{Herd, Pasture, Plot, Selection},
};

/// Read-only view of a session handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmSnapshot {
    pub session: String,
    pub time_unit: u64,
    pub active: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub credits: u32,
    pub credit_cap: u32,
    pub plots: Vec<Plot>,
    pub pastures: Vec<PastureView>,
    pub herd: Herd,
    pub selection: Selection,
    pub weather: WeatherView,
    pub climate: ClimateReadout,
    pub metrics: MetricsSnapshot,
    pub overall_band: ScoreBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PastureView {
    #[serde(flatten)]
    pub pasture: Pasture,
    pub vegetation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherView {
    pub kind: WeatherKind,
    pub severity: Severity,
    pub since: u64,
    pub title: &'static str,
    pub cause: &'static str,
    pub impact: &'static str,
    pub water_impact: &'static str,
    pub pasture_impact: &'static str,
}

impl FarmSnapshot {
    pub fn capture(engine: &Engine) -> Self {
        let farm = engine.farm();
        let metrics = engine.metrics();
        let weather = farm.weather();
        Self {
            session: engine.name().to_string(),
            time_unit: engine.time_unit(),
            active: engine.is_active(),
            started_at: engine.started_at(),
            credits: farm.ledger().credits(),
            credit_cap: farm.ledger().cap(),
            plots: farm.plots().to_vec(),
            pastures: farm
                .pastures()
                .iter()
                .map(|pasture| PastureView {
                    pasture: pasture.clone(),
                    vegetation: VegetationClass::of(pasture.ndvi()).label(),
                })
                .collect(),
            herd: farm.herd().clone(),
            selection: farm.selection(),
            weather: WeatherView {
                kind: weather.kind,
                severity: weather.severity,
                since: weather.since,
                title: weather.title(),
                cause: weather.cause(),
                impact: weather.impact(),
                water_impact: weather.water_impact_label(),
                pasture_impact: weather.pasture_impact_label(),
            },
            climate: farm.climate().clone(),
            metrics,
            overall_band: ScoreBand::of(metrics.overall_sustainability),
        }
    }
}
