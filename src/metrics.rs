use serde::Serialize;

use crate::world::{Farm, Herd, Pasture, Plot};

/// Derived scores. Always recomputed from the farm, never stored on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub sustainability: u32,
    pub efficiency: u32,
    #[serde(rename = "yield")]
    pub crop_yield: u32,
    pub animal_welfare: u32,
    pub resource_efficiency: u32,
    pub pasture_health: u32,
    pub overall_sustainability: u32,
}

impl MetricsSnapshot {
    pub fn compute(farm: &Farm) -> Self {
        let crops = CropAverages::of(farm.plots());
        let herd = farm.herd();

        let animal_welfare = score(
            herd.health() * 0.5 + herd.feed_level() * 0.25 + herd.water_availability() * 0.25,
        );
        let resource_efficiency = score(
            herd.water_availability() * 0.4
                + herd.feed_level() * 0.3
                + grazing_balance(herd) * 0.3,
        );
        let pasture_health = score(mean_ndvi(farm.pastures()) * 100.0);
        let overall_sustainability =
            round((animal_welfare + resource_efficiency + pasture_health) as f64 / 3.0);

        Self {
            sustainability: score(crops.health * 0.7 + crops.fertilized_fraction * 30.0),
            efficiency: score(crops.water * 0.6 + crops.health * 0.4),
            crop_yield: score(
                crops.health * 0.5 + crops.water * 0.3 + crops.fertilized_fraction * 20.0,
            ),
            animal_welfare,
            resource_efficiency,
            pasture_health,
            overall_sustainability,
        }
    }
}

struct CropAverages {
    health: f64,
    water: f64,
    fertilized_fraction: f64,
}

impl CropAverages {
    fn of(plots: &[Plot]) -> Self {
        let count = plots.len().max(1) as f64;
        let fertilized = plots.iter().filter(|plot| plot.is_fertilized()).count() as f64;
        Self {
            health: plots.iter().map(Plot::health).sum::<f64>() / count,
            water: plots.iter().map(Plot::water_level).sum::<f64>() / count,
            fertilized_fraction: fertilized / count,
        }
    }
}

fn mean_ndvi(pastures: &[Pasture]) -> f64 {
    let count = pastures.len().max(1) as f64;
    pastures.iter().map(Pasture::ndvi).sum::<f64>() / count
}

/// 100 for an empty herd, dropping by 8 per animal.
pub fn grazing_balance(herd: &Herd) -> f64 {
    if herd.size() == 0 {
        100.0
    } else {
        (100.0 - f64::from(herd.size()) * 8.0).max(0.0)
    }
}

fn round(value: f64) -> u32 {
    value.max(0.0).round() as u32
}

fn score(value: f64) -> u32 {
    round(value).min(100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
}

impl ScoreBand {
    pub fn of(score: u32) -> Self {
        match score {
            80..=u32::MAX => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            40..=59 => ScoreBand::Fair,
            _ => ScoreBand::NeedsAttention,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::NeedsAttention => "Needs Attention",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VegetationClass {
    Excellent,
    Good,
    Moderate,
    Poor,
    VeryPoor,
}

impl VegetationClass {
    pub fn of(ndvi: f64) -> Self {
        if ndvi >= 0.7 {
            VegetationClass::Excellent
        } else if ndvi >= 0.5 {
            VegetationClass::Good
        } else if ndvi >= 0.3 {
            VegetationClass::Moderate
        } else if ndvi >= 0.2 {
            VegetationClass::Poor
        } else {
            VegetationClass::VeryPoor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VegetationClass::Excellent => "Excellent",
            VegetationClass::Good => "Good",
            VegetationClass::Moderate => "Moderate",
            VegetationClass::Poor => "Poor",
            VegetationClass::VeryPoor => "Very Poor",
        }
    }
}
