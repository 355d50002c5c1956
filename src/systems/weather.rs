use anyhow::Result;
use rand::Rng;
use tracing::info;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    weather::{WeatherBands, WeatherEvent, WeatherKind},
    world::Farm,
};

/// Slow cadence: draws the next weather event and applies its side effects
/// in the same step as the transition.
pub struct WeatherSystem {
    bands: WeatherBands,
}

impl WeatherSystem {
    pub fn new(bands: WeatherBands) -> Self {
        Self { bands }
    }
}

impl Default for WeatherSystem {
    fn default() -> Self {
        Self::new(WeatherBands::default())
    }
}

impl System for WeatherSystem {
    fn name(&self) -> &str {
        "weather"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        farm: &mut Farm,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let roll: f64 = rng.gen();
        let kind = self.bands.classify(roll);
        let previous = farm.weather.kind;
        apply_weather(farm, kind, ctx.time_unit);
        info!(
            unit = ctx.time_unit,
            from = ?previous,
            to = ?kind,
            severity = ?farm.weather.severity,
            "weather changed"
        );
        Ok(())
    }
}

/// Makes `kind` the current event, starting on `time_unit`, and applies its
/// effect vector.
pub(crate) fn apply_weather(farm: &mut Farm, kind: WeatherKind, time_unit: u64) {
    let effect = kind.effect();
    farm.weather = WeatherEvent::new(kind, time_unit);
    farm.herd.adjust_water(effect.water_availability);
    farm.herd.adjust_health(effect.herd_health);
    if effect.ndvi != 0.0 {
        for pasture in &mut farm.pastures {
            pasture.adjust_ndvi(effect.ndvi);
        }
    }
}
