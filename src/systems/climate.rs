use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::Farm,
};

/// Drifts the display-only climate gauges. Never touches plots, pastures or herd.
pub struct ClimateSystem;

impl ClimateSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClimateSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ClimateSystem {
    fn name(&self) -> &str {
        "climate"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        farm: &mut Farm,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        farm.climate.drift(rng);
        Ok(())
    }
}
