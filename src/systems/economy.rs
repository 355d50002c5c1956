use anyhow::Result;
use tracing::trace;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::Farm,
};

/// Medium cadence: tops the ledger up by its regeneration increment.
pub struct EconomySystem;

impl EconomySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EconomySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for EconomySystem {
    fn name(&self) -> &str {
        "economy"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        farm: &mut Farm,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let added = farm.ledger.regenerate();
        trace!(
            unit = ctx.time_unit,
            added,
            credits = farm.ledger.credits(),
            "credits regenerated"
        );
        Ok(())
    }
}
