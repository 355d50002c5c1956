use anyhow::Result;
use rand::Rng;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::Farm,
};

const PLOT_HEALTH_DECAY: f64 = 0.5;
const PLOT_WATER_DECAY: f64 = 1.0;
const NDVI_JITTER: f64 = 0.01;
const GRAZED_PASTURE_DECAY: f64 = 0.5;
const IDLE_PASTURE_DECAY: f64 = 0.1;
const HERD_HEALTH_DECAY: f64 = 1.5;
const FEED_DECAY_PER_ANIMAL: f64 = 0.8;
const WATER_DECAY_PER_ANIMAL: f64 = 0.6;

/// Fast cadence: unconditional background erosion of every entity.
pub struct DecaySystem;

impl DecaySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DecaySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DecaySystem {
    fn name(&self) -> &str {
        "decay"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        farm: &mut Farm,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for plot in &mut farm.plots {
            plot.adjust_health(-PLOT_HEALTH_DECAY);
            plot.adjust_water(-PLOT_WATER_DECAY);
        }

        for pasture in &mut farm.pastures {
            let jitter: f64 = rng.gen_range(-NDVI_JITTER..=NDVI_JITTER);
            pasture.adjust_ndvi(jitter);
            let decay = if pasture.grazing_load() > 0 {
                GRAZED_PASTURE_DECAY
            } else {
                IDLE_PASTURE_DECAY
            };
            pasture.adjust_health(-decay);
        }

        let herd = &mut farm.herd;
        if herd.size() > 0 {
            let size = f64::from(herd.size());
            herd.adjust_health(-HERD_HEALTH_DECAY);
            herd.adjust_feed(-FEED_DECAY_PER_ANIMAL * size);
            herd.adjust_water(-WATER_DECAY_PER_ANIMAL * size);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        actions::{self, Action, HerdChange},
        config::SimulationConfig,
        rng::RngManager,
        world::{PastureId, PlotId},
    };

    fn run_once(farm: &mut Farm, rng: &mut RngManager) {
        let ctx = SystemContext { time_unit: 2 };
        DecaySystem::new()
            .run(&ctx, farm, &mut rng.stream("decay"))
            .unwrap();
    }

    #[test]
    fn plots_lose_health_and_water() {
        let mut farm = Farm::from_config(&SimulationConfig::default());
        let mut rng = RngManager::new(5);
        run_once(&mut farm, &mut rng);
        let plot = farm.plot(PlotId(0)).unwrap();
        assert_eq!(plot.health(), 49.5);
        assert_eq!(plot.water_level(), 49.0);
    }

    #[test]
    fn plot_decay_floors_at_zero() {
        let mut farm = Farm::from_config(&SimulationConfig::default());
        farm.plot_mut(PlotId(1)).unwrap().set_health(0.2);
        farm.plot_mut(PlotId(1)).unwrap().set_water_level(0.5);
        let mut rng = RngManager::new(5);
        run_once(&mut farm, &mut rng);
        let plot = farm.plot(PlotId(1)).unwrap();
        assert_eq!(plot.health(), 0.0);
        assert_eq!(plot.water_level(), 0.0);
    }

    #[test]
    fn grazed_pastures_decay_faster() {
        let mut farm = Farm::from_config(&SimulationConfig::default());
        actions::apply(&mut farm, Action::SelectPasture { pasture: PastureId(0) }).unwrap();
        actions::apply(
            &mut farm,
            Action::ResizeHerd {
                change: HerdChange::Add,
            },
        )
        .unwrap();
        let mut rng = RngManager::new(5);
        run_once(&mut farm, &mut rng);
        assert!((farm.pasture(PastureId(0)).unwrap().health() - 79.5).abs() < 1e-9);
        assert!((farm.pasture(PastureId(1)).unwrap().health() - 79.9).abs() < 1e-9);
    }

    #[test]
    fn ndvi_jitter_is_small_and_bounded() {
        let mut farm = Farm::from_config(&SimulationConfig::default());
        let mut rng = RngManager::new(11);
        let before: Vec<f64> = farm.pastures().iter().map(|p| p.ndvi()).collect();
        run_once(&mut farm, &mut rng);
        for (pasture, old) in farm.pastures().iter().zip(before) {
            assert!((pasture.ndvi() - old).abs() <= 0.01 + 1e-12);
        }
    }

    #[test]
    fn herd_decay_scales_with_size() {
        let mut farm = Farm::from_config(&SimulationConfig::default());
        for _ in 0..2 {
            farm.herd.grow();
        }
        let mut rng = RngManager::new(5);
        run_once(&mut farm, &mut rng);
        let herd = farm.herd();
        assert_eq!(herd.health(), 98.5);
        assert!((herd.feed_level() - 68.4).abs() < 1e-9);
        assert!((herd.water_availability() - 68.8).abs() < 1e-9);
    }
}
