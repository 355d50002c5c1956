//! Player actions: validation and application against the farm.
//!
//! Every action is checked in full before anything is touched, so a rejected
//! action leaves plots, pastures, herd and credits exactly as they were.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{Farm, PastureId, PlotId};

pub const IRRIGATE_COST: u32 = 10;
pub const FERTILIZE_COST: u32 = 15;
pub const ADD_ANIMAL_COST: u32 = 50;
pub const FEED_COST: u32 = 15;
pub const WATER_COST: u32 = 10;

const IRRIGATE_WATER: f64 = 30.0;
const IRRIGATE_HEALTH: f64 = 10.0;
const FERTILIZE_HEALTH: f64 = 20.0;
const FEED_AMOUNT: f64 = 40.0;
const FEED_HEALTH: f64 = 10.0;
const WATER_AMOUNT: f64 = 30.0;
const WATER_HEALTH: f64 = 5.0;
const GAUGE_FULL: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HerdChange {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Applies to the selected plot.
    Irrigate,
    /// Applies to the selected plot.
    Fertilize,
    ResizeHerd { change: HerdChange },
    Feed,
    Water,
    SelectPlot { plot: PlotId },
    SelectPasture { pasture: PastureId },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Irrigate => "irrigate",
            Action::Fertilize => "fertilize",
            Action::ResizeHerd {
                change: HerdChange::Add,
            } => "add_animal",
            Action::ResizeHerd {
                change: HerdChange::Remove,
            } => "remove_animal",
            Action::Feed => "feed",
            Action::Water => "water",
            Action::SelectPlot { .. } => "select_plot",
            Action::SelectPasture { .. } => "select_pasture",
        }
    }

    pub fn cost(&self) -> u32 {
        match self {
            Action::Irrigate => IRRIGATE_COST,
            Action::Fertilize => FERTILIZE_COST,
            Action::ResizeHerd {
                change: HerdChange::Add,
            } => ADD_ANIMAL_COST,
            Action::Feed => FEED_COST,
            Action::Water => WATER_COST,
            Action::ResizeHerd {
                change: HerdChange::Remove,
            }
            | Action::SelectPlot { .. }
            | Action::SelectPasture { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gauge {
    Feed,
    Water,
}

impl std::fmt::Display for Gauge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gauge::Feed => f.write_str("feed level"),
            Gauge::Water => f.write_str("water supply"),
        }
    }
}

/// A recoverable rejection. Nothing was mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please select a plot first")]
    NoPlotSelected,
    #[error("not enough credits: need {cost}, have {available}")]
    InsufficientCredits { cost: u32, available: u32 },
    #[error("{gauge} is already full")]
    AlreadyAtCap { gauge: Gauge },
    #[error("the herd has no animals to remove")]
    EmptyHerd,
}

/// The caller referenced an entity outside the fixed identity space.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{0} does not exist")]
    UnknownPlot(PlotId),
    #[error("{0} does not exist")]
    UnknownPasture(PastureId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] InvariantViolation),
}

impl ActionError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ActionError::Validation(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReceipt {
    pub action: Action,
    pub cost: u32,
    pub credits_remaining: u32,
}

pub fn apply(farm: &mut Farm, action: Action) -> Result<ActionReceipt, ActionError> {
    match action {
        Action::Irrigate => irrigate(farm)?,
        Action::Fertilize => fertilize(farm)?,
        Action::ResizeHerd {
            change: HerdChange::Add,
        } => add_animal(farm)?,
        Action::ResizeHerd {
            change: HerdChange::Remove,
        } => remove_animal(farm)?,
        Action::Feed => feed(farm)?,
        Action::Water => water(farm)?,
        Action::SelectPlot { plot } => select_plot(farm, plot)?,
        Action::SelectPasture { pasture } => select_pasture(farm, pasture)?,
    }
    Ok(ActionReceipt {
        action,
        cost: action.cost(),
        credits_remaining: farm.ledger.credits(),
    })
}

fn ensure_affordable(farm: &Farm, cost: u32) -> Result<(), ValidationError> {
    if farm.ledger.can_afford(cost) {
        Ok(())
    } else {
        Err(ValidationError::InsufficientCredits {
            cost,
            available: farm.ledger.credits(),
        })
    }
}

fn selected_plot(farm: &Farm) -> Result<PlotId, ActionError> {
    let id = farm.selection.plot.ok_or(ValidationError::NoPlotSelected)?;
    if farm.plot(id).is_none() {
        return Err(InvariantViolation::UnknownPlot(id).into());
    }
    Ok(id)
}

fn selected_pasture(farm: &Farm) -> Result<Option<PastureId>, InvariantViolation> {
    match farm.selection.pasture {
        Some(id) if farm.pasture(id).is_none() => Err(InvariantViolation::UnknownPasture(id)),
        selected => Ok(selected),
    }
}

fn irrigate(farm: &mut Farm) -> Result<(), ActionError> {
    let id = selected_plot(farm)?;
    ensure_affordable(farm, IRRIGATE_COST)?;
    farm.ledger.debit(IRRIGATE_COST);
    if let Some(plot) = farm.plot_mut(id) {
        plot.adjust_water(IRRIGATE_WATER);
        plot.adjust_health(IRRIGATE_HEALTH);
    }
    Ok(())
}

fn fertilize(farm: &mut Farm) -> Result<(), ActionError> {
    let id = selected_plot(farm)?;
    ensure_affordable(farm, FERTILIZE_COST)?;
    farm.ledger.debit(FERTILIZE_COST);
    if let Some(plot) = farm.plot_mut(id) {
        plot.mark_fertilized();
        plot.adjust_health(FERTILIZE_HEALTH);
    }
    Ok(())
}

fn add_animal(farm: &mut Farm) -> Result<(), ActionError> {
    ensure_affordable(farm, ADD_ANIMAL_COST)?;
    let pasture = selected_pasture(farm)?;
    farm.ledger.debit(ADD_ANIMAL_COST);
    farm.herd.grow();
    if let Some(pasture) = pasture.and_then(|id| farm.pasture_mut(id)) {
        pasture.add_animal();
    }
    Ok(())
}

fn remove_animal(farm: &mut Farm) -> Result<(), ActionError> {
    if farm.herd.size() == 0 {
        return Err(ValidationError::EmptyHerd.into());
    }
    let pasture = selected_pasture(farm)?;
    farm.herd.shrink();
    if let Some(pasture) = pasture.and_then(|id| farm.pasture_mut(id)) {
        pasture.remove_animal();
    }
    // Animals grazing elsewhere may now outnumber the herd.
    if farm.total_grazing_load() > farm.herd.size() {
        if let Some(pasture) = farm
            .pastures
            .iter_mut()
            .find(|pasture| pasture.grazing_load() > 0)
        {
            pasture.remove_animal();
        }
    }
    Ok(())
}

fn feed(farm: &mut Farm) -> Result<(), ActionError> {
    ensure_affordable(farm, FEED_COST)?;
    if farm.herd.feed_level() >= GAUGE_FULL {
        return Err(ValidationError::AlreadyAtCap { gauge: Gauge::Feed }.into());
    }
    farm.ledger.debit(FEED_COST);
    farm.herd.adjust_feed(FEED_AMOUNT);
    farm.herd.adjust_health(FEED_HEALTH);
    Ok(())
}

fn water(farm: &mut Farm) -> Result<(), ActionError> {
    ensure_affordable(farm, WATER_COST)?;
    if farm.herd.water_availability() >= GAUGE_FULL {
        return Err(ValidationError::AlreadyAtCap {
            gauge: Gauge::Water,
        }
        .into());
    }
    farm.ledger.debit(WATER_COST);
    farm.herd.adjust_water(WATER_AMOUNT);
    farm.herd.adjust_health(WATER_HEALTH);
    Ok(())
}

fn select_plot(farm: &mut Farm, id: PlotId) -> Result<(), InvariantViolation> {
    if farm.plot(id).is_none() {
        return Err(InvariantViolation::UnknownPlot(id));
    }
    farm.selection.plot = Some(id);
    Ok(())
}

fn select_pasture(farm: &mut Farm, id: PastureId) -> Result<(), InvariantViolation> {
    if farm.pasture(id).is_none() {
        return Err(InvariantViolation::UnknownPasture(id));
    }
    farm.selection.pasture = Some(id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    fn farm() -> Farm {
        Farm::from_config(&SimulationConfig::default())
    }

    fn add() -> Action {
        Action::ResizeHerd {
            change: HerdChange::Add,
        }
    }

    fn remove() -> Action {
        Action::ResizeHerd {
            change: HerdChange::Remove,
        }
    }

    #[test]
    fn irrigate_without_selection_is_rejected() {
        let mut farm = farm();
        let err = apply(&mut farm, Action::Irrigate).unwrap_err();
        assert_eq!(err, ActionError::Validation(ValidationError::NoPlotSelected));
        assert_eq!(farm.ledger().credits(), 100);
    }

    #[test]
    fn irrigate_selected_plot() {
        let mut farm = farm();
        apply(&mut farm, Action::SelectPlot { plot: PlotId(3) }).unwrap();
        let receipt = apply(&mut farm, Action::Irrigate).unwrap();
        assert_eq!(receipt.cost, 10);
        assert_eq!(receipt.credits_remaining, 90);
        let plot = farm.plot(PlotId(3)).unwrap();
        assert_eq!(plot.water_level(), 80.0);
        assert_eq!(plot.health(), 60.0);
        assert_eq!(farm.plot(PlotId(2)).unwrap().water_level(), 50.0);
    }

    #[test]
    fn fertilize_marks_plot_and_caps_health() {
        let mut farm = farm();
        apply(&mut farm, Action::SelectPlot { plot: PlotId(0) }).unwrap();
        farm.plot_mut(PlotId(0)).unwrap().set_health(90.0);
        apply(&mut farm, Action::Fertilize).unwrap();
        let plot = farm.plot(PlotId(0)).unwrap();
        assert!(plot.is_fertilized());
        assert_eq!(plot.health(), 100.0);
        assert_eq!(farm.ledger().credits(), 85);
    }

    #[test]
    fn plot_actions_need_credits() {
        let mut farm = farm();
        apply(&mut farm, Action::SelectPlot { plot: PlotId(0) }).unwrap();
        farm.ledger_mut().set_credits(12);
        let err = apply(&mut farm, Action::Fertilize).unwrap_err();
        assert_eq!(
            err,
            ActionError::Validation(ValidationError::InsufficientCredits {
                cost: 15,
                available: 12
            })
        );
        assert!(!farm.plot(PlotId(0)).unwrap().is_fertilized());
    }

    #[test]
    fn selection_replaces_previous_choice() {
        let mut farm = farm();
        apply(&mut farm, Action::SelectPlot { plot: PlotId(1) }).unwrap();
        apply(&mut farm, Action::SelectPlot { plot: PlotId(7) }).unwrap();
        apply(&mut farm, Action::SelectPasture { pasture: PastureId(2) }).unwrap();
        assert_eq!(farm.selection().plot, Some(PlotId(7)));
        assert_eq!(farm.selection().pasture, Some(PastureId(2)));
    }

    #[test]
    fn unknown_ids_are_invariant_violations() {
        let mut farm = farm();
        let err = apply(&mut farm, Action::SelectPlot { plot: PlotId(12) }).unwrap_err();
        assert_eq!(
            err,
            ActionError::InvariantViolation(InvariantViolation::UnknownPlot(PlotId(12)))
        );
        assert!(!err.is_validation());
        let err = apply(
            &mut farm,
            Action::SelectPasture {
                pasture: PastureId(40),
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ActionError::InvariantViolation(InvariantViolation::UnknownPasture(_))
        ));
        assert_eq!(farm.selection().plot, None);
    }

    #[test]
    fn adding_animal_assigns_to_selected_pasture() {
        let mut farm = farm();
        apply(&mut farm, Action::SelectPasture { pasture: PastureId(4) }).unwrap();
        apply(&mut farm, add()).unwrap();
        assert_eq!(farm.herd().size(), 1);
        assert_eq!(farm.pasture(PastureId(4)).unwrap().grazing_load(), 1);
        assert_eq!(farm.ledger().credits(), 50);
    }

    #[test]
    fn adding_animal_without_pasture_only_grows_herd() {
        let mut farm = farm();
        apply(&mut farm, add()).unwrap();
        assert_eq!(farm.herd().size(), 1);
        assert_eq!(farm.total_grazing_load(), 0);
    }

    #[test]
    fn removing_from_empty_herd_is_rejected() {
        let mut farm = farm();
        let err = apply(&mut farm, remove()).unwrap_err();
        assert_eq!(err, ActionError::Validation(ValidationError::EmptyHerd));
    }

    #[test]
    fn removal_keeps_grazing_within_herd() {
        let mut farm = farm();
        farm.ledger_mut().set_credits(200);
        apply(&mut farm, Action::SelectPasture { pasture: PastureId(0) }).unwrap();
        apply(&mut farm, add()).unwrap();
        apply(&mut farm, add()).unwrap();
        apply(&mut farm, Action::SelectPasture { pasture: PastureId(5) }).unwrap();
        apply(&mut farm, remove()).unwrap();
        assert_eq!(farm.herd().size(), 1);
        assert_eq!(farm.pasture(PastureId(0)).unwrap().grazing_load(), 1);
        assert!(farm.total_grazing_load() <= farm.herd().size());
    }

    #[test]
    fn removing_is_free() {
        let mut farm = farm();
        apply(&mut farm, add()).unwrap();
        let receipt = apply(&mut farm, remove()).unwrap();
        assert_eq!(receipt.cost, 0);
        assert_eq!(farm.ledger().credits(), 50);
        assert_eq!(farm.herd().size(), 0);
    }

    #[test]
    fn feed_rejected_when_full() {
        let mut farm = farm();
        farm.herd_mut().set_feed_level(100.0);
        let err = apply(&mut farm, Action::Feed).unwrap_err();
        assert_eq!(
            err,
            ActionError::Validation(ValidationError::AlreadyAtCap { gauge: Gauge::Feed })
        );
        assert_eq!(farm.ledger().credits(), 100);
    }

    #[test]
    fn water_rejected_when_full() {
        let mut farm = farm();
        farm.herd_mut().set_water_availability(100.0);
        farm.herd_mut().set_health(40.0);
        let err = apply(&mut farm, Action::Water).unwrap_err();
        assert_eq!(
            err,
            ActionError::Validation(ValidationError::AlreadyAtCap {
                gauge: Gauge::Water
            })
        );
        assert_eq!(farm.herd().health(), 40.0);
        assert_eq!(farm.ledger().credits(), 100);
    }

    #[test]
    fn water_raises_supply_and_health() {
        let mut farm = farm();
        farm.herd_mut().set_health(50.0);
        apply(&mut farm, Action::Water).unwrap();
        assert_eq!(farm.herd().water_availability(), 100.0);
        assert_eq!(farm.herd().health(), 55.0);
        assert_eq!(farm.ledger().credits(), 90);
    }

    #[test]
    fn water_rejected_without_credits() {
        let mut farm = farm();
        farm.ledger_mut().set_credits(9);
        let err = apply(&mut farm, Action::Water).unwrap_err();
        assert!(matches!(
            err,
            ActionError::Validation(ValidationError::InsufficientCredits { cost: 10, .. })
        ));
        assert_eq!(farm.herd().water_availability(), 70.0);
    }

    #[test]
    fn actions_deserialize_from_tagged_json() {
        let action: Action = serde_json::from_str(r#"{"type":"selectPlot","plot":4}"#).unwrap();
        assert_eq!(action, Action::SelectPlot { plot: PlotId(4) });
        let action: Action =
            serde_json::from_str(r#"{"type":"resizeHerd","change":"remove"}"#).unwrap();
        assert_eq!(action, remove());
    }
}
