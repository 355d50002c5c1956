pub mod actions;
pub mod config;
pub mod engine;
pub mod ledger;
pub mod metrics;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod systems;
pub mod weather;
pub mod web;
pub mod world;

pub use actions::{Action, ActionError, HerdChange, InvariantViolation, ValidationError};
pub use config::SimulationConfig;
pub use engine::{Engine, EngineError, TickSummary};
pub use session::Session;
pub use snapshot::FarmSnapshot;
