mod climate;
mod decay;
mod economy;
mod weather;

pub use climate::ClimateSystem;
pub use decay::DecaySystem;
pub use economy::EconomySystem;
pub use weather::WeatherSystem;
