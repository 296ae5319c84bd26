//! Food-surplus decision and simulation engine
//! Forecast demand, price the ways of handling expected surplus and pick an
//! action, then replay the loop over simulated days against a fixed-production
//! baseline.

pub mod baseline;
pub mod cascade;
pub mod config;
pub mod controller;
pub mod decision;
pub mod demand;
pub mod error;
pub mod forecast;
pub mod inventory;
pub mod models;
pub mod recommendations;
pub mod reporting;
pub mod simulation;
pub mod spoilage;
pub mod weather;

pub use config::EngineConfig;
pub use decision::{make_decision, Action, Decision, DecisionInputs, ShelterState};
pub use error::{Collaborator, Result, SimError};
pub use forecast::{DemandForecaster, HistoricalForecaster, StaticForecaster, SubprocessForecaster};
pub use inventory::Inventory;
pub use models::{DayRecord, DemandForecast, ForecastRequest, MetricsSnapshot, PredictResult, SimulationRun};
pub use simulation::Simulator;
pub use weather::{FixedWeather, SimulatedWeather, WeatherSource};
