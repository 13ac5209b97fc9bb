//! Projections module - balance forecasts, percentile bands and forecast accuracy.

mod account_lock;
mod forecast_accuracy;
mod projection_calculator;
mod projections_constants;
mod projections_model;
mod projections_service;
mod projections_traits;


pub use account_lock::{AccountLockGuard, AccountLocks};
pub use forecast_accuracy::ForecastAccuracyCalculator;
pub use projection_calculator::ProjectionCalculator;
pub use projections_constants::*;
pub use projections_model::{
    AccuracyRating, BandPoint, ForecastAccuracy, ForecastPeriod, NewProjection,
    NewProjectionAssumption, PercentileBands, Projection, ProjectionAssumption,
    ProjectionChartData, ProjectionPoint,
};
pub use projections_service::ProjectionService;
pub use projections_traits::{
    AssumptionRepositoryTrait, ProjectionRepositoryTrait, ProjectionServiceTrait,
};
