//! Multi-objective siting of waste processing facilities.
//!
//! Farms send their waste to facilities built at candidate sites. A site holds at most one
//! facility, either small or large, and the four objective components (transport, safety,
//! water quality, investment) are combined by a fixed weighted sum.

pub mod model;
pub mod nearest;
pub mod sets_and_parameters;

pub use model::{SitingModel, SitingResult, Variables};
pub use nearest::{nearest_facility, unit_square_big_m, NearestDistance};
pub use sets_and_parameters::{
    FacilityKind, FacilityType, FacilityTypes, Objectives, Parameters, Sets, Weights,
};
