//! Report routes

pub mod precipitation;
pub mod stations;
pub mod temperature;
pub mod tobs;
