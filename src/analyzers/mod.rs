//! AQI scoring and aggregation.
//!
//! Concentrations are mapped onto the 0–500 AQI scale by breakpoint
//! interpolation per pollutant, combined into a per-city composite (the
//! largest sub-index) and averaged into a state AQI. The threshold check
//! lives alongside but scores against its own table.

pub mod aggregate;
pub mod breakpoints;
pub mod subindex;
pub mod types;
pub mod utility;
