pub mod analyzers;
pub mod chart;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod server;
pub mod table;

pub use analyzers::aggregate::Aggregator;
pub use analyzers::breakpoints::ScoringTables;
pub use error::{AqiError, Scope};
pub use table::{Measurement, MeasurementTable};
