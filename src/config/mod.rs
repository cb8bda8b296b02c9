//! Configuration loading and management for the allocation engine.
//!
//! Engine settings (working days per year, financial year start, the
//! allocation window policy) and yearly pay scales are loaded from YAML
//! files. Every calculation receives its settings as an explicit argument.
//!
//! # Example
//!
//! ```no_run
//! use allocation_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Financial year starts in month {}", config.settings().financial_year_start_month);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{DEFAULT_WORKING_DAYS_PER_YEAR, EngineConfig, PayScale, PayScaleBook, ScalePoint};
