//! Async service boundary for the allocation engine.
//!
//! [`EngineService`] holds the loaded configuration and runs calculations on
//! tokio's blocking pool, logging each request with a correlation id.

mod engine;
mod request;

pub use engine::EngineService;
pub use request::{CommitmentPoint, CostRequest, TimelineRequest};
