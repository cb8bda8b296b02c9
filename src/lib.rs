//! Allocation commitment and cost-accounting engine
//!
//! This crate turns staff allocations (a percentage of someone's time on a
//! project between two dates) into commitment timelines, and prices them
//! against dated salary bands projected across financial years.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
