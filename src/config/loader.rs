//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! settings and pay scales from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, PayScale, PayScaleBook};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml          # Working days, financial year start, window policy
/// └── pay_scales/
///     ├── 2024.yaml        # Pay scale for the 2024 financial year
///     └── 2025.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use allocation_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Working days per year: {}", loader.settings().working_days_per_year);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    settings: EngineConfig,
    scales: PayScaleBook,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if `engine.yaml` or the `pay_scales` directory is
    /// missing, if any file contains invalid YAML, or if the settings fail
    /// validation.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine_path = path.join("engine.yaml");
        let settings = Self::load_yaml::<EngineConfig>(&engine_path)?;
        settings
            .validate()
            .map_err(|e| EngineError::ConfigParseError {
                path: engine_path.display().to_string(),
                message: e.to_string(),
            })?;

        let scales = Self::load_scales(&path.join("pay_scales"))?;

        Ok(Self::from_parts(settings, scales))
    }

    /// Builds a loader from settings and scales already in memory.
    pub fn from_parts(settings: EngineConfig, scales: Vec<PayScale>) -> Self {
        Self {
            settings,
            scales: PayScaleBook::new(scales),
        }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every pay scale file from the scales directory.
    fn load_scales(scales_dir: &Path) -> EngineResult<Vec<PayScale>> {
        let scales_dir_str = scales_dir.display().to_string();

        let entries = fs::read_dir(scales_dir).map_err(|_| EngineError::ConfigNotFound {
            path: scales_dir_str.clone(),
        })?;

        let mut scales = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: scales_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                scales.push(Self::load_yaml::<PayScale>(&path)?);
            }
        }

        Ok(scales)
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineConfig {
        &self.settings
    }

    /// Returns the loaded pay scales.
    pub fn scales(&self) -> &PayScaleBook {
        &self.scales
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/default"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.settings().working_days_per_year, dec("261"));
        assert_eq!(loader.settings().financial_year_start_month, 8);
        assert!(loader.settings().strict_allocation_window);
    }

    #[test]
    fn test_pay_scales_loaded_for_each_year() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let years: Vec<i32> = loader.scales().years().collect();
        assert_eq!(years, vec![2024, 2025]);
    }

    #[test]
    fn test_pay_scale_point_loaded_correctly() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let point = loader.scales().lookup(2024, 7, 1).unwrap();
        assert_eq!(point.annual_salary, dec("36500"));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("engine.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_from_parts_without_scales() {
        let loader = ConfigLoader::from_parts(EngineConfig::default(), Vec::new());
        assert!(loader.scales().is_empty());
    }
}
