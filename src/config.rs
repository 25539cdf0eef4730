use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

use crate::parser::DetectorConfig;

pub const DEFAULT_DB_PATH: &str = "data/notebook.sqlite";

/// Runtime settings. Defaults, then `NOTEBOOK_*` environment variables,
/// e.g. `NOTEBOOK_DB_PATH` or `NOTEBOOK_DETECTOR__MIN_BLOCK_LINES`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: String,
    pub detector: DetectorConfig,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Environment::with_prefix("NOTEBOOK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn from_builder(env: Environment) -> Result<Self> {
        let defaults = DetectorConfig::default();
        Config::builder()
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("detector.min_block_lines", defaults.min_block_lines as i64)?
            .set_default("detector.complete_block_lines", defaults.complete_block_lines as i64)?
            .set_default("detector.good_quality_score", defaults.good_quality_score as i64)?
            .add_source(env)
            .build()
            .context("building settings")?
            .try_deserialize()
            .context("reading settings")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Environment::with_prefix("NOTEBOOK")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn defaults() {
        let settings = Settings::from_builder(env(&[])).unwrap();
        assert_eq!(settings.db_path, DEFAULT_DB_PATH);
        assert_eq!(settings.detector, DetectorConfig::default());
    }

    #[test]
    fn environment_overrides() {
        let settings = Settings::from_builder(env(&[
            ("NOTEBOOK_DB_PATH", "/tmp/recipes.sqlite"),
            ("NOTEBOOK_DETECTOR__MIN_BLOCK_LINES", "6"),
            ("NOTEBOOK_DETECTOR__GOOD_QUALITY_SCORE", "80"),
        ]))
        .unwrap();
        assert_eq!(settings.db_path, "/tmp/recipes.sqlite");
        assert_eq!(settings.detector.min_block_lines, 6);
        assert_eq!(settings.detector.complete_block_lines, 15);
        assert_eq!(settings.detector.good_quality_score, 80);
    }
}
