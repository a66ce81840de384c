use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::correct::CorrectionMap;
use crate::error::{PipelineError, Result};

/// Pipeline logging verbosity. NONE disables the crate's output entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    None,
}

/// The one column-label swap the survey data needs: yield and crop type
/// were entered under each other's headings.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnSwap {
    pub from: String,
    pub to: String,
}

/// Immutable pipeline configuration, loaded once from TOML and held by the
/// orchestrator for its lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Connection descriptor for the survey database.
    pub db_path: String,

    #[serde(default = "default_sql_query")]
    pub sql_query: String,

    pub columns_to_rename: ColumnSwap,

    #[serde(default)]
    pub values_to_rename: CorrectionMap,

    /// URL of the externally hosted weather-station mapping CSV.
    pub weather_mapping_csv: String,

    #[serde(default = "default_abs_column")]
    pub abs_column: String,

    #[serde(default = "default_category_column")]
    pub category_column: String,

    #[serde(default = "default_key_column")]
    pub key_column: String,

    /// Spurious index column carried over from the export, dropped last.
    #[serde(default = "default_drop_column")]
    pub drop_column: String,

    #[serde(default)]
    pub logging_level: LogLevel,
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: PipelineConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

fn default_sql_query() -> String {
    "SELECT * FROM geographic_features \
     LEFT JOIN weather_features USING (Field_ID) \
     LEFT JOIN soil_and_crop_features USING (Field_ID) \
     LEFT JOIN farm_management_features USING (Field_ID)"
        .to_string()
}

fn default_abs_column() -> String {
    "Elevation".to_string()
}

fn default_category_column() -> String {
    "Crop_type".to_string()
}

fn default_key_column() -> String {
    "Field_ID".to_string()
}

fn default_drop_column() -> String {
    "Unnamed: 0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            db_path = "sqlite: survey.db"
            weather_mapping_csv = "https://example.com/mapping.csv"
            columns_to_rename = { from = "Annual_yield", to = "Crop_type" }
            "#,
        )
        .unwrap();
        assert_eq!(config.abs_column, "Elevation");
        assert_eq!(config.key_column, "Field_ID");
        assert_eq!(config.drop_column, "Unnamed: 0");
        assert_eq!(config.logging_level, LogLevel::Info);
        assert!(config.sql_query.contains("geographic_features"));
    }

    #[test]
    fn corrections_and_level_parse() {
        let config: PipelineConfig = toml::from_str(
            r#"
            db_path = "survey.db"
            weather_mapping_csv = "https://example.com/mapping.csv"
            logging_level = "NONE"
            columns_to_rename = { from = "Annual_yield", to = "Crop_type" }

            [values_to_rename]
            cassaval = "cassava"
            wheatn = "wheat"
            "#,
        )
        .unwrap();
        assert_eq!(config.logging_level, LogLevel::None);
        assert_eq!(config.values_to_rename.get("cassaval"), Some("cassava"));
        assert_eq!(config.values_to_rename.get("maize"), None);
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        assert!(matches!(
            PipelineConfig::load("does-not-exist.toml").unwrap_err(),
            PipelineError::Config(_)
        ));
    }
}
