use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::domain::table::{ConfigError, TableConfig};

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Не удалось прочитать файл конфига: {0}")]
    Io(#[from] std::io::Error),

    #[error("Некорректный JSON конфига: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Некорректный конфиг стола: {0}")]
    Invalid(#[from] ConfigError),
}

/// Разобрать конфиг стола из JSON. Отсутствующие поля берутся из `TableConfig::default()`,
/// результат проходит `validate()`.
pub fn parse_table_config_json(json: &str) -> Result<TableConfig, ConfigLoadError> {
    let config: TableConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

pub fn load_table_config_json(path: impl AsRef<Path>) -> Result<TableConfig, ConfigLoadError> {
    let raw = fs::read_to_string(path)?;
    parse_table_config_json(&raw)
}
