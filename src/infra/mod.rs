//! Инфраструктурный слой вокруг покерного движка:
//! - генерация ID;
//! - RNG-реализации для движка;
//! - загрузка конфига стола и логирование.

pub mod config;
pub mod ids;
pub mod logging;
pub mod rng;

pub use config::{load_table_config_json, parse_table_config_json, ConfigLoadError};
pub use ids::IdGenerator;
pub use logging::{init_logging, TracingObserver};
pub use rng::{DeterministicRng, SystemRng};
