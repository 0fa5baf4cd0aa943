//! Симулятор Техасского Холдема для эволюционного отбора стратегий.
//!
//! - `domain` – фишки, номиналы, карты, колода, игроки, стол;
//! - `eval` – оценка комбинаций, ранжирование, эквити;
//! - `engine` – раздача: блайнды, торговля, сайд-поты, шоудаун, параллельные столы;
//! - `infra` – RNG, ID, конфиг, логирование.

pub mod domain;
pub mod engine;
pub mod eval;
pub mod infra;
