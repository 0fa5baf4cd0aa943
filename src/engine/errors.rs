use thiserror::Error;

use crate::domain::{Chips, ConfigError, DeckError, HandId, LedgerError};
use crate::eval::EvalError;

/// Ошибки движка покера.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Ошибка фишек: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Ошибка колоды: {0}")]
    Deck(#[from] DeckError),

    #[error("Ошибка оценки руки: {0}")]
    Eval(#[from] EvalError),

    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] ConfigError),

    #[error("Недостаточно игроков с фишками для раздачи")]
    NotEnoughPlayers,

    #[error("Раздача уже идёт")]
    HandAlreadyInProgress,

    #[error("Стратегий {strategies}, а игроков за столом {players}")]
    StrategyCountMismatch { players: usize, strategies: usize },

    #[error("Раздача {0} прервана")]
    HandAborted(HandId),

    #[error("Нарушен баланс фишек: было {before}, стало {after}")]
    ConservationViolated { before: Chips, after: Chips },

    #[error("Внутренняя ошибка: {0}")]
    Internal(&'static str),
}
