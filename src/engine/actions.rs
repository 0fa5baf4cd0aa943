use serde::{Deserialize, Serialize};

use crate::domain::{Chips, PlayerId, SeatIndex, Street};

/// Что игрок хочет сделать. Возвращается стратегией.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Decision {
    Fold,
    Check,
    Call,
    /// Повысить на указанную сумму сверх колла.
    Raise(Chips),
    /// То же, что Raise, но учитывается отдельно в статистике.
    Bluff(Chips),
    /// Весь стек.
    AllIn,
}

/// Почему игрок сбросил карты.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum FoldReason {
    /// Сам решил.
    Voluntary,
    /// Попросил check, когда нужно было доплатить.
    IllegalCheck,
    /// Не уложился в лимит времени на решение.
    Timeout,
}

/// Что движок реально применил после нормализации решения.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResolvedAction {
    Fold(FoldReason),
    Check,
    Call {
        added: Chips,
    },
    Raise {
        added: Chips,
        raise_by: Chips,
        bluff: bool,
    },
    /// `raise_by` = 0, если олл-ин не перекрыл текущую ставку.
    AllIn {
        added: Chips,
        raise_by: Chips,
    },
}

impl ResolvedAction {
    /// Открывает ли действие торговлю заново.
    pub fn is_aggressive(&self) -> bool {
        match self {
            ResolvedAction::Raise { .. } => true,
            ResolvedAction::AllIn { raise_by, .. } => !raise_by.is_zero(),
            _ => false,
        }
    }

    pub fn added(&self) -> Chips {
        match *self {
            ResolvedAction::Call { added }
            | ResolvedAction::Raise { added, .. }
            | ResolvedAction::AllIn { added, .. } => added,
            ResolvedAction::Fold(_) | ResolvedAction::Check => Chips::ZERO,
        }
    }
}

/// Конкретное действие игрока в раздаче.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerAction {
    pub player_id: PlayerId,
    pub seat: SeatIndex,
    pub street: Street,
    pub decision: Decision,
    pub resolved: ResolvedAction,
}

/// Счётчики действий игрока за всё время за столом.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionCounters {
    pub folds: u32,
    pub checks: u32,
    pub calls: u32,
    pub raises: u32,
    pub bluffs: u32,
    pub all_ins: u32,
    /// Фолды по таймауту (входят и в `folds`).
    pub timeouts: u32,
}

impl ActionCounters {
    pub fn record(&mut self, action: &ResolvedAction) {
        match action {
            ResolvedAction::Fold(reason) => {
                self.folds += 1;
                if *reason == FoldReason::Timeout {
                    self.timeouts += 1;
                }
            }
            ResolvedAction::Check => self.checks += 1,
            ResolvedAction::Call { .. } => self.calls += 1,
            ResolvedAction::Raise { bluff: true, .. } => self.bluffs += 1,
            ResolvedAction::Raise { bluff: false, .. } => self.raises += 1,
            ResolvedAction::AllIn { .. } => self.all_ins += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.folds + self.checks + self.calls + self.raises + self.bluffs + self.all_ins
    }
}
