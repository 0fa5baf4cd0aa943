use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::table::SeatIndex;
use crate::domain::{HandId, PlayerId, TableId};
use crate::eval::HandEvaluation;

/// Улица раздачи. Переходы строго линейные.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Street {
    /// Следующая улица (Showdown остаётся Showdown).
    pub fn next(self) -> Street {
        match self {
            Street::Preflop => Street::Flop,
            Street::Flop => Street::Turn,
            Street::Turn => Street::River,
            Street::River | Street::Showdown => Street::Showdown,
        }
    }

    /// Сколько карт открывается на борд при входе на эту улицу.
    pub fn cards_to_deal(self) -> usize {
        match self {
            Street::Flop => 3,
            Street::Turn | Street::River => 1,
            Street::Preflop | Street::Showdown => 0,
        }
    }
}

/// Результат конкретного игрока в раздаче.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerHandResult {
    pub player_id: PlayerId,
    pub seat: SeatIndex,
    /// Лучшая рука (если игрок дошёл до шоудауна).
    pub evaluation: Option<HandEvaluation>,
    pub stack_before: Chips,
    pub stack_after: Chips,
    /// Сколько фишек получил из банков.
    pub won: Chips,
    pub folded: bool,
}

impl PlayerHandResult {
    /// Изменение стека за раздачу.
    pub fn net(&self) -> i64 {
        self.stack_after.0 as i64 - self.stack_before.0 as i64
    }

    pub fn is_winner(&self) -> bool {
        !self.won.is_zero()
    }
}

/// Краткое описание завершённой раздачи.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandSummary {
    pub hand_id: HandId,
    pub table_id: TableId,
    pub street_reached: Street,
    pub board: Vec<Card>,
    pub total_pot: Chips,
    /// Раздача закончилась без вскрытия (все, кроме одного, сбросили).
    pub uncontested: bool,
    pub results: Vec<PlayerHandResult>,
}

impl HandSummary {
    pub fn winners(&self) -> impl Iterator<Item = &PlayerHandResult> {
        self.results.iter().filter(|r| r.is_winner())
    }
}
