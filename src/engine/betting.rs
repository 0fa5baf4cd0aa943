use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::hand::Street;
use crate::domain::ledger::ChipLedger;
use crate::domain::SeatIndex;

/// Состояние раунда ставок (на конкретной улице).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BettingState {
    pub street: Street,
    /// Уровень, до которого должны дотянуться ставки (BB, bet, raise).
    pub amount_to_call: ChipLedger,
    /// Минимальный размер повышающей части рейза.
    pub min_raise: Chips,
    /// Seat последнего агрессора.
    pub last_aggressor: Option<SeatIndex>,
    /// Очередь ходящих на этой улице.
    pub to_act: VecDeque<SeatIndex>,
}

impl BettingState {
    pub fn new(street: Street, amount_to_call: ChipLedger, min_raise: Chips, to_act: Vec<SeatIndex>) -> Self {
        Self {
            street,
            amount_to_call,
            min_raise,
            last_aggressor: None,
            to_act: to_act.into(),
        }
    }

    pub fn call_level(&self) -> Chips {
        self.amount_to_call.total_value()
    }

    pub fn next_actor(&mut self) -> Option<SeatIndex> {
        self.to_act.pop_front()
    }

    /// Поставить игрока в конец очереди.
    pub fn requeue(&mut self, seat: SeatIndex) {
        self.to_act.push_back(seat);
    }

    /// После рейза: новый уровень, минимальный рейз не уменьшается,
    /// очередь заменяется на `reopened`.
    pub fn on_raise(&mut self, seat: SeatIndex, new_level: ChipLedger, raise_by: Chips, reopened: Vec<SeatIndex>) {
        self.amount_to_call = new_level;
        if raise_by > self.min_raise {
            self.min_raise = raise_by;
        }
        self.last_aggressor = Some(seat);
        self.to_act = reopened.into();
    }
}
