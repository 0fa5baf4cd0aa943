use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::ledger::ChipLedger;
use crate::domain::PlayerId;
use crate::engine::hand_history::PotSnapshot;

/// Банк: фишки по номиналам и список тех, кто в него вносил.
///
/// Первый банк раздачи главный, остальные сайд-поты в порядке создания.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pot {
    pub chips: ChipLedger,
    /// В порядке первого взноса.
    pub contributors: Vec<PlayerId>,
}

impl Pot {
    pub fn new(chips: ChipLedger) -> Self {
        Self {
            chips,
            contributors: Vec::new(),
        }
    }

    pub fn total(&self) -> Chips {
        self.chips.total_value()
    }

    pub fn add_contributor(&mut self, player_id: PlayerId) {
        if !self.contributors.contains(&player_id) {
            self.contributors.push(player_id);
        }
    }

    pub fn is_contributor(&self, player_id: PlayerId) -> bool {
        self.contributors.contains(&player_id)
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    pub fn snapshot(&self) -> PotSnapshot {
        PotSnapshot {
            value: self.total(),
            contributors: self.contributors.clone(),
        }
    }
}

/// Сумма всех банков.
pub fn pots_total(pots: &[Pot]) -> Chips {
    pots.iter().map(Pot::total).sum()
}
