use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::card::Card;

/// Категория покерной руки, от 1 (старшая карта) до 10 (роял-флеш).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandTier {
    HighCard = 1,
    OnePair = 2,
    TwoPair = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

impl HandTier {
    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            HandTier::HighCard => "High card",
            HandTier::OnePair => "One pair",
            HandTier::TwoPair => "Two pair",
            HandTier::ThreeOfAKind => "Three of a kind",
            HandTier::Straight => "Straight",
            HandTier::Flush => "Flush",
            HandTier::FullHouse => "Full house",
            HandTier::FourOfAKind => "Four of a kind",
            HandTier::StraightFlush => "Straight flush",
            HandTier::RoyalFlush => "Royal flush",
        }
    }
}

impl fmt::Display for HandTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ключ сравнения рук: сначала категория, затем кикеры лексикографически.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HandStrength {
    pub tier: HandTier,
    pub kickers: Vec<u8>,
}

impl Ord for HandStrength {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then_with(|| self.kickers.cmp(&other.kickers))
    }
}

impl PartialOrd for HandStrength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Результат оценки руки.
///
/// `cards`: лучшие 5 карт (или все, если карт меньше пяти),
/// `kickers`: ранги для разрешения ничьих внутри категории.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandEvaluation {
    pub tier: HandTier,
    pub cards: Vec<Card>,
    pub kickers: Vec<u8>,
}

impl HandEvaluation {
    pub fn strength(&self) -> HandStrength {
        HandStrength {
            tier: self.tier,
            kickers: self.kickers.clone(),
        }
    }

    /// "Full house [Ah Ad Ac Kd Ks]".
    pub fn describe(&self) -> String {
        let cards: Vec<String> = self.cards.iter().map(ToString::to_string).collect();
        format!("{} [{}]", self.tier, cards.join(" "))
    }
}
