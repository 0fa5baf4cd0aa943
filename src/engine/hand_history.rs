use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::hand::Street;
use crate::domain::{HandId, PlayerId, SeatIndex, TableId};
use crate::engine::actions::{Decision, PlayerAction, ResolvedAction};
use crate::eval::HandEvaluation;

/// Снимок банка после разбора ставок улицы.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PotSnapshot {
    pub value: Chips,
    pub contributors: Vec<PlayerId>,
}

/// Тип события в раздаче.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum HandEventKind {
    HandStarted {
        table_id: TableId,
        hand_id: HandId,
        dealer: SeatIndex,
        /// (игрок, стек) всех, кому раздали карты.
        stacks: Vec<(PlayerId, Chips)>,
    },

    BlindPosted {
        seat: SeatIndex,
        player_id: PlayerId,
        amount: Chips,
        big: bool,
        all_in: bool,
    },

    HoleCardsDealt {
        seat: SeatIndex,
        player_id: PlayerId,
        cards: Vec<Card>,
    },

    /// Открыты общие карты (после сжигания одной).
    StreetDealt {
        street: Street,
        cards: Vec<Card>,
    },

    ActionTaken {
        player_id: PlayerId,
        seat: SeatIndex,
        street: Street,
        decision: Decision,
        resolved: ResolvedAction,
        stack_after: Chips,
        bet_after: Chips,
    },

    /// Ставки улицы разложены по банкам.
    PotsResolved {
        street: Street,
        pots: Vec<PotSnapshot>,
    },

    ShowdownReveal {
        seat: SeatIndex,
        player_id: PlayerId,
        hole_cards: Vec<Card>,
        evaluation: HandEvaluation,
    },

    PayoutMade {
        pot_index: usize,
        seat: SeatIndex,
        player_id: PlayerId,
        amount: Chips,
    },

    HandFinished {
        hand_id: HandId,
        table_id: TableId,
        uncontested: bool,
    },

    /// Раздача отменена, стеки восстановлены.
    HandAborted {
        hand_id: HandId,
        reason: String,
    },
}

/// Событие в раздаче с порядковым номером.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HandEvent {
    pub hand_id: HandId,
    pub index: u32,
    pub kind: HandEventKind,
}

/// Подписчик на события раздачи. Вызывается синхронно из движка.
pub trait HandObserver {
    fn on_event(&mut self, event: &HandEvent);
}

/// Наблюдатель, который ничего не делает.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl HandObserver for NullObserver {
    fn on_event(&mut self, _event: &HandEvent) {}
}

/// Полная история раздачи (или нескольких, если использовать как наблюдателя).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct HandHistory {
    pub events: Vec<HandEvent>,
}

impl HandHistory {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Добавить событие и вернуть ссылку на него.
    pub fn push(&mut self, hand_id: HandId, kind: HandEventKind) -> &HandEvent {
        let index = self.events.len() as u32;
        self.events.push(HandEvent {
            hand_id,
            index,
            kind,
        });
        &self.events[self.events.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Все действия игроков по порядку.
    pub fn actions(&self) -> impl Iterator<Item = PlayerAction> + '_ {
        self.events.iter().filter_map(|e| match e.kind {
            HandEventKind::ActionTaken {
                player_id,
                seat,
                street,
                decision,
                resolved,
                ..
            } => Some(PlayerAction {
                player_id,
                seat,
                street,
                decision,
                resolved,
            }),
            _ => None,
        })
    }

    /// Сумма выплат игроку.
    pub fn paid_to(&self, player: PlayerId) -> Chips {
        self.events
            .iter()
            .filter_map(|e| match &e.kind {
                HandEventKind::PayoutMade {
                    player_id, amount, ..
                } if *player_id == player => Some(*amount),
                _ => None,
            })
            .sum()
    }
}

impl HandObserver for HandHistory {
    fn on_event(&mut self, event: &HandEvent) {
        self.events.push(event.clone());
    }
}
