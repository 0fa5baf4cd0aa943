use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::ledger::{ChipLedger, LedgerError};
use crate::domain::PlayerId;
use crate::engine::actions::ActionCounters;
use crate::eval::{evaluate_hand, EvalError, EvalRules, HandEvaluation};

/// Игрок за столом: стек, текущая ставка, карты и статистика.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Фишки, которые у игрока на руках.
    pub stack: ChipLedger,
    /// Ставка на текущей улице (ещё не ушла в банк).
    pub bet: ChipLedger,
    /// Карманные карты (0 или 2).
    pub hole_cards: Vec<Card>,
    pub folded: bool,
    /// Повышал ли игрок на текущей улице после последнего чужого рейза.
    pub has_raised: bool,
    /// Лучшая рука с учётом текущего борда.
    pub evaluation: Option<HandEvaluation>,
    /// Сколько раздач игрок закончил с ненулевым стеком.
    pub rounds_survived: u32,
    pub counters: ActionCounters,
    /// Стоимость стека при посадке за стол.
    pub starting_value: Chips,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, stack: ChipLedger) -> Self {
        let bet = stack.empty_like();
        let starting_value = stack.total_value();
        Self {
            id,
            name: name.into(),
            stack,
            bet,
            hole_cards: Vec::with_capacity(2),
            folded: false,
            has_raised: false,
            evaluation: None,
            rounds_survived: 0,
            counters: ActionCounters::default(),
            starting_value,
        }
    }

    /// Подготовка к новой раздаче. Стек и статистика сохраняются.
    pub fn reset(&mut self) {
        self.hole_cards.clear();
        self.folded = false;
        self.has_raised = false;
        self.evaluation = None;
    }

    pub fn receive_card(&mut self, card: Card) {
        self.hole_cards.push(card);
    }

    /// Пересчитать лучшую руку по карманным картам и борду.
    pub fn evaluate_hand(&mut self, community: &[Card], rules: EvalRules) -> Result<(), EvalError> {
        let mut cards = Vec::with_capacity(self.hole_cards.len() + community.len());
        cards.extend_from_slice(&self.hole_cards);
        cards.extend_from_slice(community);
        self.evaluation = Some(evaluate_hand(&cards, rules)?);
        Ok(())
    }

    /// Переложить фишки из стека в ставку.
    pub fn place_bet(&mut self, amount: &ChipLedger) -> Result<(), LedgerError> {
        self.bet.transfer(&mut self.stack, amount)
    }

    /// Весь стек в ставку. Возвращает добавленную сумму.
    pub fn push_all_in(&mut self) -> Result<Chips, LedgerError> {
        let everything = self.stack.clone();
        let value = everything.total_value();
        self.bet.absorb(everything)?;
        self.stack.reset();
        Ok(value)
    }

    pub fn stack_value(&self) -> Chips {
        self.stack.total_value()
    }

    pub fn bet_value(&self) -> Chips {
        self.bet.total_value()
    }

    /// Есть фишки в стеке.
    pub fn is_funded(&self) -> bool {
        !self.stack.is_empty()
    }

    /// В раздаче и без фишек в стеке.
    pub fn is_all_in(&self) -> bool {
        !self.folded && !self.hole_cards.is_empty() && self.stack.is_empty()
    }

    /// Участвует в текущей раздаче (получил карты и не сбросил).
    pub fn is_live(&self) -> bool {
        !self.folded && !self.hole_cards.is_empty()
    }
}
