//! Граница между движком и стратегиями игроков.
//!
//! Движок спрашивает `DecisionMaker` только через неизменяемый
//! `DecisionContext`: стратегия видит стек, ставки и борд, но трогать
//! фишки не может.

use std::collections::VecDeque;

use crate::domain::{Card, ChipLedger, Chips, PlayerId, SeatIndex, Street};
use crate::engine::actions::Decision;
use crate::eval::{Equity, HandEvaluation, HandTier};

/// Всё, что игрок знает в момент решения.
#[derive(Clone, Debug)]
pub struct DecisionContext<'a> {
    pub player_id: PlayerId,
    pub seat: SeatIndex,
    pub dealer: SeatIndex,
    pub street: Street,
    pub hole_cards: &'a [Card],
    pub community: &'a [Card],
    pub stack: &'a ChipLedger,
    pub bet: &'a ChipLedger,
    /// Текущий уровень ставки на улице.
    pub amount_to_call: &'a ChipLedger,
    /// Сколько нужно доложить до колла.
    pub call_amount: Chips,
    pub min_raise: Chips,
    /// Банки плюс ставки текущей улицы.
    pub pot_total: Chips,
    /// call / (pot + call), 0 если колл бесплатный.
    pub pot_odds: f64,
    /// Свой стек к среднему стеку остальных.
    pub stack_ratio: f64,
    /// Место / количество мест.
    pub position: f64,
    pub can_check: bool,
    pub has_raised: bool,
    /// Кто последним повышал на этой улице.
    pub last_aggressor: Option<SeatIndex>,
    /// Несбросившие игроки, включая самого.
    pub active_players: usize,
    pub hand: Option<&'a HandEvaluation>,
    /// Монте-Карло против оставшихся соперников (если включено в конфиге).
    pub equity: Option<Equity>,
    /// Шанс улучшить руку следующей картой (флоп/тёрн, если включено).
    pub improvement_chance: Option<f64>,
}

impl DecisionContext<'_> {
    pub fn stack_value(&self) -> Chips {
        self.stack.total_value()
    }
}

/// Стратегия игрока. Вызывается синхронно на каждом ходе.
///
/// `decide` обязан вернуться: лимит времени проверяется по факту ответа,
/// зависшую стратегию движок не снимает.
pub trait DecisionMaker: Send {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Decision;
}

/// Всегда уравнивает (или чекает, если можно).
#[derive(Clone, Copy, Debug, Default)]
pub struct CallingStation;

impl DecisionMaker for CallingStation {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Decision {
        if ctx.can_check {
            Decision::Check
        } else {
            Decision::Call
        }
    }
}

/// Заранее заданная последовательность решений (для тестов и реплеев).
#[derive(Clone, Debug)]
pub struct ScriptedStrategy {
    script: VecDeque<Decision>,
    fallback: Decision,
}

impl ScriptedStrategy {
    /// Когда сценарий кончился, отвечает `Check`/`Call`.
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            script: decisions.into_iter().collect(),
            fallback: Decision::Call,
        }
    }

    pub fn with_fallback(mut self, fallback: Decision) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl DecisionMaker for ScriptedStrategy {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Decision {
        if let Some(next) = self.script.pop_front() {
            return next;
        }
        match self.fallback {
            Decision::Call if ctx.can_check => Decision::Check,
            other => other,
        }
    }
}

/// Пороговая стратегия по силе руки.
///
/// Сила берётся из Монте-Карло (win + tie/2), а без него грубо из категории руки.
#[derive(Clone, Copy, Debug)]
pub struct EquityThreshold {
    /// Ниже этого порога сбрасываем (если нельзя чекнуть).
    pub call_threshold: f64,
    /// Выше этого порога повышаем.
    pub raise_threshold: f64,
    /// Размер рейза в минимальных рейзах.
    pub raise_multiple: u64,
}

impl Default for EquityThreshold {
    fn default() -> Self {
        Self {
            call_threshold: 0.35,
            raise_threshold: 0.7,
            raise_multiple: 2,
        }
    }
}

impl EquityThreshold {
    fn strength(ctx: &DecisionContext<'_>) -> f64 {
        if let Some(eq) = ctx.equity {
            return eq.win_rate + eq.tie_rate / 2.0;
        }
        match ctx.hand.map(|h| h.tier) {
            None | Some(HandTier::HighCard) => 0.3,
            Some(HandTier::OnePair) => 0.5,
            Some(HandTier::TwoPair) => 0.65,
            Some(HandTier::ThreeOfAKind) => 0.75,
            Some(_) => 0.9,
        }
    }
}

impl DecisionMaker for EquityThreshold {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Decision {
        let strength = Self::strength(ctx);

        if strength >= self.raise_threshold && !ctx.has_raised {
            return Decision::Raise(Chips(ctx.min_raise.0 * self.raise_multiple.max(1)));
        }
        if ctx.can_check {
            return Decision::Check;
        }
        if strength >= self.call_threshold.max(ctx.pot_odds) {
            Decision::Call
        } else {
            Decision::Fold
        }
    }
}
