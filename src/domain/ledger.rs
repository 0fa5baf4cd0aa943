//! Учёт фишек по номиналам.
//!
//! `ChipLedger` хранит количество фишек каждого номинала из набора стола.
//! Все мутирующие операции атомарны: либо состав меняется и стоимость
//! сохраняется, либо возвращается ошибка и леджер остаётся как был.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::chips::{ChipSet, Chips, Denomination};

/// Ошибки операций с фишками.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Неизвестный номинал фишки: {0}")]
    InvalidDenomination(Denomination),

    #[error("Недостаточно фишек номинала {denomination}: есть {held}, нужно {requested}")]
    InsufficientChips {
        denomination: Denomination,
        held: u64,
        requested: u64,
    },

    #[error("Недостаточно средств: есть {available}, запрошено {requested}")]
    InsufficientFunds { available: Chips, requested: Chips },

    #[error("Невозможно получить {target_count} фишек номинала {target} без изменения общей стоимости")]
    TradeInImpossible {
        target: Denomination,
        target_count: u64,
    },
}

/// Набор фишек: номинал -> количество.
///
/// Ключи карты задают множество известных номиналов (с нулевыми количествами тоже).
/// `Clone` даёт полностью независимую копию.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChipLedger {
    counts: BTreeMap<Denomination, u64>,
}

impl ChipLedger {
    /// Пустой леджер с номиналами набора.
    pub fn empty(chip_set: &ChipSet) -> Self {
        Self {
            counts: chip_set.ascending().map(|d| (d, 0)).collect(),
        }
    }

    /// Леджер из списка (номинал, количество).
    pub fn from_counts(
        chip_set: &ChipSet,
        counts: &[(Denomination, u64)],
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self::empty(chip_set);
        for &(denomination, count) in counts {
            ledger.add(denomination, count)?;
        }
        Ok(ledger)
    }

    /// Собрать сумму жадно от крупного номинала к мелкому.
    ///
    /// Остаток меньше минимального номинала округляется вверх одной мелкой фишкой.
    pub fn compose(chip_set: &ChipSet, value: Chips) -> Self {
        let mut ledger = Self::empty(chip_set);
        ledger.fill_greedy_rounding_up(value.0);
        ledger
    }

    /// Пустой леджер с тем же набором номиналов.
    pub fn empty_like(&self) -> Self {
        Self {
            counts: self.counts.keys().map(|&d| (d, 0)).collect(),
        }
    }

    /// Известные номиналы по возрастанию.
    pub fn denominations(&self) -> impl Iterator<Item = Denomination> + '_ {
        self.counts.keys().copied()
    }

    pub fn smallest_denomination(&self) -> Option<Denomination> {
        self.counts.keys().next().copied()
    }

    pub fn knows(&self, denomination: Denomination) -> bool {
        self.counts.contains_key(&denomination)
    }

    /// Количество фишек номинала (0 для неизвестного).
    pub fn count(&self, denomination: Denomination) -> u64 {
        self.counts.get(&denomination).copied().unwrap_or(0)
    }

    /// Ненулевые позиции (номинал, количество) по возрастанию.
    pub fn iter(&self) -> impl Iterator<Item = (Denomination, u64)> + '_ {
        self.counts
            .iter()
            .filter(|(_, &c)| c > 0)
            .map(|(&d, &c)| (d, c))
    }

    pub fn add(&mut self, denomination: Denomination, count: u64) -> Result<(), LedgerError> {
        let slot = self
            .counts
            .get_mut(&denomination)
            .ok_or(LedgerError::InvalidDenomination(denomination))?;
        *slot += count;
        Ok(())
    }

    pub fn remove(&mut self, denomination: Denomination, count: u64) -> Result<(), LedgerError> {
        let slot = self
            .counts
            .get_mut(&denomination)
            .ok_or(LedgerError::InvalidDenomination(denomination))?;
        if *slot < count {
            return Err(LedgerError::InsufficientChips {
                denomination,
                held: *slot,
                requested: count,
            });
        }
        *slot -= count;
        Ok(())
    }

    pub fn total_value(&self) -> Chips {
        Chips(self.counts.iter().map(|(&d, &c)| d * c).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|&c| c == 0)
    }

    /// Обнулить все количества (номиналы остаются).
    pub fn reset(&mut self) {
        for c in self.counts.values_mut() {
            *c = 0;
        }
    }

    /// Забрать все фишки, оставив леджер пустым.
    pub fn drain(&mut self) -> ChipLedger {
        let out = self.clone();
        self.reset();
        out
    }

    /// Добавить все фишки другого леджера поштучно по номиналам.
    pub fn absorb(&mut self, other: ChipLedger) -> Result<(), LedgerError> {
        if let Some((d, _)) = other.iter().find(|(d, _)| !self.knows(*d)) {
            return Err(LedgerError::InvalidDenomination(d));
        }
        for (d, c) in other.iter() {
            *self.counts.entry(d).or_insert(0) += c;
        }
        Ok(())
    }

    /// Разменять состав так, чтобы фишек `target` было не меньше
    /// `min(target_count, total_value / target)`.
    ///
    /// Сначала разбиваются старшие номиналы, затем собираются младшие.
    /// Общая стоимость не меняется; при ошибке леджер не тронут.
    pub fn trade_in(&mut self, target: Denomination, target_count: u64) -> Result<(), LedgerError> {
        if !self.knows(target) {
            return Err(LedgerError::InvalidDenomination(target));
        }

        let total = self.total_value().0;
        let goal = target_count.min(total / target);
        if self.count(target) >= goal {
            return Ok(());
        }

        let mut scratch = self.clone();
        scratch.break_down_into(target, goal);
        if scratch.count(target) < goal {
            scratch.combine_up_into(target, goal);
        }

        if scratch.count(target) < goal || scratch.total_value().0 != total {
            scratch = self
                .recomposed_around(target, goal)
                .ok_or(LedgerError::TradeInImpossible {
                    target,
                    target_count: goal,
                })?;
        }

        debug_assert_eq!(scratch.total_value().0, total);
        *self = scratch;
        Ok(())
    }

    /// Сколько фишек нужно добавить к `self`, чтобы сравняться с `other`.
    pub fn difference_to(&self, other: &ChipLedger) -> ChipLedger {
        let gap = other.total_value().saturating_sub(self.total_value());
        let mut result = self.empty_like();
        result.fill_greedy_rounding_up(gap.0);
        result
    }

    /// Переложить из `source` в `self` фишки на сумму `requested.total_value()`.
    ///
    /// Если у источника нет нужных номиналов, он сам разменивается.
    /// Обе стороны меняются только при успехе.
    pub fn transfer(
        &mut self,
        source: &mut ChipLedger,
        requested: &ChipLedger,
    ) -> Result<(), LedgerError> {
        let requested_value = requested.total_value();
        let available = source.total_value();
        if available < requested_value {
            return Err(LedgerError::InsufficientFunds {
                available,
                requested: requested_value,
            });
        }
        if requested_value.is_zero() {
            return Ok(());
        }

        let mut scratch = source.clone();
        let taken = match scratch.withdraw_exact(requested) {
            Ok(taken) => taken,
            Err(_) => {
                scratch = source.clone();
                scratch.withdraw_value(requested_value)?
            }
        };

        debug_assert_eq!(taken.total_value(), requested_value);
        self.absorb(taken)?;
        *source = scratch;
        Ok(())
    }

    /// Изъять фишки на точную сумму, при необходимости разбивая крупные.
    pub fn withdraw_value(&mut self, value: Chips) -> Result<ChipLedger, LedgerError> {
        let available = self.total_value();
        if available < value {
            return Err(LedgerError::InsufficientFunds {
                available,
                requested: value,
            });
        }

        let mut scratch = self.clone();
        let mut taken = self.empty_like();
        let mut remaining = value.0;

        loop {
            for (&d, count) in scratch.counts.iter_mut().rev() {
                let n = (*count).min(remaining / d);
                if n > 0 {
                    *count -= n;
                    *taken.counts.entry(d).or_insert(0) += n;
                    remaining -= n * d;
                }
            }

            if remaining == 0 {
                *self = scratch;
                return Ok(taken);
            }

            // После жадного прохода все оставшиеся фишки крупнее остатка:
            // разбиваем самую мелкую из них.
            let breakable = scratch
                .counts
                .iter()
                .find(|(&d, &c)| c > 0 && d > remaining)
                .map(|(&d, _)| d);

            let broke = match breakable {
                Some(d) => scratch.break_one_chip(d),
                None => false,
            };
            if !broke {
                let smallest = self.smallest_denomination().unwrap_or(1);
                return Err(LedgerError::TradeInImpossible {
                    target: smallest,
                    target_count: value.0 / smallest,
                });
            }
        }
    }

    /// Перевести всю стоимость в фишки минимального номинала.
    pub fn to_smallest_denomination(&mut self) -> Result<(), LedgerError> {
        let Some(smallest) = self.smallest_denomination() else {
            return Ok(());
        };
        let total = self.total_value().0;
        if total % smallest != 0 {
            return Err(LedgerError::TradeInImpossible {
                target: smallest,
                target_count: total / smallest,
            });
        }
        self.reset();
        self.counts.insert(smallest, total / smallest);
        Ok(())
    }

    /// Изъять ровно тот состав, что в `requested` (с разменом по номиналам).
    fn withdraw_exact(&mut self, requested: &ChipLedger) -> Result<ChipLedger, LedgerError> {
        let mut taken = self.empty_like();
        let wanted: Vec<(Denomination, u64)> = requested.iter().collect();

        for &(d, c) in wanted.iter().rev() {
            if !self.knows(d) {
                return Err(LedgerError::InvalidDenomination(d));
            }
            if self.count(d) < c {
                self.trade_in(d, c)?;
            }
            self.remove(d, c)?;
            taken.add(d, c)?;
        }

        Ok(taken)
    }

    /// Разбивать старшие номиналы в `target`, пока не наберётся `goal`.
    fn break_down_into(&mut self, target: Denomination, goal: u64) {
        let higher: Vec<Denomination> = self.counts.keys().copied().filter(|&d| d > target).collect();

        for h in higher {
            while self.count(target) < goal && self.count(h) > 0 {
                let per_chip = h / target;
                let change = h % target;

                let mut attempt = self.clone();
                if let Some(slot) = attempt.counts.get_mut(&h) {
                    *slot -= 1;
                }
                if let Some(slot) = attempt.counts.get_mut(&target) {
                    *slot += per_chip;
                }
                if !attempt.deposit_exact(change, target) {
                    break;
                }
                *self = attempt;
            }
            if self.count(target) >= goal {
                return;
            }
        }
    }

    /// Собрать младшие номиналы в фишки `target`.
    fn combine_up_into(&mut self, target: Denomination, goal: u64) {
        let lower_value: u64 = self
            .counts
            .iter()
            .filter(|(&d, _)| d < target)
            .map(|(&d, &c)| d * c)
            .sum();

        let missing = goal.saturating_sub(self.count(target));
        let made = missing.min(lower_value / target);
        if made == 0 {
            return;
        }

        let mut attempt = self.clone();
        for (&d, c) in attempt.counts.iter_mut() {
            if d < target {
                *c = 0;
            }
        }
        if let Some(slot) = attempt.counts.get_mut(&target) {
            *slot += made;
        }
        if attempt.deposit_exact(lower_value - made * target, target) {
            *self = attempt;
        }
    }

    /// Полная пересборка: `goal` фишек `target`, остальное жадно.
    fn recomposed_around(&self, target: Denomination, goal: u64) -> Option<ChipLedger> {
        let total = self.total_value().0;
        let rest = total.checked_sub(goal * target)?;

        let mut ledger = self.empty_like();
        ledger.counts.insert(target, goal);
        if ledger.deposit_exact(rest, Denomination::MAX) {
            Some(ledger)
        } else {
            None
        }
    }

    /// Разбить одну фишку номинала `d` на более мелкие.
    fn break_one_chip(&mut self, d: Denomination) -> bool {
        if self.count(d) == 0 {
            return false;
        }
        let mut attempt = self.clone();
        if let Some(slot) = attempt.counts.get_mut(&d) {
            *slot -= 1;
        }
        if !attempt.deposit_exact(d, d) {
            return false;
        }
        *self = attempt;
        true
    }

    /// Положить `value` жадно номиналами строго меньше `below`.
    /// Возвращает false (ничего не меняя), если точно собрать нельзя.
    fn deposit_exact(&mut self, value: u64, below: Denomination) -> bool {
        if value == 0 {
            return true;
        }

        let mut plan = Vec::new();
        let mut remaining = value;
        for &d in self.counts.keys().rev() {
            if d >= below {
                continue;
            }
            let n = remaining / d;
            if n > 0 {
                plan.push((d, n));
                remaining -= n * d;
            }
        }

        if remaining != 0 {
            return false;
        }
        for (d, n) in plan {
            *self.counts.entry(d).or_insert(0) += n;
        }
        true
    }

    fn fill_greedy_rounding_up(&mut self, value: u64) {
        let mut remaining = value;
        for (&d, c) in self.counts.iter_mut().rev() {
            let n = remaining / d;
            if n > 0 {
                *c += n;
                remaining -= n * d;
            }
        }

        if remaining > 0 {
            if let Some((&smallest, c)) = self.counts.iter_mut().next() {
                *c += remaining.div_ceil(smallest);
            }
        }
    }
}

impl fmt::Display for ChipLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(d, c)| format!("{d}x{c}")).collect();
        write!(f, "[{}] = {}", parts.join(", "), self.total_value())
    }
}
