use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::card::Card;

use super::hand_rank::{HandEvaluation, HandTier};
use super::lookup_tables::{detect_straight, grouped_ranks, mask_of, rank_counts, suit_index};

/// Правила оценки, которые отличаются между домашними играми.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EvalRules {
    /// Считать ли A2345 стритом (туз как единица).
    pub ace_low_straight: bool,
    /// Кикеры по группам (сначала ранг каре/сета/пары, затем остальные),
    /// как в классическом холдеме. По умолчанию кикеры: ранги всех пяти
    /// карт по убыванию.
    pub grouped_kickers: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Нет карт для оценки")]
    NoCards,

    #[error("Слишком много карт для оценки: {0} (максимум 7)")]
    TooManyCards(usize),

    #[error("Карта {0} встречается дважды")]
    DuplicateCard(Card),

    #[error("В колоде не хватает карт: нужно {needed}, осталось {available}")]
    NotEnoughCards { needed: usize, available: usize },
}

pub const MAX_CARDS: usize = 7;

/// Лучшая рука из переданных карт.
///
/// Для 5–7 карт перебираются все 5-карточные подмножества, выбирается
/// максимум по (категория, кикеры), кикеры считаются по `rules`. При меньше чем пяти картах (префлоп) учитываются только
/// пары/сеты/каре по кратности рангов.
pub fn evaluate_hand(cards: &[Card], rules: EvalRules) -> Result<HandEvaluation, EvalError> {
    check_cards(cards)?;

    if cards.len() < 5 {
        return Ok(evaluate_partial(cards, rules));
    }

    Ok(best_of_all_5card_combinations(cards, rules))
}

fn check_cards(cards: &[Card]) -> Result<(), EvalError> {
    if cards.is_empty() {
        return Err(EvalError::NoCards);
    }
    if cards.len() > MAX_CARDS {
        return Err(EvalError::TooManyCards(cards.len()));
    }
    for (i, card) in cards.iter().enumerate() {
        if cards[i + 1..].contains(card) {
            return Err(EvalError::DuplicateCard(*card));
        }
    }
    Ok(())
}

fn best_of_all_5card_combinations(cards: &[Card], rules: EvalRules) -> HandEvaluation {
    let n = cards.len();
    let mut best = evaluate_five(&[cards[0], cards[1], cards[2], cards[3], cards[4]], rules);

    for a in 0..(n - 4) {
        for b in (a + 1)..(n - 3) {
            for c in (b + 1)..(n - 2) {
                for d in (c + 1)..(n - 1) {
                    for e in (d + 1)..n {
                        let candidate =
                            evaluate_five(&[cards[a], cards[b], cards[c], cards[d], cards[e]], rules);
                        if (candidate.tier, &candidate.kickers) > (best.tier, &best.kickers) {
                            best = candidate;
                        }
                    }
                }
            }
        }
    }

    best
}

/// Оценка строго 5-карточной комбинации.
fn evaluate_five(cards: &[Card; 5], rules: EvalRules) -> HandEvaluation {
    let mut suit_counts = [0u8; 4];
    for card in cards {
        suit_counts[suit_index(card.suit)] += 1;
    }
    let is_flush = suit_counts.contains(&5);

    let counts = rank_counts(cards);
    let groups = grouped_ranks(&counts);
    let straight_high = if groups.len() == 5 {
        detect_straight(mask_of(cards), rules.ace_low_straight)
    } else {
        None
    };

    if let Some(high) = straight_high {
        let tier = match (is_flush, high) {
            (true, 14) => HandTier::RoyalFlush,
            (true, _) => HandTier::StraightFlush,
            (false, _) => HandTier::Straight,
        };
        return HandEvaluation {
            tier,
            cards: order_straight(cards, high),
            kickers: straight_kickers(high),
        };
    }

    let pattern: Vec<u8> = groups.iter().map(|&(_, count)| count).collect();
    let tier = match pattern.as_slice() {
        [4, ..] => HandTier::FourOfAKind,
        [3, 2] => HandTier::FullHouse,
        _ if is_flush => HandTier::Flush,
        [3, ..] => HandTier::ThreeOfAKind,
        [2, 2, ..] => HandTier::TwoPair,
        [2, ..] => HandTier::OnePair,
        _ => HandTier::HighCard,
    };

    HandEvaluation {
        tier,
        cards: order_by_groups(cards, &counts),
        kickers: kickers_for(cards, &groups, rules),
    }
}

/// Оценка неполной руки (меньше пяти карт).
fn evaluate_partial(cards: &[Card], rules: EvalRules) -> HandEvaluation {
    let counts = rank_counts(cards);
    let groups = grouped_ranks(&counts);
    let pattern: Vec<u8> = groups.iter().map(|&(_, count)| count).collect();

    let tier = match pattern.as_slice() {
        [4, ..] => HandTier::FourOfAKind,
        [3, ..] => HandTier::ThreeOfAKind,
        [2, 2, ..] => HandTier::TwoPair,
        [2, ..] => HandTier::OnePair,
        _ => HandTier::HighCard,
    };

    HandEvaluation {
        tier,
        cards: order_by_groups(cards, &counts),
        kickers: kickers_for(cards, &groups, rules),
    }
}

/// Ключ внутри категории: ранги карт по убыванию (с повторами)
/// либо, при `grouped_kickers`, различные ранги по группам.
fn kickers_for(cards: &[Card], groups: &[(u8, u8)], rules: EvalRules) -> Vec<u8> {
    if rules.grouped_kickers {
        return groups.iter().map(|&(rank, _)| rank).collect();
    }
    let mut ranks: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    ranks
}

/// Кикеры стрита: пять рангов по убыванию, у колеса туз = 1.
fn straight_kickers(high: u8) -> Vec<u8> {
    if high == 5 {
        vec![5, 4, 3, 2, 1]
    } else {
        (0..5).map(|i| high - i).collect()
    }
}

fn order_straight(cards: &[Card; 5], high: u8) -> Vec<Card> {
    let mut ordered = cards.to_vec();
    ordered.sort_by(|a, b| b.rank.cmp(&a.rank));
    if high == 5 {
        // Туз в колесе идёт младшей картой.
        ordered.rotate_left(1);
    }
    ordered
}

fn order_by_groups(cards: &[Card], counts: &[u8; 15]) -> Vec<Card> {
    let mut ordered = cards.to_vec();
    ordered.sort_by(|a, b| {
        let ca = counts[a.rank.value() as usize];
        let cb = counts[b.rank.value() as usize];
        cb.cmp(&ca).then_with(|| b.rank.cmp(&a.rank))
    });
    ordered
}

