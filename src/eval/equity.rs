//! Оценка эквити: Монте-Карло против случайных рук и шанс улучшения
//! на следующей карте.

use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::deck::Deck;
use crate::engine::RandomSource;

use super::evaluator::{evaluate_hand, EvalError, EvalRules};

/// Доли выигрышей, ничьих и проигрышей (в сумме 1.0 при samples > 0).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Equity {
    pub win_rate: f64,
    pub tie_rate: f64,
    pub loss_rate: f64,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Win,
    Tie,
    Loss,
}

/// Монте-Карло: достраиваем борд и раздаём соперникам случайные руки
/// из оставшихся карт, `samples` раз.
pub fn monte_carlo_equity<R: RandomSource>(
    hole: &[Card],
    community: &[Card],
    num_opponents: usize,
    samples: u32,
    rules: EvalRules,
    rng: &mut R,
) -> Result<Equity, EvalError> {
    if community.len() > 5 {
        return Err(EvalError::TooManyCards(community.len()));
    }

    let mut known = Vec::with_capacity(hole.len() + community.len());
    known.extend_from_slice(hole);
    known.extend_from_slice(community);
    // Заодно проверка на дубли и размер.
    evaluate_hand(&known, rules)?;

    let mut deck = Deck::standard_52();
    deck.remove_cards(&known);

    let board_missing = 5 - community.len();
    let needed = board_missing + 2 * num_opponents;
    if needed > deck.len() {
        return Err(EvalError::NotEnoughCards {
            needed,
            available: deck.len(),
        });
    }

    if samples == 0 {
        return Ok(Equity::default());
    }

    let mut pool = deck.cards;
    let mut board: Vec<Card> = Vec::with_capacity(5);
    let mut hand: Vec<Card> = Vec::with_capacity(7);
    let (mut wins, mut ties, mut losses) = (0u32, 0u32, 0u32);

    for _ in 0..samples {
        rng.shuffle(&mut pool);
        let (board_fill, dealt) = pool.split_at(board_missing);

        board.clear();
        board.extend_from_slice(community);
        board.extend_from_slice(board_fill);

        hand.clear();
        hand.extend_from_slice(hole);
        hand.extend_from_slice(&board);
        let hero = evaluate_hand(&hand, rules)?.strength();

        let mut outcome = Outcome::Win;
        for opponent in dealt.chunks_exact(2).take(num_opponents) {
            hand.clear();
            hand.extend_from_slice(opponent);
            hand.extend_from_slice(&board);
            let villain = evaluate_hand(&hand, rules)?.strength();

            if villain > hero {
                outcome = Outcome::Loss;
                break;
            }
            if villain == hero {
                outcome = Outcome::Tie;
            }
        }

        match outcome {
            Outcome::Win => wins += 1,
            Outcome::Tie => ties += 1,
            Outcome::Loss => losses += 1,
        }
    }

    let total = samples as f64;
    Ok(Equity {
        win_rate: wins as f64 / total,
        tie_rate: ties as f64 / total,
        loss_rate: losses as f64 / total,
    })
}

/// Точная вероятность того, что следующая открытая карта повысит категорию руки.
///
/// Имеет смысл только на флопе и тёрне (3 или 4 карты борда), иначе `None`.
pub fn improvement_chance(
    hole: &[Card],
    community: &[Card],
    rules: EvalRules,
) -> Result<Option<f64>, EvalError> {
    if !(3..=4).contains(&community.len()) {
        return Ok(None);
    }

    let mut cards = Vec::with_capacity(hole.len() + community.len() + 1);
    cards.extend_from_slice(hole);
    cards.extend_from_slice(community);
    let current = evaluate_hand(&cards, rules)?.tier;

    let mut deck = Deck::standard_52();
    deck.remove_cards(&cards);
    if deck.is_empty() {
        return Ok(Some(0.0));
    }

    let mut improved = 0usize;
    for &next in &deck.cards {
        cards.push(next);
        if evaluate_hand(&cards, rules)?.tier > current {
            improved += 1;
        }
        cards.pop();
    }

    Ok(Some(improved as f64 / deck.len() as f64))
}
