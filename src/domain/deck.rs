use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::card::{Card, Rank, Suit};
use crate::engine::RandomSource;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeckError {
    #[error("Колода пуста")]
    EmptyDeck,
}

/// Колода карт. Карты берутся с конца `cards` и обратно не возвращаются.
/// Источник случайности приходит снаружи (`RandomSource`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    pub cards: Vec<Card>,
    /// Сожжённые карты текущей раздачи.
    pub burned: Vec<Card>,
}

impl Deck {
    /// Стандартная 52-карточная колода в порядке:
    /// Clubs 2..A, Diamonds 2..A, Hearts 2..A, Spades 2..A.
    pub fn standard_52() -> Self {
        let cards = Suit::ALL
            .iter()
            .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card::new(rank, suit)))
            .collect();
        Deck {
            cards,
            burned: Vec::new(),
        }
    }

    /// Свежая перемешанная колода.
    pub fn shuffled<R: RandomSource>(rng: &mut R) -> Self {
        let mut deck = Self::standard_52();
        deck.shuffle(rng);
        deck
    }

    pub fn shuffle<R: RandomSource>(&mut self, rng: &mut R) {
        rng.shuffle(&mut self.cards);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Взять одну карту сверху колоды.
    pub fn deal(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::EmptyDeck)
    }

    /// Взять n карт сверху. Если карт не хватает, колода не меняется.
    pub fn deal_n(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        if self.cards.len() < n {
            return Err(DeckError::EmptyDeck);
        }
        let mut taken = Vec::with_capacity(n);
        for _ in 0..n {
            taken.push(self.deal()?);
        }
        Ok(taken)
    }

    /// Сжечь верхнюю карту.
    pub fn burn(&mut self) -> Result<Card, DeckError> {
        let card = self.deal()?;
        self.burned.push(card);
        Ok(card)
    }

    /// Убрать из колоды уже известные карты (для оценки эквити).
    pub fn remove_cards(&mut self, to_remove: &[Card]) {
        self.cards.retain(|c| !to_remove.contains(c));
    }
}
