use crate::domain::card::{Card, Rank, Suit};

/// Битовая маска рангов: бит 0 = двойка, бит 12 = туз.
pub type RankMask = u16;

/// Маска из пяти подряд идущих рангов, начиная с двойки (23456).
const LOWEST_RUN: RankMask = 0b1_1111;

/// Колесо A2345: туз + двойка..пятёрка.
pub const WHEEL_MASK: RankMask = mask_from_ranks(&[Rank::Ace, Rank::Two, Rank::Three, Rank::Four, Rank::Five]);

/// Получить битовую маску для одного ранга.
pub const fn rank_to_bit(rank: Rank) -> RankMask {
    1 << (rank as u8 - 2)
}

/// Построить маску из списка рангов.
pub const fn mask_from_ranks(ranks: &[Rank]) -> RankMask {
    let mut mask: RankMask = 0;
    let mut i = 0;
    while i < ranks.len() {
        mask |= rank_to_bit(ranks[i]);
        i += 1;
    }
    mask
}

pub fn mask_of(cards: &[Card]) -> RankMask {
    cards.iter().fold(0, |m, c| m | rank_to_bit(c.rank))
}

/// Старшая карта стрита (числом 6..=14), если пять рангов идут подряд.
///
/// Колесо засчитывается только при `ace_low` и возвращает 5.
pub fn detect_straight(mask: RankMask, ace_low: bool) -> Option<u8> {
    // 9 непрерывных окон: 2-6 .. T-A; проверяем от старшего.
    for shift in (0..=8u8).rev() {
        let window = LOWEST_RUN << shift;
        if mask & window == window {
            return Some(shift + 6);
        }
    }
    if ace_low && mask & WHEEL_MASK == WHEEL_MASK {
        return Some(5);
    }
    None
}

/// Индекс масти для счётчиков.
pub const fn suit_index(suit: Suit) -> usize {
    match suit {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}

/// Счётчики рангов (индекс = числовой ранг 2..=14).
pub fn rank_counts(cards: &[Card]) -> [u8; 15] {
    let mut counts = [0u8; 15];
    for c in cards {
        counts[c.rank.value() as usize] += 1;
    }
    counts
}

/// Ранги, упорядоченные по (кратность ↓, ранг ↓), каждый ранг один раз.
pub fn grouped_ranks(counts: &[u8; 15]) -> Vec<(u8, u8)> {
    let mut groups: Vec<(u8, u8)> = (2u8..=14)
        .rev()
        .filter(|&r| counts[r as usize] > 0)
        .map(|r| (r, counts[r as usize]))
        .collect();
    groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
    groups
}
