use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};
use std::iter::Sum;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Номинал фишки (лицевая стоимость одной фишки).
pub type Denomination = u64;

/// Сумма в "деньгах" (не в штуках фишек). Обёртка над u64, чтобы не путать с количеством фишек.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chips(pub u64);

impl Chips {
    pub const ZERO: Chips = Chips(0);

    pub fn new(amount: u64) -> Self {
        Chips(amount)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Безопасное вычитание, не даёт уйти в минус.
    pub fn saturating_sub(self, other: Chips) -> Chips {
        Chips(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Chips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

impl Add for Chips {
    type Output = Chips;

    fn add(self, rhs: Chips) -> Self::Output {
        Chips(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Chips {
    fn add_assign(&mut self, rhs: Chips) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Chips {
    type Output = Chips;

    fn sub(self, rhs: Chips) -> Self::Output {
        Chips(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Chips {
    fn sub_assign(&mut self, rhs: Chips) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Sum for Chips {
    fn sum<I: Iterator<Item = Chips>>(iter: I) -> Self {
        iter.fold(Chips::ZERO, |acc, c| acc + c)
    }
}

/// Ошибки конструирования набора номиналов.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChipSetError {
    #[error("Набор номиналов пуст")]
    Empty,

    #[error("Номинал должен быть > 0")]
    ZeroDenomination,

    #[error("Номинал {0} указан дважды")]
    Duplicate(Denomination),

    #[error("Номинал {denomination} не кратен минимальному номиналу {smallest}")]
    NotMultipleOfSmallest {
        denomination: Denomination,
        smallest: Denomination,
    },
}

/// Набор номиналов, которыми играет стол.
///
/// Инвариант: номиналы уникальны, > 0 и каждый кратен минимальному.
/// Благодаря этому любую сумму из фишек набора можно без остатка
/// разменять в минимальный номинал.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<Denomination>", into = "Vec<Denomination>")]
pub struct ChipSet {
    /// По возрастанию.
    denominations: Vec<Denomination>,
}

impl ChipSet {
    /// Классический набор казино: белые 50, красные 100, зелёные 250, синие 500, чёрные 1000.
    pub const CASINO: [Denomination; 5] = [50, 100, 250, 500, 1000];

    pub fn new(denominations: &[Denomination]) -> Result<Self, ChipSetError> {
        if denominations.is_empty() {
            return Err(ChipSetError::Empty);
        }

        let mut sorted = denominations.to_vec();
        sorted.sort_unstable();

        if sorted[0] == 0 {
            return Err(ChipSetError::ZeroDenomination);
        }
        for pair in sorted.windows(2) {
            if pair[0] == pair[1] {
                return Err(ChipSetError::Duplicate(pair[0]));
            }
        }

        let smallest = sorted[0];
        if let Some(&bad) = sorted.iter().find(|&&d| d % smallest != 0) {
            return Err(ChipSetError::NotMultipleOfSmallest {
                denomination: bad,
                smallest,
            });
        }

        Ok(Self {
            denominations: sorted,
        })
    }

    pub fn casino() -> Self {
        Self {
            denominations: Self::CASINO.to_vec(),
        }
    }

    /// Номиналы по возрастанию.
    pub fn ascending(&self) -> impl DoubleEndedIterator<Item = Denomination> + '_ {
        self.denominations.iter().copied()
    }

    pub fn smallest(&self) -> Denomination {
        self.denominations[0]
    }

    pub fn contains(&self, denomination: Denomination) -> bool {
        self.denominations.binary_search(&denomination).is_ok()
    }

    pub fn len(&self) -> usize {
        self.denominations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.denominations.is_empty()
    }
}

impl Default for ChipSet {
    fn default() -> Self {
        Self::casino()
    }
}

impl TryFrom<Vec<Denomination>> for ChipSet {
    type Error = ChipSetError;

    fn try_from(value: Vec<Denomination>) -> Result<Self, Self::Error> {
        ChipSet::new(&value)
    }
}

impl From<ChipSet> for Vec<Denomination> {
    fn from(set: ChipSet) -> Self {
        set.denominations
    }
}
