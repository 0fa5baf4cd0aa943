use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::card::Card;
use crate::domain::chips::{ChipSet, ChipSetError, Chips, Denomination};
use crate::domain::ledger::{ChipLedger, LedgerError};
use crate::domain::player::Player;
use crate::domain::{PlayerId, TableId};
use crate::eval::EvalRules;

/// Индекс места за столом (0..max_seats-1).
pub type SeatIndex = u8;

/// Ошибки конфигурации стола (ловятся до первой раздачи).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Некорректный набор фишек: {0}")]
    ChipSet(#[from] ChipSetError),

    #[error("За столом нет игроков")]
    NoPlayers,

    #[error("Слишком много игроков: {count}, мест {max_seats}")]
    TooManyPlayers { count: usize, max_seats: u8 },

    #[error("Количество мест должно быть от 2 до {max}, задано {got}")]
    BadSeatCount { got: u8, max: u8 },

    #[error("Стартовый стек должен быть больше нуля")]
    ZeroStartingStack,

    #[error("Большой блайнд должен быть больше нуля")]
    ZeroBigBlind,

    #[error("Малый блайнд ({small}) больше большого ({big})")]
    SmallBlindExceedsBig { small: Chips, big: Chips },

    #[error("{what}: номинал {denomination} отсутствует в наборе фишек")]
    NotRepresentable {
        what: &'static str,
        denomination: Denomination,
    },

    #[error("Минимальный рейз должен быть больше нуля")]
    ZeroMinRaise,

    #[error("Ошибка фишек в конфиге: {0}")]
    Ledger(LedgerError),
}

/// Настройки стола.
///
/// Блайнды и стартовый стек задаются составом фишек `(номинал, количество)`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableConfig {
    /// Максимальное количество мест за столом (2..=10).
    pub max_seats: u8,
    pub chip_set: ChipSet,
    pub small_blind: Vec<(Denomination, u64)>,
    pub big_blind: Vec<(Denomination, u64)>,
    pub starting_stack: Vec<(Denomination, u64)>,
    /// Минимальный размер повышения в начале каждой улицы.
    pub min_raise: Chips,
    pub eval_rules: EvalRules,
    /// Сколько прогонов Монте-Карло давать игроку на каждое решение (0 = не считать).
    pub equity_samples: u32,
    /// Лимит времени на одно решение.
    ///
    /// Время меряется после того, как стратегия вернула ответ: опоздавшее
    /// решение засчитывается как фолд по таймауту. Стратегию, которая не
    /// возвращается вовсе, движок не прерывает, и стол в этом случае встаёт.
    pub decision_timeout_ms: Option<u64>,
    /// Сколько раздач максимум играет стол в `TableManager`.
    pub max_hands: u64,
}

impl TableConfig {
    pub const MAX_SEATS: u8 = 10;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_seats < 2 || self.max_seats > Self::MAX_SEATS {
            return Err(ConfigError::BadSeatCount {
                got: self.max_seats,
                max: Self::MAX_SEATS,
            });
        }

        let small = self.small_blind_ledger()?.total_value();
        let big = self.big_blind_ledger()?.total_value();
        if big.is_zero() {
            return Err(ConfigError::ZeroBigBlind);
        }
        if small > big {
            return Err(ConfigError::SmallBlindExceedsBig { small, big });
        }
        if self.starting_stack_ledger()?.is_empty() {
            return Err(ConfigError::ZeroStartingStack);
        }
        if self.min_raise.is_zero() {
            return Err(ConfigError::ZeroMinRaise);
        }
        Ok(())
    }

    pub fn small_blind_ledger(&self) -> Result<ChipLedger, ConfigError> {
        self.ledger_from("Малый блайнд", &self.small_blind)
    }

    pub fn big_blind_ledger(&self) -> Result<ChipLedger, ConfigError> {
        self.ledger_from("Большой блайнд", &self.big_blind)
    }

    pub fn starting_stack_ledger(&self) -> Result<ChipLedger, ConfigError> {
        self.ledger_from("Стартовый стек", &self.starting_stack)
    }

    pub fn decision_timeout(&self) -> Option<Duration> {
        self.decision_timeout_ms.map(Duration::from_millis)
    }

    fn ledger_from(
        &self,
        what: &'static str,
        counts: &[(Denomination, u64)],
    ) -> Result<ChipLedger, ConfigError> {
        ChipLedger::from_counts(&self.chip_set, counts).map_err(|e| match e {
            LedgerError::InvalidDenomination(denomination) => ConfigError::NotRepresentable {
                what,
                denomination,
            },
            other => ConfigError::Ledger(other),
        })
    }
}

impl Default for TableConfig {
    /// Белые 50, красные 100, зелёные 250, синие 500, чёрные 1000.
    /// SB = 1x50, BB = 1x100, стек = 5000.
    fn default() -> Self {
        Self {
            max_seats: 6,
            chip_set: ChipSet::casino(),
            small_blind: vec![(50, 1)],
            big_blind: vec![(100, 1)],
            starting_stack: vec![(50, 20), (100, 10), (250, 4), (500, 2), (1000, 1)],
            min_raise: Chips(100),
            eval_rules: EvalRules::default(),
            equity_samples: 0,
            decision_timeout_ms: None,
            max_hands: 1_000,
        }
    }
}

/// Состояние стола между раздачами и во время раздачи.
///
/// Индекс в `seats` = SeatIndex. Вылетевшие игроки остаются на своих местах
/// с пустым стеком и в раздачах не участвуют.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub config: TableConfig,
    pub seats: Vec<Player>,
    /// Общие карты борда (0–5 карт).
    pub community: Vec<Card>,
    /// Место дилера или None, если раздач ещё не было.
    pub dealer_button: Option<SeatIndex>,
    pub hands_played: u64,
    pub hand_in_progress: bool,
}

impl Table {
    /// Пустой стол. Конфиг проверяется сразу.
    pub fn new(id: TableId, name: impl Into<String>, config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id,
            name: name.into(),
            config,
            seats: Vec::new(),
            community: Vec::with_capacity(5),
            dealer_button: None,
            hands_played: 0,
            hand_in_progress: false,
        })
    }

    /// Посадить игрока со стартовым стеком из конфига.
    pub fn seat_player(&mut self, id: PlayerId, name: impl Into<String>) -> Result<SeatIndex, ConfigError> {
        let stack = self.config.starting_stack_ledger()?;
        self.seat_player_with_stack(id, name, stack)
    }

    /// Посадить игрока с произвольным стеком (набор номиналов должен совпадать со столом).
    pub fn seat_player_with_stack(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
        stack: ChipLedger,
    ) -> Result<SeatIndex, ConfigError> {
        if self.seats.len() >= self.config.max_seats as usize {
            return Err(ConfigError::TooManyPlayers {
                count: self.seats.len() + 1,
                max_seats: self.config.max_seats,
            });
        }
        // Стек переводится на набор номиналов стола.
        let mut seated = ChipLedger::empty(&self.config.chip_set);
        seated.absorb(stack).map_err(|e| match e {
            LedgerError::InvalidDenomination(denomination) => ConfigError::NotRepresentable {
                what: "Стек игрока",
                denomination,
            },
            other => ConfigError::Ledger(other),
        })?;
        let seat = self.seats.len() as SeatIndex;
        self.seats.push(Player::new(id, name, seated));
        Ok(seat)
    }

    pub fn max_seats(&self) -> u8 {
        self.config.max_seats
    }

    pub fn seated_count(&self) -> usize {
        self.seats.len()
    }

    /// Игроки с ненулевым стеком.
    pub fn funded_count(&self) -> usize {
        self.seats.iter().filter(|p| p.is_funded()).count()
    }

    pub fn player(&self, seat: SeatIndex) -> Option<&Player> {
        self.seats.get(seat as usize)
    }

    pub fn seat_of(&self, player_id: PlayerId) -> Option<SeatIndex> {
        self.seats
            .iter()
            .position(|p| p.id == player_id)
            .map(|i| i as SeatIndex)
    }

    /// Сумма стеков и текущих ставок всех игроков.
    pub fn chips_in_play(&self) -> Chips {
        self.seats
            .iter()
            .map(|p| p.stack_value() + p.bet_value())
            .sum()
    }
}
