use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::table::{ConfigError, Table};
use crate::domain::{PlayerId, SeatIndex, TableId};
use crate::engine::actions::ActionCounters;
use crate::engine::decision::DecisionMaker;
use crate::engine::errors::EngineError;
use crate::engine::game_loop::{play_hand, CancelToken};
use crate::infra::ids::IdGenerator;
use crate::infra::logging::TracingObserver;
use crate::infra::rng::DeterministicRng;

/// Снимок игрока после прогона стола (для внешнего отбора стратегий).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerReport {
    pub player_id: PlayerId,
    pub name: String,
    pub seat: SeatIndex,
    pub stack: Chips,
    pub starting_value: Chips,
    pub rounds_survived: u32,
    pub counters: ActionCounters,
}

/// Итог прогона одного стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableOutcome {
    pub table_id: TableId,
    pub hands_played: u64,
    pub players: Vec<PlayerReport>,
    /// Ошибка, на которой прогон остановился (раздача при этом откатилась).
    pub error: Option<String>,
}

impl TableOutcome {
    fn from_table(table: &Table, error: Option<String>) -> Self {
        let players = table
            .seats
            .iter()
            .enumerate()
            .map(|(seat, p)| PlayerReport {
                player_id: p.id,
                name: p.name.clone(),
                seat: seat as SeatIndex,
                stack: p.stack_value(),
                starting_value: p.starting_value,
                rounds_survived: p.rounds_survived,
                counters: p.counters,
            })
            .collect();
        Self {
            table_id: table.id,
            hands_played: table.hands_played,
            players,
            error,
        }
    }

    /// Единственный игрок с фишками, если стол доигран до конца.
    pub fn winner(&self) -> Option<&PlayerReport> {
        let mut funded = self.players.iter().filter(|p| !p.stack.is_zero());
        match (funded.next(), funded.next()) {
            (Some(p), None) => Some(p),
            _ => None,
        }
    }

    pub fn total_chips(&self) -> Chips {
        self.players.iter().map(|p| p.stack).sum()
    }

    pub fn starting_chips(&self) -> Chips {
        self.players.iter().map(|p| p.starting_value).sum()
    }
}

/// Стол вместе со стратегиями игроков и своим RNG.
pub struct ManagedTable {
    pub table: Table,
    pub strategies: Vec<Box<dyn DecisionMaker>>,
    rng: DeterministicRng,
}

/// Менеджер столов: каждый стол играет раздачи до одного игрока с фишками
/// (или до `max_hands`), столы идут параллельно через rayon.
pub struct TableManager {
    tables: Vec<ManagedTable>,
    ids: IdGenerator,
    cancel: CancelToken,
}

impl TableManager {
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            ids: IdGenerator::new(),
            cancel: CancelToken::new(),
        }
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    /// Токен, которым можно прервать текущие раздачи на всех столах.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Добавить стол. `strategies[i]` играет за `table.seats[i]`,
    /// `seed` задаёт детерминированную колоду стола.
    pub fn add_table(
        &mut self,
        table: Table,
        strategies: Vec<Box<dyn DecisionMaker>>,
        seed: u64,
    ) -> Result<TableId, EngineError> {
        if table.seats.is_empty() {
            return Err(ConfigError::NoPlayers.into());
        }
        if strategies.len() != table.seats.len() {
            return Err(EngineError::StrategyCountMismatch {
                players: table.seats.len(),
                strategies: strategies.len(),
            });
        }
        let id = table.id;
        self.tables.push(ManagedTable {
            table,
            strategies,
            rng: DeterministicRng::from_seed(seed),
        });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table(&self, table_id: TableId) -> Option<&Table> {
        self.tables
            .iter()
            .find(|mt| mt.table.id == table_id)
            .map(|mt| &mt.table)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().map(|mt| &mt.table)
    }

    /// Прогнать все столы параллельно. Результаты в порядке добавления столов.
    pub fn run_all(&mut self) -> Vec<TableOutcome> {
        let ids = &self.ids;
        let cancel = &self.cancel;
        self.tables
            .par_iter_mut()
            .map(|mt| run_table(mt, ids, cancel))
            .collect()
    }
}

impl Default for TableManager {
    fn default() -> Self {
        Self::new()
    }
}

fn run_table(mt: &mut ManagedTable, ids: &IdGenerator, cancel: &CancelToken) -> TableOutcome {
    let mut observer = TracingObserver::new(mt.table.id);
    let max_hands = mt.table.config.max_hands;
    let mut error = None;

    while mt.table.funded_count() >= 2 && mt.table.hands_played < max_hands {
        let hand_id = ids.next_hand_id();
        if let Err(err) = play_hand(
            &mut mt.table,
            &mut mt.strategies,
            &mut mt.rng,
            hand_id,
            &mut observer,
            cancel,
        ) {
            error = Some(err.to_string());
            break;
        }
    }

    tracing::info!(
        table_id = mt.table.id,
        hands = mt.table.hands_played,
        finished = error.is_none(),
        "прогон стола завершён"
    );
    TableOutcome::from_table(&mt.table, error)
}
