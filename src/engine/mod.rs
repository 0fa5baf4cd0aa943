//! Покерный движок: ставки, переход улиц, сайд-поты, шоудаун.
//!
//! Высокоуровневые операции:
//!   - `play_hand` – сыграть одну раздачу целиком
//!   - `TableManager::run_all` – гонять много столов параллельно до победителя

pub mod actions;
pub mod betting;
pub mod decision;
pub mod errors;
pub mod game_loop;
pub mod hand_history;
pub mod positions;
pub mod pot;
pub mod showdown;
pub mod side_pots;
pub mod table_manager;
pub mod validation;

pub use actions::{ActionCounters, Decision, FoldReason, PlayerAction, ResolvedAction};
pub use decision::{CallingStation, DecisionContext, DecisionMaker, EquityThreshold, ScriptedStrategy};
pub use errors::EngineError;
pub use game_loop::{play_hand, CancelToken, HandEngine, HandOutcome};
pub use hand_history::{HandEvent, HandEventKind, HandHistory, HandObserver, NullObserver};
pub use pot::Pot;
pub use showdown::Payout;
pub use table_manager::{ManagedTable, PlayerReport, TableManager, TableOutcome};

/// Источник случайности для движка (перемешивание колоды, Монте-Карло).
/// Реализации в infra.
pub trait RandomSource {
    fn shuffle<T>(&mut self, slice: &mut [T]);
}
