//! Оценка силы покерных рук (Texas Hold'em).
//!
//! Основные функции:
//!   `evaluate_hand(cards, rules) -> HandEvaluation`
//!   `evaluate_table(contenders, community, rules) -> Vec<RankGroup>`
//!   `monte_carlo_equity(..) -> Equity`

pub mod equity;
pub mod evaluator;
pub mod hand_rank;
pub mod lookup_tables;
pub mod table_rank;

pub use equity::{improvement_chance, monte_carlo_equity, Equity};
pub use evaluator::{evaluate_hand, EvalError, EvalRules};
pub use hand_rank::{HandEvaluation, HandStrength, HandTier};
pub use table_rank::{evaluate_table, rank_evaluations, RankGroup};
