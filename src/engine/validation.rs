use crate::domain::chips::Chips;
use crate::domain::player::Player;
use crate::engine::actions::{Decision, FoldReason};

/// Решение игрока после приведения к правилам стола.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BetPlan {
    Fold(FoldReason),
    Check,
    /// Доложить до уровня ставки.
    Call,
    /// Доложить до уровня и сверху `raise_by` (уже не меньше минимального рейза).
    Raise { raise_by: Chips, bluff: bool },
    AllIn,
}

/// Привести решение к допустимому действию.
///
/// - check при ставке, которую надо уравнять, превращается в фолд;
/// - call без ставки превращается в check;
/// - рейз меньше минимального поднимается до минимального;
/// - call или рейз, на которые не хватает стека, становятся олл-ином.
pub fn normalize_decision(
    decision: Decision,
    player: &Player,
    amount_to_call: Chips,
    min_raise: Chips,
) -> BetPlan {
    let stack = player.stack_value();
    let to_call = amount_to_call.saturating_sub(player.bet_value());

    match decision {
        Decision::Fold => BetPlan::Fold(FoldReason::Voluntary),

        Decision::Check => {
            if to_call.is_zero() {
                BetPlan::Check
            } else {
                BetPlan::Fold(FoldReason::IllegalCheck)
            }
        }

        Decision::Call => {
            if to_call.is_zero() {
                BetPlan::Check
            } else if stack <= to_call {
                BetPlan::AllIn
            } else {
                BetPlan::Call
            }
        }

        Decision::Raise(amount) | Decision::Bluff(amount) => {
            let raise_by = if amount < min_raise { min_raise } else { amount };
            if to_call + raise_by >= stack {
                BetPlan::AllIn
            } else {
                BetPlan::Raise {
                    raise_by,
                    bluff: matches!(decision, Decision::Bluff(_)),
                }
            }
        }

        Decision::AllIn => BetPlan::AllIn,
    }
}
