use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::PlayerId;

use super::evaluator::{evaluate_hand, EvalError, EvalRules};
use super::hand_rank::{HandEvaluation, HandStrength};

/// Одна ступень таблицы: единственный игрок или группа с равными руками.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankGroup {
    pub strength: HandStrength,
    pub players: Vec<PlayerId>,
}

impl RankGroup {
    pub fn is_tie(&self) -> bool {
        self.players.len() > 1
    }
}

/// Ранжировать игроков по их картам и общему борду.
///
/// Результат строго убывает по силе; равные ключи объединены в одну группу
/// в порядке входа.
pub fn evaluate_table(
    contenders: &[(PlayerId, &[Card])],
    community: &[Card],
    rules: EvalRules,
) -> Result<Vec<RankGroup>, EvalError> {
    let mut evaluated = Vec::with_capacity(contenders.len());
    for &(player_id, hole) in contenders {
        let mut cards = Vec::with_capacity(hole.len() + community.len());
        cards.extend_from_slice(hole);
        cards.extend_from_slice(community);
        evaluated.push((player_id, evaluate_hand(&cards, rules)?));
    }
    Ok(rank_evaluations(&evaluated))
}

/// Ранжировать уже посчитанные руки.
pub fn rank_evaluations(evaluated: &[(PlayerId, HandEvaluation)]) -> Vec<RankGroup> {
    let mut keyed: Vec<(PlayerId, HandStrength)> = evaluated
        .iter()
        .map(|(id, eval)| (*id, eval.strength()))
        .collect();
    // sort_by стабильный: при равенстве сохраняется порядок входа.
    keyed.sort_by(|a, b| b.1.cmp(&a.1));

    let mut groups: Vec<RankGroup> = Vec::new();
    for (player_id, strength) in keyed {
        match groups.last_mut() {
            Some(last) if last.strength == strength => last.players.push(player_id),
            _ => groups.push(RankGroup {
                strength,
                players: vec![player_id],
            }),
        }
    }
    groups
}
