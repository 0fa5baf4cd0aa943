use core::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::domain::{Chips, PlayerId, SeatIndex, Table};
use crate::engine::errors::EngineError;
use crate::engine::positions::payout_priority;
use crate::engine::pot::Pot;
use crate::eval::RankGroup;

/// Одна выплата из банка.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payout {
    pub pot_index: usize,
    pub seat: SeatIndex,
    pub player_id: PlayerId,
    pub amount: Chips,
}

/// Кто забирает банк: лучшая ступень таблицы, в которой есть участники банка.
///
/// Если живых участников у банка нет, банк уходит лучшей живой руке.
pub fn pot_winners(pot: &Pot, standings: &[RankGroup]) -> Vec<PlayerId> {
    for group in standings {
        let eligible: Vec<PlayerId> = group
            .players
            .iter()
            .copied()
            .filter(|id| pot.is_contributor(*id))
            .collect();
        if !eligible.is_empty() {
            return eligible;
        }
    }
    standings
        .first()
        .map(|g| g.players.clone())
        .unwrap_or_default()
}

/// Разделить банк между победителями поровну.
///
/// Доля считается в минимальных номиналах; остаток раздаётся по одной
/// минимальной фишке, начиная с ближайшего против часовой стрелки от дилера.
/// Сумма выплат равна стоимости банка, банк остаётся пустым.
pub fn distribute_pot(
    pot: &mut Pot,
    pot_index: usize,
    winners: &[PlayerId],
    table: &mut Table,
    dealer: SeatIndex,
) -> Result<Vec<Payout>, EngineError> {
    if pot.is_empty() {
        return Ok(Vec::new());
    }
    if winners.is_empty() {
        return Err(EngineError::Internal("у банка нет победителей"));
    }

    let smallest = pot
        .chips
        .smallest_denomination()
        .ok_or(EngineError::Internal("у банка нет номиналов"))?;
    let value = pot.total().0;
    if value % smallest != 0 {
        return Err(EngineError::Internal("банк не кратен минимальному номиналу"));
    }

    let mut order = Vec::with_capacity(winners.len());
    for &player_id in winners {
        let seat = table
            .seat_of(player_id)
            .ok_or(EngineError::Internal("победитель не сидит за столом"))?;
        order.push((seat, player_id));
    }
    let seat_count = table.seats.len();
    order.sort_by_key(|&(seat, _)| Reverse(payout_priority(seat, dealer, seat_count)));

    let units = value / smallest;
    let share = units / order.len() as u64;
    let extra = units % order.len() as u64;

    let mut payouts = Vec::with_capacity(order.len());
    for (i, &(seat, player_id)) in order.iter().enumerate() {
        let bonus = u64::from((i as u64) < extra);
        let amount = Chips((share + bonus) * smallest);
        if amount.is_zero() {
            continue;
        }

        let chips = match pot.chips.withdraw_value(amount) {
            Ok(chips) => chips,
            Err(_) => {
                pot.chips.to_smallest_denomination()?;
                pot.chips.withdraw_value(amount)?
            }
        };
        table.seats[seat as usize].stack.absorb(chips)?;

        payouts.push(Payout {
            pot_index,
            seat,
            player_id,
            amount,
        });
    }

    if !pot.is_empty() {
        return Err(EngineError::Internal("после выплат в банке остались фишки"));
    }
    Ok(payouts)
}

/// Выплатить все банки по таблице сил (главный банк первым).
pub fn run_showdown(
    table: &mut Table,
    pots: &mut [Pot],
    standings: &[RankGroup],
    dealer: SeatIndex,
) -> Result<Vec<Payout>, EngineError> {
    let mut payouts = Vec::new();
    for (index, pot) in pots.iter_mut().enumerate() {
        let winners = pot_winners(pot, standings);
        payouts.extend(distribute_pot(pot, index, &winners, table, dealer)?);
    }
    Ok(payouts)
}

/// Все, кроме одного, сбросили: ему уходят все банки без вскрытия.
pub fn award_uncontested(
    table: &mut Table,
    pots: &mut [Pot],
    winner: PlayerId,
    dealer: SeatIndex,
) -> Result<Vec<Payout>, EngineError> {
    let mut payouts = Vec::new();
    for (index, pot) in pots.iter_mut().enumerate() {
        payouts.extend(distribute_pot(pot, index, &[winner], table, dealer)?);
    }
    Ok(payouts)
}
