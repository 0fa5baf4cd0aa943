use crate::domain::{LedgerError, PlayerId, Table};
use crate::engine::pot::Pot;

/// Разложить ставки текущей улицы по банкам.
///
/// Ставки снимаются слоями по наименьшей оставшейся ставке: каждый, у кого
/// ещё что-то стоит, вносит уровень слоя и становится участником банка.
/// Первый слой продолжает последний банк, если все его живые участники
/// ставили на этой улице (никто не в олл-ине с прошлых улиц), иначе
/// открывается новый сайд-пот. Каждый следующий слой всегда новый банк.
///
/// После вызова ставки всех игроков пусты.
pub fn resolve_bets_into_pots(table: &mut Table, pots: &mut Vec<Pot>) -> Result<(), LedgerError> {
    let mut bettors: Vec<usize> = (0..table.seats.len())
        .filter(|&i| !table.seats[i].bet.is_empty())
        .collect();
    if bettors.is_empty() {
        return Ok(());
    }
    // Стабильная сортировка: при равных ставках сохраняется порядок мест.
    bettors.sort_by_key(|&i| table.seats[i].bet_value());

    let mut first_layer = true;
    while let Some(&lowest) = bettors.first() {
        let level = table.seats[lowest].bet_value();

        let bettor_ids: Vec<PlayerId> = bettors.iter().map(|&i| table.seats[i].id).collect();
        let continue_last = first_layer
            && pots
                .last()
                .is_some_and(|pot| live_contributors_all_betting(pot, table, &bettor_ids));
        if !continue_last {
            pots.push(Pot::new(table.seats[lowest].bet.empty_like()));
        }

        if let Some(pot) = pots.last_mut() {
            for &i in &bettors {
                let player = &mut table.seats[i];
                let layer = player.bet.withdraw_value(level)?;
                pot.chips.absorb(layer)?;
                pot.add_contributor(player.id);
            }
        }

        bettors.retain(|&i| !table.seats[i].bet.is_empty());
        first_layer = false;
    }

    Ok(())
}

/// Все несбросившие участники банка ставят в этом слое.
fn live_contributors_all_betting(pot: &Pot, table: &Table, bettors: &[PlayerId]) -> bool {
    pot.contributors.iter().all(|id| {
        let live = table
            .seats
            .iter()
            .any(|p| p.id == *id && !p.folded);
        !live || bettors.contains(id)
    })
}
