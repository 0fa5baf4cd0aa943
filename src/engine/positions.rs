use crate::domain::{Player, SeatIndex, Table};

/// Места по кругу, начиная со `start` (включительно), для которых `keep` = true.
pub fn collect_seats_from<F>(table: &Table, start: SeatIndex, keep: F) -> Vec<SeatIndex>
where
    F: Fn(&Player) -> bool,
{
    let n = table.seats.len();
    if n == 0 {
        return Vec::new();
    }

    let mut seats = Vec::with_capacity(n);
    let mut idx = start as usize % n;
    for _ in 0..n {
        if keep(&table.seats[idx]) {
            seats.push(idx as SeatIndex);
        }
        idx = (idx + 1) % n;
    }
    seats
}

/// Места по кругу, начиная со следующего после `seat`.
pub fn collect_seats_after<F>(table: &Table, seat: SeatIndex, keep: F) -> Vec<SeatIndex>
where
    F: Fn(&Player) -> bool,
{
    let n = table.seats.len();
    if n == 0 {
        return Vec::new();
    }
    let start = ((seat as usize + 1) % n) as SeatIndex;
    collect_seats_from(table, start, keep)
}

/// Следующая кнопка:
/// - если кнопка уже была, то следующий игрок с фишками;
/// - иначе первый игрок с фишками от нулевого места.
pub fn next_dealer(table: &Table) -> Option<SeatIndex> {
    match table.dealer_button {
        Some(button) => collect_seats_after(table, button, Player::is_funded)
            .first()
            .copied(),
        None => collect_seats_from(table, 0, Player::is_funded).first().copied(),
    }
}

/// Приоритет на остаток при делёжке банка: чем больше, тем раньше.
///
/// Ближайший против часовой стрелки от дилера получает первым, дилер последним.
pub fn payout_priority(seat: SeatIndex, dealer: SeatIndex, seat_count: usize) -> usize {
    if seat_count == 0 {
        return 0;
    }
    (seat as usize + seat_count - dealer as usize % seat_count) % seat_count
}

/// Относительная позиция места (0.0..1.0), как её видит стратегия.
pub fn relative_position(seat: SeatIndex, seat_count: usize) -> f64 {
    if seat_count == 0 {
        return 0.0;
    }
    seat as f64 / seat_count as f64
}
