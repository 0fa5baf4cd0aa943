//! Тесты раскладки ставок по банкам и выплат на шоудауне.
//!
//! Здесь проверяем:
//! - сайд-поты при олл-инах разного размера (500/500/200);
//! - продолжение главного банка на следующей улице;
//! - новый банк, если кто-то в олл-ине с прошлой улицы;
//! - выплаты по таблице сил с учётом участия в банке.

use holdem_evo_engine::domain::card::parse_cards;
use holdem_evo_engine::domain::chips::Chips;
use holdem_evo_engine::domain::ledger::ChipLedger;
use holdem_evo_engine::domain::table::{Table, TableConfig};
use holdem_evo_engine::domain::PlayerId;
use holdem_evo_engine::engine::pot::{pots_total, Pot};
use holdem_evo_engine::engine::showdown::run_showdown;
use holdem_evo_engine::engine::side_pots::resolve_bets_into_pots;
use holdem_evo_engine::eval::{evaluate_table, EvalRules};

const A: PlayerId = 1;
const B: PlayerId = 2;
const C: PlayerId = 3;

/// Стол A, B по 5000 и C с заданным стеком.
fn table_with_short_c(c_stack: u64) -> Table {
    let mut table = Table::new(1, "side pots", TableConfig::default()).unwrap();
    table.seat_player(A, "A").unwrap();
    table.seat_player(B, "B").unwrap();
    let short = ChipLedger::compose(&table.config.chip_set, Chips(c_stack));
    table.seat_player_with_stack(C, "C", short).unwrap();
    table
}

fn bet(table: &mut Table, seat: usize, value: u64) {
    let amount = ChipLedger::compose(&table.config.chip_set, Chips(value));
    table.seats[seat].place_bet(&amount).unwrap();
}

fn sorted(ids: &[PlayerId]) -> Vec<PlayerId> {
    let mut v = ids.to_vec();
    v.sort_unstable();
    v
}

// ===================== SIDE POTS =====================

/// A и B ставят по 500, C в олл-ине на 200.
/// Главный банк 600 на троих, сайд-пот 600 на A и B.
#[test]
fn all_in_for_less_creates_side_pot() {
    let mut table = table_with_short_c(200);
    bet(&mut table, 0, 500);
    bet(&mut table, 1, 500);
    table.seats[2].push_all_in().unwrap();

    let mut pots = Vec::new();
    resolve_bets_into_pots(&mut table, &mut pots).unwrap();

    assert_eq!(pots.len(), 2, "Главный банк и один сайд-пот");
    assert_eq!(pots[0].total(), Chips(600));
    assert_eq!(sorted(&pots[0].contributors), vec![A, B, C]);
    assert_eq!(pots[1].total(), Chips(600));
    assert_eq!(sorted(&pots[1].contributors), vec![A, B]);

    assert!(table.seats.iter().all(|p| p.bet.is_empty()), "Ставки должны уйти в банки");
    assert_eq!(table.chips_in_play() + pots_total(&pots), Chips(10_200));
}

#[test]
fn equal_bets_make_single_pot() {
    let mut table = table_with_short_c(5000);
    for seat in 0..3 {
        bet(&mut table, seat, 100);
    }

    let mut pots = Vec::new();
    resolve_bets_into_pots(&mut table, &mut pots).unwrap();

    assert_eq!(pots.len(), 1);
    assert_eq!(pots[0].total(), Chips(300));
}

#[test]
fn no_bets_leave_pots_unchanged() {
    let mut table = table_with_short_c(5000);
    let mut pots = Vec::new();
    resolve_bets_into_pots(&mut table, &mut pots).unwrap();
    assert!(pots.is_empty());
}

/// C сбросил после префлопа: ставки флопа продолжают главный банк.
#[test]
fn later_street_continues_pot_when_contributors_still_betting() {
    let mut table = table_with_short_c(5000);
    for seat in 0..3 {
        bet(&mut table, seat, 100);
    }
    let mut pots = Vec::new();
    resolve_bets_into_pots(&mut table, &mut pots).unwrap();

    table.seats[2].folded = true;
    bet(&mut table, 0, 200);
    bet(&mut table, 1, 200);
    resolve_bets_into_pots(&mut table, &mut pots).unwrap();

    assert_eq!(pots.len(), 1);
    assert_eq!(pots[0].total(), Chips(700));
    assert_eq!(sorted(&pots[0].contributors), vec![A, B, C]);
}

/// C в олл-ине с префлопа: ставки флопа идут в новый сайд-пот.
#[test]
fn later_street_opens_side_pot_after_all_in() {
    let mut table = table_with_short_c(100);
    bet(&mut table, 0, 100);
    bet(&mut table, 1, 100);
    table.seats[2].push_all_in().unwrap();
    let mut pots = Vec::new();
    resolve_bets_into_pots(&mut table, &mut pots).unwrap();

    bet(&mut table, 0, 200);
    bet(&mut table, 1, 200);
    resolve_bets_into_pots(&mut table, &mut pots).unwrap();

    assert_eq!(pots.len(), 2);
    assert_eq!(pots[0].total(), Chips(300));
    assert_eq!(pots[1].total(), Chips(400));
    assert_eq!(sorted(&pots[1].contributors), vec![A, B]);
}

// ===================== SHOWDOWN =====================

/// Лучшая рука у C (тузы), но он участвует только в главном банке.
/// Сайд-пот забирает следующий по силе среди A и B.
#[test]
fn short_all_in_wins_only_main_pot() {
    let mut table = table_with_short_c(200);
    bet(&mut table, 0, 500);
    bet(&mut table, 1, 500);
    table.seats[2].push_all_in().unwrap();
    let mut pots = Vec::new();
    resolve_bets_into_pots(&mut table, &mut pots).unwrap();

    let board = parse_cards("2c 7d 9h Js 3c").unwrap();
    let hole_a = parse_cards("Kh Kd").unwrap();
    let hole_b = parse_cards("Qh Qd").unwrap();
    let hole_c = parse_cards("As Ad").unwrap();
    let standings = evaluate_table(
        &[(A, hole_a.as_slice()), (B, hole_b.as_slice()), (C, hole_c.as_slice())],
        &board,
        EvalRules::default(),
    )
    .unwrap();

    let payouts = run_showdown(&mut table, &mut pots, &standings, 0).unwrap();

    assert_eq!(table.seats[2].stack_value(), Chips(600), "C забирает главный банк");
    assert_eq!(table.seats[0].stack_value(), Chips(5100), "A забирает сайд-пот");
    assert_eq!(table.seats[1].stack_value(), Chips(4500));
    assert!(pots.iter().all(Pot::is_empty));

    let paid: Chips = payouts.iter().map(|p| p.amount).sum();
    assert_eq!(paid, Chips(1200));
    assert_eq!(payouts[0].pot_index, 0);
    assert_eq!(payouts[0].player_id, C);
}
